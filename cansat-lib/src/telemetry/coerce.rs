use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{FieldIndex, Reading, Vector3};
use crate::error::DecodeError;

/// What to do with a numeric token that does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CoercionPolicy {
    /// Use zero for the field and keep going.
    #[default]
    Permissive,
    /// Fail the whole decode with [DecodeError::FieldParse].
    Strict,
}

/// Strip the ASCII whitespace a width-formatted sender may pad numbers with.
pub(crate) fn numeric_token(token: &str) -> &str {
    token.trim_matches(|c: char| c.is_ascii_whitespace())
}

struct Coercer<'a> {
    tokens: &'a [&'a str],
    policy: CoercionPolicy,
}

impl<'a> Coercer<'a> {
    fn token(&self, field: FieldIndex) -> &'a str {
        self.tokens[field.position()]
    }

    fn parse<T>(&self, field: FieldIndex) -> Result<T, DecodeError>
    where
        T: FromStr + Default,
    {
        let token = self.token(field);
        match numeric_token(token).parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) if self.policy == CoercionPolicy::Permissive => {
                warn!(field = %field, token, "unparseable field value, using zero");
                Ok(T::default())
            }
            Err(_) => Err(DecodeError::FieldParse {
                field,
                token: token.to_string(),
            }),
        }
    }

    fn vector(
        &self,
        x: FieldIndex,
        y: FieldIndex,
        z: FieldIndex,
    ) -> Result<Vector3, DecodeError> {
        Ok(Vector3::new(self.parse(x)?, self.parse(y)?, self.parse(z)?))
    }
}

/// Converts a tokenized frame into a [Reading].
///
/// `tokens` must be in wire order and contain exactly [FieldIndex::COUNT] entries.
///
/// # Errors
/// [DecodeError::FieldCount] if `tokens` has the wrong length, or [DecodeError::FieldParse]
/// for the first bad numeric token when `policy` is [CoercionPolicy::Strict].
pub fn coerce(tokens: &[&str], policy: CoercionPolicy) -> Result<Reading, DecodeError> {
    use FieldIndex::*;

    if tokens.len() != FieldIndex::COUNT {
        return Err(DecodeError::FieldCount {
            expected: FieldIndex::COUNT,
            actual: tokens.len(),
        });
    }
    let c = Coercer { tokens, policy };
    Ok(Reading {
        header: c.token(Header).to_string(),
        team_id: c.parse(TeamId)?,
        packet_count: c.parse(PacketCount)?,
        mission_time: c.parse(MissionTime)?,
        altitude: c.parse(Altitude)?,
        battery_voltage: c.parse(BatteryVoltage)?,
        relative_humidity: c.parse(RelativeHumidity)?,
        uv_radiation_index: c.parse(UvRadiationIndex)?,
        internal_temp: c.parse(InternalTemp)?,
        external_temp: c.parse(ExternalTemp)?,
        atmospheric_pressure: c.parse(AtmosphericPressure)?,
        gps_time: c.parse(GpsTime)?,
        gps_altitude: c.parse(GpsAltitude)?,
        gps_velocity: c.parse(GpsVelocity)?,
        gps_latitude: c.parse(GpsLatitude)?,
        gps_longitude: c.parse(GpsLongitude)?,
        gps_satellite_count: c.token(GpsSatelliteCount).to_string(),
        accelerometer: c.vector(AccelerometerX, AccelerometerY, AccelerometerZ)?,
        gyroscope: c.vector(GyroscopeX, GyroscopeY, GyroscopeZ)?,
        checksum: c.parse(Checksum)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn tokens() -> Vec<&'static str> {
        vec![
            "KAANSAT", "1", "5", "1000", "100.5", "7.4", "45.5", "3", "21.25", "-4.5", "101325",
            "1530000000", "98.2", "12.5", "19.4326", "-99.1332", "08", "0.1", "0.2", "9.81",
            "-1.5", "0", "2.25", "42",
        ]
    }

    #[test]
    fn coerce_all_fields() {
        let reading = coerce(&tokens(), CoercionPolicy::Strict).unwrap();

        assert_eq!(reading.header, "KAANSAT");
        assert_eq!(reading.team_id, 1);
        assert_eq!(reading.packet_count, 5);
        assert_eq!(reading.mission_time, 1000);
        assert_eq!(reading.altitude, 100.5);
        assert_eq!(reading.battery_voltage, 7.4);
        assert_eq!(reading.relative_humidity, 45.5);
        assert_eq!(reading.uv_radiation_index, 3.0);
        assert_eq!(reading.internal_temp, 21.25);
        assert_eq!(reading.external_temp, -4.5);
        assert_eq!(reading.atmospheric_pressure, 101_325.0);
        assert_eq!(reading.gps_time, 1_530_000_000);
        assert_eq!(reading.gps_altitude, 98.2);
        assert_eq!(reading.gps_velocity, 12.5);
        assert_eq!(reading.gps_latitude, 19.4326);
        assert_eq!(reading.gps_longitude, -99.1332);
        assert_eq!(reading.gps_satellite_count, "08");
        assert_eq!(reading.accelerometer, Vector3::new(0.1, 0.2, 9.81));
        assert_eq!(reading.gyroscope, Vector3::new(-1.5, 0.0, 2.25));
        assert_eq!(reading.checksum, 42);
    }

    #[test_case(FieldIndex::TeamId, "one" ; "integer")]
    #[test_case(FieldIndex::MissionTime, "-1" ; "negative mission time")]
    #[test_case(FieldIndex::Altitude, "" ; "empty double")]
    #[test_case(FieldIndex::GpsTime, "4294967296" ; "gps time overflow")]
    #[test_case(FieldIndex::GyroscopeZ, "1,5" ; "float with comma")]
    fn bad_token(field: FieldIndex, token: &'static str) {
        let mut tokens = tokens();
        tokens[field.position()] = token;

        let reading = coerce(&tokens, CoercionPolicy::Permissive).unwrap();
        assert_eq!(reading.value(field).to_string(), "0", "permissive should zero {field}");
        assert_eq!(reading.team_id == 0, field == FieldIndex::TeamId);

        let err = coerce(&tokens, CoercionPolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            DecodeError::FieldParse {
                field,
                token: token.to_string()
            }
        );
    }

    #[test_case(FieldIndex::Altitude, " 100.5", "100.5" ; "leading space")]
    #[test_case(FieldIndex::Altitude, "  100.50", "100.5" ; "width formatted")]
    #[test_case(FieldIndex::TeamId, "42 ", "42" ; "trailing space")]
    #[test_case(FieldIndex::MissionTime, "\t1000\r", "1000" ; "tab and carriage return")]
    #[test_case(FieldIndex::AccelerometerZ, " -9.5 ", "-9.5" ; "padded float")]
    fn padded_number(field: FieldIndex, token: &'static str, expected: &str) {
        let mut tokens = tokens();
        tokens[field.position()] = token;

        for policy in [CoercionPolicy::Permissive, CoercionPolicy::Strict] {
            let reading = coerce(&tokens, policy).unwrap();
            assert_eq!(reading.value(field).to_string(), expected, "{policy:?}");
        }
    }

    #[test]
    fn padding_inside_a_number_is_still_bad() {
        let mut tokens = tokens();
        tokens[FieldIndex::Altitude.position()] = "100 .5";

        assert_eq!(
            coerce(&tokens, CoercionPolicy::Strict).unwrap_err(),
            DecodeError::FieldParse {
                field: FieldIndex::Altitude,
                token: "100 .5".into()
            }
        );
    }

    #[test]
    fn text_fields_are_not_trimmed() {
        let mut tokens = tokens();
        tokens[FieldIndex::GpsSatelliteCount.position()] = " 8 ";

        let reading = coerce(&tokens, CoercionPolicy::Strict).unwrap();
        assert_eq!(reading.gps_satellite_count, " 8 ");
        assert_eq!(reading.satellite_count(), 8);
    }

    #[test]
    fn satellite_count_is_kept_verbatim() {
        let mut tokens = tokens();
        tokens[FieldIndex::GpsSatelliteCount.position()] = "n/a";

        let reading = coerce(&tokens, CoercionPolicy::Strict).unwrap();
        assert_eq!(reading.gps_satellite_count, "n/a");
        assert_eq!(reading.satellite_count(), 0);
    }

    #[test]
    fn wrong_token_count() {
        let tokens = tokens();
        let err = coerce(&tokens[1..], CoercionPolicy::Permissive).unwrap_err();
        assert_eq!(
            err,
            DecodeError::FieldCount {
                expected: 24,
                actual: 23
            }
        );
    }
}
