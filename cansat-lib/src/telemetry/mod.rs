//! CanSat telemetry data model.
//!
//! A telemetry frame carries exactly [FieldIndex::COUNT] fields in a fixed order: 23 data
//! fields followed by the checksum. The position of a field on the wire is its
//! [FieldIndex].
mod coerce;

pub use coerce::*;
pub(crate) use coerce::numeric_token;

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Telemetry fields in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum FieldIndex {
    Header = 0,
    TeamId,
    PacketCount,
    MissionTime,
    Altitude,
    BatteryVoltage,
    RelativeHumidity,
    UvRadiationIndex,
    InternalTemp,
    ExternalTemp,
    AtmosphericPressure,
    GpsTime,
    GpsAltitude,
    GpsVelocity,
    GpsLatitude,
    GpsLongitude,
    GpsSatelliteCount,
    AccelerometerX,
    AccelerometerY,
    AccelerometerZ,
    GyroscopeX,
    GyroscopeY,
    GyroscopeZ,
    Checksum,
}

impl FieldIndex {
    /// Number of fields in every frame, including the header and checksum.
    pub const COUNT: usize = 24;
    /// Number of fields covered by the checksum, i.e. every field before it.
    pub const DATA_FIELDS: usize = Self::COUNT - 1;

    /// All fields in wire order.
    pub const ALL: [FieldIndex; Self::COUNT] = [
        FieldIndex::Header,
        FieldIndex::TeamId,
        FieldIndex::PacketCount,
        FieldIndex::MissionTime,
        FieldIndex::Altitude,
        FieldIndex::BatteryVoltage,
        FieldIndex::RelativeHumidity,
        FieldIndex::UvRadiationIndex,
        FieldIndex::InternalTemp,
        FieldIndex::ExternalTemp,
        FieldIndex::AtmosphericPressure,
        FieldIndex::GpsTime,
        FieldIndex::GpsAltitude,
        FieldIndex::GpsVelocity,
        FieldIndex::GpsLatitude,
        FieldIndex::GpsLongitude,
        FieldIndex::GpsSatelliteCount,
        FieldIndex::AccelerometerX,
        FieldIndex::AccelerometerY,
        FieldIndex::AccelerometerZ,
        FieldIndex::GyroscopeX,
        FieldIndex::GyroscopeY,
        FieldIndex::GyroscopeZ,
        FieldIndex::Checksum,
    ];

    /// Zero-based position of this field in a tokenized frame.
    #[must_use]
    pub fn position(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FieldIndex::Header => "header",
            FieldIndex::TeamId => "team_id",
            FieldIndex::PacketCount => "packet_count",
            FieldIndex::MissionTime => "mission_time",
            FieldIndex::Altitude => "altitude",
            FieldIndex::BatteryVoltage => "battery_voltage",
            FieldIndex::RelativeHumidity => "relative_humidity",
            FieldIndex::UvRadiationIndex => "uv_radiation_index",
            FieldIndex::InternalTemp => "internal_temp",
            FieldIndex::ExternalTemp => "external_temp",
            FieldIndex::AtmosphericPressure => "atmospheric_pressure",
            FieldIndex::GpsTime => "gps_time",
            FieldIndex::GpsAltitude => "gps_altitude",
            FieldIndex::GpsVelocity => "gps_velocity",
            FieldIndex::GpsLatitude => "gps_latitude",
            FieldIndex::GpsLongitude => "gps_longitude",
            FieldIndex::GpsSatelliteCount => "gps_satellite_count",
            FieldIndex::AccelerometerX => "accelerometer_x",
            FieldIndex::AccelerometerY => "accelerometer_y",
            FieldIndex::AccelerometerZ => "accelerometer_z",
            FieldIndex::GyroscopeX => "gyroscope_x",
            FieldIndex::GyroscopeY => "gyroscope_y",
            FieldIndex::GyroscopeZ => "gyroscope_z",
            FieldIndex::Checksum => "checksum",
        }
    }
}

impl Display for FieldIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 3-axis sample from the accelerometer or gyroscope.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vector3 { x, y, z }
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(value: [f32; 3]) -> Self {
        Vector3::new(value[0], value[1], value[2])
    }
}

/// One fully decoded telemetry frame.
///
/// A `Reading` is only ever produced whole, by a successful decode, so every field always
/// comes from the same frame. The default value is the all-zero reading a decoder starts
/// with.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    pub header: String,
    pub team_id: i32,
    pub packet_count: i32,
    /// Milliseconds since the payload powered on.
    pub mission_time: u64,
    /// Meters
    pub altitude: f64,
    pub battery_voltage: f64,
    pub relative_humidity: f64,
    pub uv_radiation_index: f64,
    pub internal_temp: f64,
    pub external_temp: f64,
    pub atmospheric_pressure: f64,
    /// Seconds since the Unix epoch as reported by the GPS receiver.
    pub gps_time: u32,
    pub gps_altitude: f64,
    pub gps_velocity: f64,
    pub gps_latitude: f64,
    pub gps_longitude: f64,
    /// Satellite count token exactly as it was received.
    pub gps_satellite_count: String,
    pub accelerometer: Vector3,
    pub gyroscope: Vector3,
    /// Checksum transmitted with the frame.
    pub checksum: u32,
}

impl Reading {
    /// GPS time as a UTC timestamp.
    #[must_use]
    pub fn gps_timestamp(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(i64::from(self.gps_time), 0).single()
    }

    /// Satellite count as an integer, zero if the received token is not a number.
    /// Surrounding whitespace is ignored.
    #[must_use]
    pub fn satellite_count(&self) -> i32 {
        numeric_token(&self.gps_satellite_count)
            .parse()
            .unwrap_or_default()
    }

    /// Typed view of the slot at `field`.
    #[must_use]
    pub fn value(&self, field: FieldIndex) -> Value<'_> {
        match field {
            FieldIndex::Header => Value::Text(&self.header),
            FieldIndex::TeamId => Value::Int(self.team_id),
            FieldIndex::PacketCount => Value::Int(self.packet_count),
            FieldIndex::MissionTime => Value::UInt(self.mission_time),
            FieldIndex::Altitude => Value::Double(self.altitude),
            FieldIndex::BatteryVoltage => Value::Double(self.battery_voltage),
            FieldIndex::RelativeHumidity => Value::Double(self.relative_humidity),
            FieldIndex::UvRadiationIndex => Value::Double(self.uv_radiation_index),
            FieldIndex::InternalTemp => Value::Double(self.internal_temp),
            FieldIndex::ExternalTemp => Value::Double(self.external_temp),
            FieldIndex::AtmosphericPressure => Value::Double(self.atmospheric_pressure),
            FieldIndex::GpsTime => Value::UInt(u64::from(self.gps_time)),
            FieldIndex::GpsAltitude => Value::Double(self.gps_altitude),
            FieldIndex::GpsVelocity => Value::Double(self.gps_velocity),
            FieldIndex::GpsLatitude => Value::Double(self.gps_latitude),
            FieldIndex::GpsLongitude => Value::Double(self.gps_longitude),
            FieldIndex::GpsSatelliteCount => Value::Text(&self.gps_satellite_count),
            FieldIndex::AccelerometerX => Value::Float(self.accelerometer.x),
            FieldIndex::AccelerometerY => Value::Float(self.accelerometer.y),
            FieldIndex::AccelerometerZ => Value::Float(self.accelerometer.z),
            FieldIndex::GyroscopeX => Value::Float(self.gyroscope.x),
            FieldIndex::GyroscopeY => Value::Float(self.gyroscope.y),
            FieldIndex::GyroscopeZ => Value::Float(self.gyroscope.z),
            FieldIndex::Checksum => Value::UInt(u64::from(self.checksum)),
        }
    }
}

/// Borrowed view of a single [Reading] slot.
///
/// The `Display` impl writes the value the way it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Text(&'a str),
    Int(i32),
    UInt(u64),
    Double(f64),
    Float(f32),
}

impl Display for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
        }
    }
}
