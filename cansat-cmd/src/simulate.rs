use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use cansat::framing::{encode, FrameFormat};
use cansat::{Reading, Vector3};
use tracing::debug;

/// GPS time of the first simulated frame.
const GPS_EPOCH: u32 = 1_530_000_000;
const APOGEE: f64 = 500.0;
const SEA_LEVEL_PRESSURE: f64 = 101_325.0;

pub struct Profile {
    pub count: usize,
    pub team_id: i32,
    /// Frame index at which the payload clock starts over.
    pub reset_at: Option<usize>,
}

/// Synthetic reading for frame `idx` of a flight sending one frame per second.
fn reading(format: &FrameFormat, profile: &Profile, idx: usize) -> Reading {
    let clock_start = match profile.reset_at {
        Some(reset) if idx >= reset => reset,
        _ => 0,
    };
    let mid = (profile.count.max(2) as f64) / 2.0;
    let progress = (idx as f64 - mid) / mid;
    let altitude = (APOGEE * (1.0 - progress * progress)).max(0.0);
    let pressure = SEA_LEVEL_PRESSURE * (1.0 - 2.255_77e-5 * altitude).powf(5.255_88);

    Reading {
        header: format.header_code.clone(),
        team_id: profile.team_id,
        packet_count: i32::try_from(idx + 1).unwrap_or(i32::MAX),
        mission_time: (idx - clock_start) as u64 * 1000,
        altitude,
        battery_voltage: 8.4 - 0.002 * idx as f64,
        relative_humidity: 40.0,
        uv_radiation_index: 5.0,
        internal_temp: 25.0,
        external_temp: 20.0 - altitude * 0.0065,
        atmospheric_pressure: pressure.round(),
        gps_time: GPS_EPOCH.saturating_add(u32::try_from(idx).unwrap_or(u32::MAX)),
        gps_altitude: altitude,
        gps_velocity: 0.0,
        gps_latitude: 19.432_608,
        gps_longitude: -99.133_209,
        gps_satellite_count: "9".into(),
        accelerometer: Vector3::new(0.0, 0.0, 9.81),
        gyroscope: Vector3::default(),
        checksum: 0,
    }
}

/// Write `profile.count` frames to `dest`, each terminated by the primary EOT.
pub fn simulate<W: Write>(dest: W, format: &FrameFormat, profile: &Profile) -> Result<()> {
    let delimiter = format.primary_delimiter()?;
    let mut writer = BufWriter::new(dest);
    for idx in 0..profile.count {
        let frame = encode(&reading(format, profile, idx), format);
        writer.write_all(&frame).context("writing frame")?;
        writer.write_all(&[delimiter]).context("writing frame")?;
    }
    writer.flush().context("flushing output")?;
    debug!("wrote {} frames", profile.count);
    Ok(())
}
