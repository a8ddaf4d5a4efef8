#![allow(dead_code)]
use cansat::framing::{crc32, FrameFormat};
use cansat::FieldIndex;

/// Fields of the reference frame from the ground station test procedure.
pub fn reference_fields() -> Vec<String> {
    let mut fields = vec!["0".to_string(); FieldIndex::DATA_FIELDS];
    fields[FieldIndex::Header.position()] = "KAANSAT".into();
    fields[FieldIndex::TeamId.position()] = "1".into();
    fields[FieldIndex::PacketCount.position()] = "5".into();
    fields[FieldIndex::MissionTime.position()] = "1000".into();
    fields[FieldIndex::Altitude.position()] = "100.5".into();
    fields[FieldIndex::BatteryVoltage.position()] = "7.4".into();
    fields[FieldIndex::GpsSatelliteCount.position()] = "8".into();
    fields
}

/// Build a frame from data fields (no checksum) the way the flight software does.
pub fn build_frame(fields: &[String]) -> Vec<u8> {
    let crc = checksum(fields);
    build_frame_with_checksum(fields, &crc.to_string())
}

/// Build a frame with an arbitrary checksum field.
pub fn build_frame_with_checksum(fields: &[String], checksum: &str) -> Vec<u8> {
    let format = FrameFormat::default();
    let mut frame = payload(fields);
    frame.push_str(checksum);
    frame.push(format.eot_secondary);
    frame.into_bytes()
}

/// Correct checksum for `fields`.
pub fn checksum(fields: &[String]) -> u32 {
    crc32(payload(fields).as_bytes())
}

fn payload(fields: &[String]) -> String {
    let sep = FrameFormat::default().separator;
    let mut payload = String::new();
    for field in fields {
        payload.push_str(field);
        payload.push(sep);
    }
    payload
}
