use super::{crc32, FrameFormat};
use crate::telemetry::{FieldIndex, Reading};

/// Encode `reading` the way the flight software does, including the secondary EOT but
/// not the primary EOT.
///
/// The checksum is always computed from the encoded fields; [Reading::checksum] is ignored.
/// [Reading::header] is written as-is and must start with [FrameFormat::header_code] for
/// the frame to decode.
///
/// # Examples
/// ```
/// use cansat::framing::{encode, FrameFormat};
/// use cansat::telemetry::Reading;
///
/// let reading = Reading { header: "KAANSAT".into(), team_id: 7, ..Default::default() };
/// let frame = encode(&reading, &FrameFormat::default());
/// assert!(frame.starts_with(b"KAANSAT,7,0,"));
/// assert!(frame.ends_with(b";"));
/// ```
#[must_use]
pub fn encode(reading: &Reading, format: &FrameFormat) -> Vec<u8> {
    let mut frame = String::new();
    for field in &FieldIndex::ALL[..FieldIndex::DATA_FIELDS] {
        frame.push_str(&reading.value(*field).to_string());
        frame.push(format.separator);
    }
    let checksum = crc32(frame.as_bytes());
    frame.push_str(&checksum.to_string());
    frame.push(format.eot_secondary);
    frame.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::{tokenize, validate_frame, verify_checksum};

    #[test]
    fn encoded_frame_validates() {
        let reading = Reading {
            header: "KAANSAT".into(),
            mission_time: 1000,
            altitude: 100.5,
            checksum: 1,
            ..Default::default()
        };
        let format = FrameFormat::default();
        let frame = encode(&reading, &format);

        let body = validate_frame(&frame, &format).unwrap();
        let tokens = tokenize(body, format.separator).unwrap();
        let checksum = verify_checksum(&tokens, format.separator).unwrap();

        assert_eq!(tokens[FieldIndex::Altitude.position()], "100.5");
        assert_ne!(checksum, reading.checksum, "checksum should be computed");
    }
}
