use crc::Crc;
use tracing::trace;

use crate::error::DecodeError;
use crate::telemetry::{numeric_token, FieldIndex};

/// CRC-32 as used by the CanSat flight software (ISO-HDLC, the zlib/PKZIP variant).
pub const CRC_32: Crc<u32> = Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

/// Compute the CRC-32 of `bytes`.
#[must_use]
pub fn crc32(bytes: &[u8]) -> u32 {
    CRC_32.checksum(bytes)
}

/// Rebuild the text the sender computed its checksum over: every field before the checksum,
/// each followed by `separator`, including the last one.
#[must_use]
pub fn checksum_payload(tokens: &[&str], separator: char) -> String {
    let mut payload = String::new();
    for token in tokens.iter().take(FieldIndex::DATA_FIELDS) {
        payload.push_str(token);
        payload.push(separator);
    }
    payload
}

/// CRC-32 of the checksum payload for `tokens`, computed without building the payload.
#[must_use]
pub fn payload_crc32(tokens: &[&str], separator: char) -> u32 {
    let mut sep = [0u8; 4];
    let sep = separator.encode_utf8(&mut sep).as_bytes();

    let mut digest = CRC_32.digest();
    for token in tokens.iter().take(FieldIndex::DATA_FIELDS) {
        digest.update(token.as_bytes());
        digest.update(sep);
    }
    digest.finalize()
}

/// Verify a tokenized frame against its checksum field and return the checksum.
///
/// # Errors
/// [DecodeError::FieldCount] if `tokens` does not contain a checksum field,
/// [DecodeError::ChecksumParse] if the checksum field is not a decimal `u32` (surrounding
/// whitespace aside), or
/// [DecodeError::ChecksumMismatch] if it does not match the computed checksum.
pub fn verify_checksum(tokens: &[&str], separator: char) -> Result<u32, DecodeError> {
    let Some(token) = tokens.get(FieldIndex::Checksum.position()) else {
        return Err(DecodeError::FieldCount {
            expected: FieldIndex::COUNT,
            actual: tokens.len(),
        });
    };
    let received: u32 = numeric_token(token)
        .parse()
        .map_err(|_| DecodeError::ChecksumParse((*token).to_string()))?;
    let computed = payload_crc32(tokens, separator);
    trace!(computed, received, "frame checksum");

    if computed != received {
        return Err(DecodeError::ChecksumMismatch { computed, received });
    }
    Ok(received)
}
