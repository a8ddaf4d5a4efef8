//! CanSat telemetry frame handling.
//!
//! A frame is a single line of ASCII text:
//!
//! ```text
//! KAANSAT,<team id>,<packet count>,...,<gyro z>,<crc32>;
//! ```
//!
//! It starts with [FrameFormat::header_code], has [FieldIndex::COUNT] fields delimited by
//! [FrameFormat::separator], and ends with [FrameFormat::eot_secondary]. The last field is
//! the decimal CRC-32 of all preceding fields, each followed by the separator. On the serial
//! link frames are further delimited by [FrameFormat::eot_primary], which the transport
//! removes before a frame reaches the decoder.
mod encode;
mod integrity;
mod splitter;

pub use encode::*;
pub use integrity::*;
pub use splitter::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{DecodeError, FrameError};
use crate::prelude::*;
use crate::telemetry::FieldIndex;

pub const DEFAULT_HEADER_CODE: &str = "KAANSAT";
pub const DEFAULT_SEPARATOR: char = ',';
pub const DEFAULT_EOT_SECONDARY: char = ';';
pub const DEFAULT_EOT_PRIMARY: char = '\n';

/// Framing constants shared by the sender and the ground station.
///
/// # Examples
/// ```
/// use cansat::framing::FrameFormat;
///
/// let format = FrameFormat::builder().header_code("TEAM42").build();
/// assert_eq!(format.separator, ',');
/// assert!(format.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FrameFormat {
    /// Every frame must begin with these bytes.
    #[builder(default = DEFAULT_HEADER_CODE.to_string(), setter(into))]
    pub header_code: String,
    /// Field delimiter.
    #[builder(default = DEFAULT_SEPARATOR)]
    pub separator: char,
    /// Trailer at the end of every frame.
    #[builder(default = DEFAULT_EOT_SECONDARY)]
    pub eot_secondary: char,
    /// Delimits frames in the raw serial stream.
    #[builder(default = DEFAULT_EOT_PRIMARY)]
    pub eot_primary: char,
}

impl Default for FrameFormat {
    fn default() -> Self {
        FrameFormat::builder().build()
    }
}

impl FrameFormat {
    /// Check that the markers can be told apart from each other and from frame content.
    ///
    /// # Errors
    /// [Error::FrameFormat] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.header_code.is_empty() {
            return Err(Error::FrameFormat("header code is empty".into()));
        }
        for (name, c) in [
            ("separator", self.separator),
            ("eot_secondary", self.eot_secondary),
            ("eot_primary", self.eot_primary),
        ] {
            if !c.is_ascii() {
                return Err(Error::FrameFormat(format!("{name} {c:?} is not ASCII")));
            }
        }
        if self.separator == self.eot_secondary
            || self.separator == self.eot_primary
            || self.eot_secondary == self.eot_primary
        {
            return Err(Error::FrameFormat(
                "separator, eot_secondary and eot_primary must all differ".into(),
            ));
        }
        if self.header_code.contains(self.separator) || self.header_code.contains(self.eot_primary)
        {
            return Err(Error::FrameFormat(format!(
                "header code {:?} contains a delimiter",
                self.header_code
            )));
        }
        Ok(())
    }

    /// The primary EOT marker as the byte the transport splits on.
    ///
    /// # Errors
    /// [Error::FrameFormat] if the marker is not a single ASCII byte.
    pub fn primary_delimiter(&self) -> Result<u8> {
        u8::try_from(self.eot_primary)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                Error::FrameFormat(format!("eot_primary {:?} is not ASCII", self.eot_primary))
            })
    }
}

/// Check the frame markers and return the frame body with the trailer removed.
///
/// # Errors
/// [FrameError] if `packet` is empty, does not start with the header code, does not end
/// with the secondary EOT marker, or is not valid UTF-8.
pub fn validate_frame<'a>(
    packet: &'a [u8],
    format: &FrameFormat,
) -> std::result::Result<&'a str, FrameError> {
    if packet.is_empty() {
        return Err(FrameError::Empty);
    }
    if !packet.starts_with(format.header_code.as_bytes()) {
        return Err(FrameError::MissingHeader {
            expected: format.header_code.clone(),
        });
    }
    let mut trailer = [0u8; 4];
    let trailer = format.eot_secondary.encode_utf8(&mut trailer).as_bytes();
    let Some(body) = packet.strip_suffix(trailer) else {
        return Err(FrameError::MissingTrailer {
            expected: format.eot_secondary,
        });
    };

    std::str::from_utf8(body).map_err(|err| FrameError::Encoding {
        valid_up_to: err.valid_up_to(),
    })
}

/// Split a frame body into its fields.
///
/// Fields are returned verbatim, without any whitespace trimming.
///
/// # Errors
/// [DecodeError::FieldCount] if the body does not have exactly [FieldIndex::COUNT] fields.
pub fn tokenize(body: &str, separator: char) -> std::result::Result<Vec<&str>, DecodeError> {
    let tokens: Vec<&str> = body.split(separator).collect();
    if tokens.len() != FieldIndex::COUNT {
        return Err(DecodeError::FieldCount {
            expected: FieldIndex::COUNT,
            actual: tokens.len(),
        });
    }
    Ok(tokens)
}
