#![doc = include_str!("../README.md")]

mod error;

pub mod decoder;
pub mod events;
pub mod framing;
pub mod telemetry;

pub use decoder::{Decoded, PacketDecoder};
pub use error::{DecodeError, Error, FrameError, Result};
pub use events::{ChannelListener, Event, Listener};
pub use telemetry::{CoercionPolicy, FieldIndex, Reading, Vector3};

pub(crate) mod prelude {
    pub use crate::error::{Error, Result};
}
