use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::thread;

use crossbeam::channel::{bounded, Receiver};
use tracing::{debug, trace};

use crate::prelude::*;

/// Splits a raw serial byte stream into frames on the primary EOT marker.
///
/// The marker itself is not included in the returned frames and empty frames are skipped.
/// Bytes after the last marker are returned as a final frame.
///
/// # Examples
/// ```
/// use cansat::framing::FrameSplitter;
///
/// let stream: &[u8] = b"first\n\nsecond\nthird";
/// let frames: Vec<Vec<u8>> = FrameSplitter::new(stream, b'\n')
///     .filter_map(Result::ok)
///     .collect();
/// assert_eq!(frames, vec![b"first".to_vec(), b"second".to_vec(), b"third".to_vec()]);
/// ```
pub struct FrameSplitter<R>
where
    R: Read,
{
    reader: BufReader<R>,
    delimiter: u8,
    done: bool,
}

impl<R> FrameSplitter<R>
where
    R: Read,
{
    pub fn new(reader: R, delimiter: u8) -> Self {
        FrameSplitter {
            reader: BufReader::new(reader),
            delimiter,
            done: false,
        }
    }
}

impl<R> Iterator for FrameSplitter<R>
where
    R: Read,
{
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let mut frame = Vec::new();
            match self.reader.read_until(self.delimiter, &mut frame) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {
                    if frame.last() == Some(&self.delimiter) {
                        frame.pop();
                    }
                    if frame.is_empty() {
                        trace!("skipping empty frame");
                        continue;
                    }
                    return Some(Ok(frame));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.done = true;
                    return Some(Err(Error::Io(err)));
                }
            }
        }
    }
}

/// Number of frames the reader thread may get ahead of the consumer.
const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Read frames from `reader` on a background thread.
///
/// The returned channel is the single queue through which frames reach a decoder. It is
/// closed when the reader hits EOF, after delivering a read error, or when the receiver is
/// dropped.
///
/// # Errors
/// If the reader thread cannot be spawned.
pub fn spawn_frame_reader<R>(reader: R, delimiter: u8) -> Result<Receiver<Result<Vec<u8>>>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = bounded(DEFAULT_BUFFER_SIZE);

    thread::Builder::new()
        .name("cansat_frame_reader".into())
        .spawn(move || {
            for (idx, frame) in FrameSplitter::new(reader, delimiter).enumerate() {
                if tx.send(frame).is_err() {
                    debug!(frame_idx = idx, "frame receiver dropped; stopping reader");
                    return;
                }
            }
            debug!("frame reader reached end of stream");
        })?;

    Ok(rx)
}
