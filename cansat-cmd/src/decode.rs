use std::io::{stdout, Read, Write};

use anyhow::{Context, Result};
use cansat::framing::spawn_frame_reader;
use cansat::{FieldIndex, PacketDecoder, Reading};
use tracing::{info, warn};

use crate::info::Format;

pub fn decode<R>(input: R, mut decoder: PacketDecoder, format: &Format, csv: bool) -> Result<()>
where
    R: Read + Send + 'static,
{
    decoder.set_csv_logging_enabled(csv);
    let delimiter = decoder.format().primary_delimiter()?;
    let frames = spawn_frame_reader(input, delimiter)?;

    let mut out = stdout().lock();
    let mut decoded = 0usize;
    let mut rejected = 0usize;
    for frame in frames {
        let frame = frame.context("reading input")?;
        match decoder.decode(&frame) {
            Ok(zult) => {
                decoded += 1;
                if zult.reset_detected {
                    info!(
                        packet_count = zult.reading.packet_count,
                        "payload reset, mission time restarted at {}ms", zult.reading.mission_time
                    );
                }
                write_reading(&mut out, &zult.reading, format)?;
            }
            Err(err) => {
                rejected += 1;
                warn!(kind = err.kind(), "packet error: {err}");
            }
        }
    }
    out.flush().context("writing to stdout")?;

    info!(decoded, rejected, "finished decoding");
    Ok(())
}

fn write_reading<W: Write>(mut out: W, reading: &Reading, format: &Format) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer(&mut out, reading).context("serializing to json")?;
        }
        Format::Text => {
            out.write_all(render_text(reading).as_bytes())
                .context("writing to stdout")?;
        }
    }
    out.write_all(b"\n").context("writing to stdout")
}

/// One `name=value` pair per field, in wire order.
pub(crate) fn render_text(reading: &Reading) -> String {
    FieldIndex::ALL
        .iter()
        .map(|field| format!("{field}={}", reading.value(*field)))
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_line_has_every_field() {
        let reading = Reading {
            header: "KAANSAT".into(),
            altitude: 100.5,
            ..Default::default()
        };
        let line = render_text(&reading);

        assert!(line.starts_with("header=KAANSAT team_id=0 "));
        assert!(line.contains(" altitude=100.5 "));
        assert!(line.ends_with(" checksum=0"));
        assert_eq!(line.split(' ').count(), FieldIndex::COUNT);
    }

    #[test]
    fn json_line() {
        let mut buf = Vec::new();
        write_reading(&mut buf, &Reading::default(), &Format::Json).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["mission_time"], 0);
        assert_eq!(value["accelerometer"]["x"], 0.0);
    }
}
