use std::collections::BTreeMap;
use std::io::{stdout, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use cansat::framing::FrameSplitter;
use cansat::{Event, PacketDecoder, Reading};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Default, Debug, Clone, Serialize)]
struct Summary {
    total_frames: usize,
    decoded: usize,
    rejected: usize,
    /// Rejected frames by error kind
    errors: BTreeMap<String, usize>,
    resets: usize,
    first_mission_time: Option<u64>,
    last_mission_time: Option<u64>,
    first_gps_time: Option<DateTime<Utc>>,
    last_gps_time: Option<DateTime<Utc>>,
    team_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    summary: Summary,
    last_reading: Option<Reading>,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::PacketError(err) => {
                self.rejected += 1;
                *self.errors.entry(err.kind().to_string()).or_default() += 1;
            }
            Event::ResetDetected { previous, current } => {
                debug!("reset detected: {previous}ms -> {current}ms");
                self.resets += 1;
            }
            Event::DecodeSucceeded(reading) => {
                self.decoded += 1;
                self.first_mission_time.get_or_insert(reading.mission_time);
                self.last_mission_time = Some(reading.mission_time);
                if reading.gps_time != 0 {
                    if let Some(ts) = reading.gps_timestamp() {
                        self.first_gps_time.get_or_insert(ts);
                        self.last_gps_time = Some(ts);
                    }
                }
                if !self.team_ids.contains(&reading.team_id) {
                    self.team_ids.push(reading.team_id);
                }
            }
            Event::CsvLoggingEnabledChanged(_) => {}
        }
    }
}

fn summarize<R: Read>(filename: &str, input: R, mut decoder: PacketDecoder) -> Result<Info> {
    let delimiter = decoder.format().primary_delimiter()?;
    let events = decoder.subscribe();
    let mut summary = Summary::default();

    for frame in FrameSplitter::new(input, delimiter) {
        let frame = frame.context("reading input")?;
        summary.total_frames += 1;
        // outcome is tallied from events
        let _ = decoder.decode(&frame);
        for event in events.try_iter() {
            summary.record(&event);
        }
    }

    let last_reading = if summary.decoded > 0 {
        Some(decoder.snapshot())
    } else {
        None
    };

    Ok(Info {
        filename: filename.to_string(),
        summary,
        last_reading,
    })
}

pub fn info<R: Read>(fpath: &Path, input: R, decoder: PacketDecoder, format: &Format) -> Result<()> {
    let info = summarize(&fpath.to_string_lossy(), input, decoder)?;

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &info).context("serializing to json")
        }
        Format::Text => {
            let data = render_text(&info).context("serializing info")?;
            stdout()
                .write_all(str::as_bytes(&data))
                .context("writing to stdout")
        }
    }
}

fn render_text(info: &Info) -> Result<String> {
    let mut hb = handlebars::Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    hb.register_template_string("info", TEXT_TEMPLATE)
        .context("compiling text template")?;

    hb.render("info", &info).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"{{ filename }}
===============================================================================
Frames:       {{ summary.total_frames }}
Decoded:      {{ summary.decoded }}
Rejected:     {{ summary.rejected }}{{ #each summary.errors }}
  {{ @key }}: {{ this }}{{ /each }}
Resets:       {{ summary.resets }}
Teams:        {{ #each summary.team_ids }}{{ this }}{{ #if @last }}{{ else }}, {{ /if }}{{ /each }}
Mission time: {{ summary.first_mission_time }} - {{ summary.last_mission_time }} ms
GPS time:     {{ summary.first_gps_time }} - {{ summary.last_gps_time }}
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::{simulate, Profile};
    use cansat::framing::FrameFormat;
    use std::fs::File;

    fn capture(profile: &Profile, trailing: &[u8]) -> tempfile::NamedTempFile {
        let mut dat = Vec::new();
        simulate(&mut dat, &FrameFormat::default(), profile).unwrap();
        dat.extend_from_slice(trailing);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&dat).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn summarize_capture() {
        let profile = Profile {
            count: 20,
            team_id: 7,
            reset_at: Some(12),
        };
        let file = capture(&profile, b"KAANSAT,1,2;\nnoise\n");

        let info = summarize(
            "capture.dat",
            File::open(file.path()).unwrap(),
            PacketDecoder::default(),
        )
        .unwrap();

        let summary = &info.summary;
        assert_eq!(summary.total_frames, 22);
        assert_eq!(summary.decoded, 20);
        assert_eq!(summary.rejected, 2);
        assert_eq!(summary.errors.get("field_count"), Some(&1));
        assert_eq!(summary.errors.get("frame"), Some(&1));
        assert_eq!(summary.resets, 1);
        assert_eq!(summary.team_ids, vec![7]);
        assert_eq!(summary.first_mission_time, Some(0));
        assert_eq!(info.last_reading.as_ref().map(|r| r.packet_count), Some(20));

        let text = render_text(&info).unwrap();
        assert!(text.contains("Decoded:      20"), "{text}");
        assert!(text.contains("  frame: 1"), "{text}");
    }

    #[test]
    fn summarize_empty_capture() {
        let info = summarize("empty", &b""[..], PacketDecoder::default()).unwrap();
        assert_eq!(info.summary.total_frames, 0);
        assert!(info.last_reading.is_none());
    }
}
