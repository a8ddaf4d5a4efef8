mod decode;
mod info;
mod simulate;

use std::fs::File;
use std::io::{stderr, stdin, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cansat::framing::FrameFormat;
use cansat::{CoercionPolicy, PacketDecoder};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct DecoderArgs {
    /// JSON frame format configuration.
    ///
    /// Keys are header_code, separator, eot_secondary and eot_primary. Missing keys
    /// use the defaults (KAANSAT, ',', ';' and '\n').
    #[arg(short, long, value_name = "path")]
    config: Option<PathBuf>,

    /// Reject frames with a field that is not a valid number, rather than using zero.
    #[arg(long, action)]
    strict: bool,
}

impl DecoderArgs {
    fn frame_format(&self) -> Result<FrameFormat> {
        let format = match self.config {
            Some(ref path) => {
                let file = File::open(path).with_context(|| format!("opening config {path:?}"))?;
                serde_json::from_reader(file)
                    .with_context(|| format!("parsing frame format from {path:?}"))?
            }
            None => FrameFormat::default(),
        };
        format.validate()?;
        debug!("using {format:?}");
        Ok(format)
    }

    fn decoder(&self) -> Result<PacketDecoder> {
        let policy = if self.strict {
            CoercionPolicy::Strict
        } else {
            CoercionPolicy::Permissive
        };
        Ok(PacketDecoder::new(self.frame_format()?).with_policy(policy))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a telemetry capture and write every valid reading to stdout.
    ///
    /// Rejected frames are logged to stderr and otherwise skipped.
    Decode {
        /// Capture file with raw serial data, or - for stdin.
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: info::Format,

        /// Enable CSV logging for the session.
        #[arg(long, action)]
        csv: bool,

        #[command(flatten)]
        decoder: DecoderArgs,
    },
    /// Show a summary of a telemetry capture.
    Info {
        /// Capture file with raw serial data, or - for stdin.
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: info::Format,

        #[command(flatten)]
        decoder: DecoderArgs,
    },
    /// Write a capture of synthetic telemetry frames.
    Simulate {
        /// Number of frames to generate.
        #[arg(short = 'n', long, default_value_t = 100)]
        count: usize,

        /// Team ID to put in every frame.
        #[arg(short, long, default_value_t = 1)]
        team_id: i32,

        /// Restart the payload mission clock at this frame index.
        #[arg(short, long, value_name = "index")]
        reset_at: Option<usize>,

        /// JSON frame format configuration.
        #[arg(short, long, value_name = "path")]
        config: Option<PathBuf>,

        /// Delete output file if it already exists
        #[arg(long, action)]
        clobber: bool,

        /// Output file path.
        #[arg(short, long, default_value = "capture.dat", value_name = "path")]
        output: PathBuf,
    },
}

fn open_input(path: &Path) -> Result<Box<dyn Read + Send>> {
    if path == Path::new("-") {
        return Ok(Box::new(stdin()));
    }
    let file = File::open(path).with_context(|| format!("opening input {path:?}"))?;
    Ok(Box::new(file))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("CANSAT_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Decode {
            input,
            format,
            csv,
            decoder,
        } => {
            let decoder = decoder.decoder()?;
            decode::decode(open_input(input)?, decoder, format, *csv)
        }
        Commands::Info {
            input,
            format,
            decoder,
        } => {
            let decoder = decoder.decoder()?;
            info::info(input, open_input(input)?, decoder, format)
        }
        Commands::Simulate {
            count,
            team_id,
            reset_at,
            config,
            clobber,
            output,
        } => {
            if !clobber && output.exists() {
                bail!("{output:?} exists; use --clobber");
            }
            let args = DecoderArgs {
                config: config.clone(),
                strict: false,
            };
            let format = args.frame_format()?;
            let dest = File::create(output)
                .with_context(|| format!("failed to create output {output:?}"))?;
            info!("writing {count} frames to {output:?}");
            simulate::simulate(
                dest,
                &format,
                &simulate::Profile {
                    count: *count,
                    team_id: *team_id,
                    reset_at: *reset_at,
                },
            )
        }
    }
}
