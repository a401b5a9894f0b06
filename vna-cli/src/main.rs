//! VNA command-line tool
//!
//! Exercises the driver stack against real hardware or the simulator:
//!
//! ```text
//! vna-cli --port /dev/ttyACM0 info
//! vna-cli --port /dev/ttyACM0 sweep --start 1000000 --stop 30000000 --json
//! vna-cli --port /dev/ttyACM0 screenshot --output screen.ppm
//! vna-cli --sim sweep --start 1000000 --stop 2000000 --points 11
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vna_driver::{FrequencyReader, Interface, NanoVna, SerialInterface, ValueReader, DEFAULT_BAUD};
use vna_protocol::{DataChannel, PixelFrame};
use vna_sim::SimVna;

/// VNA driver test tool
#[derive(Parser)]
#[command(name = "vna-cli", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyACM0, COM4)
    #[arg(long)]
    port: Option<String>,

    /// Baud rate for the serial port
    #[arg(long, default_value_t = DEFAULT_BAUD)]
    baud: u32,

    /// Use the simulated device instead of hardware
    #[arg(long)]
    sim: bool,

    /// Firmware version the simulated device reports
    #[arg(long, default_value = "0.7.1")]
    sim_version: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Print firmware version, sweep method, and negotiated features
    Info,
    /// Configure a sweep and dump frequencies with both channels' values
    Sweep {
        /// Sweep start frequency in Hz
        #[arg(long)]
        start: u64,
        /// Sweep stop frequency in Hz
        #[arg(long)]
        stop: u64,
        /// Datapoint count (board default when omitted)
        #[arg(long)]
        points: Option<u32>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Capture the device screen and write it as a binary PPM image
    Screenshot {
        /// Output file path
        #[arg(long, default_value = "screen.ppm")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "vna_cli=info,vna_driver=info,vna_protocol=info,vna_sim=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let iface: Box<dyn Interface> = if cli.sim {
        tracing::info!(version = %cli.sim_version, "using simulated device");
        Box::new(SimVna::with_version(&cli.sim_version))
    } else if let Some(port) = &cli.port {
        Box::new(SerialInterface::open_with_baud(port, cli.baud)?)
    } else {
        bail!("either --port or --sim is required");
    };

    let mut vna = NanoVna::connect(iface).context("connecting to device")?;

    match cli.command {
        CliCommand::Info => run_info(&vna),
        CliCommand::Sweep {
            start,
            stop,
            points,
            json,
        } => run_sweep(&mut vna, start, stop, points, json),
        CliCommand::Screenshot { output } => run_screenshot(&vna, &output),
    }
}

fn run_info<I: Interface>(vna: &NanoVna<I>) -> Result<()> {
    println!("board:        {}", vna.board().name);
    println!("firmware:     {}", vna.version());
    println!("sweep method: {}", vna.sweep_method().name());
    for feature in vna.features() {
        println!("feature:      {}", feature.name());
    }
    Ok(())
}

fn run_sweep<I: Interface>(
    vna: &mut NanoVna<I>,
    start: u64,
    stop: u64,
    points: Option<u32>,
    json: bool,
) -> Result<()> {
    if let Some(points) = points {
        vna.set_datapoints(points)?;
    }
    vna.set_sweep(start, stop).context("configuring sweep")?;

    let frequencies = vna.read_frequencies().context("reading frequencies")?;
    let ch0 = vna
        .read_values(DataChannel::Channel0)
        .context("reading channel 0")?;
    let ch1 = vna
        .read_values(DataChannel::Channel1)
        .context("reading channel 1")?;

    if json {
        let rows: Vec<serde_json::Value> = frequencies
            .iter()
            .zip(ch0.iter().zip(&ch1))
            .map(|(hz, (c0, c1))| {
                serde_json::json!({
                    "frequency_hz": hz,
                    "ch0": c0,
                    "ch1": c1,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{:>12}  {:^24}  {:^24}", "Hz", "channel 0", "channel 1");
        for (hz, (c0, c1)) in frequencies.iter().zip(ch0.iter().zip(&ch1)) {
            println!("{hz:>12}  {c0:^24}  {c1:^24}");
        }
    }
    Ok(())
}

fn run_screenshot<I: Interface>(vna: &NanoVna<I>, output: &Path) -> Result<()> {
    // The propagating capture path: a CLI user wants the failure, not a
    // silently blank image.
    let frame = vna.capture_frame().context("capturing screen")?;
    write_ppm(&frame, output)
        .with_context(|| format!("writing {}", output.display()))?;
    println!(
        "wrote {}x{} frame to {}",
        frame.width(),
        frame.height(),
        output.display()
    );
    Ok(())
}

/// Write a frame as binary PPM (P6), dropping the constant alpha channel
fn write_ppm(frame: &PixelFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write!(out, "P6\n{} {}\n255\n", frame.width(), frame.height())?;
    for px in frame.pixels() {
        out.write_all(&[(px >> 16) as u8, (px >> 8) as u8, *px as u8])?;
    }
    out.flush()?;
    Ok(())
}
