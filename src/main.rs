//! Dialview
//!
//! Reads measurements from a serial dial indicator or digital caliper and
//! displays them as big digits in the terminal.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use dialview::error::Error;
use dialview::font::FontCatalog;
use dialview::reactor::EventLoop;
use dialview::render::Renderer;
use dialview::serial;
use dialview::term::Tty;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "dialview")]
#[command(version)]
#[command(about = "Big-digit terminal readout for serial measuring instruments")]
#[command(long_about = "\
Reads measurement lines (e.g. `12.34 mm`) from a serial port connected to a
dial indicator or digital caliper and displays them as large glyphs.

With no port given, the serial ports are scanned: a single candidate is used
directly; zero or several candidates are listed instead, and a port must then
be selected explicitly with --port.

While running: ESC or Ctrl-D exits, F1 cycles the font, F2 cycles the style.")]
struct Args {
    /// List available ports and exit
    #[arg(short, long)]
    list_ports: bool,

    /// Serial port to monitor
    #[arg(short, long, value_name = "PATH")]
    port: Option<String>,

    /// Baudrate of serial communication
    #[arg(short, long, default_value_t = serial::DEFAULT_BAUD)]
    baudrate: u32,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {e}");
            eprintln!("dialview: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let port = match select_port(&args)? {
        Some(port) => port,
        // Listing cases are informational and exit cleanly.
        None => return Ok(()),
    };

    // Open the instrument link before touching any terminal state, so an
    // open failure reports on a normal screen.
    let serial = serial::open_port(&port, args.baudrate)?;
    info!(port = %port, baud = args.baudrate, "connected");

    let catalog = FontCatalog::builtin()?;
    let tty = Tty::acquire()?;
    let renderer = Renderer::new(tty, &catalog);
    EventLoop::new(serial, renderer)?.run()
}

/// Resolve which port to monitor, mirroring the scan-first workflow: an
/// explicit `--port` wins; otherwise a lone candidate is used, and zero or
/// several candidates are printed for the user to pick from.
fn select_port(args: &Args) -> Result<Option<String>, Error> {
    if !args.list_ports {
        if let Some(port) = &args.port {
            return Ok(Some(port.clone()));
        }
    }

    let ports = serial::list_ports()?;
    if ports.is_empty() {
        println!("No ports found");
        return Ok(None);
    }
    if args.list_ports || ports.len() > 1 {
        for info in &ports {
            println!("{}", serial::describe(info));
        }
        return Ok(None);
    }
    Ok(Some(ports[0].port_name.clone()))
}
