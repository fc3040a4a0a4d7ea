//! Preonic PloverHID Probe CLI
//!
//! One-shot diagnostic that scans HID interfaces for the Keyboard.io
//! Preonic and test-writes its PloverHID stenography interface.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ploverhid_probe::error::ProbeError;
use ploverhid_probe::hid::HidapiBackend;
use ploverhid_probe::probe::{self, ProbeEvent, ProbeProgress};

// CLI definitions
mod cli;
use cli::Cli;

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Prints each probe step to stdout.
struct ConsoleProgress;

impl ProbeProgress for ConsoleProgress {
    fn on_event(&mut self, event: &ProbeEvent) {
        println!("{event}");
    }
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let backend = match HidapiBackend::new() {
        Ok(backend) => backend,
        Err(error) => exit_unavailable(&error),
    };

    let mut progress = ConsoleProgress;
    match probe::run(&backend, &mut progress) {
        Ok(run) => process::exit(run.outcome.exit_code()),
        Err(error) => exit_unavailable(&error),
    }
}

/// HID enumeration is not usable at all. Report, hint, fail.
fn exit_unavailable(error: &ProbeError) -> ! {
    println!("{error}");
    println!("Install the hidapi library and check hidraw device permissions (udev rules).");
    println!("{}", ProbeEvent::Verdict { found: false });
    process::exit(1);
}
