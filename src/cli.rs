// CLI definitions using clap

use clap::Parser;

#[derive(Parser)]
#[command(name = "ploverhid-probe")]
#[command(author, version, about = "Preonic PloverHID interface diagnostic")]
pub struct Cli {
    /// Enable debug logging (HID enumeration and write details)
    #[arg(short, long)]
    pub verbose: bool,
}
