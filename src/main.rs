use clap::Parser;
use livedeck::{LaunchOptions, initialize_logging, launch};
use std::path::PathBuf;

/// Show live-coding slides in your terminal.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// The path to the presentation manifest.
    #[clap(default_value = "presentation.yaml")]
    path: PathBuf,

    /// Continue from the slide the last run ended on.
    #[clap(short = 'c', long = "continue")]
    resume: bool,

    /// Don't show the footer.
    #[clap(long)]
    no_footer: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = initialize_logging() {
        eprintln!("warning: logging is disabled: {e}");
    }
    let options = LaunchOptions { manifest: cli.path, resume: cli.resume, show_footer: !cli.no_footer };
    if let Err(e) = launch(options) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
