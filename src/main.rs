use std::{
    path::PathBuf,
    process::ExitCode,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context;
use clap::{ArgAction, Parser};
use otpclip::{clipboard::ClipboardChain, find_descriptor_in_file, report, totp};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Search a WinAuth-style export and copy the current TOTP code of the
/// first record whose label matches
#[derive(Debug, Parser)]
#[command(name = "otpclip", version, about)]
struct Cli {
    /// Path to a file containing otpauth://totp/ lines
    file_path: PathBuf,

    /// Nickname or substring to match in the label, case-insensitive
    search_text: String,

    /// Print the code to stdout instead of trying the clipboard
    #[arg(long)]
    print: bool,

    /// Print a plain status marker instead of a colored bar
    #[arg(long)]
    no_color: bool,

    /// Log more details to stderr (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

enum Outcome {
    Found,
    NotFound,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    // RUST_LOG wins over -v when set
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<Outcome> {
    let descriptor = find_descriptor_in_file(&cli.file_path, &cli.search_text)
        .with_context(|| format!("Could not search {}", cli.file_path.display()))?;

    let Some(descriptor) = descriptor else {
        return Ok(Outcome::NotFound);
    };

    let now = SystemTime::now();
    let code = totp::generate(&descriptor, now)
        .with_context(|| format!("Could not generate a code for {}", descriptor.label()))?;

    if let Ok(elapsed) = now.duration_since(UNIX_EPOCH) {
        let remaining = totp::Totp::from(&descriptor).remaining_seconds(elapsed.as_secs());
        info!(label = descriptor.label(), remaining, "generated code");
    }

    if cli.print {
        println!("{code}");
        return Ok(Outcome::Found);
    }

    let code = code.to_string();
    let copied = ClipboardChain::platform_default().copy(&code).is_some();

    println!("{}", report::status_box(copied, !cli.no_color));

    if !copied {
        warn!("no clipboard backend worked, printing the code instead");
        println!("{code}");
    }

    Ok(Outcome::Found)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !cli.file_path.is_file() {
        eprintln!("File not found: {}", cli.file_path.display());
        return ExitCode::from(1);
    }

    match run(&cli) {
        Ok(Outcome::Found) => ExitCode::SUCCESS,
        Ok(Outcome::NotFound) => {
            println!("{}", report::status_box(false, !cli.no_color));
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            println!("{}", report::status_box(false, !cli.no_color));
            ExitCode::from(1)
        }
    }
}
