use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use cdcheck::{CheckOptions, Checker, ImageSource, Progress, SectorLayout};
use clap::Parser;
use env_logger::Env;

/// edccchk - CD image EDC/ECC checker
#[derive(Parser)]
#[command(version)]
struct Args {
    /// CD image file (raw 2352 byte sectors, or a .zip archive containing one)
    image: PathBuf,

    /// The image is a stream of 2336 byte Mode 2 sectors without sync and header
    #[arg(long)]
    headerless: bool,

    /// Load the whole image in RAM and check sectors on all cores
    #[arg(long)]
    parallel: bool,

    /// Entry to check when the image is a zip archive (default: first file)
    #[arg(long)]
    entry: Option<String>,

    /// Don't display progress
    #[arg(short, long)]
    quiet: bool,

    /// Exit with status 2 if any sector failed verification
    #[arg(long)]
    strict: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let options = CheckOptions {
        layout: if args.headerless {
            SectorLayout::Mode2Headerless
        } else {
            SectorLayout::Raw
        },
        parallel: args.parallel,
    };

    let checker = Checker::new();

    let mut image = ImageSource::open(&args.image, args.entry.as_deref())
        .with_context(|| format!("Can't open {}", args.image.display()))?;

    println!("Checking {}...", args.image.display());

    let quiet = args.quiet;
    let stats = image
        .check(&checker, &options, |p: Progress| {
            if !quiet {
                eprint!("Analyze({:02}%)\r", p.percent());
                let _ = std::io::stderr().flush();
            }
        })
        .with_context(|| format!("Error while reading {}", args.image.display()))?;

    print!("{}", stats);
    println!("Done");

    if args.strict && !stats.is_clean() {
        return Ok(ExitCode::from(2));
    }

    Ok(ExitCode::SUCCESS)
}
