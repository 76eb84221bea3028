use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clspost::{diagnostics, init_logging, translate, Error, PostConfig};
use tracing::{info, warn};

/// Translate a CLS toolpath document into a conversational machine program
#[derive(Parser, Debug)]
#[command(name = "clspost", author, version, about, long_about = None)]
struct Args {
    /// Toolpath document (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Program file to write
    #[arg(short, long)]
    output: PathBuf,

    /// Postprocessor settings (JSON); defaults apply to missing keys
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prefix every line with N<number>
    #[arg(long)]
    line_numbers: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(args: &Args) -> Result<PostConfig, Error> {
    let mut config = match &args.config {
        Some(path) => PostConfig::from_file(path)?,
        None => PostConfig::default(),
    };
    if args.line_numbers {
        config = config.with_line_numbers(true);
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), Error> {
    let config = load_config(args)?;

    let source = fs::read_to_string(&args.input)?;
    let program = match translate(&source, &config) {
        Ok(program) => program,
        Err(Error::Parse(e)) => {
            let name = args.input.display().to_string();
            // Fall back to the plain message if the report cannot be written
            if diagnostics::eprint(&e, &name, &source).is_err() {
                eprintln!("{}: {}", name, e);
            }
            return Err(Error::Parse(e));
        }
        Err(e) => return Err(e),
    };

    if program.skipped_segments > 0 {
        warn!(
            skipped = program.skipped_segments,
            "segments with unknown types were left out"
        );
    }

    fs::write(&args.output, program.to_text())?;
    info!(lines = program.lines.len(), "program written");

    println!("Generated: {}", args.output.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        // Already reported against the source
        Err(Error::Parse(_)) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
