//! clspost: translates CLS toolpath documents into conversational
//! three-axis machine programs with modal word compression.
//!
//! ```no_run
//! use clspost::{translate, PostConfig};
//!
//! let source = std::fs::read_to_string("toolpath.json").unwrap();
//! let program = translate(&source, &PostConfig::default()).unwrap();
//! print!("{}", program.to_text());
//! ```

pub mod ast;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod lexer;
pub mod modal;
pub mod parser;
pub mod post;
pub mod vocab;

use std::path::Path;
use thiserror::Error;

pub use codegen::{CodeGenerator, ProgramOutput};
pub use config::PostConfig;
pub use parser::ParseError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

/// Parse, generate and run the configured post passes
pub fn translate(source: &str, config: &PostConfig) -> Result<ProgramOutput, Error> {
    let toolpath = parser::parse_document(source)?;
    let mut program = CodeGenerator::with_config(config.clone()).generate(&toolpath);

    for pass in post::pipeline(config) {
        tracing::debug!(pass = pass.name(), "running post pass");
        program = pass.process(&program);
    }

    Ok(program)
}

/// Translate `input` and write the program to `output`. Nothing is written
/// when the input fails to parse.
pub fn translate_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &PostConfig,
) -> Result<ProgramOutput, Error> {
    let source = std::fs::read_to_string(input)?;
    let program = translate(&source, config)?;
    std::fs::write(output, program.to_text())?;
    Ok(program)
}

/// Initialize logging to stderr
///
/// `RUST_LOG` takes precedence; otherwise `verbosity` picks the level
/// (0 = warn, 1 = info, 2 = debug, 3+ = trace).
pub fn init_logging(verbosity: u8) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
