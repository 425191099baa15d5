//! the args for running etapac

use clap::{value_parser, ArgAction};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// The args struct
#[derive(Debug, clap::Parser)]
#[clap(
    author,
    version,
    about = "Parses etapa source code and renders its syntax tree as a graph"
)]
pub struct Args {
    #[command(flatten)]
    logging: LoggingArgs,

    /// The source file to parse. Standard input is read when it's omitted.
    #[clap(value_name = "source file", value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,
    /// Write the rendered graph to this file instead of standard output
    #[clap(short = 'o', long = "output", env = "ETAPAC_OUTPUT")]
    pub output: Option<PathBuf>,
    /// Only check that the source parses, without rendering anything
    #[clap(long = "no-render", conflicts_with = "output")]
    pub no_render: bool,
}

impl Args {
    /// Gets the logging level based on whether `-v[v]` or `-q[q]` has been used
    pub fn log_level_filter(&self) -> LevelFilter {
        self.logging.log_level_filter()
    }
}

/// Sets logging levels
#[derive(Debug, Clone, Copy, clap::Args)]
pub struct LoggingArgs {
    /// Log more, `-vv` for everything
    #[clap(short = 'v', value_parser = value_parser!(u8).range(0..=2), action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
    /// Log less, `-qq` for nothing at all
    #[clap(short = 'q', value_parser = value_parser!(u8).range(0..=2), action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
}

impl LoggingArgs {
    pub fn log_level_filter(&self) -> LevelFilter {
        match self.verbose as i8 - self.quiet as i8 {
            i8::MIN..=-2 => LevelFilter::OFF,
            -1 => LevelFilter::ERROR,
            0 => LevelFilter::WARN,
            1 => LevelFilter::DEBUG,
            2..=i8::MAX => LevelFilter::TRACE,
        }
    }
}
