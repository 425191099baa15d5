use crate::args::Args;
use clap::Parser;
use etapa_parsing::Driver;
use eyre::WrapErr;
use owo_colors::{OwoColorize, Stream};
use std::fs::File;
use std::io;
use std::io::{stderr, BufWriter};
use tracing::metadata::LevelFilter;
use tracing::{debug, info, trace};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, Registry};

mod args;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.log_level_filter())?;
    trace!("starting etapac with args: {args:?}");
    debug!("etapac version: {}", env!("CARGO_PKG_VERSION"));

    let mut driver = Driver::new();
    if let Some(file) = &args.file {
        driver
            .bind_path(file)
            .wrap_err_with(|| format!("could not open {file:?}"))?;
    }
    if let Err(e) = driver.run_parse() {
        return Err(e).wrap_err_with(|| format!("could not parse {}", driver.source_id()));
    }
    info!("parsed {}", driver.source_id());

    if args.no_render {
        let source = driver.source_id().to_string();
        eprintln!(
            "{} {source}",
            "ok".if_supports_color(Stream::Stderr, |text| text.green())
        );
        return Ok(());
    }
    match &args.output {
        Some(output) => {
            let file = File::create(output).wrap_err_with(|| format!("could not create {output:?}"))?;
            driver.render_result(BufWriter::new(file))?;
            debug!("rendered graph to {output:?}");
        }
        None => driver.render_result(io::stdout().lock())?,
    }

    Ok(())
}

fn init_logging(level_filter: LevelFilter) -> eyre::Result<()> {
    let registry = Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format().without_time())
                .with_writer(stderr)
                .with_filter(level_filter),
        )
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(registry)?;

    Ok(())
}
