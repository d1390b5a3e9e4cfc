mod app;
mod bootstrap;

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use nodelog_core::settings::Settings;

fn main() -> Result<()> {
    let settings = Settings::parse();
    settings.validate()?;

    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("nodelog v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "Markers: {:?}, node marker: {}, max blocking threads: {}",
        settings.log_markers,
        settings.node_marker,
        settings.max_blocking_threads
    );

    let runtime = bootstrap::build_runtime(settings.max_blocking_threads)?;

    // JSON output keeps stdout clean for the document; markers move to stderr.
    let markers: Box<dyn Write + Send> = if settings.json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };

    runtime.block_on(app::run(&settings, io::stdout(), markers))?;

    tracing::info!("nodelog finished");
    Ok(())
}
