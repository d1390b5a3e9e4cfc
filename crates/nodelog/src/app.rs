//! One invocation: ingest the requested paths, then print the report.

use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use nodelog_core::settings::{Command, Settings};
use nodelog_data::discovery::DiscoveryConfig;
use nodelog_data::progress::TerminalProgress;
use nodelog_data::rules::{DropRule, LineRule, SlowQueryRule};
use nodelog_data::store::AggregateStore;
use nodelog_data::{EngineConfig, IngestSummary, IngestionEngine};
use nodelog_report::{
    render_drop_table, render_json, render_quantile_table, summarize_drops, summarize_quantiles,
};
use tracing::{debug, warn};

/// Engine configuration derived from the command line.
pub fn engine_config(settings: &Settings) -> EngineConfig {
    EngineConfig {
        discovery: DiscoveryConfig::new(settings.log_markers.clone()),
        node_marker: settings.node_marker.clone(),
    }
}

/// Run the report selected by `settings`.
///
/// Progress markers and the failure list go to `markers`, the report goes to
/// `out`. Both writers are handed back once everything is written.
pub async fn run<W, M>(settings: &Settings, mut out: W, markers: M) -> Result<(W, M)>
where
    W: Write,
    M: Write + Send + 'static,
{
    let engine = IngestionEngine::new(engine_config(settings));
    let progress = Arc::new(TerminalProgress::new(markers));
    let paths = settings.command.paths();

    let (summary, report) = match &settings.command {
        Command::Drops { .. } => {
            let rule = Arc::new(DropRule::new());
            let summary = engine
                .parse(paths, progress.clone(), vec![rule.clone() as Arc<dyn LineRule>])
                .await?;
            log_store(rule.name(), rule.store());
            let summaries = summarize_drops(&rule.store().take());
            let report = if settings.json {
                render_json(&summaries)?
            } else {
                render_drop_table(&summaries, settings.number_style())
            };
            (summary, report)
        }
        Command::SlowQueries { .. } => {
            let rule = Arc::new(SlowQueryRule::new());
            let summary = engine
                .parse(paths, progress.clone(), vec![rule.clone() as Arc<dyn LineRule>])
                .await?;
            log_store(rule.name(), rule.store());
            let rows = summarize_quantiles(&rule.store().take(), |hit| hit.hits);
            let report = if settings.json {
                render_json(&rows)?
            } else {
                render_quantile_table(&rows, settings.number_style())
            };
            (summary, report)
        }
    };

    let progress = Arc::try_unwrap(progress)
        .map_err(|_| anyhow!("progress sink is still shared after ingestion"))?;
    if progress.failure_count() > 0 {
        warn!("{} files could not be opened", progress.failure_count());
        progress.print_failures()?;
    }
    let mut markers = progress.into_inner();
    markers.flush()?;

    let notice = incomplete_notice(&summary);
    if let Some(notice) = &notice {
        warn!("{}", notice);
    }

    if settings.json {
        writeln!(out, "{}", report)?;
    } else {
        writeln!(out)?;
        if let Some(notice) = &notice {
            writeln!(out, "{}", notice)?;
        }
        writeln!(out, "report complete")?;
        write!(out, "{}", report)?;
    }
    out.flush()?;
    Ok((out, markers))
}

/// Warning text when some files were not fully scanned, so the report
/// under-counts them.
fn incomplete_notice(summary: &IngestSummary) -> Option<String> {
    (summary.tasks_panicked > 0).then(|| {
        format!(
            "warning: {} of {} files did not finish scanning; totals are incomplete",
            summary.tasks_panicked, summary.files_discovered
        )
    })
}

fn log_store<T>(rule: &str, store: &AggregateStore<T>) {
    debug!(
        "{}: {} observations across {} nodes",
        rule,
        store.total(),
        store.node_count()
    );
}
