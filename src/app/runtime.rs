use std::io::{self, IsTerminal};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use pagegrab_core::{HttpClient, PipelineOptions, PolitenessGate, Session, process_document};
use tracing::{debug, error, info, warn};

use crate::ProcessExit;
use crate::app::progress_manager::TerminalProgress;
use crate::app::{exit_handler, input_processor, settings, terminal};
use crate::app_config::load_default_file_config;
use crate::cli::Args;

/// Counts of documents that finished or failed in one batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BatchSummary {
    pub(crate) completed: usize,
    pub(crate) failed: usize,
}

pub(crate) async fn run_pagegrab() -> Result<ProcessExit> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let loaded_config = load_default_file_config()?;
    let settings = settings::resolve_settings(&args, loaded_config.config.as_ref());

    let default_level = settings::resolve_default_log_level(&settings);
    terminal::init_tracing(
        default_level,
        settings.force_cli_log_level,
        terminal::is_no_color_requested(&args),
    );

    debug!(
        config = ?loaded_config.path,
        verbosity = settings.verbosity.as_str(),
        "configuration resolved"
    );
    info!("pagegrab starting");

    let document_ids = input_processor::load_document_ids(&args.input)?;
    info!(documents = document_ids.len(), "documents queued");

    let client = HttpClient::with_timeouts(
        &settings.base_url,
        settings.connect_timeout_secs,
        settings.read_timeout_secs,
    )?;
    let gate = PolitenessGate::new(settings.max_delay);
    if gate.is_disabled() {
        debug!("politeness wait disabled");
    }

    let progress = TerminalProgress::new(terminal::should_use_progress_bars(
        io::stderr().is_terminal(),
        settings.quiet(),
        terminal::is_dumb_terminal(),
    ));

    let summary = run_batch(
        &client,
        &gate,
        &progress,
        &settings.options,
        settings.cooldown,
        &document_ids,
    )
    .await;
    progress.finish();

    info!(
        completed = summary.completed,
        failed = summary.failed,
        total = document_ids.len(),
        "batch complete"
    );

    Ok(exit_handler::determine_exit_outcome(
        summary.completed,
        summary.failed,
    ))
}

/// Processes documents strictly one after another with a cooldown in between.
///
/// A failing document is logged and counted; the batch moves on.
pub(crate) async fn run_batch(
    client: &HttpClient,
    gate: &PolitenessGate,
    progress: &TerminalProgress,
    options: &PipelineOptions,
    cooldown: Duration,
    document_ids: &[String],
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let mut last_session: Option<Session> = None;

    for (position, document_id) in document_ids.iter().enumerate() {
        progress.start_document(document_id);

        match process_document(client, gate, progress, options, document_id, last_session.as_ref())
            .await
        {
            Ok(report) => {
                summary.completed += 1;
                info!(
                    document_id = %report.document_id,
                    title = %report.title,
                    saved = report.pages_saved,
                    skipped = report.pages_skipped,
                    total = report.pages_total,
                    resumed = report.resumed,
                    archive = ?report.archive_path,
                    "document finished"
                );
                if !report.discovery_complete {
                    warn!(
                        document_id = %report.document_id,
                        "page list may be incomplete; delete the discovery file to retry"
                    );
                }
                last_session = Some(report.session);
            }
            Err(err) => {
                summary.failed += 1;
                error!(document_id = %document_id, error = %err, "document failed");
            }
        }

        if position + 1 < document_ids.len() && !cooldown.is_zero() {
            info!(seconds = cooldown.as_secs(), "cooling down before next document");
            tokio::time::sleep(cooldown).await;
        }
    }

    summary
}
