//! Merges CLI flags over file configuration over built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use pagegrab_core::download::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use pagegrab_core::{DEFAULT_BASE_URL, DEFAULT_MAX_DELAY, DEFAULT_OUTPUT_DIR, PipelineOptions};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::Args;

/// Pause between two documents of a batch when nothing else is configured.
pub(crate) const DEFAULT_COOLDOWN_SECS: u64 = 30;

/// Effective settings for one run.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub(crate) options: PipelineOptions,
    pub(crate) cooldown: Duration,
    pub(crate) max_delay: Duration,
    pub(crate) base_url: String,
    pub(crate) connect_timeout_secs: u64,
    pub(crate) read_timeout_secs: u64,
    pub(crate) verbosity: VerbositySetting,
    pub(crate) verbose_level: u8,
    /// `true` when -v/-q were given explicitly and must win over `RUST_LOG`.
    pub(crate) force_cli_log_level: bool,
}

impl RunSettings {
    pub(crate) fn quiet(&self) -> bool {
        self.verbosity == VerbositySetting::Quiet
    }
}

pub(crate) fn resolve_settings(args: &Args, file_config: Option<&FileConfig>) -> RunSettings {
    let file = file_config.cloned().unwrap_or_default();

    let cli_sets_verbosity = args.verbose > 0 || args.quiet;
    let verbosity = if args.quiet {
        VerbositySetting::Quiet
    } else if args.verbose > 0 {
        VerbositySetting::Verbose
    } else {
        file.verbosity.unwrap_or(VerbositySetting::Default)
    };

    let output_dir = args
        .output_dir
        .clone()
        .or(file.output_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let options = PipelineOptions {
        output_dir,
        create_archive: !args.no_archive && file.create_archive.unwrap_or(true),
        cleanup: !args.no_cleanup && file.cleanup.unwrap_or(true),
        reuse_session: args.reuse_session || file.reuse_session.unwrap_or(false),
    };

    let max_delay = args
        .max_delay
        .or(file.max_delay_ms)
        .map_or(DEFAULT_MAX_DELAY, Duration::from_millis);

    RunSettings {
        options,
        cooldown: Duration::from_secs(
            args.cooldown
                .or(file.cooldown_secs)
                .unwrap_or(DEFAULT_COOLDOWN_SECS),
        ),
        max_delay,
        base_url: args
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        connect_timeout_secs: file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
        read_timeout_secs: file.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS),
        verbosity,
        verbose_level: args.verbose,
        force_cli_log_level: cli_sets_verbosity,
    }
}

/// Log level used when `RUST_LOG` is unset (or overridden by explicit flags).
pub(crate) fn resolve_default_log_level(settings: &RunSettings) -> &'static str {
    match settings.verbosity {
        VerbositySetting::Quiet => "error",
        VerbositySetting::Debug => "trace",
        VerbositySetting::Default => "info",
        VerbositySetting::Verbose => {
            if settings.verbose_level > 1 {
                "trace"
            } else {
                "debug"
            }
        }
    }
}
