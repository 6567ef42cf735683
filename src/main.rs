//! CLI entry point for the pagegrab tool.

use std::process::ExitCode;

mod app;
mod app_config;
mod cli;

/// Final outcome of a run, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every document finished.
    Success,
    /// Some documents failed.
    Partial,
    /// Every document failed, or setup failed.
    Failure,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Partial => 2,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match app::runtime::run_pagegrab().await {
        Ok(exit) => ExitCode::from(exit.code()),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(ProcessExit::Failure.code())
        }
    }
}
