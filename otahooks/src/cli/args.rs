// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

use std::{
    io::{self, IsTerminal},
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use crate::cli::{completion, hooks};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_level(self) -> Level {
        match self {
            Self::Trace => Level::TRACE,
            Self::Debug => Level::DEBUG,
            Self::Info => Level::INFO,
            Self::Warn => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Level and message only.
    #[default]
    Short,
    /// Timestamp, level, and message.
    Medium,
    /// Timestamp, level, target module, and message.
    Long,
}

pub fn init_logging(log_level: LogLevel, log_format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_max_level(log_level.as_level());

    match log_format {
        LogFormat::Short => builder.without_time().with_target(false).init(),
        LogFormat::Medium => builder.with_target(false).init(),
        LogFormat::Long => builder.init(),
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Full(hooks::FullCli),
    Incremental(hooks::IncrementalCli),
    Filesmap(hooks::FilesmapCli),
    Completion(completion::CompletionCli),
}

#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Lowest log message severity to output.
    #[arg(long, global = true, value_enum, value_name = "LEVEL", default_value_t)]
    pub log_level: LogLevel,

    /// Output format for log messages.
    #[arg(long, global = true, value_enum, value_name = "FORMAT", default_value_t)]
    pub log_format: LogFormat,
}

pub fn main(logging_initialized: &AtomicBool, cancel_signal: &AtomicBool) -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_level, cli.log_format);
    logging_initialized.store(true, Ordering::SeqCst);

    match cli.command {
        Command::Full(c) => hooks::full_subcommand(&c, cancel_signal),
        Command::Incremental(c) => hooks::incremental_subcommand(&c, cancel_signal),
        Command::Filesmap(c) => hooks::filesmap_subcommand(&c, cancel_signal),
        Command::Completion(c) => completion::completion_main(&c),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_log_options() {
        let cli = Cli::try_parse_from([
            "otahooks",
            "filesmap",
            "-i",
            "target_files.zip",
            "--log-level",
            "debug",
            "--log-format",
            "long",
        ])
        .unwrap();

        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.log_format, LogFormat::Long);
    }
}
