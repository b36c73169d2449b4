// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use pricefeed_bin_common::logging::setup_tracing_logger;

mod cli;
mod config;
mod output;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let config = config::CliConfig::load(cli.config.as_deref())?;
    setup_tracing_logger(&config.logging);

    cli::execute(cli, config).await
}
