// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::config::CliConfig;
use crate::output::{
    MaxPricesOutput, NodePricesOutput, ProductPricesOutput, RosterOutput, WatchTick,
};
use clap::{Parser, Subcommand};
use pricefeed_bin_common::output_format::OutputFormat;
use pricefeed_roster_cache::{
    JsonRosterFetcher, Product, ProductId, RealmId, RosterCache, RosterRequest,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Path to the TOML configuration file. Defaults are used if not provided.
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Path to the JSON registry document the roster is read from.
    #[arg(short, long)]
    pub(crate) registry: PathBuf,

    /// Realm to query. Overrides the configured default.
    #[arg(long)]
    pub(crate) realm: Option<RealmId>,

    /// Comma separated list of products to request prices for. Overrides the configured default.
    #[arg(long, value_delimiter = ',')]
    pub(crate) products: Vec<Product>,

    #[arg(short, long, default_value_t = OutputFormat::default())]
    pub(crate) output: OutputFormat,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Show the full roster with nodes ordered cheapest first
    Roster,

    /// Show the node prices, optionally of a single product
    Prices {
        #[arg(long)]
        product: Option<Product>,
    },

    /// Derive the per-node max prices for a request served by `threshold` nodes
    MaxPrices {
        #[arg(long)]
        product: Product,

        /// Total budget for the request. Unlimited if not specified.
        #[arg(long)]
        max_price: Option<u128>,

        #[arg(long)]
        threshold: usize,
    },

    /// Periodically query the roster through the cache
    Watch {
        #[arg(long, default_value_t = 10)]
        iterations: usize,

        #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
        interval: Duration,
    },
}

impl Cli {
    pub(crate) fn request(&self, config: &CliConfig) -> RosterRequest {
        let products = (!self.products.is_empty())
            .then(|| self.products.iter().map(Product::id).collect::<Vec<ProductId>>());
        config.roster_cache.request(self.realm, products)
    }
}

pub(crate) async fn execute(cli: Cli, config: CliConfig) -> anyhow::Result<()> {
    let request = cli.request(&config);
    let fetcher = JsonRosterFetcher::new(&cli.registry);
    let cache = RosterCache::new(fetcher, config.roster_cache);
    let output = cli.output;

    match cli.command {
        Commands::Roster => {
            let roster = cache.get_roster(&request).await?;
            println!(
                "{}",
                output.format(&RosterOutput {
                    roster: (*roster).clone()
                })
            );
        }
        Commands::Prices { product: None } => {
            let prices = cache.get_node_prices(&request).await?;
            println!("{}", output.format(&NodePricesOutput::from(prices)));
        }
        Commands::Prices {
            product: Some(product),
        } => {
            let roster = cache.get_roster(&request).await?;
            let prices = roster.prices_for_product(product.id())?;
            println!(
                "{}",
                output.format(&ProductPricesOutput {
                    product_id: product.id(),
                    prices,
                })
            );
        }
        Commands::MaxPrices {
            product,
            max_price,
            threshold,
        } => {
            let roster = cache.get_roster(&request).await?;
            let max_prices = roster.max_prices_for_product(product.id(), max_price, threshold)?;
            println!(
                "{}",
                output.format(&MaxPricesOutput {
                    product_id: product.id(),
                    threshold,
                    max_prices,
                })
            );
        }
        Commands::Watch {
            iterations,
            interval,
        } => watch(&cache, &request, output, iterations, interval).await,
    }

    Ok(())
}

async fn watch(
    cache: &RosterCache<JsonRosterFetcher>,
    request: &RosterRequest,
    output: OutputFormat,
    iterations: usize,
    interval: Duration,
) {
    let mut previous = None;
    for iteration in 1..=iterations {
        match cache.get_roster(request).await {
            Ok(roster) => {
                let refreshed = previous
                    .as_ref()
                    .map(|previous| !Arc::ptr_eq(previous, &roster))
                    .unwrap_or(true);
                let tick = WatchTick {
                    iteration,
                    realm_id: roster.realm_id,
                    epoch_id: roster.epoch_id,
                    nodes: roster.node_prices.len(),
                    refreshed,
                    cheapest: roster.urls().next().map(ToString::to_string),
                };
                println!("{}", output.format(&tick));
                previous = Some(roster);
            }
            Err(err) => {
                // report, but keep polling with whatever was cached last
                match cache.cached_snapshot(request) {
                    Some(cached) => warn!(
                        "{err}. last good roster (epoch {}) is {:?} old",
                        cached.snapshot.epoch_id,
                        cached.age()
                    ),
                    None => warn!("{err}. no roster is available yet"),
                }
            }
        }

        if iteration != iterations {
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_arguments_override_config() {
        let cli = Cli::parse_from([
            "pricefeed-cli",
            "--registry",
            "registry.json",
            "--realm",
            "2",
            "--products",
            "sign,lit_action",
            "max-prices",
            "--product",
            "sign",
            "--max-price",
            "1000",
            "--threshold",
            "2",
        ]);

        let request = cli.request(&CliConfig::default());
        assert_eq!(request.realm_id, RealmId::new(2));
        assert_eq!(
            request.product_ids,
            vec![Product::Sign.id(), Product::LitAction.id()]
        );
        assert!(matches!(
            cli.command,
            Commands::MaxPrices {
                product: Product::Sign,
                max_price: Some(1000),
                threshold: 2
            }
        ));
    }

    #[test]
    fn defaults_come_from_config() {
        let cli = Cli::parse_from(["pricefeed-cli", "-r", "registry.json", "roster"]);
        let request = cli.request(&CliConfig::default());
        assert_eq!(request, RosterRequest::default());
        assert_eq!(cli.output, OutputFormat::Text);
    }
}
