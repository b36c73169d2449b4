// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use pricefeed_roster_cache::{
    EpochId, NodeMaxPrice, NodePrice, NodeProductPrice, ProductId, RealmId, RosterSnapshot,
};
use serde::Serialize;
use std::fmt::{Display, Formatter};

fn join_prices(prices: &[u128]) -> String {
    prices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Serialize)]
#[serde(transparent)]
pub(crate) struct RosterOutput {
    pub(crate) roster: RosterSnapshot,
}

impl Display for RosterOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let roster = &self.roster;
        writeln!(f, "realm:          {}", roster.realm_id)?;
        writeln!(f, "epoch:          {}", roster.epoch_id)?;
        writeln!(f, "min node count: {}", roster.min_node_count)?;
        writeln!(
            f,
            "products:       {}",
            roster
                .product_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        write!(f, "{}", NodePricesOutput::from(roster.node_prices.clone()))
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub(crate) struct NodePricesOutput {
    nodes: Vec<NodePrice>,
}

impl From<Vec<NodePrice>> for NodePricesOutput {
    fn from(nodes: Vec<NodePrice>) -> Self {
        NodePricesOutput { nodes }
    }
}

impl Display for NodePricesOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for node in &self.nodes {
            writeln!(f, "{}: [{}]", node.url, join_prices(&node.prices))?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub(crate) struct ProductPricesOutput {
    pub(crate) product_id: ProductId,
    pub(crate) prices: Vec<NodeProductPrice>,
}

impl Display for ProductPricesOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "product {}:", self.product_id)?;
        for node in &self.prices {
            writeln!(f, "  {}: {}", node.url, node.price)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub(crate) struct MaxPricesOutput {
    pub(crate) product_id: ProductId,
    pub(crate) threshold: usize,
    pub(crate) max_prices: Vec<NodeMaxPrice>,
}

impl Display for MaxPricesOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "max prices for product {} with threshold {}:",
            self.product_id, self.threshold
        )?;
        for node in &self.max_prices {
            writeln!(f, "  {}: {}", node.url, node.price)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub(crate) struct WatchTick {
    pub(crate) iteration: usize,
    pub(crate) realm_id: RealmId,
    pub(crate) epoch_id: EpochId,
    pub(crate) nodes: usize,
    pub(crate) refreshed: bool,
    pub(crate) cheapest: Option<String>,
}

impl Display for WatchTick {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} realm {} epoch {}: {} nodes ({}), cheapest: {}",
            self.iteration,
            self.realm_id,
            self.epoch_id,
            self.nodes,
            if self.refreshed { "refreshed" } else { "cached" },
            self.cheapest.as_deref().unwrap_or("-")
        )
    }
}
