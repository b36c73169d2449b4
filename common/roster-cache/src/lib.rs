// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

//! Client-side view of the on-chain node roster and its per-product prices.
//!
//! [`RosterCache`] fronts a [`RosterFetcher`] (normally a contract read) and makes sure that
//! concurrent callers share a single outstanding refresh, while fresh enough snapshots are
//! served straight from memory.

mod cache;
mod config;
mod error;
mod fetcher;
mod pricing;
mod snapshot;
mod types;

pub use crate::{
    cache::{CacheStatus, CachedRoster, RosterCache},
    config::Config,
    error::{FetchError, Result, RosterCacheError},
    fetcher::{json::JsonRosterFetcher, RawNode, RawRoster, RosterFetcher},
    pricing::{NodeMaxPrice, NodeProductPrice},
    snapshot::{NodePrice, RosterSnapshot},
    types::{EpochId, Product, ProductId, RealmId, RosterRequest},
};
