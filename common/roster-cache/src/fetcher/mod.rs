// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::error::FetchError;
use crate::types::{EpochId, ProductId, RealmId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod json;

/// Unvalidated reply of a roster read, as returned by the price feed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRoster {
    pub epoch_id: EpochId,
    pub min_node_count: u64,
    pub nodes: Vec<RawNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNode {
    pub url: String,

    /// Prices aligned with the product ids of the request.
    pub prices: Vec<u128>,
}

/// Source of the node roster, normally a read of the price feed contract.
///
/// Implementations are expected to perform exactly one remote read per call and must not
/// cache anything themselves. Retries, if any, are also their responsibility.
#[async_trait]
pub trait RosterFetcher: Send + Sync {
    async fn fetch_roster(
        &self,
        realm_id: RealmId,
        product_ids: &[ProductId],
    ) -> Result<RawRoster, FetchError>;
}

#[async_trait]
impl<T> RosterFetcher for Arc<T>
where
    T: RosterFetcher + ?Sized,
{
    async fn fetch_roster(
        &self,
        realm_id: RealmId,
        product_ids: &[ProductId],
    ) -> Result<RawRoster, FetchError> {
        (**self).fetch_roster(realm_id, product_ids).await
    }
}

#[async_trait]
impl<T> RosterFetcher for Box<T>
where
    T: RosterFetcher + ?Sized,
{
    async fn fetch_roster(
        &self,
        realm_id: RealmId,
        product_ids: &[ProductId],
    ) -> Result<RawRoster, FetchError> {
        (**self).fetch_roster(realm_id, product_ids).await
    }
}
