// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::error::FetchError;
use crate::fetcher::{RawNode, RawRoster, RosterFetcher};
use crate::types::{EpochId, ProductId, RealmId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Registry document mirroring what the price feed contract exposes, one entry per realm.
///
/// ```json
/// {
///   "realms": {
///     "1": {
///       "epoch_id": 15,
///       "min_node_count": 2,
///       "nodes": [{ "url": "http://127.0.0.1:7470", "prices": { "0": 10, "1": 20 } }]
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryDocument {
    pub realms: BTreeMap<RealmId, RealmRoster>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RealmRoster {
    pub epoch_id: EpochId,
    pub min_node_count: u64,
    pub nodes: Vec<RegisteredNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisteredNode {
    pub url: String,
    pub prices: BTreeMap<ProductId, u128>,
}

impl RealmRoster {
    fn project(&self, product_ids: &[ProductId]) -> Result<RawRoster, FetchError> {
        let nodes = self
            .nodes
            .iter()
            .map(|node| {
                let prices = product_ids
                    .iter()
                    .map(|product_id| {
                        node.prices.get(product_id).copied().ok_or_else(|| {
                            FetchError::MalformedResponse {
                                reason: format!(
                                    "node {} has no price for product {product_id}",
                                    node.url
                                ),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(RawNode {
                    url: node.url.clone(),
                    prices,
                })
            })
            .collect::<Result<Vec<_>, FetchError>>()?;

        Ok(RawRoster {
            epoch_id: self.epoch_id,
            min_node_count: self.min_node_count,
            nodes,
        })
    }
}

/// Fetcher reading the roster out of a [`RegistryDocument`] stored on disk.
///
/// The file is re-read on every fetch, so external updates are picked up on the next refresh.
#[derive(Debug, Clone)]
pub struct JsonRosterFetcher {
    path: PathBuf,
}

impl JsonRosterFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonRosterFetcher { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_document(&self) -> Result<RegistryDocument, FetchError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|err| FetchError::Transport {
                message: format!("failed to read {}: {err}", self.path.display()),
            })?;

        serde_json::from_slice(&raw).map_err(|err| FetchError::MalformedResponse {
            reason: format!("{} is not a valid registry document: {err}", self.path.display()),
        })
    }
}

#[async_trait]
impl RosterFetcher for JsonRosterFetcher {
    async fn fetch_roster(
        &self,
        realm_id: RealmId,
        product_ids: &[ProductId],
    ) -> Result<RawRoster, FetchError> {
        debug!(
            "reading roster of realm {realm_id} from {}",
            self.path.display()
        );

        let document = self.load_document().await?;
        let realm = document
            .realms
            .get(&realm_id)
            .ok_or(FetchError::UnknownRealm { realm_id })?;

        realm.project(product_ids)
    }
}
