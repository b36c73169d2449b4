// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::error::FetchError;
use crate::fetcher::RawRoster;
use crate::types::{EpochId, ProductId, RealmId, RosterRequest};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePrice {
    pub url: String,

    /// Prices aligned with [`RosterSnapshot::product_ids`].
    pub prices: Vec<u128>,
}

impl NodePrice {
    pub fn new(url: impl Into<String>, prices: Vec<u128>) -> Self {
        NodePrice {
            url: url.into(),
            prices,
        }
    }
}

/// Validated result of a single roster read. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub realm_id: RealmId,

    /// Epoch the data was read at. Informational only.
    pub epoch_id: EpochId,

    /// Minimum number of nodes required by downstream quorum logic.
    pub min_node_count: u64,

    pub product_ids: Vec<ProductId>,

    /// Node prices, cheapest first by the price of the first requested product.
    pub node_prices: Vec<NodePrice>,
}

impl RosterSnapshot {
    /// Validate a raw roster read against the request that produced it and derive the
    /// cheapest-first ordering.
    ///
    /// The ordering only considers the first product, under the assumption that a node cheap for
    /// one product is representative across all of them. Ties keep the order of the raw response.
    pub fn from_raw(request: &RosterRequest, raw: RawRoster) -> Result<Self, FetchError> {
        let expected_prices = request.product_ids.len();

        let mut node_prices = Vec::with_capacity(raw.nodes.len());
        for node in raw.nodes {
            if node.url.trim().is_empty() {
                return Err(FetchError::MalformedResponse {
                    reason: "received a node without an url".to_string(),
                });
            }
            if node.prices.len() != expected_prices {
                return Err(FetchError::MalformedResponse {
                    reason: format!(
                        "node {} returned {} prices for {expected_prices} requested products",
                        node.url,
                        node.prices.len()
                    ),
                });
            }
            node_prices.push(NodePrice {
                url: node.url,
                prices: node.prices,
            })
        }

        let available = node_prices.len();
        if (available as u64) < raw.min_node_count {
            return Err(FetchError::InsufficientNodes {
                available,
                required: raw.min_node_count,
            });
        }

        // `sort_by_key` is stable
        node_prices.sort_by_key(|node| node.prices.first().copied());

        Ok(RosterSnapshot {
            realm_id: request.realm_id,
            epoch_id: raw.epoch_id,
            min_node_count: raw.min_node_count,
            product_ids: request.product_ids.clone(),
            node_prices,
        })
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.node_prices.iter().map(|node| node.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::RawNode;

    fn raw(min_node_count: u64, nodes: &[(&str, &[u128])]) -> RawRoster {
        RawRoster {
            epoch_id: 15,
            min_node_count,
            nodes: nodes
                .iter()
                .map(|(url, prices)| RawNode {
                    url: url.to_string(),
                    prices: prices.to_vec(),
                })
                .collect(),
        }
    }

    fn single_product_request() -> RosterRequest {
        RosterRequest::new(RealmId::new(1), vec![ProductId::new(0)])
    }

    #[test]
    fn sorts_cheapest_first() {
        let snapshot = RosterSnapshot::from_raw(
            &single_product_request(),
            raw(2, &[("a", &[10]), ("b", &[5])]),
        )
        .unwrap();

        assert_eq!(snapshot.epoch_id, 15);
        assert_eq!(snapshot.min_node_count, 2);
        assert_eq!(
            snapshot.node_prices,
            vec![NodePrice::new("b", vec![5]), NodePrice::new("a", vec![10])]
        );
    }

    #[test]
    fn sort_is_stable_and_uses_first_product_only() {
        let request =
            RosterRequest::new(RealmId::new(1), vec![ProductId::new(0), ProductId::new(1)]);
        let snapshot = RosterSnapshot::from_raw(
            &request,
            raw(
                0,
                &[
                    ("x", &[5, 1]),
                    ("y", &[2, 100]),
                    ("z", &[8, 0]),
                    ("w", &[2, 3]),
                ],
            ),
        )
        .unwrap();

        let order = snapshot.urls().collect::<Vec<_>>();
        assert_eq!(order, vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn rejects_misaligned_prices() {
        let request =
            RosterRequest::new(RealmId::new(1), vec![ProductId::new(0), ProductId::new(1)]);
        let err = RosterSnapshot::from_raw(&request, raw(1, &[("a", &[1, 2]), ("b", &[1])]))
            .unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[test]
    fn rejects_nodes_without_urls() {
        let err = RosterSnapshot::from_raw(&single_product_request(), raw(1, &[(" ", &[1])]))
            .unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse { .. }));
    }

    #[test]
    fn enforces_minimum_node_count() {
        let err = RosterSnapshot::from_raw(&single_product_request(), raw(3, &[("a", &[1])]))
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::InsufficientNodes {
                available: 1,
                required: 3
            }
        );

        let snapshot =
            RosterSnapshot::from_raw(&single_product_request(), raw(1, &[("a", &[1])])).unwrap();
        assert_eq!(snapshot.node_prices.len(), 1);
    }
}
