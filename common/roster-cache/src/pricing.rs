// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Result, RosterCacheError};
use crate::snapshot::{NodePrice, RosterSnapshot};
use crate::types::ProductId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// Price of a single product at a given node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProductPrice {
    pub url: String,
    pub price: u128,
}

/// Maximum price the caller is willing to pay a given node for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMaxPrice {
    pub url: String,
    pub price: u128,
}

impl RosterSnapshot {
    /// Column of the given product within every node's `prices`.
    pub fn product_index(&self, product_id: ProductId) -> Result<usize> {
        self.product_ids
            .iter()
            .position(|id| *id == product_id)
            .ok_or(RosterCacheError::UnknownProduct { product_id })
    }

    /// Prices of a single product, cheapest first. Ties keep the snapshot order.
    pub fn prices_for_product(&self, product_id: ProductId) -> Result<Vec<NodeProductPrice>> {
        let index = self.product_index(product_id)?;

        let mut prices = self
            .node_prices
            .iter()
            .filter_map(|node| {
                node.prices.get(index).map(|price| NodeProductPrice {
                    url: node.url.clone(),
                    price: *price,
                })
            })
            .collect::<Vec<_>>();
        prices.sort_by_key(|node| node.price);
        Ok(prices)
    }

    /// Derive per-node maximum prices for a request served by `required_nodes` nodes.
    ///
    /// The cheapest `required_nodes` nodes for the product are selected and whatever is left of
    /// the user's budget after paying their base prices is split evenly between them.
    /// No explicit budget means the budget is unlimited.
    pub fn max_prices_for_product(
        &self,
        product_id: ProductId,
        user_max_price: Option<u128>,
        required_nodes: usize,
    ) -> Result<Vec<NodeMaxPrice>> {
        if required_nodes == 0 {
            return Err(RosterCacheError::InvalidParameters {
                reason: "at least one node has to be required".to_string(),
            });
        }

        let prices = self.prices_for_product(product_id)?;
        if prices.len() < required_nodes {
            return Err(RosterCacheError::InsufficientPricedNodes {
                available: prices.len(),
                required: required_nodes,
            });
        }

        let max_price = user_max_price.unwrap_or(u128::MAX);
        let selected = &prices[..required_nodes];
        let required_cost = selected
            .iter()
            .try_fold(0u128, |total, node| total.checked_add(node.price))
            .unwrap_or(u128::MAX);

        if required_cost > max_price {
            return Err(RosterCacheError::MaxPriceTooLow {
                max_price,
                required_cost,
            });
        }

        let excess_per_node = (max_price - required_cost) / required_nodes as u128;

        Ok(selected
            .iter()
            .map(|node| NodeMaxPrice {
                url: node.url.clone(),
                price: node.price.saturating_add(excess_per_node),
            })
            .collect())
    }

    /// Restrict the node prices to the nodes that actually responded to the caller.
    pub fn responding_node_prices<'a, I>(&self, responding_urls: I) -> Result<Vec<NodePrice>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let responding = responding_urls.into_iter().collect::<HashSet<_>>();

        let (kept, excluded): (Vec<_>, Vec<_>) = self
            .node_prices
            .iter()
            .partition(|node| responding.contains(node.url.as_str()));

        if kept.is_empty() {
            return Err(RosterCacheError::NoRespondingNodePrices);
        }

        if !excluded.is_empty() {
            let excluded = excluded
                .iter()
                .map(|node| node.url.as_str())
                .collect::<Vec<_>>();
            warn!("excluding priced nodes that did not respond: {excluded:?}");
        }

        Ok(kept.into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RealmId;

    fn snapshot() -> RosterSnapshot {
        RosterSnapshot {
            realm_id: RealmId::new(1),
            epoch_id: 3,
            min_node_count: 2,
            product_ids: vec![ProductId::new(0), ProductId::new(1)],
            node_prices: vec![
                NodePrice::new("a", vec![10, 40]),
                NodePrice::new("b", vec![20, 10]),
                NodePrice::new("c", vec![30, 10]),
            ],
        }
    }

    #[test]
    fn product_index_lookup() {
        let snapshot = snapshot();
        assert_eq!(snapshot.product_index(ProductId::new(1)).unwrap(), 1);
        assert_eq!(
            snapshot.product_index(ProductId::new(9)).unwrap_err(),
            RosterCacheError::UnknownProduct {
                product_id: ProductId::new(9)
            }
        );
    }

    #[test]
    fn per_product_ordering_is_stable() {
        let prices = snapshot().prices_for_product(ProductId::new(1)).unwrap();
        let urls = prices.iter().map(|p| p.url.as_str()).collect::<Vec<_>>();
        assert_eq!(urls, vec!["b", "c", "a"]);
    }

    #[test]
    fn splits_remaining_budget_between_required_nodes() {
        let max_prices = snapshot()
            .max_prices_for_product(ProductId::new(0), Some(100), 2)
            .unwrap();

        // base cost is 10 + 20, leaving 70 to be split evenly
        assert_eq!(
            max_prices,
            vec![
                NodeMaxPrice {
                    url: "a".to_string(),
                    price: 45
                },
                NodeMaxPrice {
                    url: "b".to_string(),
                    price: 55
                },
            ]
        );
    }

    #[test]
    fn unlimited_budget_does_not_overflow() {
        let max_prices = snapshot()
            .max_prices_for_product(ProductId::new(1), None, 3)
            .unwrap();
        assert_eq!(max_prices.len(), 3);
        assert!(max_prices.iter().all(|p| p.price > 0));
    }

    #[test]
    fn budget_below_quorum_cost() {
        let err = snapshot()
            .max_prices_for_product(ProductId::new(0), Some(29), 2)
            .unwrap_err();
        assert_eq!(
            err,
            RosterCacheError::MaxPriceTooLow {
                max_price: 29,
                required_cost: 30
            }
        );
    }

    #[test]
    fn not_enough_nodes_for_threshold() {
        let err = snapshot()
            .max_prices_for_product(ProductId::new(0), Some(1000), 4)
            .unwrap_err();
        assert_eq!(
            err,
            RosterCacheError::InsufficientPricedNodes {
                available: 3,
                required: 4
            }
        );

        assert!(matches!(
            snapshot().max_prices_for_product(ProductId::new(0), Some(1000), 0),
            Err(RosterCacheError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn filters_out_non_responding_nodes() {
        let snapshot = snapshot();
        let kept = snapshot.responding_node_prices(["c", "a", "z"]).unwrap();
        assert_eq!(
            kept,
            vec![
                NodePrice::new("a", vec![10, 40]),
                NodePrice::new("c", vec![30, 10])
            ]
        );

        assert_eq!(
            snapshot.responding_node_prices(["z"]).unwrap_err(),
            RosterCacheError::NoRespondingNodePrices
        );
    }
}
