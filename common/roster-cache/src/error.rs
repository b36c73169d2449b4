// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::types::{ProductId, RealmId};

/// Failure of a single roster read, as reported by (or derived from) the fetcher.
///
/// Every waiter of a shared refresh receives its own copy of the error, hence `Clone`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("failed to reach the roster source: {message}")]
    Transport { message: String },

    #[error("the roster source returned a malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("realm {realm_id} is not known to the roster source")]
    UnknownRealm { realm_id: RealmId },

    #[error("only {available} nodes are available while the quorum requires at least {required}")]
    InsufficientNodes { available: usize, required: u64 },

    #[error("the roster refresh was aborted before completing")]
    Aborted,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterCacheError {
    #[error("invalid roster request: {reason}")]
    InvalidParameters { reason: String },

    #[error("node roster for realm {realm_id} is unavailable")]
    RosterUnavailable {
        realm_id: RealmId,
        #[source]
        source: FetchError,
    },

    #[error("product {product_id} is not part of the requested product set")]
    UnknownProduct { product_id: ProductId },

    #[error("only {available} priced nodes are available while {required} are required")]
    InsufficientPricedNodes { available: usize, required: usize },

    #[error("max price {max_price} is below the cost of the cheapest quorum ({required_cost})")]
    MaxPriceTooLow { max_price: u128, required_cost: u128 },

    #[error("none of the responding nodes have price data available")]
    NoRespondingNodePrices,
}

impl RosterCacheError {
    pub fn unavailable(realm_id: RealmId, source: FetchError) -> Self {
        RosterCacheError::RosterUnavailable { realm_id, source }
    }
}

// Result type based on our error type
pub type Result<T> = std::result::Result<T, RosterCacheError>;
