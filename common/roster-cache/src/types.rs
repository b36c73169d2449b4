// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::error::RosterCacheError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};
use tracing::warn;

pub type EpochId = u64;

/// Identifier of a partition of the node network. Realms are numbered from 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RealmId(u64);

impl RealmId {
    pub const DEFAULT: RealmId = RealmId(1);

    pub const fn new(id: u64) -> Self {
        RealmId(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl Default for RealmId {
    fn default() -> Self {
        RealmId::DEFAULT
    }
}

impl From<u64> for RealmId {
    fn from(value: u64) -> Self {
        RealmId(value)
    }
}

impl Display for RealmId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RealmId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(RealmId)
    }
}

/// On-chain identifier of a billable product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    pub const fn new(id: u64) -> Self {
        ProductId(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ProductId {
    fn from(value: u64) -> Self {
        ProductId(value)
    }
}

impl From<Product> for ProductId {
    fn from(value: Product) -> Self {
        value.id()
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Products currently priced by the network.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    StrumDisplay,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Product {
    Decryption,
    Sign,
    LitAction,
    SignSessionKey,
}

impl Product {
    pub const fn id(&self) -> ProductId {
        match self {
            Product::Decryption => ProductId(0),
            Product::Sign => ProductId(1),
            Product::LitAction => ProductId(2),
            Product::SignSessionKey => ProductId(3),
        }
    }

    /// Ids of every known product, in id order.
    pub fn all_ids() -> Vec<ProductId> {
        Product::iter().map(|product| product.id()).collect()
    }
}

/// Parameters of a single roster read. Also the key under which the cache stores results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterRequest {
    pub realm_id: RealmId,

    /// Requested products. The order defines the column order of every node's `prices`.
    pub product_ids: Vec<ProductId>,
}

impl Default for RosterRequest {
    fn default() -> Self {
        RosterRequest::for_realm(RealmId::DEFAULT)
    }
}

impl RosterRequest {
    pub fn new(realm_id: RealmId, product_ids: Vec<ProductId>) -> Self {
        RosterRequest {
            realm_id,
            product_ids,
        }
    }

    /// Request prices of every known product for the given realm.
    pub fn for_realm(realm_id: RealmId) -> Self {
        RosterRequest::new(realm_id, Product::all_ids())
    }

    pub fn with_products<I, P>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ProductId>,
    {
        self.product_ids = products.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), RosterCacheError> {
        if self.realm_id.get() == 0 {
            return Err(RosterCacheError::InvalidParameters {
                reason: "realm identifiers start at 1".to_string(),
            });
        }

        if self.product_ids.is_empty() {
            return Err(RosterCacheError::InvalidParameters {
                reason: "at least one product id has to be requested".to_string(),
            });
        }

        let unique = self.product_ids.iter().collect::<HashSet<_>>();
        if unique.len() != self.product_ids.len() {
            warn!(
                "roster request for realm {} contains duplicate product ids: {:?}",
                self.realm_id, self.product_ids
            );
        }

        Ok(())
    }
}
