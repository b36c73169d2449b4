// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use crate::types::{Product, ProductId, RealmId, RosterRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Duration during which a fetched roster is served from cache without querying the chain again.
    #[serde(with = "humantime_serde")]
    pub stale_threshold: Duration,

    /// Realm used for requests that do not explicitly specify one.
    pub default_realm: RealmId,

    /// Products requested when the caller does not explicitly specify them.
    pub default_products: Vec<ProductId>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stale_threshold: Self::DEFAULT_STALE_THRESHOLD,
            default_realm: RealmId::DEFAULT,
            default_products: Product::all_ids(),
        }
    }
}

impl Config {
    pub const DEFAULT_STALE_THRESHOLD: Duration = Duration::from_secs(3);

    #[must_use]
    pub fn with_stale_threshold(mut self, stale_threshold: Duration) -> Self {
        self.stale_threshold = stale_threshold;
        self
    }

    /// Build a request out of the configured defaults, overriding whatever was explicitly provided.
    pub fn request(
        &self,
        realm_id: Option<RealmId>,
        product_ids: Option<Vec<ProductId>>,
    ) -> RosterRequest {
        RosterRequest {
            realm_id: realm_id.unwrap_or(self.default_realm),
            product_ids: product_ids.unwrap_or_else(|| self.default_products.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_humantime_durations() {
        let raw = r#"
            stale_threshold = "1500ms"
            default_realm = 2
            default_products = [1, 2]
        "#;

        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.stale_threshold, Duration::from_millis(1500));
        assert_eq!(config.default_realm, RealmId::new(2));
        assert_eq!(
            config.default_products,
            vec![ProductId::new(1), ProductId::new(2)]
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = toml::from_str(r#"stale_threshold = "10s""#).unwrap();
        assert_eq!(config.stale_threshold, Duration::from_secs(10));
        assert_eq!(config.default_realm, RealmId::DEFAULT);
        assert_eq!(config.default_products, Product::all_ids());
    }

    #[test]
    fn rejects_unknown_fields() {
        let raw = r#"
            stale_threshold = "3s"
            default_realm = 1
            default_products = [0]
            retries = 5
        "#;
        assert!(toml::from_str::<Config>(raw).is_err());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::default();
        let request = config.request(None, None);
        assert_eq!(request, RosterRequest::default());

        let request = config.request(Some(RealmId::new(3)), Some(vec![ProductId::new(2)]));
        assert_eq!(request.realm_id, RealmId::new(3));
        assert_eq!(request.product_ids, vec![ProductId::new(2)]);
    }
}
