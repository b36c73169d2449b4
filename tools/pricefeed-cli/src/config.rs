// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use anyhow::Context;
use pricefeed_bin_common::logging::LoggingSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CliConfig {
    #[serde(default)]
    pub(crate) roster_cache: pricefeed_roster_cache::Config,

    #[serde(default)]
    pub(crate) logging: LoggingSettings,
}

impl CliConfig {
    pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(CliConfig::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn loads_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [roster_cache]
            stale_threshold = "250ms"

            [logging]
            filter = "debug"
            "#
        )
        .unwrap();

        let config = CliConfig::load(Some(file.path())).unwrap();
        assert_eq!(
            config.roster_cache.stale_threshold,
            Duration::from_millis(250)
        );
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
        assert!(CliConfig::load(Some(Path::new("/definitely/not/here.toml"))).is_err());
    }
}
