// Copyright 2023 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use clap::ValueEnum;
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl OutputFormat {
    pub fn format<T: Serialize + Display>(&self, data: &T) -> String {
        match self {
            OutputFormat::Text => data.to_string(),
            OutputFormat::Json => match serde_json::to_string_pretty(data) {
                Ok(json) => json,
                Err(err) => format!("failed to serialize the output: {err}"),
            },
        }
    }
}
