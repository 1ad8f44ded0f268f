// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde::Deserialize;

use super::model::{BooksConfig, Config, StackConfig, SynthConfig};

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigSer {
    pub stack: Option<StackSer>,
    pub books: Option<BooksSer>,
    pub synth: Option<SynthSer>,
}

#[derive(Deserialize, Debug, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct StackSer {
    pub name: Option<String>,
    pub description: Option<String>,
    pub account: Option<String>,
    pub region: Option<String>,
}

#[derive(Deserialize, Debug, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct BooksSer {
    pub schema: Option<PathBuf>,
    #[serde(rename = "lambda-asset")]
    pub lambda_asset: Option<PathBuf>,
    #[serde(rename = "xray-enabled")]
    pub xray_enabled: Option<bool>,
}

#[derive(Deserialize, Debug, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SynthSer {
    pub output: Option<PathBuf>,
}

impl TryFrom<ConfigSer> for Config {
    type Error = anyhow::Error;

    fn try_from(config: ConfigSer) -> Result<Self, Self::Error> {
        Ok(Config {
            stack: config
                .stack
                .map(StackConfig::try_from)
                .transpose()?
                .unwrap_or_default(),
            books: config.books.map(BooksConfig::from).unwrap_or_default(),
            synth: config.synth.map(SynthConfig::from).unwrap_or_default(),
        })
    }
}

impl TryFrom<StackSer> for StackConfig {
    type Error = anyhow::Error;

    fn try_from(config: StackSer) -> Result<Self, Self::Error> {
        if let Some(account) = &config.account
            && (account.len() != 12 || !account.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(anyhow!(
                "Invalid account '{}': expected a 12 digit account id",
                account
            ));
        }

        if let Some(region) = &config.region
            && (region.is_empty()
                || !region
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'))
        {
            return Err(anyhow!(
                "Invalid region '{}': expected a region name such as 'us-east-1'",
                region
            ));
        }

        let defaults = StackConfig::default();
        Ok(StackConfig {
            name: config.name.unwrap_or(defaults.name),
            description: config.description,
            account: config.account,
            region: config.region,
        })
    }
}

impl From<BooksSer> for BooksConfig {
    fn from(config: BooksSer) -> Self {
        let defaults = BooksConfig::default();
        BooksConfig {
            schema: config.schema.unwrap_or(defaults.schema),
            lambda_asset: config.lambda_asset.unwrap_or(defaults.lambda_asset),
            xray_enabled: config.xray_enabled,
        }
    }
}

impl From<SynthSer> for SynthConfig {
    fn from(config: SynthSer) -> Self {
        SynthConfig {
            output: config.output.unwrap_or(SynthConfig::default().output),
        }
    }
}

fn parse_config(toml_str: &str) -> Result<Config> {
    let config: ConfigSer = toml::from_str(toml_str)?;
    config.try_into()
}

fn load_config_from_file(path: &Path) -> Result<Config> {
    let toml_str = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read file '{}': {}", path.display(), e))?;

    parse_config(&toml_str)
        .map_err(|e| anyhow!("Failed to parse TOML file '{}': {}", path.display(), e))
}

/// Load `path` if it exists, otherwise use the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    load_config_from_file(path)
}
