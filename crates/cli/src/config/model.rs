// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;

use stack_builder::books::{DEFAULT_LAMBDA_ASSET, DEFAULT_SCHEMA_PATH};

pub const DEFAULT_STACK_NAME: &str = "BooksStack";
pub const DEFAULT_OUTPUT_DIR: &str = "cdk.out";
pub const DEFAULT_XRAY_ENABLED: bool = true;

#[derive(Debug, PartialEq, Default)]
pub struct Config {
    pub stack: StackConfig,
    pub books: BooksConfig,
    pub synth: SynthConfig,
}

#[derive(Debug, PartialEq)]
pub struct StackConfig {
    pub name: String,
    pub description: Option<String>,
    pub account: Option<String>,
    pub region: Option<String>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_STACK_NAME.to_string(),
            description: None,
            account: None,
            region: None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct BooksConfig {
    pub schema: PathBuf,
    pub lambda_asset: PathBuf,
    /// Unset unless stack.toml names it, so that the environment can still decide
    pub xray_enabled: Option<bool>,
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self {
            schema: PathBuf::from(DEFAULT_SCHEMA_PATH),
            lambda_asset: PathBuf::from(DEFAULT_LAMBDA_ASSET),
            xray_enabled: None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct SynthConfig {
    pub output: PathBuf,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}
