// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde::Serialize;

pub const ASSET_MANIFEST_VERSION: &str = "36.0.0";

/// Bucket the default bootstrap creates for file assets.
pub const DEFAULT_ASSET_BUCKET: &str = "cdk-hnb659fds-assets-${AWS::AccountId}-${AWS::Region}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Packaging {
    Zip,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSource {
    pub path: String,
    pub packaging: Packaging,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDestination {
    pub bucket_name: String,
    pub object_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileAsset {
    pub source: AssetSource,
    pub destinations: IndexMap<String, AssetDestination>,
}

/// Files the deployment tool must upload before the template can be deployed, keyed by
/// content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetManifest {
    pub version: &'static str,
    pub files: IndexMap<String, FileAsset>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            version: ASSET_MANIFEST_VERSION,
            files: IndexMap::new(),
        }
    }
}

impl AssetManifest {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
