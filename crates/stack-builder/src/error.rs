// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt, sync::Arc};

use codemap::CodeMap;
use codemap_diagnostic::Diagnostic;
use stack_model::error::ModelSerializationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    // Don't include the diagnostics, since we emit them separately (see `emit_diagnostics`)
    #[error("Could not process GraphQL schema '{file}'")]
    Diagnosis {
        file: String,
        diagnostics: Vec<Diagnostic>,
        source_map: SourceMap,
    },

    #[error("File '{0}' not found")]
    FileNotFound(String),

    #[error("Cannot find asset at '{0}'")]
    AssetNotFound(String),

    #[error("Cannot include link '{path}' in asset: {reason}")]
    AssetLink { path: String, reason: String },

    #[error("There is already a construct with id '{id}' in '{scope}'")]
    DuplicateConstruct { scope: String, id: String },

    #[error("Logical id '{logical_id}' (from '{path}') is already used in stack '{stack}'")]
    DuplicateLogicalId {
        stack: String,
        logical_id: String,
        path: String,
    },

    #[error("Field '{type_name}.{field_name}' already has a resolver")]
    DuplicateResolver {
        type_name: String,
        field_name: String,
    },

    #[error("'{from}' refers to '{target}', which is not declared in stack '{stack}'")]
    DanglingReference {
        stack: String,
        from: String,
        target: String,
    },

    #[error("Invalid {kind} '{value}': {reason}")]
    InvalidName {
        kind: &'static str,
        value: String,
        reason: String,
    },

    #[error("API key expiration must be between 1 and 365 days after it is issued (got {0} days)")]
    InvalidExpiration(i64),

    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("{0}")]
    ModelSerialization(#[from] ModelSerializationError),

    #[error("{0}")]
    Generic(String),
}

/// Source text that diagnostics point into.
#[derive(Clone)]
pub struct SourceMap(Arc<CodeMap>);

impl SourceMap {
    pub(crate) fn new(codemap: CodeMap) -> Self {
        Self(Arc::new(codemap))
    }

    pub fn codemap(&self) -> &CodeMap {
        &self.0
    }
}

impl fmt::Debug for SourceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceMap").finish_non_exhaustive()
    }
}
