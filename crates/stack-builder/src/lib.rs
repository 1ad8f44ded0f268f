// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Declares stacks of AppSync, DynamoDB and Lambda resources and synthesizes them into
//! CloudFormation templates.

use codemap_diagnostic::{ColorConfig, Emitter};
use error::BuildError;

pub mod app;
pub mod appsync;
pub mod asset;
pub mod books;
pub mod construct;
pub mod dynamodb;
pub mod error;
pub mod iam;
pub mod lambda;
pub mod stack;

/// Print source-located diagnostics carried by `err` (if any) to stderr.
pub fn emit_diagnostics(err: &BuildError) {
    if let BuildError::Diagnosis {
        diagnostics,
        source_map,
        ..
    } = err
    {
        let mut emitter = Emitter::stderr(ColorConfig::Auto, Some(source_map.codemap()));
        emitter.emit(diagnostics);
    }
}
