// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Property shapes of the resource kinds the stack declares. Field names follow the
//! provider's PascalCase property names.

use serde::Serialize;

pub mod appsync;
pub mod dynamodb;
pub mod iam;
pub mod lambda;

/// Properties of one resource kind, tagged with the provider's resource type name.
pub trait ResourceProperties: Serialize {
    const RESOURCE_TYPE: &'static str;
}
