// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Typed representation of the synthesized manifest: a CloudFormation template, its
//! resources and outputs, the intrinsic functions used to wire resources together, and
//! the asset manifest that accompanies it.

pub mod asset;
pub mod error;
pub mod intrinsic;
pub mod resources;
pub mod template;

#[cfg(any(test, feature = "test-support"))]
pub mod assertions;
