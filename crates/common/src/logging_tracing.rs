// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! # Tracing configuration setup.
//!
//! The builder is instrumented with Rust's `tracing` framework.
//!
//! Calling the `init` function will initialize a global tracing subscriber based on the value of
//! the `STACK_LOG` environment variable, which follows the same conventions as `RUST_LOG`
//! (for example `STACK_LOG=stack_builder=debug`). Without it, only warnings and errors are
//! logged.
//!
//! Logs go to stderr, so that templates printed to stdout can be piped.

use stack_env::Environment;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*};

pub const STACK_LOG: &str = "STACK_LOG";

/// Initialize the tracing subscriber with a compact `tracing_subscriber::fmt` layer.
pub fn init(env: &dyn Environment) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter(env.get(STACK_LOG)))
        .with(fmt_layer)
        .init();
}

fn env_filter(directives: Option<String>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives.unwrap_or_default())
}
