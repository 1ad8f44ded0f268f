// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::Path;

use anyhow::Result;
use common::logging_tracing;
use stack_env::SystemEnvironment;

use commands::{
    command::{CommandDefinition, SubcommandDefinition},
    list::ListCommandDefinition,
    synth::SynthCommandDefinition,
};

mod commands;
mod config;

const CONFIG_FILE: &str = "stack.toml";

fn main() -> Result<()> {
    logging_tracing::init(&SystemEnvironment);

    let subcommand_definition = SubcommandDefinition::new(
        "stack",
        "Synthesize the books GraphQL stack into CloudFormation templates",
        vec![
            Box::new(SynthCommandDefinition {}),
            Box::new(ListCommandDefinition {}),
        ],
    );

    let command = subcommand_definition
        .command()
        .version(env!("CARGO_PKG_VERSION"));

    let matches = command.get_matches();

    let config = config::load_config(Path::new(CONFIG_FILE))?;

    subcommand_definition.execute(&matches, &config)
}
