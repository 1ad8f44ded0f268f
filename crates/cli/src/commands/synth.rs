// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgMatches, Command};
use colored::Colorize;
use stack_env::SystemEnvironment;

use crate::config::Config;

use super::{
    command::{
        CommandDefinition, account_arg, get, issued_at_arg, lambda_arg, output_arg, print_arg,
        region_arg, schema_arg, stack_name_arg,
    },
    util::{build_app, synth_options},
};

pub(crate) struct SynthCommandDefinition {}

impl CommandDefinition for SynthCommandDefinition {
    fn command(&self) -> Command {
        Command::new("synth")
            .about("Synthesize the stack into a cloud assembly")
            .arg(stack_name_arg())
            .arg(schema_arg())
            .arg(lambda_arg())
            .arg(region_arg())
            .arg(account_arg())
            .arg(issued_at_arg())
            .arg(output_arg())
            .arg(print_arg())
    }

    fn execute(&self, matches: &ArgMatches, config: &Config) -> Result<()> {
        let options = synth_options(matches, config, &SystemEnvironment)?;
        let output: PathBuf =
            get(matches, "output").unwrap_or_else(|| config.synth.output.clone());
        let print = matches.get_flag("print");

        let assembly = build_app(options)?.synth()?;
        assembly.write_to(&output)?;

        for stack in &assembly.stacks {
            if print {
                println!("{}", stack.template.to_json_pretty()?);
            } else {
                println!(
                    "Synthesized {} ({} resources) to {}",
                    stack.stack_name.green().bold(),
                    stack.template.resources.len(),
                    output
                        .join(format!("{}.template.json", stack.stack_name))
                        .display()
                );
            }
        }

        Ok(())
    }
}
