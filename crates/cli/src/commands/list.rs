// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use stack_env::SystemEnvironment;

use crate::config::Config;

use super::{
    command::{
        CommandDefinition, account_arg, issued_at_arg, lambda_arg, region_arg, schema_arg,
        stack_name_arg,
    },
    util::{build_app, synth_options},
};

pub(crate) struct ListCommandDefinition {}

impl CommandDefinition for ListCommandDefinition {
    fn command(&self) -> Command {
        Command::new("list")
            .alias("ls")
            .about("List the stacks of the app")
            .arg(stack_name_arg())
            .arg(schema_arg())
            .arg(lambda_arg())
            .arg(region_arg())
            .arg(account_arg())
            .arg(issued_at_arg())
            .arg(
                Arg::new("long")
                    .help("Also show each stack's environment and resource count")
                    .short('l')
                    .long("long")
                    .action(ArgAction::SetTrue),
            )
    }

    fn execute(&self, matches: &ArgMatches, config: &Config) -> Result<()> {
        let options = synth_options(matches, config, &SystemEnvironment)?;
        let long = matches.get_flag("long");

        let app = build_app(options)?;
        for stack in app.stacks() {
            if long {
                let artifact = stack.synth()?;
                println!(
                    "{}\t{}\t{} resources",
                    artifact.stack_name,
                    artifact.environment.uri(),
                    artifact.template.resources.len()
                );
            } else {
                println!("{}", stack.name());
            }
        }

        Ok(())
    }
}
