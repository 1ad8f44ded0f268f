// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::config::Config;

pub trait CommandDefinition {
    fn command(&self) -> Command;

    fn execute(&self, matches: &ArgMatches, config: &Config) -> Result<()>;
}

pub struct SubcommandDefinition {
    pub name: &'static str,
    pub about: &'static str,
    pub command_definitions: Vec<Box<dyn CommandDefinition>>,
}

impl SubcommandDefinition {
    pub fn new(
        name: &'static str,
        about: &'static str,
        command_definitions: Vec<Box<dyn CommandDefinition>>,
    ) -> Self {
        Self {
            name,
            about,
            command_definitions,
        }
    }
}

impl CommandDefinition for SubcommandDefinition {
    fn command(&self) -> Command {
        Command::new(self.name)
            .about(self.about)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .disable_help_subcommand(true)
            .subcommands(
                self.command_definitions
                    .iter()
                    .map(|command_definition| command_definition.command()),
            )
    }

    fn execute(&self, matches: &ArgMatches, config: &Config) -> Result<()> {
        let (name, matches) = matches
            .subcommand()
            .ok_or_else(|| anyhow!("A subcommand is required"))?;

        for command_definition in &self.command_definitions {
            if command_definition.command().get_name() == name {
                return command_definition.execute(matches, config);
            }
        }

        Err(anyhow!("Unknown subcommand: {}", name))
    }
}

pub fn get<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, arg_id: &str) -> Option<T> {
    matches.get_one::<T>(arg_id).cloned()
}

pub fn stack_name_arg() -> Arg {
    Arg::new("stack-name")
        .help("The stack id (also the CloudFormation stack name).")
        .long_help("The stack id (also the CloudFormation stack name). Defaults to the `[stack] name` of stack.toml, or `BooksStack`.")
        .required(false)
        .index(1)
}

pub fn schema_arg() -> Arg {
    Arg::new("schema")
        .help("The GraphQL schema file.")
        .long("schema")
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .num_args(1)
}

pub fn lambda_arg() -> Arg {
    Arg::new("lambda")
        .help("The directory with the function's code.")
        .long("lambda")
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .num_args(1)
}

pub fn region_arg() -> Arg {
    Arg::new("region")
        .help("Deploy region. If not specified, the program will attempt to read it from the environment (`CDK_DEFAULT_REGION`, `AWS_REGION`).")
        .long("region")
        .required(false)
        .num_args(1)
}

pub fn account_arg() -> Arg {
    Arg::new("account")
        .help("Deploy account. If not specified, the program will attempt to read it from the environment (`CDK_DEFAULT_ACCOUNT`).")
        .long("account")
        .required(false)
        .num_args(1)
}

pub fn issued_at_arg() -> Arg {
    Arg::new("issued-at")
        .help("When the API key is issued (RFC 3339). Defaults to now.")
        .long_help("When the API key is issued (RFC 3339), the base of its 365 day expiration. Defaults to now; pass a fixed instant for reproducible templates.")
        .long("issued-at")
        .required(false)
        .value_parser(parse_instant)
        .num_args(1)
}

pub fn output_arg() -> Arg {
    Arg::new("output")
        .help("Output directory for the cloud assembly")
        .short('o')
        .long("output")
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .num_args(1)
}

pub fn print_arg() -> Arg {
    Arg::new("print")
        .help("Also print the template to stdout")
        .long("print")
        .action(ArgAction::SetTrue)
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| format!("Invalid RFC 3339 instant '{value}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instants() {
        assert_eq!(
            parse_instant("2025-01-01T10:00:00+02:00").unwrap(),
            parse_instant("2025-01-01T08:00:00Z").unwrap()
        );
        assert!(parse_instant("yesterday").is_err());
    }
}
