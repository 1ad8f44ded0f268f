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
use clap::ArgMatches;
use stack_builder::{
    app::App,
    books::{BooksStack, BooksStackProps},
    emit_diagnostics,
    stack::{DeployEnvironment, StackProps},
};
use stack_env::Environment;
use tracing::debug;

use crate::config::{Config, DEFAULT_XRAY_ENABLED};

use super::command::get;

pub const XRAY_ENABLED: &str = "STACK_XRAY_ENABLED";

/// Inputs of one synthesis, resolved from arguments, then stack.toml, then the environment.
#[derive(Debug, PartialEq)]
pub(crate) struct SynthOptions {
    pub stack_name: String,
    pub props: BooksStackProps,
}

pub(crate) fn synth_options(
    matches: &ArgMatches,
    config: &Config,
    env: &dyn Environment,
) -> Result<SynthOptions> {
    let stack_name = get::<String>(matches, "stack-name").unwrap_or_else(|| config.stack.name.clone());

    let account = get::<String>(matches, "account")
        .or_else(|| config.stack.account.clone())
        .or_else(|| env.deploy_account());
    let region = get::<String>(matches, "region")
        .or_else(|| config.stack.region.clone())
        .or_else(|| env.deploy_region());

    let issued_at = get::<DateTime<Utc>>(matches, "issued-at").unwrap_or_else(Utc::now);
    let xray_enabled = match config.books.xray_enabled {
        Some(enabled) => enabled,
        None => env.enabled(XRAY_ENABLED, DEFAULT_XRAY_ENABLED)?,
    };

    Ok(SynthOptions {
        stack_name,
        props: BooksStackProps {
            stack: StackProps {
                description: config.stack.description.clone(),
                env: DeployEnvironment { account, region },
            },
            schema: get::<PathBuf>(matches, "schema").unwrap_or_else(|| config.books.schema.clone()),
            lambda_asset: get::<PathBuf>(matches, "lambda")
                .unwrap_or_else(|| config.books.lambda_asset.clone()),
            api_key_issued_at: issued_at,
            xray_enabled,
        },
    })
}

/// Declare the books stack in a new app, printing schema diagnostics on failure.
pub(crate) fn build_app(options: SynthOptions) -> Result<App> {
    debug!(?options, "Building app");

    let mut app = App::new();
    BooksStack::new(&mut app, &options.stack_name, options.props).map_err(|err| {
        emit_diagnostics(&err);
        anyhow!(err)
    })?;

    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{
        command::CommandDefinition, synth::SynthCommandDefinition,
    };
    use crate::config::model::{BooksConfig, StackConfig};
    use stack_env::{CDK_DEFAULT_ACCOUNT, CDK_DEFAULT_REGION, MapEnvironment};

    fn matches(args: &[&str]) -> ArgMatches {
        SynthCommandDefinition {}
            .command()
            .try_get_matches_from(std::iter::once("synth").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults() {
        let options = synth_options(
            &matches(&["--issued-at", "2025-01-01T00:00:00Z"]),
            &Config::default(),
            &MapEnvironment::default(),
        )
        .unwrap();

        assert_eq!(options.stack_name, "BooksStack");
        assert_eq!(options.props.schema, PathBuf::from("graphql/schema.graphql"));
        assert_eq!(options.props.lambda_asset, PathBuf::from("lambda"));
        assert_eq!(options.props.stack.env, DeployEnvironment::default());
        assert!(options.props.xray_enabled);
    }

    #[test]
    fn arguments_override_config_and_environment() {
        let config = Config {
            stack: StackConfig {
                name: "FromConfig".to_string(),
                description: Some("Books".to_string()),
                account: None,
                region: Some("eu-west-1".to_string()),
            },
            books: BooksConfig {
                xray_enabled: Some(false),
                ..BooksConfig::default()
            },
            ..Config::default()
        };
        let env = MapEnvironment::from([
            (CDK_DEFAULT_ACCOUNT, "123456789012"),
            (CDK_DEFAULT_REGION, "us-east-1"),
        ]);

        let options = synth_options(
            &matches(&["FromArgs", "--schema", "api.graphql"]),
            &config,
            &env,
        )
        .unwrap();

        assert_eq!(options.stack_name, "FromArgs");
        assert_eq!(options.props.schema, PathBuf::from("api.graphql"));
        assert_eq!(
            options.props.stack.env,
            DeployEnvironment {
                account: Some("123456789012".to_string()),
                region: Some("eu-west-1".to_string()),
            }
        );
        assert_eq!(options.props.stack.description, Some("Books".to_string()));
        assert!(!options.props.xray_enabled);

        let options = synth_options(&matches(&["--region", "ap-south-1"]), &config, &env).unwrap();
        assert_eq!(options.props.stack.env.region, Some("ap-south-1".to_string()));
    }

    #[test]
    fn xray_from_environment() {
        let env = MapEnvironment::from([(XRAY_ENABLED, "off")]);
        let options = synth_options(&matches(&[]), &Config::default(), &env).unwrap();
        assert!(!options.props.xray_enabled);

        let env = MapEnvironment::from([(XRAY_ENABLED, "sometimes")]);
        assert!(synth_options(&matches(&[]), &Config::default(), &env).is_err());
    }

    #[test]
    fn xray_from_config_wins_over_environment() {
        let config = Config {
            books: BooksConfig {
                xray_enabled: Some(false),
                ..BooksConfig::default()
            },
            ..Config::default()
        };
        let env = MapEnvironment::from([(XRAY_ENABLED, "true")]);

        let options = synth_options(&matches(&[]), &config, &env).unwrap();
        assert!(!options.props.xray_enabled);

        let env = MapEnvironment::from([(XRAY_ENABLED, "sometimes")]);
        assert!(synth_options(&matches(&[]), &config, &env).is_ok());
    }
}
