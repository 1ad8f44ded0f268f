// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use stack_model::{
    intrinsic::Expr,
    resources::appsync::{
        ApiKeyProperties, AuthenticationType, GraphQLApiProperties, GraphQLSchemaProperties,
    },
    template::Resource,
};
use tracing::debug;

use crate::{
    construct::ConstructPath, dynamodb::Table, error::BuildError, lambda::Function,
    stack::Stack,
};

use super::{
    data_source::DataSource,
    resolver::{BaseResolverProps, Resolver},
    schema::{GraphqlSchema, SchemaFile},
};

const MIN_KEY_VALIDITY_DAYS: i64 = 1;
const MAX_KEY_VALIDITY_DAYS: i64 = 365;

/// When an API key stops being accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiration {
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Expiration {
    pub fn after(issued_at: DateTime<Utc>, validity: TimeDelta) -> Self {
        Self {
            issued_at,
            expires_at: issued_at + validity,
        }
    }

    pub fn in_days(issued_at: DateTime<Utc>, days: i64) -> Self {
        Self::after(issued_at, TimeDelta::days(days))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Seconds since the epoch, the form the provider expects.
    pub fn to_epoch(&self) -> i64 {
        self.expires_at.timestamp()
    }

    fn validate(&self) -> Result<(), BuildError> {
        let validity = self.expires_at - self.issued_at;

        if validity < TimeDelta::days(MIN_KEY_VALIDITY_DAYS)
            || validity > TimeDelta::days(MAX_KEY_VALIDITY_DAYS)
        {
            Err(BuildError::InvalidExpiration(validity.num_days()))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiKeyConfig {
    /// Construct id of the key, `DefaultApiKey` when not set
    pub name: Option<String>,
    pub description: Option<String>,
    /// The provider's default (seven days from deployment) applies when not set
    pub expires: Option<Expiration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationMode {
    ApiKey(ApiKeyConfig),
    Iam,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationConfig {
    pub default_authorization: AuthorizationMode,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            default_authorization: AuthorizationMode::ApiKey(ApiKeyConfig::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphqlApiProps {
    pub name: String,
    pub schema: SchemaFile,
    pub authorization_config: AuthorizationConfig,
    pub xray_enabled: bool,
}

/// Handle to an AppSync GraphQL API registered in a stack.
#[derive(Debug, Clone)]
pub struct GraphqlApi {
    path: ConstructPath,
    logical_id: String,
    schema_logical_id: String,
    api_key_logical_id: Option<String>,
    schema: Arc<GraphqlSchema>,
}

impl GraphqlApi {
    pub fn new(stack: &mut Stack, id: &str, props: GraphqlApiProps) -> Result<Self, BuildError> {
        let schema = GraphqlSchema::parse(props.schema)?;

        let (authentication_type, api_key) = match props.authorization_config.default_authorization
        {
            AuthorizationMode::ApiKey(config) => {
                if let Some(expires) = &config.expires {
                    expires.validate()?;
                }
                (AuthenticationType::ApiKey, Some(config))
            }
            AuthorizationMode::Iam => (AuthenticationType::AwsIam, None),
        };

        let path = ConstructPath::root(id)?;
        stack.register_construct(&path)?;

        let logical_id = stack.add_resource(
            &path.resource(),
            Resource::new(&GraphQLApiProperties {
                name: props.name,
                authentication_type,
                xray_enabled: Some(props.xray_enabled),
            })?,
        )?;
        let api_id = Expr::get_att(&logical_id, "ApiId");

        let schema_logical_id = stack.add_resource(
            &path.child("Schema")?,
            Resource::new(&GraphQLSchemaProperties {
                api_id: api_id.clone(),
                definition: schema.definition().to_string(),
            })?,
        )?;

        let api_key_logical_id = match api_key {
            Some(config) => {
                let key_id = config.name.as_deref().unwrap_or("DefaultApiKey");
                let key_logical_id = stack.add_resource(
                    &path.child(key_id)?,
                    Resource::new(&ApiKeyProperties {
                        api_id,
                        description: config.description,
                        expires: config.expires.as_ref().map(Expiration::to_epoch),
                    })?,
                )?;
                stack.add_dependency(&key_logical_id, &schema_logical_id)?;
                Some(key_logical_id)
            }
            None => None,
        };

        debug!(api = %logical_id, schema = schema.name(), "Registered GraphQL API");

        Ok(Self {
            path,
            logical_id,
            schema_logical_id,
            api_key_logical_id,
            schema: Arc::new(schema),
        })
    }

    pub(crate) fn path(&self) -> &ConstructPath {
        &self.path
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub(crate) fn schema_logical_id(&self) -> &str {
        &self.schema_logical_id
    }

    pub fn schema(&self) -> &GraphqlSchema {
        &self.schema
    }

    pub fn api_id(&self) -> Expr {
        Expr::get_att(&self.logical_id, "ApiId")
    }

    pub fn graphql_url(&self) -> Expr {
        Expr::get_att(&self.logical_id, "GraphQLUrl")
    }

    /// The key value, if the API authorizes with an API key.
    pub fn api_key(&self) -> Option<Expr> {
        self.api_key_logical_id
            .as_ref()
            .map(|key| Expr::get_att(key, "ApiKey"))
    }

    pub fn add_dynamodb_data_source(
        &self,
        stack: &mut Stack,
        id: &str,
        table: &Table,
    ) -> Result<DataSource, BuildError> {
        DataSource::dynamodb(stack, self, id, table)
    }

    pub fn add_lambda_data_source(
        &self,
        stack: &mut Stack,
        id: &str,
        function: &Function,
    ) -> Result<DataSource, BuildError> {
        DataSource::lambda(stack, self, id, function)
    }

    pub fn create_resolver(
        &self,
        stack: &mut Stack,
        id: &str,
        data_source: &DataSource,
        props: BaseResolverProps,
    ) -> Result<Resolver, BuildError> {
        Resolver::new(stack, self, id, data_source, props)
    }
}
