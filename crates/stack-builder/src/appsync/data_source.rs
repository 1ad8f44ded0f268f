// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::LazyLock;

use regex::Regex;
use stack_model::{
    intrinsic::Expr,
    resources::appsync::{DataSourceProperties, DataSourceType, DynamoDbConfig, LambdaConfig},
    template::Resource,
};

use crate::{
    dynamodb::Table,
    error::BuildError,
    iam::{APPSYNC_SERVICE, Grantable, Role},
    lambda::Function,
    stack::Stack,
};

use super::{
    api::GraphqlApi,
    resolver::{BaseResolverProps, Resolver},
};

static DATA_SOURCE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[_A-Za-z][_0-9A-Za-z]*$").unwrap());

/// A data source of a GraphQL API, with the service role AppSync assumes to reach it.
#[derive(Debug, Clone)]
pub struct DataSource {
    api: GraphqlApi,
    logical_id: String,
    name: String,
    service_role: Role,
}

enum Backend<'a> {
    DynamoDb(&'a Table),
    Lambda(&'a Function),
}

impl DataSource {
    pub(crate) fn dynamodb(
        stack: &mut Stack,
        api: &GraphqlApi,
        id: &str,
        table: &Table,
    ) -> Result<Self, BuildError> {
        let data_source = Self::new(stack, api, id, Backend::DynamoDb(table))?;
        table.grant_read_write_data(stack, &data_source)?;
        Ok(data_source)
    }

    pub(crate) fn lambda(
        stack: &mut Stack,
        api: &GraphqlApi,
        id: &str,
        function: &Function,
    ) -> Result<Self, BuildError> {
        let data_source = Self::new(stack, api, id, Backend::Lambda(function))?;
        function.grant_invoke(stack, &data_source)?;
        Ok(data_source)
    }

    fn new(
        stack: &mut Stack,
        api: &GraphqlApi,
        id: &str,
        backend: Backend<'_>,
    ) -> Result<Self, BuildError> {
        // The construct id doubles as the data source name
        if !DATA_SOURCE_NAME.is_match(id) {
            return Err(BuildError::InvalidName {
                kind: "data source name",
                value: id.to_string(),
                reason: "must start with a letter or underscore and contain only letters, digits and underscores".to_string(),
            });
        }

        let path = api.path().child(id)?;
        stack.register_construct(&path)?;

        let service_role = Role::new(stack, path.child("ServiceRole")?, APPSYNC_SERVICE, vec![])?;

        let (kind, dynamodb_config, lambda_config) = match backend {
            Backend::DynamoDb(table) => (
                DataSourceType::AmazonDynamodb,
                Some(DynamoDbConfig {
                    table_name: table.table_name(),
                    aws_region: stack.region(),
                }),
                None,
            ),
            Backend::Lambda(function) => (
                DataSourceType::AwsLambda,
                None,
                Some(LambdaConfig {
                    lambda_function_arn: function.function_arn(),
                }),
            ),
        };

        let logical_id = stack.add_resource(
            &path.resource(),
            Resource::new(&DataSourceProperties {
                api_id: api.api_id(),
                name: id.to_string(),
                kind,
                dynamodb_config,
                lambda_config,
                service_role_arn: Some(service_role.arn()),
            })?,
        )?;

        Ok(Self {
            api: api.clone(),
            logical_id,
            name: id.to_string(),
            service_role,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The data source name as resolvers must refer to it (so that they depend on it).
    pub fn name_expr(&self) -> Expr {
        Expr::get_att(&self.logical_id, "Name")
    }

    pub fn service_role(&self) -> &Role {
        &self.service_role
    }

    pub fn create_resolver(
        &self,
        stack: &mut Stack,
        id: &str,
        props: BaseResolverProps,
    ) -> Result<Resolver, BuildError> {
        self.api.create_resolver(stack, id, self, props)
    }
}

impl Grantable for DataSource {
    fn grant_principal(&self) -> &Role {
        &self.service_role
    }

    fn grant_dependent(&self) -> Option<&str> {
        Some(&self.logical_id)
    }
}
