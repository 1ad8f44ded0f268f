// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The books service: a GraphQL API over a single DynamoDB table, with one query
//! (`getBooksByAuthor`) delegated to a Lambda function.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use stack_model::{intrinsic::Expr, resources::dynamodb::AttributeType};
use tracing::instrument;

use crate::{
    app::App,
    appsync::{
        ApiKeyConfig, AuthorizationConfig, AuthorizationMode, BaseResolverProps, Expiration,
        GraphqlApi, GraphqlApiProps, MappingTemplate, PrimaryKey, Resolver, SchemaFile, Values,
    },
    dynamodb::{Attribute, Table, TableProps},
    error::BuildError,
    lambda::{Code, Function, FunctionProps, Runtime},
    stack::StackProps,
};

pub const API_NAME: &str = "cdk-test-api";
pub const FUNCTION_NAME: &str = "cdk-test-lambda";
pub const FUNCTION_HANDLER: &str = "main.handler";
pub const TABLE_NAME_VARIABLE: &str = "DYNAMODB_TABLE_NAME";
pub const API_KEY_VALIDITY_DAYS: i64 = 365;

pub const DEFAULT_SCHEMA_PATH: &str = "graphql/schema.graphql";
pub const DEFAULT_LAMBDA_ASSET: &str = "lambda";

/// Updates title and author of an existing book. The condition makes the update fail
/// for an unknown `id` instead of creating a new item.
pub const UPDATE_BOOK_TEMPLATE: &str = r##"
{
  "version": "2017-02-28",
  "operation": "UpdateItem",
  "key": {
    "id": { "S": "$ctx.args.id" }
  },
  "update": {
    "expression": "set #title = :title, #author = :author",
    "expressionNames": {
      "#title": "title",
      "#author": "author"
    },
    "expressionValues": {
      ":title": { "S": "$ctx.args.title" },
      ":author": { "S": "$ctx.args.author" }
    }
  },
  "condition": {
    "expression": "attribute_exists(id)"
  }
}
"##;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooksStackProps {
    pub stack: StackProps,
    pub schema: PathBuf,
    /// Directory holding the function's code
    pub lambda_asset: PathBuf,
    /// Base of the API key's expiration
    pub api_key_issued_at: DateTime<Utc>,
    pub xray_enabled: bool,
}

impl BooksStackProps {
    pub fn new(api_key_issued_at: DateTime<Utc>) -> Self {
        Self {
            stack: StackProps::default(),
            schema: PathBuf::from(DEFAULT_SCHEMA_PATH),
            lambda_asset: PathBuf::from(DEFAULT_LAMBDA_ASSET),
            api_key_issued_at,
            xray_enabled: true,
        }
    }
}

/// Handles to what the books stack declares.
#[derive(Debug, Clone)]
pub struct BooksStack {
    pub api: GraphqlApi,
    pub table: Table,
    pub function: Function,
    pub resolvers: Vec<Resolver>,
}

impl BooksStack {
    #[instrument(skip(app, props), fields(schema = %props.schema.display()))]
    pub fn new(app: &mut App, id: &str, props: BooksStackProps) -> Result<Self, BuildError> {
        let stack = app.add_stack(id, props.stack)?;

        let api = GraphqlApi::new(
            stack,
            "Api",
            GraphqlApiProps {
                name: API_NAME.to_string(),
                schema: SchemaFile::from_asset(&props.schema)?,
                authorization_config: AuthorizationConfig {
                    default_authorization: AuthorizationMode::ApiKey(ApiKeyConfig {
                        expires: Some(Expiration::in_days(
                            props.api_key_issued_at,
                            API_KEY_VALIDITY_DAYS,
                        )),
                        ..ApiKeyConfig::default()
                    }),
                },
                xray_enabled: props.xray_enabled,
            },
        )?;

        let table = Table::new(
            stack,
            "BooksTable",
            TableProps::new(Attribute::new("id", AttributeType::String)),
        )?;

        let books = api.add_dynamodb_data_source(stack, "books", &table)?;

        let mut resolvers = vec![
            books.create_resolver(
                stack,
                "getAllBooks",
                BaseResolverProps::new(
                    "Query",
                    "getBooks",
                    MappingTemplate::dynamodb_scan_table(false),
                    MappingTemplate::dynamodb_result_list(),
                ),
            )?,
            books.create_resolver(
                stack,
                "createBook",
                BaseResolverProps::new(
                    "Mutation",
                    "addBook",
                    MappingTemplate::dynamodb_put_item(
                        PrimaryKey::partition("id").auto(),
                        Values::projecting(None),
                    ),
                    MappingTemplate::dynamodb_result_item(),
                ),
            )?,
            books.create_resolver(
                stack,
                "deleteBook",
                BaseResolverProps::new(
                    "Mutation",
                    "deleteBook",
                    MappingTemplate::dynamodb_delete_item("id", "id"),
                    MappingTemplate::dynamodb_result_item(),
                ),
            )?,
            books.create_resolver(
                stack,
                "UpdateBookResolver",
                BaseResolverProps::new(
                    "Mutation",
                    "updateBook",
                    MappingTemplate::from_string(UPDATE_BOOK_TEMPLATE)
                        .with_arguments(&["id", "title", "author"]),
                    MappingTemplate::dynamodb_result_item(),
                ),
            )?,
            books.create_resolver(
                stack,
                "getBookById",
                BaseResolverProps::new(
                    "Query",
                    "getBookById",
                    MappingTemplate::dynamodb_get_item("id", "id", false),
                    MappingTemplate::dynamodb_result_item(),
                ),
            )?,
        ];

        let function = Function::new(
            stack,
            "LambdaFunction",
            FunctionProps {
                runtime: Runtime::Nodejs18X,
                handler: FUNCTION_HANDLER.to_string(),
                code: Code::from_asset(&props.lambda_asset)?,
                function_name: Some(FUNCTION_NAME.to_string()),
                environment: IndexMap::from([(
                    TABLE_NAME_VARIABLE.to_string(),
                    table.table_name(),
                )]),
            },
        )?;
        table.grant_read_write_data(stack, &function)?;

        let lambda_data_source = api.add_lambda_data_source(stack, "lambdaDatasource", &function)?;
        resolvers.push(lambda_data_source.create_resolver(
            stack,
            "getBooksByAuthor",
            BaseResolverProps::new(
                "Query",
                "getBooksByAuthor",
                MappingTemplate::lambda_request(),
                MappingTemplate::lambda_result(),
            ),
        )?);

        stack.add_output("GraphQLAPIURL", api.graphql_url())?;
        stack.add_output(
            "GraphQLAPIKey",
            api.api_key().unwrap_or_else(|| Expr::literal("")),
        )?;
        let region = stack.region();
        stack.add_output("Stack Region", region)?;

        Ok(Self {
            api,
            table,
            function,
            resolvers,
        })
    }
}
