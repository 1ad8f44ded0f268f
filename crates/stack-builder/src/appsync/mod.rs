// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! GraphQL APIs served by AppSync: the API itself, its schema, data sources and the
//! resolvers that bind schema fields to data sources.

mod api;
mod data_source;
pub mod mapping_template;
mod resolver;
pub mod schema;

pub use api::{
    ApiKeyConfig, AuthorizationConfig, AuthorizationMode, Expiration, GraphqlApi,
    GraphqlApiProps,
};
pub use data_source::DataSource;
pub use mapping_template::{MappingTemplate, PrimaryKey, Values};
pub use resolver::{BaseResolverProps, Resolver};
pub use schema::{GraphqlSchema, SchemaFile};
