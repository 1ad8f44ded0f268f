// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use stack_model::{
    resources::appsync::{ResolverKind, ResolverProperties},
    template::Resource,
};
use tracing::debug;

use crate::{error::BuildError, stack::Stack};

use super::{api::GraphqlApi, data_source::DataSource, mapping_template::MappingTemplate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseResolverProps {
    pub type_name: String,
    pub field_name: String,
    pub request_mapping_template: Option<MappingTemplate>,
    pub response_mapping_template: Option<MappingTemplate>,
}

impl BaseResolverProps {
    pub fn new(
        type_name: &str,
        field_name: &str,
        request: MappingTemplate,
        response: MappingTemplate,
    ) -> Self {
        Self {
            type_name: type_name.to_string(),
            field_name: field_name.to_string(),
            request_mapping_template: Some(request),
            response_mapping_template: Some(response),
        }
    }
}

/// A unit resolver binding one schema field to one data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    logical_id: String,
    type_name: String,
    field_name: String,
}

impl Resolver {
    pub(crate) fn new(
        stack: &mut Stack,
        api: &GraphqlApi,
        id: &str,
        data_source: &DataSource,
        props: BaseResolverProps,
    ) -> Result<Self, BuildError> {
        let BaseResolverProps {
            type_name,
            field_name,
            request_mapping_template,
            response_mapping_template,
        } = props;

        let arguments: Vec<String> = [&request_mapping_template, &response_mapping_template]
            .into_iter()
            .flatten()
            .flat_map(|template| template.arguments().iter().cloned())
            .collect();
        api.schema()
            .check_binding(&type_name, &field_name, &arguments)?;

        let path = api.path().child(id)?;
        stack.register_construct(&path)?;
        stack.claim_resolver_field(api.logical_id(), &type_name, &field_name)?;

        let logical_id = stack.add_resource(
            &path.resource(),
            Resource::new(&ResolverProperties {
                api_id: api.api_id(),
                field_name: field_name.clone(),
                type_name: type_name.clone(),
                data_source_name: data_source.name_expr(),
                kind: ResolverKind::Unit,
                request_mapping_template: request_mapping_template
                    .map(|template| template.render_template().to_string()),
                response_mapping_template: response_mapping_template
                    .map(|template| template.render_template().to_string()),
            })?,
        )?;
        stack.add_dependency(&logical_id, api.schema_logical_id())?;
        stack.add_dependency(&logical_id, data_source.logical_id())?;

        debug!(%logical_id, "{type_name}.{field_name} resolved by {}", data_source.name());

        Ok(Self {
            logical_id,
            type_name,
            field_name,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        appsync::{
            ApiKeyConfig, AuthorizationConfig, AuthorizationMode, GraphqlApiProps, SchemaFile,
        },
        dynamodb::{Attribute, Table, TableProps},
        stack::StackProps,
    };
    use serde_json::json;
    use stack_model::resources::dynamodb::AttributeType;

    const SCHEMA: &str = r#"
type Item { id: ID! }
type Query {
  items: [Item]
  item(id: ID!): Item
}
"#;

    fn setup() -> (Stack, GraphqlApi, DataSource) {
        let mut stack = Stack::new("S", StackProps::default()).unwrap();
        let api = GraphqlApi::new(
            &mut stack,
            "Api",
            GraphqlApiProps {
                name: "api".to_string(),
                schema: SchemaFile::from_string("schema.graphql", SCHEMA),
                authorization_config: AuthorizationConfig {
                    default_authorization: AuthorizationMode::ApiKey(ApiKeyConfig::default()),
                },
                xray_enabled: false,
            },
        )
        .unwrap();
        let table = Table::new(
            &mut stack,
            "Items",
            TableProps::new(Attribute::new("id", AttributeType::String)),
        )
        .unwrap();
        let data_source = api.add_dynamodb_data_source(&mut stack, "items", &table).unwrap();

        (stack, api, data_source)
    }

    #[test]
    fn resolver_depends_on_schema_and_data_source() {
        let (mut stack, _api, data_source) = setup();

        let resolver = data_source
            .create_resolver(
                &mut stack,
                "itemResolver",
                BaseResolverProps::new(
                    "Query",
                    "item",
                    MappingTemplate::dynamodb_get_item("id", "id", false),
                    MappingTemplate::dynamodb_result_item(),
                ),
            )
            .unwrap();

        assert_eq!(resolver.logical_id(), "ApiitemResolver");
        let artifact = stack.synth().unwrap();
        let resource = artifact.template.resource(resolver.logical_id()).unwrap();
        assert_eq!(
            resource.depends_on,
            vec!["ApiSchema".to_string(), "Apiitems".to_string()]
        );
        assert_eq!(
            resource.properties["DataSourceName"],
            json!({ "Fn::GetAtt": ["Apiitems", "Name"] })
        );
        assert_eq!(resource.properties["Kind"], json!("UNIT"));
    }

    #[test]
    fn one_resolver_per_field() {
        let (mut stack, _api, data_source) = setup();
        let props = || {
            BaseResolverProps::new(
                "Query",
                "items",
                MappingTemplate::dynamodb_scan_table(false),
                MappingTemplate::dynamodb_result_list(),
            )
        };

        data_source.create_resolver(&mut stack, "first", props()).unwrap();
        let err = data_source
            .create_resolver(&mut stack, "second", props())
            .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateResolver { .. }));
    }

    #[test]
    fn unknown_field_or_argument() {
        let (mut stack, _api, data_source) = setup();

        let unknown_field = data_source.create_resolver(
            &mut stack,
            "missing",
            BaseResolverProps::new(
                "Query",
                "books",
                MappingTemplate::dynamodb_scan_table(false),
                MappingTemplate::dynamodb_result_list(),
            ),
        );
        assert!(matches!(unknown_field, Err(BuildError::Diagnosis { .. })));

        let unknown_argument = data_source.create_resolver(
            &mut stack,
            "byKey",
            BaseResolverProps::new(
                "Query",
                "item",
                MappingTemplate::dynamodb_get_item("id", "key", false),
                MappingTemplate::dynamodb_result_item(),
            ),
        );
        assert!(matches!(unknown_argument, Err(BuildError::Diagnosis { .. })));

        // Nothing was registered for the rejected resolvers
        let artifact = stack.synth().unwrap();
        assert_eq!(artifact.template.resources_of_type("AWS::AppSync::Resolver").count(), 0);
    }

    #[test]
    fn data_source_names_are_validated() {
        let (mut stack, api, _) = setup();
        let table = Table::new(
            &mut stack,
            "Other",
            TableProps::new(Attribute::new("id", AttributeType::String)),
        )
        .unwrap();

        assert!(matches!(
            api.add_dynamodb_data_source(&mut stack, "my-items", &table),
            Err(BuildError::InvalidName { .. })
        ));
    }
}
