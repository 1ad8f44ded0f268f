// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::ModelSerializationError, intrinsic::Expr, resources::ResourceProperties,
};

/// What the provider does with the physical resource when it is removed from the template
/// (or replaced).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RemovalPolicy {
    Delete,
    Retain,
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<RemovalPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<RemovalPolicy>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, Value>,
}

impl Resource {
    pub fn new<P: ResourceProperties>(properties: &P) -> Result<Self, ModelSerializationError> {
        let properties = serde_json::to_value(properties).map_err(|source| {
            ModelSerializationError::Properties {
                resource_type: P::RESOURCE_TYPE,
                source,
            }
        })?;

        Ok(Self {
            resource_type: P::RESOURCE_TYPE.to_string(),
            properties,
            depends_on: vec![],
            update_replace_policy: None,
            deletion_policy: None,
            metadata: IndexMap::new(),
        })
    }

    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.update_replace_policy = Some(policy);
        self.deletion_policy = Some(policy);
        self
    }

    /// Adds an explicit dependency. Dependencies stay sorted and free of duplicates so
    /// that the order in which constructs are wired does not leak into the output.
    pub fn add_dependency(&mut self, logical_id: impl Into<String>) {
        let logical_id = logical_id.into();
        if let Err(index) = self.depends_on.binary_search(&logical_id) {
            self.depends_on.insert(index, logical_id);
        }
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value: Expr,
}

/// The synthesized manifest of one stack.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub resources: IndexMap<String, Resource>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Output>,
}

impl Template {
    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, resource)| resource.resource_type == resource_type)
    }

    pub fn output(&self, logical_id: &str) -> Option<&Output> {
        self.outputs.get(logical_id)
    }

    pub fn to_json_pretty(&self) -> Result<String, ModelSerializationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::dynamodb::{
        AttributeDefinition, AttributeType, KeySchemaElement, KeyType, TableProperties,
    };
    use serde_json::json;

    fn table() -> Resource {
        Resource::new(&TableProperties {
            key_schema: vec![KeySchemaElement {
                attribute_name: "id".to_string(),
                key_type: KeyType::Hash,
            }],
            attribute_definitions: vec![AttributeDefinition {
                attribute_name: "id".to_string(),
                attribute_type: AttributeType::String,
            }],
            billing_mode: None,
            provisioned_throughput: None,
            table_name: None,
        })
        .unwrap()
    }

    #[test]
    fn resource_layout() {
        let mut resource = table().with_removal_policy(RemovalPolicy::Retain);
        resource.add_dependency("B");
        resource.add_dependency("A");
        resource.add_dependency("B");

        assert_eq!(
            serde_json::to_value(&resource).unwrap(),
            json!({
                "Type": "AWS::DynamoDB::Table",
                "Properties": {
                    "KeySchema": [{ "AttributeName": "id", "KeyType": "HASH" }],
                    "AttributeDefinitions": [{ "AttributeName": "id", "AttributeType": "S" }]
                },
                "DependsOn": ["A", "B"],
                "UpdateReplacePolicy": "Retain",
                "DeletionPolicy": "Retain"
            })
        );
    }

    #[test]
    fn empty_sections_are_omitted() {
        let mut template = Template::default();
        template.resources.insert("BooksTable".to_string(), table());

        let value = serde_json::to_value(&template).unwrap();
        assert!(value.get("Outputs").is_none());
        assert!(value.get("Description").is_none());
        assert_eq!(template.resources_of_type("AWS::DynamoDB::Table").count(), 1);
        assert_eq!(template.resources_of_type("AWS::Lambda::Function").count(), 0);
    }
}
