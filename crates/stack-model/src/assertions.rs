// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Partial matching of synthesized templates, for tests.

use serde_json::Value;

use crate::template::{Resource, Template};

/// Does `actual` contain everything in `pattern`?
///
/// Objects match when every key of the pattern is present and matches; extra keys in
/// `actual` are ignored. Arrays must have the same length and match element-wise.
/// Everything else is compared for equality.
pub fn object_like(actual: &Value, pattern: &Value) -> bool {
    match (actual, pattern) {
        (Value::Object(actual), Value::Object(pattern)) => pattern.iter().all(|(key, pattern)| {
            actual
                .get(key)
                .is_some_and(|actual| object_like(actual, pattern))
        }),
        (Value::Array(actual), Value::Array(pattern)) => {
            actual.len() == pattern.len()
                && actual
                    .iter()
                    .zip(pattern)
                    .all(|(actual, pattern)| object_like(actual, pattern))
        }
        _ => actual == pattern,
    }
}

impl Template {
    /// Resources of `resource_type` whose properties are [`object_like`] `properties`.
    ///
    /// The found resources borrow from the template only, so they outlive the pattern.
    pub fn find_resources<'a, 'p>(
        &'a self,
        resource_type: &'a str,
        properties: &'p Value,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + use<'a, 'p> {
        self.resources_of_type(resource_type)
            .filter(move |(_, resource)| object_like(&resource.properties, properties))
    }

    pub fn has_resource_properties(&self, resource_type: &str, properties: &Value) -> bool {
        self.find_resources(resource_type, properties).next().is_some()
    }

    pub fn resource_count_is(&self, resource_type: &str, count: usize) -> bool {
        self.resources_of_type(resource_type).count() == count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_partial_match() {
        let actual = json!({
            "Name": "books",
            "DynamoDBConfig": { "TableName": { "Ref": "BooksTable" }, "AwsRegion": "us-east-1" },
            "Tags": ["a", "b"]
        });

        assert!(object_like(&actual, &json!({ "Name": "books" })));
        assert!(object_like(
            &actual,
            &json!({ "DynamoDBConfig": { "TableName": { "Ref": "BooksTable" } } })
        ));
        assert!(!object_like(&actual, &json!({ "Tags": ["a"] })));
        assert!(!object_like(&actual, &json!({ "Name": "authors" })));
        assert!(!object_like(&actual, &json!({ "Missing": null })));
    }

    fn resource(resource_type: &str, properties: Value) -> Resource {
        Resource {
            resource_type: resource_type.to_string(),
            properties,
            depends_on: vec![],
            update_replace_policy: None,
            deletion_policy: None,
            metadata: Default::default(),
        }
    }

    fn first_match<'a>(template: &'a Template, name: &str) -> Option<&'a Value> {
        let pattern = json!({ "Name": name });
        let (_, found) = template
            .find_resources("AWS::AppSync::DataSource", &pattern)
            .next()?;
        Some(&found.properties)
    }

    #[test]
    fn found_resources_outlive_the_pattern() {
        let mut template = Template::default();
        template.resources.insert(
            "Books".to_string(),
            resource("AWS::AppSync::DataSource", json!({ "Name": "books", "Type": "AMAZON_DYNAMODB" })),
        );
        template.resources.insert(
            "Lambda".to_string(),
            resource("AWS::AppSync::DataSource", json!({ "Name": "lambda", "Type": "AWS_LAMBDA" })),
        );
        template.resources.insert(
            "Table".to_string(),
            resource("AWS::DynamoDB::Table", json!({ "Name": "books" })),
        );

        assert_eq!(
            first_match(&template, "lambda").and_then(|properties| properties.get("Type")),
            Some(&json!("AWS_LAMBDA"))
        );
        assert_eq!(first_match(&template, "authors"), None);
        assert!(template.has_resource_properties("AWS::DynamoDB::Table", &json!({ "Name": "books" })));
        assert!(template.resource_count_is("AWS::AppSync::DataSource", 2));
    }
}
