// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! VTL request/response mapping templates.
//!
//! A request template turns the GraphQL arguments (`$ctx.args`) into the data source's
//! native request; a response template turns the native result (`$ctx.result`) back
//! into the field's type. The generators below produce the templates for the common
//! DynamoDB and Lambda operations.

const DYNAMODB_VERSION: &str = "2017-02-28";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTemplate {
    template: String,
    /// GraphQL arguments the template reads by name
    arguments: Vec<String>,
}

impl MappingTemplate {
    /// A hand-written template. Arguments it reads are not tracked.
    pub fn from_string(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            arguments: vec![],
        }
    }

    /// Declare the GraphQL arguments a hand-written template reads, so that they are
    /// checked against the schema like those of generated templates.
    pub fn with_arguments(mut self, arguments: &[&str]) -> Self {
        self.arguments
            .extend(arguments.iter().map(|argument| argument.to_string()));
        self
    }

    fn reading(template: String, arguments: Vec<String>) -> Self {
        Self {
            template,
            arguments,
        }
    }

    pub fn render_template(&self) -> &str {
        &self.template
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Scan the whole table.
    pub fn dynamodb_scan_table(consistent_read: bool) -> Self {
        Self::from_string(format!(
            r#"{{"version" : "{DYNAMODB_VERSION}", "operation" : "Scan", "consistentRead": {consistent_read}}}"#
        ))
    }

    /// Get the item whose `key_name` equals the argument `id_arg`.
    pub fn dynamodb_get_item(key_name: &str, id_arg: &str, consistent_read: bool) -> Self {
        Self::reading(
            format!(
                r#"{{"version": "{DYNAMODB_VERSION}", "operation": "GetItem", "consistentRead": {consistent_read}, "key": {{"{key_name}": $util.dynamodb.toDynamoDBJson($ctx.args.{id_arg})}}}}"#
            ),
            vec![id_arg.to_string()],
        )
    }

    /// Delete the item whose `key_name` equals the argument `id_arg`.
    pub fn dynamodb_delete_item(key_name: &str, id_arg: &str) -> Self {
        Self::reading(
            format!(
                r#"{{"version": "{DYNAMODB_VERSION}", "operation": "DeleteItem", "key": {{"{key_name}": $util.dynamodb.toDynamoDBJson($ctx.args.{id_arg})}}}}"#
            ),
            vec![id_arg.to_string()],
        )
    }

    /// Put an item with the given key and attribute values.
    pub fn dynamodb_put_item(key: PrimaryKey, values: AttributeValues) -> Self {
        let template = format!(
            r#"
      {}
      {{
        "version": "{DYNAMODB_VERSION}",
        "operation": "PutItem",
        {},
        {}
      }}"#,
            values.render_variables(),
            key.render_template(),
            values.render_template()
        );

        let mut arguments = key.arguments();
        arguments.extend(values.arguments());
        Self::reading(template, arguments)
    }

    /// The single item of a get/put/update/delete result.
    pub fn dynamodb_result_item() -> Self {
        Self::from_string("$util.toJson($ctx.result)")
    }

    /// The items of a scan or query result.
    pub fn dynamodb_result_list() -> Self {
        Self::from_string("$util.toJson($ctx.result.items)")
    }

    /// Invoke the function with the whole resolver context as payload.
    pub fn lambda_request() -> Self {
        Self::from_string(format!(
            r#"{{"version": "{DYNAMODB_VERSION}", "operation": "Invoke", "payload": $util.toJson($ctx)}}"#
        ))
    }

    /// The function's result, unchanged.
    pub fn lambda_result() -> Self {
        Self::from_string("$util.toJson($ctx.result)")
    }
}

/// Assignment of a VTL expression to an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    attr: String,
    arg: String,
    argument: Option<String>,
}

impl Assign {
    fn render_as_assignment(&self) -> String {
        format!(
            r#""{}" : $util.dynamodb.toDynamoDBJson({})"#,
            self.attr, self.arg
        )
    }

    fn put_in_map(&self, map: &str) -> String {
        format!(r#"$util.qr(${map}.put("{}", {}))"#, self.attr, self.arg)
    }
}

/// Builder step naming a key attribute, completed by choosing where its value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStep {
    key: String,
    partition: Option<Assign>,
}

impl KeyStep {
    /// The key is taken from the GraphQL argument `arg`.
    pub fn is(self, arg: &str) -> PrimaryKey {
        let attr = self.key.clone();
        self.assign(Assign {
            attr,
            arg: format!("$ctx.args.{arg}"),
            argument: Some(arg.to_string()),
        })
    }

    /// The key is a generated unique id.
    pub fn auto(self) -> PrimaryKey {
        let attr = self.key.clone();
        self.assign(Assign {
            attr,
            arg: "$util.autoId()".to_string(),
            argument: None,
        })
    }

    fn assign(self, assign: Assign) -> PrimaryKey {
        match self.partition {
            None => PrimaryKey {
                partition: assign,
                sort: None,
            },
            Some(partition) => PrimaryKey {
                partition,
                sort: Some(assign),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    partition: Assign,
    sort: Option<Assign>,
}

impl PrimaryKey {
    pub fn partition(key: &str) -> KeyStep {
        KeyStep {
            key: key.to_string(),
            partition: None,
        }
    }

    pub fn sort(self, key: &str) -> KeyStep {
        KeyStep {
            key: key.to_string(),
            partition: Some(self.partition),
        }
    }

    fn render_template(&self) -> String {
        let assignments = std::iter::once(&self.partition)
            .chain(&self.sort)
            .map(Assign::render_as_assignment)
            .collect::<Vec<_>>()
            .join(",");

        format!("\"key\" : {{\n      {assignments}\n    }}")
    }

    fn arguments(&self) -> Vec<String> {
        std::iter::once(&self.partition)
            .chain(&self.sort)
            .filter_map(|assign| assign.argument.clone())
            .collect()
    }
}

/// Attribute values of a put, built from a container (usually the arguments) plus
/// optional extra assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValues {
    container: String,
    container_argument: Option<String>,
    assignments: Vec<Assign>,
}

impl AttributeValues {
    /// Additionally set `attr` from the GraphQL argument `arg`.
    pub fn attribute(mut self, attr: &str, arg: &str) -> Self {
        self.assignments.push(Assign {
            attr: attr.to_string(),
            arg: format!("$ctx.args.{arg}"),
            argument: Some(arg.to_string()),
        });
        self
    }

    fn render_variables(&self) -> String {
        let assignments = self
            .assignments
            .iter()
            .map(|assign| assign.put_in_map("input"))
            .collect::<Vec<_>>()
            .join("\n");

        format!("#set($input = {})\n      {assignments}", self.container)
    }

    fn render_template(&self) -> &'static str {
        r#""attributeValues": $util.dynamodb.toMapValuesJson($input)"#
    }

    fn arguments(&self) -> Vec<String> {
        self.container_argument
            .iter()
            .cloned()
            .chain(
                self.assignments
                    .iter()
                    .filter_map(|assign| assign.argument.clone()),
            )
            .collect()
    }
}

pub struct Values;

impl Values {
    /// Use the argument `arg` (an input object) as the attribute values, or all
    /// arguments when `arg` is `None`.
    pub fn projecting(arg: Option<&str>) -> AttributeValues {
        AttributeValues {
            container: match arg {
                Some(arg) => format!("$ctx.args.{arg}"),
                None => "$ctx.args".to_string(),
            },
            container_argument: arg.map(str::to_string),
            assignments: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_and_result_list() {
        assert_eq!(
            MappingTemplate::dynamodb_scan_table(false).render_template(),
            r#"{"version" : "2017-02-28", "operation" : "Scan", "consistentRead": false}"#
        );
        assert_eq!(
            MappingTemplate::dynamodb_result_list().render_template(),
            "$util.toJson($ctx.result.items)"
        );
    }

    #[test]
    fn keyed_operations_record_their_argument() {
        let get = MappingTemplate::dynamodb_get_item("id", "id", false);
        assert_eq!(
            get.render_template(),
            r#"{"version": "2017-02-28", "operation": "GetItem", "consistentRead": false, "key": {"id": $util.dynamodb.toDynamoDBJson($ctx.args.id)}}"#
        );
        assert_eq!(get.arguments(), ["id".to_string()]);

        let delete = MappingTemplate::dynamodb_delete_item("id", "bookId");
        assert_eq!(
            delete.render_template(),
            r#"{"version": "2017-02-28", "operation": "DeleteItem", "key": {"id": $util.dynamodb.toDynamoDBJson($ctx.args.bookId)}}"#
        );
        assert_eq!(delete.arguments(), ["bookId".to_string()]);
    }

    #[test]
    fn put_with_generated_key() {
        let put = MappingTemplate::dynamodb_put_item(
            PrimaryKey::partition("id").auto(),
            Values::projecting(None),
        );
        let template = put.render_template();

        assert!(template.contains("#set($input = $ctx.args)"));
        assert!(template.contains(r#""operation": "PutItem""#));
        assert!(template.contains(r#""id" : $util.dynamodb.toDynamoDBJson($util.autoId())"#));
        assert!(
            template.contains(r#""attributeValues": $util.dynamodb.toMapValuesJson($input)"#)
        );
        assert!(put.arguments().is_empty());
    }

    #[test]
    fn put_with_composite_key_and_projection() {
        let put = MappingTemplate::dynamodb_put_item(
            PrimaryKey::partition("author").is("author").sort("id").auto(),
            Values::projecting(Some("input")).attribute("updatedBy", "user"),
        );
        let template = put.render_template();

        assert!(template.contains(
            r#""author" : $util.dynamodb.toDynamoDBJson($ctx.args.author),"id" : $util.dynamodb.toDynamoDBJson($util.autoId())"#
        ));
        assert!(template.contains("#set($input = $ctx.args.input)"));
        assert!(template.contains(r#"$util.qr($input.put("updatedBy", $ctx.args.user))"#));
        assert_eq!(
            put.arguments(),
            ["author".to_string(), "input".to_string(), "user".to_string()]
        );
    }

    #[test]
    fn rendered_put_templates() {
        let generated_key = MappingTemplate::dynamodb_put_item(
            PrimaryKey::partition("id").auto(),
            Values::projecting(None),
        );
        let composite_key = MappingTemplate::dynamodb_put_item(
            PrimaryKey::partition("author").is("author").sort("id").auto(),
            Values::projecting(Some("input")).attribute("updatedBy", "user"),
        );

        insta::assert_json_snapshot!(
            serde_json::json!({
                "generated_key": generated_key.render_template(),
                "composite_key": composite_key.render_template(),
            }),
            @r#"
        {
          "generated_key": "\n      #set($input = $ctx.args)\n      \n      {\n        \"version\": \"2017-02-28\",\n        \"operation\": \"PutItem\",\n        \"key\" : {\n      \"id\" : $util.dynamodb.toDynamoDBJson($util.autoId())\n    },\n        \"attributeValues\": $util.dynamodb.toMapValuesJson($input)\n      }",
          "composite_key": "\n      #set($input = $ctx.args.input)\n      $util.qr($input.put(\"updatedBy\", $ctx.args.user))\n      {\n        \"version\": \"2017-02-28\",\n        \"operation\": \"PutItem\",\n        \"key\" : {\n      \"author\" : $util.dynamodb.toDynamoDBJson($ctx.args.author),\"id\" : $util.dynamodb.toDynamoDBJson($util.autoId())\n    },\n        \"attributeValues\": $util.dynamodb.toMapValuesJson($input)\n      }"
        }
        "#
        );
    }

    #[test]
    fn lambda_templates() {
        assert_eq!(
            MappingTemplate::lambda_request().render_template(),
            r#"{"version": "2017-02-28", "operation": "Invoke", "payload": $util.toJson($ctx)}"#
        );
        assert_eq!(
            MappingTemplate::lambda_result().render_template(),
            "$util.toJson($ctx.result)"
        );
    }
}
