// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use stack_model::{
    intrinsic::Expr,
    resources::dynamodb::{
        self, AttributeDefinition, AttributeType, KeySchemaElement, KeyType,
        ProvisionedThroughput, TableProperties,
    },
    template::{RemovalPolicy, Resource},
};

use crate::{
    construct::ConstructPath,
    error::BuildError,
    iam::{Grantable, grant},
    stack::Stack,
};

pub const READ_DATA_ACTIONS: [&str; 7] = [
    "dynamodb:BatchGetItem",
    "dynamodb:GetRecords",
    "dynamodb:GetShardIterator",
    "dynamodb:Query",
    "dynamodb:GetItem",
    "dynamodb:Scan",
    "dynamodb:ConditionCheckItem",
];

pub const WRITE_DATA_ACTIONS: [&str; 4] = [
    "dynamodb:BatchWriteItem",
    "dynamodb:PutItem",
    "dynamodb:UpdateItem",
    "dynamodb:DeleteItem",
];

pub const DESCRIBE_TABLE_ACTION: &str = "dynamodb:DescribeTable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

impl Attribute {
    pub fn new(name: &str, attribute_type: AttributeType) -> Self {
        Self {
            name: name.to_string(),
            attribute_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    PayPerRequest,
    Provisioned {
        read_capacity: u32,
        write_capacity: u32,
    },
}

impl Default for BillingMode {
    fn default() -> Self {
        BillingMode::Provisioned {
            read_capacity: 5,
            write_capacity: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProps {
    pub partition_key: Attribute,
    pub sort_key: Option<Attribute>,
    pub billing_mode: BillingMode,
    /// Tables hold data, so they are retained unless asked otherwise
    pub removal_policy: RemovalPolicy,
    /// Physical name; generated by the provider when not set
    pub table_name: Option<String>,
}

impl TableProps {
    pub fn new(partition_key: Attribute) -> Self {
        Self {
            partition_key,
            sort_key: None,
            billing_mode: BillingMode::default(),
            removal_policy: RemovalPolicy::Retain,
            table_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    logical_id: String,
}

impl Table {
    pub fn new(stack: &mut Stack, id: &str, props: TableProps) -> Result<Self, BuildError> {
        let path = ConstructPath::root(id)?;

        let mut key_schema = vec![KeySchemaElement {
            attribute_name: props.partition_key.name.clone(),
            key_type: KeyType::Hash,
        }];
        let mut attribute_definitions = vec![AttributeDefinition {
            attribute_name: props.partition_key.name.clone(),
            attribute_type: props.partition_key.attribute_type,
        }];

        if let Some(sort_key) = &props.sort_key {
            if sort_key.name == props.partition_key.name {
                return Err(BuildError::InvalidName {
                    kind: "sort key",
                    value: sort_key.name.clone(),
                    reason: "must differ from the partition key".to_string(),
                });
            }
            key_schema.push(KeySchemaElement {
                attribute_name: sort_key.name.clone(),
                key_type: KeyType::Range,
            });
            attribute_definitions.push(AttributeDefinition {
                attribute_name: sort_key.name.clone(),
                attribute_type: sort_key.attribute_type,
            });
        }

        let (billing_mode, provisioned_throughput) = match props.billing_mode {
            BillingMode::PayPerRequest => (Some(dynamodb::BillingMode::PayPerRequest), None),
            BillingMode::Provisioned {
                read_capacity,
                write_capacity,
            } => (
                None,
                Some(ProvisionedThroughput {
                    read_capacity_units: read_capacity,
                    write_capacity_units: write_capacity,
                }),
            ),
        };

        stack.register_construct(&path)?;
        let logical_id = stack.add_resource(
            &path.resource(),
            Resource::new(&TableProperties {
                key_schema,
                attribute_definitions,
                billing_mode,
                provisioned_throughput,
                table_name: props.table_name,
            })?
            .with_removal_policy(props.removal_policy),
        )?;

        Ok(Self { logical_id })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn table_name(&self) -> Expr {
        Expr::reference(&self.logical_id)
    }

    pub fn table_arn(&self) -> Expr {
        Expr::get_att(&self.logical_id, "Arn")
    }

    /// Permit reading, writing and deleting items (but not managing the table).
    pub fn grant_read_write_data(
        &self,
        stack: &mut Stack,
        grantee: &impl Grantable,
    ) -> Result<(), BuildError> {
        let actions: Vec<&str> = READ_DATA_ACTIONS
            .into_iter()
            .chain(WRITE_DATA_ACTIONS)
            .chain([DESCRIBE_TABLE_ACTION])
            .collect();

        grant(stack, grantee, &actions, vec![self.table_arn()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::StackProps;
    use serde_json::json;

    #[test]
    fn provisioned_by_default_and_retained() {
        let mut stack = Stack::new("S", StackProps::default()).unwrap();
        let table = Table::new(
            &mut stack,
            "BooksTable",
            TableProps::new(Attribute::new("id", AttributeType::String)),
        )
        .unwrap();

        let artifact = stack.synth().unwrap();
        let resource = artifact.template.resource(table.logical_id()).unwrap();
        assert_eq!(
            resource.properties,
            json!({
                "KeySchema": [{ "AttributeName": "id", "KeyType": "HASH" }],
                "AttributeDefinitions": [{ "AttributeName": "id", "AttributeType": "S" }],
                "ProvisionedThroughput": { "ReadCapacityUnits": 5, "WriteCapacityUnits": 5 }
            })
        );
        assert_eq!(resource.deletion_policy, Some(RemovalPolicy::Retain));
        assert_eq!(table.table_name(), Expr::reference("BooksTable"));
    }

    #[test]
    fn composite_key_on_demand() {
        let mut stack = Stack::new("S", StackProps::default()).unwrap();
        let table = Table::new(
            &mut stack,
            "Events",
            TableProps {
                sort_key: Some(Attribute::new("at", AttributeType::Number)),
                billing_mode: BillingMode::PayPerRequest,
                removal_policy: RemovalPolicy::Delete,
                ..TableProps::new(Attribute::new("pk", AttributeType::String))
            },
        )
        .unwrap();

        let artifact = stack.synth().unwrap();
        let resource = artifact.template.resource(table.logical_id()).unwrap();
        assert_eq!(resource.properties["BillingMode"], json!("PAY_PER_REQUEST"));
        assert_eq!(
            resource.properties["KeySchema"],
            json!([
                { "AttributeName": "pk", "KeyType": "HASH" },
                { "AttributeName": "at", "KeyType": "RANGE" }
            ])
        );
        assert!(resource.properties.get("ProvisionedThroughput").is_none());
    }

    #[test]
    fn sort_key_must_differ() {
        let mut stack = Stack::new("S", StackProps::default()).unwrap();
        let result = Table::new(
            &mut stack,
            "T",
            TableProps {
                sort_key: Some(Attribute::new("id", AttributeType::String)),
                ..TableProps::new(Attribute::new("id", AttributeType::String))
            },
        );
        assert!(matches!(result, Err(BuildError::InvalidName { .. })));
    }
}
