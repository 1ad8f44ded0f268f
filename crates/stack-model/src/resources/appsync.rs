// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::Serialize;

use super::ResourceProperties;
use crate::intrinsic::Expr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticationType {
    ApiKey,
    AwsIam,
    AmazonCognitoUserPools,
    OpenidConnect,
    AwsLambda,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GraphQLApiProperties {
    pub name: String,
    pub authentication_type: AuthenticationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xray_enabled: Option<bool>,
}

impl ResourceProperties for GraphQLApiProperties {
    const RESOURCE_TYPE: &'static str = "AWS::AppSync::GraphQLApi";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GraphQLSchemaProperties {
    pub api_id: Expr,
    pub definition: String,
}

impl ResourceProperties for GraphQLSchemaProperties {
    const RESOURCE_TYPE: &'static str = "AWS::AppSync::GraphQLSchema";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiKeyProperties {
    pub api_id: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Epoch seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
}

impl ResourceProperties for ApiKeyProperties {
    const RESOURCE_TYPE: &'static str = "AWS::AppSync::ApiKey";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSourceType {
    AmazonDynamodb,
    AwsLambda,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DynamoDbConfig {
    pub table_name: Expr,
    pub aws_region: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LambdaConfig {
    pub lambda_function_arn: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSourceProperties {
    pub api_id: Expr,
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: DataSourceType,
    #[serde(rename = "DynamoDBConfig", skip_serializing_if = "Option::is_none")]
    pub dynamodb_config: Option<DynamoDbConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda_config: Option<LambdaConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_role_arn: Option<Expr>,
}

impl ResourceProperties for DataSourceProperties {
    const RESOURCE_TYPE: &'static str = "AWS::AppSync::DataSource";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolverKind {
    Unit,
    Pipeline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResolverProperties {
    pub api_id: Expr,
    pub field_name: String,
    pub type_name: String,
    pub data_source_name: Expr,
    pub kind: ResolverKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_mapping_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mapping_template: Option<String>,
}

impl ResourceProperties for ResolverProperties {
    const RESOURCE_TYPE: &'static str = "AWS::AppSync::Resolver";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_source_property_names() {
        let properties = DataSourceProperties {
            api_id: Expr::get_att("Api", "ApiId"),
            name: "books".to_string(),
            kind: DataSourceType::AmazonDynamodb,
            dynamodb_config: Some(DynamoDbConfig {
                table_name: Expr::reference("BooksTable"),
                aws_region: Expr::region(),
            }),
            lambda_config: None,
            service_role_arn: Some(Expr::get_att("ApibooksServiceRole", "Arn")),
        };

        assert_eq!(
            serde_json::to_value(&properties).unwrap(),
            json!({
                "ApiId": { "Fn::GetAtt": ["Api", "ApiId"] },
                "Name": "books",
                "Type": "AMAZON_DYNAMODB",
                "DynamoDBConfig": {
                    "TableName": { "Ref": "BooksTable" },
                    "AwsRegion": { "Ref": "AWS::Region" }
                },
                "ServiceRoleArn": { "Fn::GetAtt": ["ApibooksServiceRole", "Arn"] }
            })
        );
    }

    #[test]
    fn api_authentication_type() {
        let properties = GraphQLApiProperties {
            name: "cdk-test-api".to_string(),
            authentication_type: AuthenticationType::ApiKey,
            xray_enabled: Some(true),
        };

        assert_eq!(
            serde_json::to_value(&properties).unwrap(),
            json!({
                "Name": "cdk-test-api",
                "AuthenticationType": "API_KEY",
                "XrayEnabled": true
            })
        );
    }
}
