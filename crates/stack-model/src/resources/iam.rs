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
use crate::intrinsic::{Expr, one_or_many};

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Principal {
    pub service: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    #[serde(serialize_with = "one_or_many")]
    pub action: Vec<String>,
    pub effect: Effect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "one_or_many"
    )]
    pub resource: Vec<Expr>,
}

impl PolicyStatement {
    pub fn allow(actions: &[&str], resources: Vec<Expr>) -> Self {
        Self {
            action: actions.iter().map(|a| a.to_string()).collect(),
            effect: Effect::Allow,
            principal: None,
            resource: resources,
        }
    }

    /// Trust statement letting `service` (e.g. `lambda.amazonaws.com`) assume a role.
    pub fn assume_role(service: &str) -> Self {
        Self {
            action: vec!["sts:AssumeRole".to_string()],
            effect: Effect::Allow,
            principal: Some(Principal {
                service: service.to_string(),
            }),
            resource: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub statement: Vec<PolicyStatement>,
    pub version: &'static str,
}

impl PolicyDocument {
    pub fn new(statement: Vec<PolicyStatement>) -> Self {
        Self {
            statement,
            version: POLICY_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleProperties {
    pub assume_role_policy_document: PolicyDocument,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub managed_policy_arns: Vec<Expr>,
}

impl ResourceProperties for RoleProperties {
    const RESOURCE_TYPE: &'static str = "AWS::IAM::Role";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyProperties {
    pub policy_document: PolicyDocument,
    pub policy_name: String,
    pub roles: Vec<Expr>,
}

impl ResourceProperties for PolicyProperties {
    const RESOURCE_TYPE: &'static str = "AWS::IAM::Policy";
}
