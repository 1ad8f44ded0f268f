// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde_json::Value;
use stack_model::{
    error::ModelSerializationError,
    intrinsic::Expr,
    resources::iam::{PolicyDocument, PolicyProperties, PolicyStatement, RoleProperties},
    template::Resource,
};

use crate::{construct::ConstructPath, error::BuildError, stack::Stack};

pub const APPSYNC_SERVICE: &str = "appsync.amazonaws.com";
pub const LAMBDA_SERVICE: &str = "lambda.amazonaws.com";

const DEFAULT_POLICY_ID: &str = "DefaultPolicy";

/// A role assumable by one service. Statements granted to it are collected in a single
/// inline policy (`<role path>/DefaultPolicy`), created on the first grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    path: ConstructPath,
    logical_id: String,
}

impl Role {
    pub(crate) fn new(
        stack: &mut Stack,
        path: ConstructPath,
        assumed_by: &str,
        managed_policy_arns: Vec<Expr>,
    ) -> Result<Self, BuildError> {
        stack.register_construct(&path)?;

        let logical_id = stack.add_resource(
            &path.resource(),
            Resource::new(&RoleProperties {
                assume_role_policy_document: PolicyDocument::new(vec![
                    PolicyStatement::assume_role(assumed_by),
                ]),
                managed_policy_arns,
            })?,
        )?;

        Ok(Self { path, logical_id })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn arn(&self) -> Expr {
        Expr::get_att(&self.logical_id, "Arn")
    }

    /// Adds `statement` to the role's default policy and returns the policy's logical id.
    pub(crate) fn add_to_policy(
        &self,
        stack: &mut Stack,
        statement: PolicyStatement,
    ) -> Result<String, BuildError> {
        let policy_path = self.path.child(DEFAULT_POLICY_ID)?;
        let policy_id = policy_path.resource().logical_id();

        match stack.resource_mut(&policy_id) {
            Some(policy) => {
                let statement =
                    serde_json::to_value(&statement).map_err(ModelSerializationError::Manifest)?;
                policy
                    .properties
                    .pointer_mut("/PolicyDocument/Statement")
                    .and_then(Value::as_array_mut)
                    .ok_or_else(|| {
                        BuildError::Generic(format!("Policy '{policy_id}' has no statements"))
                    })?
                    .push(statement);
                Ok(policy_id)
            }
            None => {
                stack.register_construct(&policy_path)?;
                stack.add_resource(
                    &policy_path.resource(),
                    Resource::new(&PolicyProperties {
                        policy_document: PolicyDocument::new(vec![statement]),
                        policy_name: policy_id,
                        roles: vec![Expr::reference(&self.logical_id)],
                    })?,
                )
            }
        }
    }
}

/// Something that can be granted permissions through its role.
pub trait Grantable {
    fn grant_principal(&self) -> &Role;

    /// Logical id of the resource that must wait for granted permissions to exist.
    fn grant_dependent(&self) -> Option<&str> {
        None
    }
}

pub(crate) fn grant(
    stack: &mut Stack,
    grantee: &impl Grantable,
    actions: &[&str],
    resources: Vec<Expr>,
) -> Result<(), BuildError> {
    let policy_id = grantee
        .grant_principal()
        .add_to_policy(stack, PolicyStatement::allow(actions, resources))?;

    if let Some(dependent) = grantee.grant_dependent() {
        stack.add_dependency(dependent, &policy_id)?;
    }
    Ok(())
}
