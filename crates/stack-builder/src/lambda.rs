// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt, path::Path, sync::LazyLock};

use indexmap::IndexMap;
use regex::Regex;
use stack_model::{
    asset::DEFAULT_ASSET_BUCKET,
    intrinsic::Expr,
    resources::lambda::{self, FunctionEnvironment, FunctionProperties},
    template::Resource,
};

use crate::{
    asset::Asset,
    construct::ConstructPath,
    error::BuildError,
    iam::{Grantable, LAMBDA_SERVICE, Role, grant},
    stack::Stack,
};

static FUNCTION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z0-9_-]{1,64}$").unwrap());

const BASIC_EXECUTION_ROLE: &str = ":iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    Nodejs18X,
    Nodejs20X,
    Nodejs22X,
    Python312,
    ProvidedAl2023,
}

impl Runtime {
    pub fn name(&self) -> &'static str {
        match self {
            Runtime::Nodejs18X => "nodejs18.x",
            Runtime::Nodejs20X => "nodejs20.x",
            Runtime::Nodejs22X => "nodejs22.x",
            Runtime::Python312 => "python3.12",
            Runtime::ProvidedAl2023 => "provided.al2023",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Where the function's code comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    /// A local directory (zipped) or archive, uploaded to the asset bucket at deployment.
    Asset(Asset),
}

impl Code {
    pub fn from_asset(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        Ok(Code::Asset(Asset::from_path(path)?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionProps {
    pub runtime: Runtime,
    /// `<file>.<export>` for the Node.js runtimes
    pub handler: String,
    pub code: Code,
    pub function_name: Option<String>,
    pub environment: IndexMap<String, Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    logical_id: String,
    role: Role,
}

impl Function {
    pub fn new(stack: &mut Stack, id: &str, props: FunctionProps) -> Result<Self, BuildError> {
        if let Some(name) = &props.function_name
            && !FUNCTION_NAME.is_match(name)
        {
            return Err(BuildError::InvalidName {
                kind: "function name",
                value: name.clone(),
                reason: "must be 1 to 64 letters, digits, hyphens or underscores".to_string(),
            });
        }
        if props.handler.is_empty() {
            return Err(BuildError::InvalidName {
                kind: "handler",
                value: props.handler,
                reason: "must not be empty".to_string(),
            });
        }

        let path = ConstructPath::root(id)?;
        stack.register_construct(&path)?;

        let role = Role::new(
            stack,
            path.child("ServiceRole")?,
            LAMBDA_SERVICE,
            vec![Expr::join(
                "",
                vec!["arn:".into(), Expr::partition(), BASIC_EXECUTION_ROLE.into()],
            )],
        )?;

        let code = match &props.code {
            Code::Asset(asset) => {
                stack.add_file_asset(asset);
                lambda::Code {
                    s3_bucket: Expr::sub(DEFAULT_ASSET_BUCKET),
                    s3_key: asset.object_key(),
                }
            }
        };

        let logical_id = stack.add_resource(
            &path.resource(),
            Resource::new(&FunctionProperties {
                code,
                role: role.arn(),
                environment: (!props.environment.is_empty()).then(|| FunctionEnvironment {
                    variables: props.environment,
                }),
                function_name: props.function_name,
                handler: props.handler,
                runtime: props.runtime.name().to_string(),
            })?,
        )?;
        stack.add_dependency(&logical_id, role.logical_id())?;

        Ok(Self { logical_id, role })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn function_arn(&self) -> Expr {
        Expr::get_att(&self.logical_id, "Arn")
    }

    /// Permit `grantee` to invoke this function and any of its versions or aliases.
    pub fn grant_invoke(&self, stack: &mut Stack, grantee: &impl Grantable) -> Result<(), BuildError> {
        grant(
            stack,
            grantee,
            &["lambda:InvokeFunction"],
            vec![
                self.function_arn(),
                Expr::join("", vec![self.function_arn(), ":*".into()]),
            ],
        )
    }
}

impl Grantable for Function {
    fn grant_principal(&self) -> &Role {
        &self.role
    }

    fn grant_dependent(&self) -> Option<&str> {
        Some(&self.logical_id)
    }
}
