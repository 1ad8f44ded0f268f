// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{collections::HashSet, sync::LazyLock};

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use stack_model::{
    asset::{AssetDestination, AssetManifest, AssetSource, DEFAULT_ASSET_BUCKET, FileAsset},
    intrinsic::Expr,
    template::{Output, Resource, Template},
};
use tracing::{debug, instrument};

use crate::{asset::Asset, construct::ConstructPath, error::BuildError};

static STACK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z][A-Za-z0-9-]{0,127}$").unwrap());

const CDK_PATH_METADATA: &str = "aws:cdk:path";

/// Account and region a stack targets. Unset values are left for the provider to
/// resolve at deployment time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeployEnvironment {
    pub account: Option<String>,
    pub region: Option<String>,
}

impl DeployEnvironment {
    /// The `aws://account/region` form used in the cloud assembly manifest.
    pub fn uri(&self) -> String {
        format!(
            "aws://{}/{}",
            self.account.as_deref().unwrap_or("unknown-account"),
            self.region.as_deref().unwrap_or("unknown-region")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackProps {
    pub description: Option<String>,
    pub env: DeployEnvironment,
}

/// A unit of deployment: the constructs registered against it and the template they
/// synthesize to.
pub struct Stack {
    name: String,
    env: DeployEnvironment,
    construct_paths: HashSet<ConstructPath>,
    resolver_fields: HashSet<(String, String, String)>,
    template: Template,
    assets: AssetManifest,
}

/// The synthesized form of a stack.
#[derive(Debug, Clone, PartialEq)]
pub struct StackArtifact {
    pub stack_name: String,
    pub environment: DeployEnvironment,
    pub template: Template,
    pub assets: AssetManifest,
}

impl Stack {
    pub(crate) fn new(name: &str, props: StackProps) -> Result<Self, BuildError> {
        if !STACK_NAME.is_match(name) {
            return Err(BuildError::InvalidName {
                kind: "stack name",
                value: name.to_string(),
                reason: "must start with a letter and contain only alphanumeric characters and hyphens (at most 128)".to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            env: props.env,
            construct_paths: HashSet::new(),
            resolver_fields: HashSet::new(),
            template: Template {
                description: props.description,
                ..Template::default()
            },
            assets: AssetManifest::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn env(&self) -> &DeployEnvironment {
        &self.env
    }

    pub fn region(&self) -> Expr {
        match &self.env.region {
            Some(region) => Expr::literal(region),
            None => Expr::region(),
        }
    }

    pub fn account(&self) -> Expr {
        match &self.env.account {
            Some(account) => Expr::literal(account),
            None => Expr::account_id(),
        }
    }

    pub(crate) fn register_construct(&mut self, path: &ConstructPath) -> Result<(), BuildError> {
        if self.construct_paths.insert(path.clone()) {
            Ok(())
        } else {
            Err(BuildError::DuplicateConstruct {
                scope: path
                    .parent()
                    .map(|parent| format!("{}/{}", self.name, parent))
                    .unwrap_or_else(|| self.name.clone()),
                id: path.id().to_string(),
            })
        }
    }

    /// Registers the provider resource at `path` and returns its logical id.
    pub(crate) fn add_resource(
        &mut self,
        path: &ConstructPath,
        mut resource: Resource,
    ) -> Result<String, BuildError> {
        self.register_construct(path)?;

        let logical_id = self.claim_logical_id(path)?;
        resource.metadata.insert(
            CDK_PATH_METADATA.to_string(),
            Value::String(format!("{}/{}", self.name, path)),
        );

        debug!(
            %logical_id,
            resource_type = %resource.resource_type,
            "Registered resource"
        );
        self.template.resources.insert(logical_id.clone(), resource);

        Ok(logical_id)
    }

    pub(crate) fn add_output(&mut self, id: &str, value: Expr) -> Result<String, BuildError> {
        let path = ConstructPath::root(id)?;
        self.register_construct(&path)?;

        let logical_id = self.claim_logical_id(&path)?;
        self.template.outputs.insert(
            logical_id.clone(),
            Output {
                description: None,
                value,
            },
        );

        Ok(logical_id)
    }

    pub(crate) fn resource_mut(&mut self, logical_id: &str) -> Option<&mut Resource> {
        self.template.resources.get_mut(logical_id)
    }

    pub(crate) fn add_dependency(&mut self, dependent: &str, target: &str) -> Result<(), BuildError> {
        if !self.template.resources.contains_key(target) {
            return Err(self.dangling(dependent, target));
        }
        match self.template.resources.get_mut(dependent) {
            Some(resource) => {
                resource.add_dependency(target);
                Ok(())
            }
            None => Err(self.dangling(target, dependent)),
        }
    }

    /// Records that `type_name.field_name` of the API `api` has a resolver.
    pub(crate) fn claim_resolver_field(
        &mut self,
        api: &str,
        type_name: &str,
        field_name: &str,
    ) -> Result<(), BuildError> {
        let claimed = self.resolver_fields.insert((
            api.to_string(),
            type_name.to_string(),
            field_name.to_string(),
        ));

        if claimed {
            Ok(())
        } else {
            Err(BuildError::DuplicateResolver {
                type_name: type_name.to_string(),
                field_name: field_name.to_string(),
            })
        }
    }

    /// Adds a file asset to the stack's asset manifest. Identical content is recorded once.
    pub(crate) fn add_file_asset(&mut self, asset: &Asset) {
        self.assets
            .files
            .entry(asset.fingerprint.clone())
            .or_insert_with(|| FileAsset {
                source: AssetSource {
                    path: asset.path.display().to_string(),
                    packaging: asset.packaging,
                },
                destinations: IndexMap::from([(
                    "current_account-current_region".to_string(),
                    AssetDestination {
                        bucket_name: DEFAULT_ASSET_BUCKET.to_string(),
                        object_key: asset.object_key(),
                    },
                )]),
            });
    }

    /// Produce the template and asset manifest of this stack.
    ///
    /// Fails if any resource or output refers to a logical id that is not declared.
    #[instrument(skip_all, fields(stack = %self.name))]
    pub fn synth(&self) -> Result<StackArtifact, BuildError> {
        for (logical_id, resource) in &self.template.resources {
            let mut references = vec![];
            collect_references(&resource.properties, &mut references);
            references.extend(resource.depends_on.iter().map(String::as_str));

            if let Some(target) = references
                .into_iter()
                .find(|target| !self.template.resources.contains_key(*target))
            {
                return Err(self.dangling(logical_id, target));
            }
        }

        for (logical_id, output) in &self.template.outputs {
            if let Some(target) = output
                .value
                .references()
                .into_iter()
                .find(|target| !self.template.resources.contains_key(*target))
            {
                return Err(self.dangling(logical_id, target));
            }
        }

        debug!(
            resources = self.template.resources.len(),
            outputs = self.template.outputs.len(),
            "Synthesized stack"
        );

        Ok(StackArtifact {
            stack_name: self.name.clone(),
            environment: self.env.clone(),
            template: self.template.clone(),
            assets: self.assets.clone(),
        })
    }

    fn claim_logical_id(&self, path: &ConstructPath) -> Result<String, BuildError> {
        let logical_id = path.logical_id();

        if logical_id.is_empty() {
            return Err(BuildError::InvalidName {
                kind: "construct path",
                value: path.to_string(),
                reason: "does not produce a logical id".to_string(),
            });
        }

        if self.template.resources.contains_key(&logical_id)
            || self.template.outputs.contains_key(&logical_id)
        {
            return Err(BuildError::DuplicateLogicalId {
                stack: self.name.clone(),
                logical_id,
                path: path.to_string(),
            });
        }

        Ok(logical_id)
    }

    fn dangling(&self, from: &str, target: &str) -> BuildError {
        BuildError::DanglingReference {
            stack: self.name.clone(),
            from: from.to_string(),
            target: target.to_string(),
        }
    }
}

/// Collect the logical ids referenced through `Ref` and `Fn::GetAtt` in a property value.
fn collect_references<'a>(value: &'a Value, references: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(target)) = map.get("Ref") {
                    if !target.starts_with("AWS::") {
                        references.push(target);
                    }
                    return;
                }
                if let Some(Value::Array(args)) = map.get("Fn::GetAtt")
                    && let Some(Value::String(target)) = args.first()
                {
                    references.push(target);
                    return;
                }
            }
            map.values()
                .for_each(|value| collect_references(value, references));
        }
        Value::Array(values) => values
            .iter()
            .for_each(|value| collect_references(value, references)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stack_model::resources::appsync::{ApiKeyProperties, GraphQLApiProperties, AuthenticationType};

    fn api_properties() -> GraphQLApiProperties {
        GraphQLApiProperties {
            name: "api".to_string(),
            authentication_type: AuthenticationType::ApiKey,
            xray_enabled: None,
        }
    }

    #[test]
    fn stack_names() {
        assert!(Stack::new("MyTestStack", StackProps::default()).is_ok());
        assert!(Stack::new("my-stack-2", StackProps::default()).is_ok());
        assert!(matches!(
            Stack::new("2stack", StackProps::default()),
            Err(BuildError::InvalidName { .. })
        ));
        assert!(matches!(
            Stack::new("my_stack", StackProps::default()),
            Err(BuildError::InvalidName { .. })
        ));
    }

    #[test]
    fn duplicate_construct_ids_are_rejected() {
        let mut stack = Stack::new("S", StackProps::default()).unwrap();
        let path = ConstructPath::root("Api").unwrap();

        stack.register_construct(&path).unwrap();
        let err = stack.register_construct(&path).unwrap_err();
        assert!(
            matches!(err, BuildError::DuplicateConstruct { ref scope, ref id } if scope == "S" && id == "Api")
        );
    }

    #[test]
    fn colliding_logical_ids_are_rejected() {
        let mut stack = Stack::new("S", StackProps::default()).unwrap();
        let resource = Resource::new(&api_properties()).unwrap();

        stack
            .add_resource(&ConstructPath::root("Api").unwrap().resource(), resource.clone())
            .unwrap();
        // "A/pi" and "Api/Resource" both map to "Api"
        let colliding = ConstructPath::root("A").unwrap().child("pi").unwrap();
        assert!(matches!(
            stack.add_resource(&colliding, resource),
            Err(BuildError::DuplicateLogicalId { .. })
        ));
    }

    #[test]
    fn resources_carry_their_path() {
        let mut stack = Stack::new("S", StackProps::default()).unwrap();
        let id = stack
            .add_resource(
                &ConstructPath::root("Api").unwrap().resource(),
                Resource::new(&api_properties()).unwrap(),
            )
            .unwrap();

        let artifact = stack.synth().unwrap();
        assert_eq!(id, "Api");
        assert_eq!(
            artifact.template.resource("Api").unwrap().metadata[CDK_PATH_METADATA],
            json!("S/Api/Resource")
        );
    }

    #[test]
    fn dangling_references_fail_synthesis() {
        let mut stack = Stack::new("S", StackProps::default()).unwrap();
        stack
            .add_resource(
                &ConstructPath::root("Key").unwrap().resource(),
                Resource::new(&ApiKeyProperties {
                    api_id: Expr::get_att("Api", "ApiId"),
                    description: None,
                    expires: None,
                })
                .unwrap(),
            )
            .unwrap();

        let err = stack.synth().unwrap_err();
        assert!(
            matches!(err, BuildError::DanglingReference { ref from, ref target, .. } if from == "Key" && target == "Api")
        );
    }

    #[test]
    fn region_defaults_to_pseudo_parameter() {
        let stack = Stack::new("S", StackProps::default()).unwrap();
        assert_eq!(stack.region(), Expr::region());

        let stack = Stack::new(
            "S",
            StackProps {
                description: None,
                env: DeployEnvironment {
                    account: Some("123456789012".to_string()),
                    region: Some("eu-west-1".to_string()),
                },
            },
        )
        .unwrap();
        assert_eq!(stack.region(), Expr::literal("eu-west-1"));
        assert_eq!(stack.env().uri(), "aws://123456789012/eu-west-1");
    }

    #[test]
    fn nested_references_are_found() {
        let value = json!({
            "A": { "Ref": "Table" },
            "B": [{ "Fn::GetAtt": ["Function", "Arn"] }, { "Ref": "AWS::Region" }],
            "C": { "Fn::Join": ["", [{ "Ref": "Role" }]] }
        });
        let mut references = vec![];
        collect_references(&value, &mut references);
        assert_eq!(references, vec!["Table", "Function", "Role"]);
    }
}
