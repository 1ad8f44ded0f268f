// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fs, path::Path};

use indexmap::IndexMap;
use serde::Serialize;
use stack_model::error::ModelSerializationError;
use tracing::{info, instrument};

use crate::{
    error::BuildError,
    stack::{Stack, StackArtifact, StackProps},
};

const CLOUD_ASSEMBLY_VERSION: &str = "36.0.0";

/// The root of a construct tree: a set of stacks synthesized together.
#[derive(Default)]
pub struct App {
    stacks: IndexMap<String, Stack>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stack(&mut self, id: &str, props: StackProps) -> Result<&mut Stack, BuildError> {
        if self.stacks.contains_key(id) {
            return Err(BuildError::DuplicateConstruct {
                scope: "App".to_string(),
                id: id.to_string(),
            });
        }

        let stack = Stack::new(id, props)?;
        Ok(self.stacks.entry(id.to_string()).or_insert(stack))
    }

    pub fn stack(&self, id: &str) -> Option<&Stack> {
        self.stacks.get(id)
    }

    pub fn stacks(&self) -> impl Iterator<Item = &Stack> {
        self.stacks.values()
    }

    #[instrument(skip_all)]
    pub fn synth(&self) -> Result<CloudAssembly, BuildError> {
        let stacks = self
            .stacks
            .values()
            .map(Stack::synth)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CloudAssembly { stacks })
    }
}

/// Synthesized artifacts of every stack of an app.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudAssembly {
    pub stacks: Vec<StackArtifact>,
}

impl CloudAssembly {
    pub fn stack(&self, name: &str) -> Option<&StackArtifact> {
        self.stacks.iter().find(|stack| stack.stack_name == name)
    }

    /// Write `<stack>.template.json`, `<stack>.assets.json` (if the stack has assets) and
    /// `manifest.json` into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<(), BuildError> {
        fs::create_dir_all(dir)?;

        let mut artifacts = IndexMap::new();

        for stack in &self.stacks {
            let template_file = format!("{}.template.json", stack.stack_name);
            fs::write(dir.join(&template_file), stack.template.to_json_pretty()?)?;

            let assets_file = if stack.assets.is_empty() {
                None
            } else {
                let assets_file = format!("{}.assets.json", stack.stack_name);
                fs::write(dir.join(&assets_file), to_json_pretty(&stack.assets)?)?;
                Some(assets_file)
            };

            info!(stack = %stack.stack_name, "Wrote {}", dir.join(&template_file).display());

            artifacts.insert(
                stack.stack_name.clone(),
                ManifestArtifact {
                    kind: "aws:cloudformation:stack",
                    environment: stack.environment.uri(),
                    properties: ManifestProperties {
                        template_file,
                        assets_file,
                    },
                },
            );
        }

        let manifest = Manifest {
            version: CLOUD_ASSEMBLY_VERSION,
            artifacts,
        };
        fs::write(dir.join("manifest.json"), to_json_pretty(&manifest)?)?;

        Ok(())
    }
}

#[derive(Serialize)]
struct Manifest {
    version: &'static str,
    artifacts: IndexMap<String, ManifestArtifact>,
}

#[derive(Serialize)]
struct ManifestArtifact {
    #[serde(rename = "type")]
    kind: &'static str,
    environment: String,
    properties: ManifestProperties,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestProperties {
    template_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    assets_file: Option<String>,
}

fn to_json_pretty<T: Serialize>(value: &T) -> Result<String, BuildError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BuildError::ModelSerialization(ModelSerializationError::Manifest(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn duplicate_stack_ids() {
        let mut app = App::new();
        app.add_stack("First", StackProps::default()).unwrap();

        assert!(matches!(
            app.add_stack("First", StackProps::default()),
            Err(BuildError::DuplicateConstruct { .. })
        ));
        assert_eq!(app.stacks().count(), 1);
    }

    #[test]
    fn writes_manifest() {
        let mut app = App::new();
        app.add_stack("First", StackProps::default()).unwrap();
        app.add_stack("Second", StackProps::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        app.synth().unwrap().write_to(dir.path()).unwrap();

        let manifest: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("manifest.json")).unwrap())
                .unwrap();
        assert_eq!(
            manifest["artifacts"]["First"],
            json!({
                "type": "aws:cloudformation:stack",
                "environment": "aws://unknown-account/unknown-region",
                "properties": { "templateFile": "First.template.json" }
            })
        );
        assert!(dir.path().join("Second.template.json").exists());
        assert!(!dir.path().join("First.assets.json").exists());
    }
}
