// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt;

use crate::error::BuildError;

/// Id of the child that holds the provider resource of a higher-level construct.
pub const RESOURCE_ID: &str = "Resource";
/// Id of a construct's implicitly created child (e.g. the API key of an API).
pub const DEFAULT_ID: &str = "Default";

/// Location of a construct in its stack: the ids from the stack down to the construct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstructPath(Vec<String>);

impl ConstructPath {
    pub fn root(id: &str) -> Result<Self, BuildError> {
        validate_id(id)?;
        Ok(Self(vec![id.to_string()]))
    }

    pub fn child(&self, id: &str) -> Result<Self, BuildError> {
        validate_id(id)?;
        let mut components = self.0.clone();
        components.push(id.to_string());
        Ok(Self(components))
    }

    /// The path of the provider resource backing this construct.
    pub fn resource(&self) -> Self {
        let mut components = self.0.clone();
        components.push(RESOURCE_ID.to_string());
        Self(components)
    }

    pub fn id(&self) -> &str {
        // A path always has at least one component (see constructors)
        &self.0[self.0.len() - 1]
    }

    pub fn parent(&self) -> Option<Self> {
        (self.0.len() > 1).then(|| Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The template-level name derived from the path.
    ///
    /// Components are concatenated after dropping `Resource` and `Default`, and only
    /// ASCII alphanumeric characters are kept (`Stack Region` becomes `StackRegion`).
    pub fn logical_id(&self) -> String {
        self.0
            .iter()
            .filter(|component| *component != RESOURCE_ID && *component != DEFAULT_ID)
            .flat_map(|component| component.chars())
            .filter(char::is_ascii_alphanumeric)
            .collect()
    }
}

impl fmt::Display for ConstructPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

fn validate_id(id: &str) -> Result<(), BuildError> {
    if id.is_empty() {
        return Err(BuildError::InvalidName {
            kind: "construct id",
            value: id.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if id.contains('/') {
        return Err(BuildError::InvalidName {
            kind: "construct id",
            value: id.to_string(),
            reason: "must not contain '/'".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_ids() {
        let api = ConstructPath::root("Api").unwrap();
        assert_eq!(api.resource().logical_id(), "Api");

        let role = api.child("books").unwrap().child("ServiceRole").unwrap();
        assert_eq!(role.resource().logical_id(), "ApibooksServiceRole");
        assert_eq!(
            role.child("DefaultPolicy").unwrap().resource().logical_id(),
            "ApibooksServiceRoleDefaultPolicy"
        );
        assert_eq!(
            api.child("DefaultApiKey").unwrap().logical_id(),
            "ApiDefaultApiKey"
        );
        assert_eq!(
            ConstructPath::root("Stack Region").unwrap().logical_id(),
            "StackRegion"
        );
    }

    #[test]
    fn paths() {
        let path = ConstructPath::root("Api")
            .unwrap()
            .child("getAllBooks")
            .unwrap();

        assert_eq!(path.to_string(), "Api/getAllBooks");
        assert_eq!(path.id(), "getAllBooks");
        assert_eq!(path.parent(), Some(ConstructPath::root("Api").unwrap()));
        assert_eq!(ConstructPath::root("Api").unwrap().parent(), None);
    }

    #[test]
    fn invalid_ids() {
        assert!(matches!(
            ConstructPath::root(""),
            Err(BuildError::InvalidName { .. })
        ));
        assert!(matches!(
            ConstructPath::root("Api").unwrap().child("a/b"),
            Err(BuildError::InvalidName { .. })
        ));
    }
}
