// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{
    Serialize, Serializer,
    ser::{SerializeMap, SerializeSeq},
};

/// Pseudo parameters resolved by the provider at deployment time.
pub mod pseudo {
    pub const ACCOUNT_ID: &str = "AWS::AccountId";
    pub const NO_VALUE: &str = "AWS::NoValue";
    pub const PARTITION: &str = "AWS::Partition";
    pub const REGION: &str = "AWS::Region";
    pub const URL_SUFFIX: &str = "AWS::URLSuffix";
}

/// A property value that may only be known once the template is deployed.
///
/// Serializes to the JSON shape of the corresponding CloudFormation intrinsic function
/// (`{"Ref": ..}`, `{"Fn::GetAtt": [..]}` and so on) or to a plain string for literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Literal(String),
    Ref(String),
    GetAtt {
        logical_id: String,
        attribute: String,
    },
    Join {
        delimiter: String,
        parts: Vec<Expr>,
    },
    Sub(String),
}

impl Expr {
    pub fn literal(value: impl Into<String>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn reference(logical_id: impl Into<String>) -> Self {
        Expr::Ref(logical_id.into())
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Expr::GetAtt {
            logical_id: logical_id.into(),
            attribute: attribute.into(),
        }
    }

    pub fn join(delimiter: impl Into<String>, parts: Vec<Expr>) -> Self {
        Expr::Join {
            delimiter: delimiter.into(),
            parts,
        }
    }

    pub fn sub(template: impl Into<String>) -> Self {
        Expr::Sub(template.into())
    }

    pub fn region() -> Self {
        Expr::Ref(pseudo::REGION.to_string())
    }

    pub fn account_id() -> Self {
        Expr::Ref(pseudo::ACCOUNT_ID.to_string())
    }

    pub fn partition() -> Self {
        Expr::Ref(pseudo::PARTITION.to_string())
    }

    /// The logical ids this expression depends on (pseudo parameters excluded).
    pub fn references(&self) -> Vec<&str> {
        match self {
            Expr::Literal(_) | Expr::Sub(_) => vec![],
            Expr::Ref(id) if id.starts_with("AWS::") => vec![],
            Expr::Ref(id) => vec![id.as_str()],
            Expr::GetAtt { logical_id, .. } => vec![logical_id.as_str()],
            Expr::Join { parts, .. } => parts.iter().flat_map(Expr::references).collect(),
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Literal(value.to_string())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Literal(value)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expr::Literal(value) => serializer.serialize_str(value),
            Expr::Ref(logical_id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", logical_id)?;
                map.end()
            }
            Expr::GetAtt {
                logical_id,
                attribute,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[logical_id, attribute])?;
                map.end()
            }
            Expr::Join { delimiter, parts } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &JoinArgs { delimiter, parts })?;
                map.end()
            }
            Expr::Sub(template) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Sub", template)?;
                map.end()
            }
        }
    }
}

struct JoinArgs<'a> {
    delimiter: &'a str,
    parts: &'a [Expr],
}

impl Serialize for JoinArgs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(self.delimiter)?;
        seq.serialize_element(self.parts)?;
        seq.end()
    }
}

/// Serializes a single-element list as its element, the way IAM policy documents
/// are usually written (`"Action": "lambda:InvokeFunction"`).
pub fn one_or_many<T: Serialize, S: Serializer>(
    values: &[T],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match values {
        [single] => single.serialize(serializer),
        _ => values.serialize(serializer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn intrinsic_shapes() {
        assert_eq!(
            serde_json::to_value(Expr::reference("BooksTable")).unwrap(),
            json!({ "Ref": "BooksTable" })
        );
        assert_eq!(
            serde_json::to_value(Expr::get_att("Api", "GraphQLUrl")).unwrap(),
            json!({ "Fn::GetAtt": ["Api", "GraphQLUrl"] })
        );
        assert_eq!(
            serde_json::to_value(Expr::join(
                "",
                vec![
                    "arn:".into(),
                    Expr::partition(),
                    ":iam::aws:policy/service-role/AWSLambdaBasicExecutionRole".into()
                ]
            ))
            .unwrap(),
            json!({ "Fn::Join": ["", [
                "arn:",
                { "Ref": "AWS::Partition" },
                ":iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"
            ]] })
        );
        assert_eq!(
            serde_json::to_value(Expr::sub("bucket-${AWS::Region}")).unwrap(),
            json!({ "Fn::Sub": "bucket-${AWS::Region}" })
        );
    }

    #[test]
    fn references_skip_pseudo_parameters() {
        let expr = Expr::join(
            "",
            vec![
                Expr::get_att("LambdaFunction", "Arn"),
                Expr::region(),
                ":*".into(),
            ],
        );
        assert_eq!(expr.references(), vec!["LambdaFunction"]);
    }
}
