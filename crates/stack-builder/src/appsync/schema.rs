// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    collections::HashSet,
    fmt, fs,
    io::ErrorKind,
    path::Path,
    sync::Arc,
};

use async_graphql_parser::{
    Pos, parse_schema,
    types::{TypeKind, TypeSystemDefinition},
};
use codemap::{CodeMap, File, Span};
use codemap_diagnostic::{Diagnostic, Level, SpanLabel, SpanStyle};
use indexmap::IndexMap;

use crate::error::{BuildError, SourceMap};

const DEFAULT_QUERY_TYPE: &str = "Query";
const DEFAULT_MUTATION_TYPE: &str = "Mutation";
const DEFAULT_SUBSCRIPTION_TYPE: &str = "Subscription";

/// GraphQL SDL text and the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFile {
    name: String,
    definition: String,
}

impl SchemaFile {
    pub fn from_asset(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let definition = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BuildError::FileNotFound(path.display().to_string()),
            _ => BuildError::IO(e),
        })?;

        Ok(Self {
            name: path.display().to_string(),
            definition,
        })
    }

    pub fn from_string(name: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: definition.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub arguments: Vec<String>,
    pos: Pos,
}

#[derive(Debug)]
struct ObjectDefinition {
    pos: Pos,
    fields: IndexMap<String, FieldDefinition>,
}

/// A parsed schema: the object types, their fields and arguments, and the root operation
/// types. Keeps the source around so that binding errors can point at it.
pub struct GraphqlSchema {
    name: String,
    definition: String,
    source_map: SourceMap,
    file: Arc<File>,
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
    objects: IndexMap<String, ObjectDefinition>,
    other_types: HashSet<String>,
}

impl GraphqlSchema {
    pub fn parse(schema_file: SchemaFile) -> Result<Self, BuildError> {
        let SchemaFile { name, definition } = schema_file;

        let mut codemap = CodeMap::new();
        let file = codemap.add_file(name.clone(), definition.clone());
        let source_map = SourceMap::new(codemap);

        let document = parse_schema(&definition).map_err(|e| BuildError::Diagnosis {
            file: name.clone(),
            diagnostics: vec![Diagnostic {
                level: Level::Error,
                message: format!("Invalid GraphQL schema: {e}"),
                code: Some("S000".to_string()),
                spans: e
                    .positions()
                    .map(|pos| primary_label(&file, pos, None))
                    .collect(),
            }],
            source_map: source_map.clone(),
        })?;

        let mut diagnostics = vec![];
        let mut root_types: [Option<String>; 3] = [None, None, None];
        let mut objects: IndexMap<String, ObjectDefinition> = IndexMap::new();
        let mut other_types = HashSet::new();

        for definition in document.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => {
                    let schema = schema.node;
                    for (slot, name) in root_types
                        .iter_mut()
                        .zip([schema.query, schema.mutation, schema.subscription])
                    {
                        if let Some(name) = name {
                            *slot = Some(name.node.to_string());
                        }
                    }
                }
                TypeSystemDefinition::Type(type_definition) => {
                    let type_definition = type_definition.node;
                    let type_name = type_definition.name.node.to_string();

                    match type_definition.kind {
                        TypeKind::Object(object) => {
                            let entry = objects.entry(type_name.clone()).or_insert_with(|| {
                                ObjectDefinition {
                                    pos: type_definition.name.pos,
                                    fields: IndexMap::new(),
                                }
                            });

                            for field in object.fields {
                                let field = field.node;
                                let field_name = field.name.node.to_string();

                                if entry.fields.contains_key(&field_name) {
                                    diagnostics.push(error(
                                        &file,
                                        field.name.pos,
                                        format!(
                                            "Field '{type_name}.{field_name}' is defined more than once"
                                        ),
                                        "S001",
                                    ));
                                    continue;
                                }

                                entry.fields.insert(
                                    field_name,
                                    FieldDefinition {
                                        arguments: field
                                            .arguments
                                            .iter()
                                            .map(|argument| argument.node.name.node.to_string())
                                            .collect(),
                                        pos: field.name.pos,
                                    },
                                );
                            }
                        }
                        _ => {
                            other_types.insert(type_name);
                        }
                    }
                }
                TypeSystemDefinition::Directive(_) => {}
            }
        }

        let [query_type, mutation_type, subscription_type] = root_types;
        let query_type = query_type.unwrap_or_else(|| DEFAULT_QUERY_TYPE.to_string());
        let mutation_type = mutation_type.or_else(|| {
            objects
                .contains_key(DEFAULT_MUTATION_TYPE)
                .then(|| DEFAULT_MUTATION_TYPE.to_string())
        });
        let subscription_type = subscription_type.or_else(|| {
            objects
                .contains_key(DEFAULT_SUBSCRIPTION_TYPE)
                .then(|| DEFAULT_SUBSCRIPTION_TYPE.to_string())
        });

        if !objects.contains_key(&query_type) {
            diagnostics.push(Diagnostic {
                level: Level::Error,
                message: format!("Schema does not define the query type '{query_type}'"),
                code: Some("S002".to_string()),
                spans: vec![],
            });
        }

        if !diagnostics.is_empty() {
            return Err(BuildError::Diagnosis {
                file: name,
                diagnostics,
                source_map,
            });
        }

        Ok(Self {
            name,
            definition,
            source_map,
            file,
            query_type,
            mutation_type,
            subscription_type,
            objects,
            other_types,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema text, as deployed.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn subscription_type(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        self.objects
            .get(type_name)
            .and_then(|object| object.fields.get(field_name))
    }

    /// Check that a resolver for `type_name.field_name` that reads `arguments` can be
    /// attached to this schema.
    pub fn check_binding(
        &self,
        type_name: &str,
        field_name: &str,
        arguments: &[String],
    ) -> Result<(), BuildError> {
        let diagnostics = match self.objects.get(type_name) {
            None if self.other_types.contains(type_name) => vec![Diagnostic {
                level: Level::Error,
                message: format!(
                    "Resolver for '{type_name}.{field_name}': '{type_name}' is not an object type"
                ),
                code: Some("S003".to_string()),
                spans: vec![],
            }],
            None => vec![Diagnostic {
                level: Level::Error,
                message: format!(
                    "Resolver for '{type_name}.{field_name}': type '{type_name}' is not defined in the schema"
                ),
                code: Some("S003".to_string()),
                spans: vec![],
            }],
            Some(object) => match object.fields.get(field_name) {
                None => vec![error(
                    &self.file,
                    object.pos,
                    format!("Resolver for '{type_name}.{field_name}': type '{type_name}' has no field '{field_name}'"),
                    "S004",
                )],
                Some(field) => arguments
                    .iter()
                    .filter(|argument| !field.arguments.contains(argument))
                    .map(|argument| {
                        error(
                            &self.file,
                            field.pos,
                            format!("Resolver for '{type_name}.{field_name}' reads argument '{argument}', which the field does not declare"),
                            "S005",
                        )
                    })
                    .collect(),
            },
        };

        if diagnostics.is_empty() {
            Ok(())
        } else {
            Err(BuildError::Diagnosis {
                file: self.name.clone(),
                diagnostics,
                source_map: self.source_map.clone(),
            })
        }
    }
}

impl fmt::Debug for GraphqlSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphqlSchema")
            .field("name", &self.name)
            .field("query_type", &self.query_type)
            .field("mutation_type", &self.mutation_type)
            .field("types", &self.objects.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn error(file: &File, pos: Pos, message: String, code: &str) -> Diagnostic {
    Diagnostic {
        level: Level::Error,
        message,
        code: Some(code.to_string()),
        spans: vec![primary_label(file, pos, None)],
    }
}

fn primary_label(file: &File, pos: Pos, label: Option<String>) -> SpanLabel {
    SpanLabel {
        span: span_at(file, pos),
        label,
        style: SpanStyle::Primary,
    }
}

/// The span of the identifier starting at `pos` (1-based line and column).
fn span_at(file: &File, pos: Pos) -> Span {
    let line = pos.line.saturating_sub(1);
    if line >= file.num_lines() {
        let end = file.span.len();
        return file.span.subspan(end, end);
    }

    let line_span = file.line_span(line);
    let text = file.source_slice(line_span);
    let start = text
        .char_indices()
        .nth(pos.column.saturating_sub(1))
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    let len: usize = text[start..]
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .map(char::len_utf8)
        .sum();

    line_span.subspan(start as u64, (start + len) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
type Book {
  id: ID!
  title: String
  author: String
}

type Query {
  getBooks: [Book]
  getBookById(id: ID!): Book
}

type Mutation {
  deleteBook(id: ID!): Book
}

extend type Query {
  getBooksByAuthor(author: String!): [Book]
}
"#;

    fn schema() -> GraphqlSchema {
        GraphqlSchema::parse(SchemaFile::from_string("schema.graphql", SCHEMA)).unwrap()
    }

    fn messages(err: BuildError) -> Vec<String> {
        match err {
            BuildError::Diagnosis { diagnostics, .. } => {
                diagnostics.into_iter().map(|d| d.message).collect()
            }
            other => panic!("Expected diagnostics, got {other:?}"),
        }
    }

    #[test]
    fn root_types_and_fields() {
        let schema = schema();

        assert_eq!(schema.query_type(), "Query");
        assert_eq!(schema.mutation_type(), Some("Mutation"));
        assert_eq!(schema.subscription_type(), None);
        assert_eq!(
            schema.field("Query", "getBookById").unwrap().arguments,
            vec!["id".to_string()]
        );
        // from the type extension
        assert!(schema.field("Query", "getBooksByAuthor").is_some());
        assert!(schema.field("Query", "addBook").is_none());
    }

    #[test]
    fn explicit_schema_definition() {
        let schema = GraphqlSchema::parse(SchemaFile::from_string(
            "schema.graphql",
            r#"
schema { query: RootQuery mutation: RootMutation }
type RootQuery { ping: String }
type RootMutation { pong: String }
"#,
        ))
        .unwrap();

        assert_eq!(schema.query_type(), "RootQuery");
        assert_eq!(schema.mutation_type(), Some("RootMutation"));
    }

    #[test]
    fn binding_checks() {
        let schema = schema();

        assert!(schema.check_binding("Query", "getBooks", &[]).is_ok());
        assert!(
            schema
                .check_binding("Query", "getBookById", &["id".to_string()])
                .is_ok()
        );

        assert_eq!(
            messages(schema.check_binding("Query", "addBook", &[]).unwrap_err()),
            vec!["Resolver for 'Query.addBook': type 'Query' has no field 'addBook'"]
        );
        assert_eq!(
            messages(
                schema
                    .check_binding("Query", "getBookById", &["bookId".to_string()])
                    .unwrap_err()
            ),
            vec![
                "Resolver for 'Query.getBookById' reads argument 'bookId', which the field does not declare"
            ]
        );
        assert_eq!(
            messages(schema.check_binding("Subscription", "onBook", &[]).unwrap_err()),
            vec![
                "Resolver for 'Subscription.onBook': type 'Subscription' is not defined in the schema"
            ]
        );
    }

    #[test]
    fn invalid_schemas() {
        let err = GraphqlSchema::parse(SchemaFile::from_string(
            "schema.graphql",
            "type Query { getBooks: [Book }",
        ))
        .unwrap_err();
        assert!(matches!(err, BuildError::Diagnosis { ref file, .. } if file == "schema.graphql"));

        let err = GraphqlSchema::parse(SchemaFile::from_string(
            "schema.graphql",
            "type Mutation { addBook(title: String): String }",
        ))
        .unwrap_err();
        assert_eq!(
            messages(err),
            vec!["Schema does not define the query type 'Query'"]
        );

        let err = GraphqlSchema::parse(SchemaFile::from_string(
            "schema.graphql",
            "type Query { a: String a: Int }",
        ))
        .unwrap_err();
        assert!(matches!(err, BuildError::Diagnosis { .. }));
    }

    #[test]
    fn spans_cover_identifiers() {
        let schema = schema();
        let object = &schema.objects["Mutation"];
        let span = span_at(&schema.file, object.pos);

        assert_eq!(schema.file.source_slice(span), "Mutation");
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SchemaFile::from_asset(dir.path().join("schema.graphql")),
            Err(BuildError::FileNotFound(_))
        ));
    }
}
