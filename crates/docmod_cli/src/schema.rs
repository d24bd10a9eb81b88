//! JSON schema files mapping field paths to field types.
//!
//! ```json
//! { "fields": { "name": "string", "count": "int", "tags": "list<string>" } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use docmod_core::{
    BoolType, BytesType, Field, FieldType, FloatType, IntType, ListType, SetType, StringType,
};
use serde::Deserialize;

use crate::error::CliError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    fields: BTreeMap<String, String>,
}

/// Declared fields, keyed by path.
#[derive(Debug)]
pub struct Schema {
    fields: BTreeMap<String, Field>,
}

impl Schema {
    /// Reads and parses a schema file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses schema JSON.
    pub fn parse(text: &str) -> Result<Self, CliError> {
        let file: SchemaFile = serde_json::from_str(text)?;
        let mut fields = BTreeMap::new();
        for (path, expr) in file.fields {
            let field_type = parse_type(&expr)?;
            let field = Field::with_shared_type(path.clone(), field_type)?;
            fields.insert(path, field);
        }
        Ok(Self { fields })
    }

    /// Looks up a declared field.
    pub fn field(&self, path: &str) -> Result<&Field, CliError> {
        self.fields.get(path).ok_or_else(|| CliError::UnknownField {
            path: path.to_string(),
        })
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Parses a type expression such as `int` or `list<set<string>>`.
pub fn parse_type(expr: &str) -> Result<Arc<dyn FieldType>, CliError> {
    let expr = expr.trim();

    if let Some(inner) = container(expr, "list") {
        return Ok(Arc::new(ListType::of_shared(parse_type(inner)?)));
    }
    if let Some(inner) = container(expr, "set") {
        return Ok(Arc::new(SetType::of_shared(parse_type(inner)?)));
    }

    let field_type: Arc<dyn FieldType> = match expr {
        "string" => Arc::new(StringType::new()),
        "int" => Arc::new(IntType),
        "float" => Arc::new(FloatType),
        "bool" => Arc::new(BoolType),
        "bytes" => Arc::new(BytesType),
        other => return Err(CliError::schema(format!("unknown field type '{other}'"))),
    };
    Ok(field_type)
}

fn container<'a>(expr: &'a str, name: &str) -> Option<&'a str> {
    expr.strip_prefix(name)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
}
