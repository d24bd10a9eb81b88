//! Operators command implementation.

use docmod_core::{
    BoolType, BytesType, FieldType, FloatType, IntType, ListType, Operator, OperatorSet,
    ServerVersion, SetType, StringType,
};

use crate::error::CliError;

/// One row of the type table.
#[derive(Debug)]
pub struct TypeRow {
    /// Type name as written in schema files.
    pub name: &'static str,
    /// Operators the type accepts, after version filtering.
    pub operators: OperatorSet,
}

/// Runs the operators command.
pub fn run(server_version: Option<&str>) -> Result<(), CliError> {
    let supported = match server_version {
        Some(version) => OperatorSet::supported_by(version.parse::<ServerVersion>()?),
        None => OperatorSet::ALL,
    };

    println!("Field types:");
    for row in type_table(supported) {
        println!("  {:<10} {}", row.name, row.operators);
    }
    println!();
    println!("Operators:");
    for op in Operator::ALL {
        let marker = if supported.contains(op) { "" } else { " (unavailable)" };
        println!("  {:<10} >= {}{}", op.as_str(), op.min_server_version(), marker);
    }

    Ok(())
}

/// Built-in field types with the operators available under `supported`.
pub fn type_table(supported: OperatorSet) -> Vec<TypeRow> {
    let types: [(&'static str, Box<dyn FieldType>); 7] = [
        ("string", Box::new(StringType::new())),
        ("int", Box::new(IntType)),
        ("float", Box::new(FloatType)),
        ("bool", Box::new(BoolType)),
        ("bytes", Box::new(BytesType)),
        ("list<T>", Box::new(ListType::new(IntType))),
        ("set<T>", Box::new(SetType::new(IntType))),
    ];

    types
        .into_iter()
        .map(|(name, field_type)| TypeRow {
            name,
            operators: field_type.valid_operators().intersection(supported),
        })
        .collect()
}
