//! Build command implementation.
//!
//! Modifiers are applied in a fixed order: set, unset, inc, push,
//! push-all, pull, pull-all, add-to-set, pop-first, pop-last. Within one
//! flag they are applied in the order given.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use docmod_codec::Value;
use docmod_core::{
    CoreError, Field, Selector, ServerVersion, Session, UpdateCommand, UpdateConfig,
    UpdateExpression, VersionPolicy,
};
use tracing::{debug, info};

use crate::error::CliError;
use crate::schema::Schema;

/// How the finished command is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// Hex-encoded CBOR.
    Cbor,
}

/// Arguments for `docmod build`.
#[derive(Debug, Default, Args)]
pub struct BuildArgs {
    /// Path to the JSON schema file
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Selector document as JSON (defaults to all documents)
    #[arg(long, value_name = "JSON")]
    pub selector: Option<String>,

    /// Set a field
    #[arg(long, value_name = "PATH=JSON")]
    pub set: Vec<String>,

    /// Remove a field
    #[arg(long, value_name = "PATH")]
    pub unset: Vec<String>,

    /// Increment a numeric field
    #[arg(long, value_name = "PATH=JSON")]
    pub inc: Vec<String>,

    /// Append one element to a list
    #[arg(long, value_name = "PATH=JSON")]
    pub push: Vec<String>,

    /// Append every element of a JSON array
    #[arg(long, value_name = "PATH=JSON")]
    pub push_all: Vec<String>,

    /// Remove matching elements
    #[arg(long, value_name = "PATH=JSON")]
    pub pull: Vec<String>,

    /// Remove every element matching one in a JSON array
    #[arg(long, value_name = "PATH=JSON")]
    pub pull_all: Vec<String>,

    /// Add an element unless present
    #[arg(long, value_name = "PATH=JSON")]
    pub add_to_set: Vec<String>,

    /// Remove the first element
    #[arg(long, value_name = "PATH")]
    pub pop_first: Vec<String>,

    /// Remove the last element
    #[arg(long, value_name = "PATH")]
    pub pop_last: Vec<String>,

    /// Insert a document if none matches
    #[arg(long)]
    pub upsert: bool,

    /// Apply to every matching document
    #[arg(long)]
    pub multi: bool,

    /// Gate operators on this server version
    #[arg(long, value_name = "X.Y.Z")]
    pub server_version: Option<String>,

    /// Accept every operator regardless of server version
    #[arg(long)]
    pub ignore_versions: bool,

    /// Allow a command with no modifiers
    #[arg(long)]
    pub allow_empty: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// A session that hands back the finished command instead of sending it.
#[derive(Debug, Default)]
pub struct DryRunSession {
    version: Option<ServerVersion>,
}

impl DryRunSession {
    /// Creates a dry-run session reporting `version`.
    pub fn new(version: Option<ServerVersion>) -> Self {
        Self { version }
    }
}

impl Session for DryRunSession {
    type Output = UpdateCommand;
    type Error = CoreError;

    fn server_version(&self) -> Option<ServerVersion> {
        self.version
    }

    fn execute_update(&self, command: UpdateCommand) -> Result<UpdateCommand, CoreError> {
        debug!(entries = command.operations().len(), "dry run, command not sent");
        Ok(command)
    }
}

/// Runs the build command.
pub fn run(args: &BuildArgs) -> Result<(), CliError> {
    info!("Building update against schema {:?}", args.schema);
    let schema = Schema::load(&args.schema)?;
    debug!(fields = schema.len(), "schema loaded");
    let command = build(&schema, args)?;
    println!("{}", render(&command, args.format)?);
    Ok(())
}

/// Applies every modifier in `args` and finalizes the command.
pub fn build(schema: &Schema, args: &BuildArgs) -> Result<UpdateCommand, CliError> {
    let version = args
        .server_version
        .as_deref()
        .map(str::parse::<ServerVersion>)
        .transpose()?;
    let session = DryRunSession::new(version);

    let selector = match &args.selector {
        Some(json) => Selector::new(serde_json::from_str(json)?)?,
        None => Selector::all(),
    };

    let policy = if args.ignore_versions {
        VersionPolicy::Ignore
    } else {
        VersionPolicy::Enforce
    };
    let config = UpdateConfig::new()
        .version_policy(policy)
        .allow_empty(args.allow_empty);

    let mut update = UpdateExpression::with_config(&session, selector, config);

    for arg in &args.set {
        let (field, value) = assignment(schema, arg)?;
        update.set(field, value)?;
    }
    for arg in &args.unset {
        update.unset(schema.field(arg)?)?;
    }
    for arg in &args.inc {
        let (field, value) = assignment(schema, arg)?;
        update.increment(field, value)?;
    }
    for arg in &args.push {
        let (field, value) = assignment(schema, arg)?;
        update.push(field, value)?;
    }
    for arg in &args.push_all {
        let (field, value) = assignment(schema, arg)?;
        update.push_all(field, elements(arg, value)?)?;
    }
    for arg in &args.pull {
        let (field, value) = assignment(schema, arg)?;
        update.pull(field, value)?;
    }
    for arg in &args.pull_all {
        let (field, value) = assignment(schema, arg)?;
        update.pull_all(field, elements(arg, value)?)?;
    }
    for arg in &args.add_to_set {
        let (field, value) = assignment(schema, arg)?;
        update.add_to_set(field, value)?;
    }
    for arg in &args.pop_first {
        update.pop_first(schema.field(arg)?)?;
    }
    for arg in &args.pop_last {
        update.pop_last(schema.field(arg)?)?;
    }

    if args.upsert {
        update.upsert();
    }
    if args.multi {
        update.multi();
    }

    Ok(update.execute()?)
}

/// Formats a finished command for output.
pub fn render(command: &UpdateCommand, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&command.to_wire())?),
        OutputFormat::Cbor => {
            let bytes = command.encode()?;
            let mut out = String::with_capacity(bytes.len() * 2);
            for byte in bytes {
                let _ = write!(out, "{byte:02x}");
            }
            Ok(out)
        }
    }
}

fn assignment<'a>(schema: &'a Schema, arg: &str) -> Result<(&'a Field, Value), CliError> {
    let (path, json) = arg
        .split_once('=')
        .ok_or_else(|| CliError::argument(arg, "expected PATH=JSON"))?;
    let field = schema.field(path.trim())?;
    let value = serde_json::from_str(json)?;
    Ok((field, value))
}

fn elements(arg: &str, value: Value) -> Result<Vec<Value>, CliError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(CliError::argument(
            arg,
            format!("expected a JSON array, got {}", other.kind()),
        )),
    }
}
