//! Structured-object generation on top of plain text generation.
//!
//! [`generate_object`] performs exactly one call to a [`TextGenerator`] and
//! turns the reply into a checked instance of a [`SchemaContract`] type.
//!
//! With `structured_outputs = false` the provider only sees the prompt; the
//! schema is enforced locally: markdown fences and surrounding prose are
//! stripped, the outermost JSON object is decoded, then the type's own
//! constraints are checked. Native mode additionally hands the schema to the
//! provider, but the local checks still run.

use std::{fmt, future::Future, time::Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error_handler::{Result, SchemaError, make_snippet};

/// Target format handed to providers that support native JSON-schema output.
#[derive(Debug, Clone, Copy)]
pub struct OutputFormat<'a> {
    pub name: &'a str,
    pub schema: &'a Value,
}

/// Plain text generation, the only capability the boundary needs from a provider.
pub trait TextGenerator: Send + Sync {
    /// Sends `prompt` and returns the raw completion text.
    ///
    /// `format` is `Some` only when native structured output was requested.
    fn generate(
        &self,
        prompt: &str,
        format: Option<OutputFormat<'_>>,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// A single broken constraint, addressed by a JSON-path-like location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A type that can be requested from the model.
///
/// Decoding covers field presence and JSON types; [`SchemaContract::check`]
/// covers everything serde cannot express (lengths, non-empty strings).
pub trait SchemaContract: DeserializeOwned {
    /// Name used in errors and in native `response_format` requests.
    const NAME: &'static str;

    /// JSON schema describing the expected object.
    fn json_schema() -> Value;

    /// Constraint check run after a successful decode.
    fn check(&self) -> std::result::Result<(), SchemaViolation>;
}

/// Input for [`generate_object`].
#[derive(Debug, Clone, Copy)]
pub struct ObjectRequest<'a> {
    pub prompt: &'a str,
    /// Ask the provider to enforce the schema itself. Keep `false` for models
    /// without JSON-schema `response_format` support.
    pub structured_outputs: bool,
}

/// Generates and validates one `T` from the model.
///
/// # Errors
/// - any transport/provider error of the generator, unchanged
/// - [`SchemaError::NoJson`] when the output holds no JSON object
/// - [`SchemaError::Decode`] when the JSON does not decode into `T`
/// - [`SchemaError::Violation`] when `T::check` fails
#[instrument(skip_all, fields(schema = T::NAME, structured = request.structured_outputs))]
pub async fn generate_object<T, G>(generator: &G, request: ObjectRequest<'_>) -> Result<T>
where
    T: SchemaContract,
    G: TextGenerator,
{
    let started = Instant::now();
    let schema = T::json_schema();
    let format = request.structured_outputs.then_some(OutputFormat {
        name: T::NAME,
        schema: &schema,
    });

    let raw = generator.generate(request.prompt, format).await?;
    debug!(
        output_len = raw.len(),
        latency_ms = started.elapsed().as_millis(),
        "model output received"
    );

    parse_object::<T>(&raw).inspect_err(|e| warn!(error = %e, "model output rejected"))
}

/// Extracts, decodes and checks a `T` from raw model text.
///
/// # Errors
/// See [`generate_object`].
pub fn parse_object<T: SchemaContract>(raw: &str) -> Result<T> {
    let block = extract_json_block(raw).ok_or_else(|| SchemaError::NoJson {
        schema: T::NAME,
        snippet: make_snippet(raw),
    })?;

    let value: T = serde_json::from_str(block).map_err(|e| SchemaError::Decode {
        schema: T::NAME,
        reason: e.to_string(),
    })?;

    value.check().map_err(|violation| SchemaError::Violation {
        schema: T::NAME,
        violation,
    })?;

    Ok(value)
}

/// Locates the outermost JSON object in model text.
///
/// Tolerates markdown fences, a BOM, and prose before or after the object:
/// the slice runs from the first `{` to the last `}`.
pub fn extract_json_block(s: &str) -> Option<&str> {
    let s = s.trim_start_matches('\u{feff}');
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (start < end).then(|| &s[start..=end])
}
