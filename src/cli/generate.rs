//! Generate a record module from a persisted document

use super::CliError;
use crate::{GenerateOptions, from_json, generate};

/// Options for the generate command
#[derive(Debug, Clone, Default)]
pub struct GenerateCommand {
    /// Persisted document (JSON text)
    pub input: Option<String>,
    /// Generation settings
    pub options: GenerateOptions,
}

/// Deserialize the document and generate the module for its root record type.
///
/// Diagnostics are handled per `options.policy`: logged and kept in the
/// output, or turned into [`CliError::Generation`].
pub fn execute_generate(command: &GenerateCommand) -> Result<String, CliError> {
    let text = command.input.as_deref().ok_or(CliError::NoInput)?;
    let doc = from_json(text)?;
    let generated = generate(&doc, &command.options);
    Ok(generated.into_result(command.options.policy)?)
}
