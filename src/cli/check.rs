//! Validate persisted documents

use super::CliError;
use crate::{
    Diagnostic, GenerateOptions,
    ast::DanglingReference,
    from_json, generate,
};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Persisted document (JSON text)
    pub input: Option<String>,
    /// Generation settings used for the dry run
    pub options: GenerateOptions,
}

/// What a check found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Objects in the document
    pub objects: usize,
    /// References whose target is not in the document
    pub dangling: Vec<DanglingReference>,
    /// Problems a generation run would report
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.diagnostics.is_empty()
    }
}

/// Deserialize the document and dry-run generation over it.
pub fn execute_check(options: &CheckOptions) -> Result<CheckReport, CliError> {
    let text = options.input.as_deref().ok_or(CliError::NoInput)?;
    let doc = from_json(text)?;
    let generated = generate(&doc, &options.options);

    Ok(CheckReport {
        objects: doc.object_count(),
        dangling: doc.dangling_references(),
        diagnostics: generated.diagnostics,
    })
}
