//! Validation outcome: ordered errors and warnings.
use serde::{Deserialize, Serialize};

/// Result of one validation pass. Valid iff there are no errors; warnings
/// never block the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationOutcome {
    /// An empty, valid outcome.
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// An invalid outcome carrying the given errors.
    pub fn from_errors(errors: Vec<String>) -> Self {
        let mut outcome = Self::new();
        for error in errors {
            outcome.error(error);
        }
        outcome
    }

    /// Records a blocking error.
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.valid = false;
    }

    /// Records a non-blocking warning.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Appends another outcome's findings after this one's.
    pub fn merge(&mut self, other: ValidationOutcome) {
        for error in other.errors {
            self.error(error);
        }
        self.warnings.extend(other.warnings);
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Splits into `(errors, warnings)`.
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.errors, self.warnings)
    }
}
