use crate::error::{PartforgeError, PartforgeResult};
use regex::Regex;
use validator::{Validate, ValidationErrors};

const MAX_IPN_LENGTH: usize = 64;

pub fn validate_model<T: Validate>(model: &T) -> PartforgeResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(PartforgeError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match &error.message {
                Some(message) => format!("{}: {}", field, message),
                None => match &error.code {
                    std::borrow::Cow::Borrowed("length") => {
                        format!("Length validation failed for field '{}'", field)
                    }
                    std::borrow::Cow::Borrowed("range") => {
                        format!("Value out of range for field '{}'", field)
                    }
                    _ => format!("Validation failed for field '{}': {}", field, error.code),
                },
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

/// Checks that an IPN is safe to use as a lookup key and a file stem.
pub fn validate_ipn(ipn: &str) -> PartforgeResult<()> {
    if ipn.is_empty() {
        return Err(PartforgeError::validation("ipn", "IPN must not be empty"));
    }

    if ipn.len() > MAX_IPN_LENGTH {
        return Err(PartforgeError::validation(
            "ipn",
            format!("IPN exceeds {} characters", MAX_IPN_LENGTH),
        ));
    }

    if ipn.starts_with('.') {
        return Err(PartforgeError::validation("ipn", "IPN must not start with '.'"));
    }

    if let Some(bad) = ipn
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(PartforgeError::validation(
            "ipn",
            format!("IPN contains illegal character {:?}", bad),
        ));
    }

    Ok(())
}

/// The reserved IPN prefixes that mark a part as an assembly.
///
/// Matching is case-insensitive and requires the hyphen after the prefix:
/// with prefixes `PCA` and `ASY`, `pca-0001` and `ASY-ROOT` are assemblies
/// while `PCA0001` and `RES-001` are not.
#[derive(Debug, Clone)]
pub struct AssemblyConvention {
    prefixes: Vec<String>,
    pattern: Regex,
}

impl AssemblyConvention {
    pub fn new<I, S>(prefixes: I) -> PartforgeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes: Vec<String> = prefixes
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if prefixes.is_empty() {
            return Err(PartforgeError::configuration(
                "at least one assembly prefix is required",
            ));
        }

        let alternatives: Vec<String> = prefixes.iter().map(|p| regex::escape(p)).collect();
        let pattern = Regex::new(&format!("^(?i)(?:{})-", alternatives.join("|")))
            .map_err(|e| PartforgeError::configuration(format!("invalid assembly prefix: {}", e)))?;

        Ok(Self { prefixes, pattern })
    }

    pub fn is_assembly(&self, ipn: &str) -> bool {
        self.pattern.is_match(ipn)
    }

    /// Rejects identifiers that cannot carry a BOM.
    pub fn validate_assembly(&self, ipn: &str) -> PartforgeResult<()> {
        validate_ipn(ipn)?;
        if !self.is_assembly(ipn) {
            return Err(PartforgeError::validation(
                "ipn",
                format!(
                    "'{}' is not an assembly; BOMs exist only for IPNs starting with {}",
                    ipn,
                    self.describe_prefixes()
                ),
            ));
        }
        Ok(())
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    fn describe_prefixes(&self) -> String {
        self.prefixes
            .iter()
            .map(|p| format!("{}-", p))
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

impl Default for AssemblyConvention {
    fn default() -> Self {
        Self {
            prefixes: vec!["PCA".to_string(), "ASY".to_string()],
            pattern: Regex::new("^(?i)(?:PCA|ASY)-").expect("static pattern compiles"),
        }
    }
}
