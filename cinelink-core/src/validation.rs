//! Input validation for the report and curated-source surfaces.

use url::Url;

// ============================================================================
// Canonical validation limits — single source of truth for the entire codebase
// ============================================================================

/// Minimum report reason length (after trimming)
pub const REASON_MIN: usize = 5;
/// Maximum report reason length
pub const REASON_MAX: usize = 2000;

/// Maximum source title length
pub const TITLE_MAX: usize = 300;

/// Maximum region-code length (most are ISO 3166-1 alpha-2)
pub const REGION_CODE_MAX: usize = 8;

/// Validation error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid {field}: {message}")]
    Field { field: String, message: String },
}

impl ValidationError {
    fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Field {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for crate::Error {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Validation result
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Report-reason validator
pub struct ReasonValidator {
    min_length: usize,
    max_length: usize,
}

impl Default for ReasonValidator {
    fn default() -> Self {
        Self {
            min_length: REASON_MIN,
            max_length: REASON_MAX,
        }
    }
}

impl ReasonValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self, reason: &str) -> ValidationResult<()> {
        let trimmed = reason.trim();

        if trimmed.len() < self.min_length {
            return Err(ValidationError::field(
                "reason",
                format!("must be at least {} characters", self.min_length),
            ));
        }

        if trimmed.len() > self.max_length {
            return Err(ValidationError::field(
                "reason",
                format!("must be at most {} characters", self.max_length),
            ));
        }

        Ok(())
    }
}

/// Structural email validator. Deliverability is not checked; the address is
/// only a contact hint on a report.
#[derive(Default)]
pub struct EmailValidator;

impl EmailValidator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, email: &str) -> ValidationResult<()> {
        let invalid = || ValidationError::field("email", "malformed address");

        if email.len() > 254 || email.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.is_empty() {
            return Err(invalid());
        }

        // Domain needs at least one dot with labels on both sides
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(invalid());
        }

        Ok(())
    }
}

/// HTTP(S) URL validator for curated source locators and license proofs
#[derive(Default)]
pub struct UrlValidator;

impl UrlValidator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, field: &str, value: &str) -> ValidationResult<()> {
        let parsed =
            Url::parse(value).map_err(|e| ValidationError::field(field, e.to_string()))?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ValidationError::field(
                field,
                format!("unsupported scheme: {other}"),
            )),
        }
    }
}

/// Normalize a region allowlist: uppercase codes, empty entries rejected
pub fn normalize_region_allowlist(regions: &[String]) -> ValidationResult<Vec<String>> {
    regions
        .iter()
        .map(|code| {
            let code = code.trim();
            if code.is_empty()
                || code.len() > REGION_CODE_MAX
                || !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            {
                return Err(ValidationError::field(
                    "regionAllowlist",
                    format!("invalid region code: {code:?}"),
                ));
            }
            Ok(code.to_ascii_uppercase())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_length() {
        let validator = ReasonValidator::new();
        assert!(validator.validate("link is dead").is_ok());
        assert!(validator.validate("bad").is_err());
        // Trimmed before measuring
        assert!(validator.validate("  ab  ").is_err());
        assert!(validator.validate(&"x".repeat(REASON_MAX + 1)).is_err());
    }

    #[test]
    fn test_email() {
        let validator = EmailValidator::new();
        assert!(validator.validate("user@example.com").is_ok());
        assert!(validator.validate("no-at-sign").is_err());
        assert!(validator.validate("a@b").is_err());
        assert!(validator.validate("a b@example.com").is_err());
        assert!(validator.validate("@example.com").is_err());
    }

    #[test]
    fn test_url() {
        let validator = UrlValidator::new();
        assert!(validator.validate("url", "https://example.com/watch").is_ok());
        assert!(validator.validate("url", "http://example.com").is_ok());
        assert!(validator.validate("url", "ftp://example.com").is_err());
        assert!(validator.validate("url", "not a url").is_err());
    }

    #[test]
    fn test_region_normalization() {
        let regions = vec!["us".to_string(), "Vn".to_string()];
        assert_eq!(
            normalize_region_allowlist(&regions).unwrap(),
            vec!["US".to_string(), "VN".to_string()]
        );
        assert!(normalize_region_allowlist(&["".to_string()]).is_err());
        assert!(normalize_region_allowlist(&["U S".to_string()]).is_err());
    }
}
