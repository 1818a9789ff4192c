use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CatalogError, UtcDateTime, ValidationError, WorkflowError};

/// Schema version stamped on every envelope.
pub const SCHEMA_VERSION: &str = "v1.0.0";

/// Standard response envelope for all `swapdesk` machine-readable outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn success(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(
        meta: EnvelopeMeta,
        data: T,
        errors: Vec<EnvelopeError>,
    ) -> Result<Self, ValidationError> {
        meta.validate()?;
        for error in &errors {
            error.validate()?;
        }

        Ok(Self { meta, data, errors })
    }

    pub fn push_error(&mut self, error: EnvelopeError) -> Result<(), ValidationError> {
        error.validate()?;
        self.errors.push(error);
        Ok(())
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Metadata attached to every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub schema_version: String,
    pub generated_at: UtcDateTime,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    /// Metadata with a fresh UUID v4 request id.
    pub fn new(latency_ms: u64) -> Self {
        Self {
            request_id: Uuid::new_v4().hyphenated().to_string(),
            schema_version: String::from(SCHEMA_VERSION),
            generated_at: UtcDateTime::now(),
            latency_ms,
            warnings: Vec::new(),
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Result<Self, ValidationError> {
        self.request_id = request_id.into();
        self.validate()?;
        Ok(self)
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_id.trim().len() < 8 {
            return Err(ValidationError::InvalidRequestId);
        }

        if !is_valid_schema_version(&self.schema_version) {
            return Err(ValidationError::InvalidSchemaVersion {
                value: self.schema_version.clone(),
            });
        }

        Ok(())
    }
}

/// Structured error payload for partial or failed responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl EnvelopeError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let error = Self {
            code: code.into(),
            message: message.into(),
            retryable: None,
        };
        error.validate()?;
        Ok(error)
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyErrorCode);
        }

        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyErrorMessage);
        }

        Ok(())
    }
}

impl From<&CatalogError> for EnvelopeError {
    fn from(error: &CatalogError) -> Self {
        Self {
            code: error.code().to_owned(),
            message: error.message().to_owned(),
            retryable: Some(error.retryable()),
        }
    }
}

impl From<&WorkflowError> for EnvelopeError {
    fn from(error: &WorkflowError) -> Self {
        match error {
            WorkflowError::Catalog(catalog) => Self::from(catalog),
            other => Self {
                code: other.code().to_owned(),
                message: other.to_string(),
                retryable: Some(other.retryable()),
            },
        }
    }
}

fn is_valid_schema_version(value: &str) -> bool {
    let Some(version) = value.strip_prefix('v') else {
        return false;
    };

    let mut parts = version.split('.');
    let major = parts.next();
    let minor = parts.next();
    let patch = parts.next();

    if parts.next().is_some() {
        return false;
    }

    [major, minor, patch].iter().all(|part| {
        part.is_some_and(|segment| {
            !segment.is_empty() && segment.chars().all(|ch| ch.is_ascii_digit())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AmountError;

    #[test]
    fn new_meta_is_valid() {
        let meta = EnvelopeMeta::new(12);
        assert!(meta.validate().is_ok());
        assert_eq!(meta.schema_version, SCHEMA_VERSION);
        assert_eq!(meta.request_id.len(), 36);
    }

    #[test]
    fn rejects_short_request_id() {
        let err = EnvelopeMeta::new(0)
            .with_request_id("abc")
            .expect_err("must fail");
        assert_eq!(err, ValidationError::InvalidRequestId);
    }

    #[test]
    fn rejects_bad_schema_version() {
        let mut meta = EnvelopeMeta::new(0);
        meta.schema_version = String::from("1.0");
        assert!(matches!(
            meta.validate(),
            Err(ValidationError::InvalidSchemaVersion { .. })
        ));
    }

    #[test]
    fn rejects_empty_error_code() {
        let err = EnvelopeError::new(" ", "message").expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyErrorCode);
    }

    #[test]
    fn maps_workflow_errors() {
        let amount = EnvelopeError::from(&WorkflowError::Amount(AmountError::NotPositive));
        assert_eq!(amount.code, "amount.not_positive");
        assert_eq!(amount.retryable, Some(false));

        let catalog = EnvelopeError::from(&WorkflowError::Catalog(CatalogError::unavailable(
            "price feed returned status 503",
        )));
        assert_eq!(catalog.code, "catalog.unavailable");
        assert_eq!(catalog.message, "price feed returned status 503");
        assert_eq!(catalog.retryable, Some(true));
    }

    #[test]
    fn errors_are_omitted_when_empty() {
        let envelope = Envelope::success(EnvelopeMeta::new(3), serde_json::json!({"ok": true}));
        let value = serde_json::to_value(&envelope).expect("serializable");
        assert!(value.get("errors").is_none());
        assert!(envelope.is_ok());
    }
}
