use topo_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using TopoError
pub type Result<T> = std::result::Result<T, TopoError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on
/// programmatically. Formatting and localization of these codes happen
/// outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// A required identity (business id, set id) is not a valid integer
    InvalidParameter,
    /// The Set object schema could not be resolved
    SchemaResolutionFailure,
    /// Request body does not match the shape the operation expects
    InvalidPayload,
    /// A targeted set identity matched zero records
    NotFound,
    /// A targeted set identity matched more than one record
    AmbiguousIdentity,
    /// A stored field could not be converted to its expected type
    FieldConversion,
    /// A set name is already taken under the same parent
    NameConflict,
    /// Failure surfaced by the query/write backend
    Backend,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidParameter => "ERR_INVALID_PARAMETER",
            ExErrorKind::SchemaResolutionFailure => "ERR_SCHEMA_RESOLUTION",
            ExErrorKind::InvalidPayload => "ERR_INVALID_PAYLOAD",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AmbiguousIdentity => "ERR_AMBIGUOUS_IDENTITY",
            ExErrorKind::FieldConversion => "ERR_FIELD_CONVERSION",
            ExErrorKind::NameConflict => "ERR_NAME_CONFLICT",
            ExErrorKind::Backend => "ERR_BACKEND",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification plus whatever context was known where the
/// error crossed a boundary.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    biz_id: Option<i64>,
    set_id: Option<i64>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            biz_id: None,
            set_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add business id context
    pub fn with_biz_id(mut self, biz_id: i64) -> Self {
        self.biz_id = Some(biz_id);
        self
    }

    /// Add set id context
    pub fn with_set_id(mut self, set_id: i64) -> Self {
        self.set_id = Some(set_id);
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn biz_id(&self) -> Option<i64> {
        self.biz_id
    }

    pub fn set_id(&self) -> Option<i64> {
        self.set_id
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(biz_id) = self.biz_id {
            write!(f, " (biz_id: {})", biz_id)?;
        }
        if let Some(set_id) = self.set_id {
            write!(f, " (set_id: {})", set_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for set lifecycle operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopoError {
    /// A path identity could not be parsed, or is out of range
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Object schema lookup failed
    #[error("Failed to resolve object schema '{obj_id}': {reason}")]
    SchemaResolutionFailure { obj_id: String, reason: String },

    /// Payload does not match the expected structure
    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },

    /// No set matched the given identity
    #[error("Set not found: {set_id}")]
    NotFound { set_id: i64 },

    /// More than one set matched a single identity (integrity violation)
    #[error("Set identity {set_id} matched {count} records")]
    AmbiguousIdentity { set_id: i64, count: u64 },

    /// A stored field could not be interpreted as its expected type
    #[error("Cannot convert field {field} of set {set_id} to {expected}: {reason}")]
    FieldConversion {
        set_id: i64,
        field: String,
        expected: String,
        reason: String,
    },

    /// Another set under the same parent already uses this name
    #[error("Set name '{name}' is already used under the same parent in business {biz_id}")]
    NameConflict { biz_id: i64, name: String },

    /// Query/write backend failure, passed through as reported
    #[error("Backend error during {op}: {message}")]
    Backend { op: String, message: String },
}

impl TopoError {
    /// Classification of this error in the canonical taxonomy
    pub fn kind(&self) -> ExErrorKind {
        match self {
            TopoError::InvalidParameter { .. } => ExErrorKind::InvalidParameter,
            TopoError::SchemaResolutionFailure { .. } => ExErrorKind::SchemaResolutionFailure,
            TopoError::InvalidPayload { .. } => ExErrorKind::InvalidPayload,
            TopoError::NotFound { .. } => ExErrorKind::NotFound,
            TopoError::AmbiguousIdentity { .. } => ExErrorKind::AmbiguousIdentity,
            TopoError::FieldConversion { .. } => ExErrorKind::FieldConversion,
            TopoError::NameConflict { .. } => ExErrorKind::NameConflict,
            TopoError::Backend { .. } => ExErrorKind::Backend,
        }
    }

    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        TopoError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        TopoError::InvalidPayload {
            reason: reason.into(),
        }
    }

    pub fn backend(op: impl Into<String>, message: impl Into<String>) -> Self {
        TopoError::Backend {
            op: op.into(),
            message: message.into(),
        }
    }
}

/// Conversion from TopoError to ExError
impl From<TopoError> for ExError {
    fn from(err: TopoError) -> Self {
        let ex = ExError::new(err.kind()).with_message(err.to_string());
        match err {
            TopoError::NotFound { set_id }
            | TopoError::AmbiguousIdentity { set_id, .. }
            | TopoError::FieldConversion { set_id, .. } => ex.with_set_id(set_id),
            TopoError::NameConflict { biz_id, .. } => ex.with_biz_id(biz_id),
            TopoError::Backend { op, .. } => ex.with_op(op),
            TopoError::InvalidParameter { .. }
            | TopoError::SchemaResolutionFailure { .. }
            | TopoError::InvalidPayload { .. } => ex,
        }
    }
}

/// Malformed JSON bodies surface as payload errors
impl From<serde_json::Error> for TopoError {
    fn from(err: serde_json::Error) -> Self {
        TopoError::InvalidPayload {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::InvalidParameter, "ERR_INVALID_PARAMETER"),
            (ExErrorKind::SchemaResolutionFailure, "ERR_SCHEMA_RESOLUTION"),
            (ExErrorKind::InvalidPayload, "ERR_INVALID_PAYLOAD"),
            (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
            (ExErrorKind::AmbiguousIdentity, "ERR_AMBIGUOUS_IDENTITY"),
            (ExErrorKind::FieldConversion, "ERR_FIELD_CONVERSION"),
            (ExErrorKind::NameConflict, "ERR_NAME_CONFLICT"),
            (ExErrorKind::Backend, "ERR_BACKEND"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_conversion_keeps_identity_context() {
        let ex: ExError = TopoError::AmbiguousIdentity {
            set_id: 7,
            count: 2,
        }
        .into();
        assert_eq!(ex.kind(), ExErrorKind::AmbiguousIdentity);
        assert_eq!(ex.set_id(), Some(7));
        assert!(ex.message().contains("matched 2 records"));

        let ex: ExError = TopoError::backend("sqlite_find", "disk I/O error").into();
        assert_eq!(ex.op(), Some("sqlite_find"));
        assert_eq!(ex.code(), "ERR_BACKEND");
    }

    #[test]
    fn test_display_includes_code_and_context() {
        let ex = ExError::new(ExErrorKind::NameConflict)
            .with_op("set_update")
            .with_biz_id(10)
            .with_message("name taken");
        let text = ex.to_string();
        assert!(text.starts_with("[ERR_NAME_CONFLICT]"));
        assert!(text.contains("set_update"));
        assert!(text.contains("biz_id: 10"));
    }

    #[test]
    fn test_serde_error_maps_to_invalid_payload() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let topo: TopoError = err.into();
        assert_eq!(topo.kind(), ExErrorKind::InvalidPayload);
    }
}
