use cmdgate_core_types::RequestId;
use thiserror::Error;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure that crosses a crate boundary is classified by one of these
/// kinds. Each kind has a stable code for programmatic handling and an HTTP
/// status class for whichever transport sits in front of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Identity
    Unauthenticated,
    Forbidden,

    // Validation
    InvalidInput,
    InvalidPattern,
    NotFound,

    // Admission outcomes
    InsufficientCredits,
    PolicyRejected,

    // Execution adapter
    ExecutionFailed,
    Timeout,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Unauthenticated => "ERR_UNAUTHENTICATED",
            ExErrorKind::Forbidden => "ERR_FORBIDDEN",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidPattern => "ERR_INVALID_PATTERN",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InsufficientCredits => "ERR_INSUFFICIENT_CREDITS",
            ExErrorKind::PolicyRejected => "ERR_POLICY_REJECTED",
            ExErrorKind::ExecutionFailed => "ERR_EXECUTION_FAILED",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// HTTP status class a transport layer should answer with
    ///
    /// Execution failures and timeouts deliberately collapse into 500: the
    /// caller learns that nothing was committed, not why the backend failed.
    pub fn http_status(&self) -> u16 {
        match self {
            ExErrorKind::InvalidInput
            | ExErrorKind::InvalidPattern
            | ExErrorKind::PolicyRejected => 400,
            ExErrorKind::Unauthenticated => 401,
            ExErrorKind::InsufficientCredits => 402,
            ExErrorKind::Forbidden => 403,
            ExErrorKind::NotFound => 404,
            ExErrorKind::ExecutionFailed
            | ExErrorKind::Timeout
            | ExErrorKind::Io
            | ExErrorKind::Serialization
            | ExErrorKind::Persistence
            | ExErrorKind::Config
            | ExErrorKind::Internal => 500,
        }
    }

    /// Whether resubmitting the same request is safe
    ///
    /// True for failures that abort the submission before commit.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExErrorKind::ExecutionFailed | ExErrorKind::Timeout | ExErrorKind::Persistence
        )
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    principal_id: Option<String>,
    rule_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            principal_id: None,
            rule_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the id of the entity the operation was about (command, rule, ...)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add the acting or affected principal
    pub fn with_principal_id(mut self, id: impl Into<String>) -> Self {
        self.principal_id = Some(id.into());
        self
    }

    /// Add the rule that decided the outcome
    pub fn with_rule_id(mut self, id: impl Into<String>) -> Self {
        self.rule_id = Some(id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn principal_id(&self) -> Option<&str> {
        self.principal_id.as_deref()
    }

    pub fn rule_id(&self) -> Option<&str> {
        self.rule_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
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
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(principal_id) = &self.principal_id {
            write!(f, " (principal_id: {})", principal_id)?;
        }
        if let Some(rule_id) = &self.rule_id {
            write!(f, " (rule_id: {})", rule_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Failures raised by the pure core (policy evaluation, model parsing, adapters)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    /// Rule pattern does not compile
    #[error("Invalid rule pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Principal cannot pay for the command
    #[error("Insufficient credits for principal {principal_id} (balance {balance})")]
    InsufficientCredits { principal_id: String, balance: i64 },

    /// An AUTO_REJECT rule matched the command text
    #[error("Command rejected by rule {rule_id} ({pattern})")]
    PolicyRejected { rule_id: String, pattern: String },

    /// Execution backend reported a failure
    #[error("Execution failed: {message}")]
    ExecutionFailed { message: String },

    /// Execution backend did not answer in time
    #[error("Execution timed out after {timeout_ms}ms")]
    ExecutionTimeout { timeout_ms: u64 },

    /// A persisted enum column held a value this build does not know
    #[error("Unknown {field} value: {value}")]
    UnknownVariant { field: &'static str, value: String },
}

impl From<GateError> for ExError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::InvalidPattern { pattern, reason } => {
                ExError::new(ExErrorKind::InvalidPattern)
                    .with_op("validate_pattern")
                    .with_message(format!("Invalid regex pattern '{}': {}", pattern, reason))
            }
            GateError::InsufficientCredits {
                principal_id,
                balance,
            } => ExError::new(ExErrorKind::InsufficientCredits)
                .with_principal_id(principal_id)
                .with_message(format!("Insufficient credits (balance {})", balance)),
            GateError::PolicyRejected { rule_id, pattern } => {
                ExError::new(ExErrorKind::PolicyRejected)
                    .with_rule_id(rule_id)
                    .with_message(format!("Command rejected by policy: {}", pattern))
            }
            GateError::ExecutionFailed { message } => ExError::new(ExErrorKind::ExecutionFailed)
                .with_op("execute")
                .with_message(message),
            GateError::ExecutionTimeout { timeout_ms } => ExError::new(ExErrorKind::Timeout)
                .with_op("execute")
                .with_message(format!("Execution exceeded {}ms", timeout_ms)),
            GateError::UnknownVariant { field, value } => {
                ExError::new(ExErrorKind::Serialization)
                    .with_message(format!("Unknown {} value: {}", field, value))
            }
        }
    }
}
