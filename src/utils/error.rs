use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Target type must be set before building a proxy type")]
    MissingTargetType,

    #[error("Composition proxy target must implement at least one interface. (target: {target})")]
    ContractViolation { target: String },

    #[error("No interfaces to implement for target '{target}' ({examined} examined, none proxiable)")]
    EmptyResolution { target: String, examined: usize },

    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    #[error("Unknown interface: {name}")]
    UnknownInterface { name: String },

    #[error("'{name}' is not an interface")]
    NotAnInterface { name: String },

    #[error("Invalid target type '{name}': {reason}")]
    InvalidTargetType { name: String, reason: String },

    #[error("Invalid base type '{base}': {reason}")]
    InvalidBaseType { base: String, reason: String },

    #[error("Target type '{target}' has no parameterless constructor")]
    NoDefaultConstructor { target: String },

    #[error("Type '{name}' is already registered")]
    DuplicateType { name: String },

    #[error("Member '{member}' of '{target}' has no bound implementation")]
    UnboundMember { target: String, member: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Contract,
    Resolution,
    Metadata,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ProxyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProxyError::MissingTargetType
            | ProxyError::InvalidTargetType { .. }
            | ProxyError::InvalidBaseType { .. }
            | ProxyError::NoDefaultConstructor { .. }
            | ProxyError::MissingConfigError { .. }
            | ProxyError::ConfigValidationError { .. }
            | ProxyError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ProxyError::ContractViolation { .. } => ErrorCategory::Contract,
            ProxyError::EmptyResolution { .. }
            | ProxyError::UnknownType { .. }
            | ProxyError::UnknownInterface { .. }
            | ProxyError::NotAnInterface { .. } => ErrorCategory::Resolution,
            ProxyError::DuplicateType { .. } | ProxyError::UnboundMember { .. } => {
                ErrorCategory::Metadata
            }
            ProxyError::IoError(_) | ProxyError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Contract | ErrorCategory::Resolution => ErrorSeverity::Medium,
            ErrorCategory::Metadata => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ProxyError::MissingTargetType => "Set the target type on the builder before building",
            ProxyError::ContractViolation { .. } => {
                "Make the target implement an interface, or list the interfaces explicitly"
            }
            ProxyError::EmptyResolution { .. } => {
                "All implemented interfaces are marked non-proxiable; force them via the interfaces list"
            }
            ProxyError::UnknownType { .. } | ProxyError::UnknownInterface { .. } => {
                "Register the type in the metadata registry or fix the name"
            }
            ProxyError::NotAnInterface { .. } => "Only interfaces can be listed as proxy interfaces",
            ProxyError::InvalidTargetType { .. } => "Use a concrete type as the composition target",
            ProxyError::InvalidBaseType { .. } => {
                "Use a base type unrelated to the target that implements no interfaces"
            }
            ProxyError::NoDefaultConstructor { .. } => {
                "Give the target type a parameterless constructor"
            }
            ProxyError::DuplicateType { .. } => "Each type name may only be registered once",
            ProxyError::UnboundMember { .. } => {
                "Bind an implementation to the target member, or use plan() for metadata-only types"
            }
            ProxyError::MissingConfigError { .. }
            | ProxyError::ConfigValidationError { .. }
            | ProxyError::InvalidConfigValueError { .. } => "Check the configuration file",
            ProxyError::IoError(_) => "Check that the file exists and is readable",
            ProxyError::SerializationError(_) => "Check the data format",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Contract => format!("Target contract violated: {}", self),
            ErrorCategory::Resolution => format!("Could not resolve proxy interfaces: {}", self),
            ErrorCategory::Metadata => format!("Type metadata problem: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

/// 代理執行期的呼叫錯誤
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvocationError {
    /// Raised by a target member body; proxies hand it back untouched.
    #[error("{kind}: {message}")]
    Raised { kind: String, message: String },

    #[error("Interface '{interface}' has no member '{member}'")]
    MissingMember { interface: String, member: String },

    #[error("Arguments do not match any overload of '{interface}.{member}'")]
    ArgumentMismatch { interface: String, member: String },
}

impl InvocationError {
    pub fn raised(kind: impl Into<String>, message: impl Into<String>) -> Self {
        InvocationError::Raised {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
