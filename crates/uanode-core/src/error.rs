// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Node model error types with diagnostics.
//!
//! Every error is local to a single registry, node or enumeration operation
//! and propagates synchronously to the caller. Nothing in this crate retries;
//! [`ModelError::is_recoverable`] tells the host whether rejecting the single
//! request is enough or the model itself is broken.
//!
//! # Error Categories
//!
//! ```text
//! ModelError
//! ├── Schema       - Type registry lookups and model validation
//! ├── Instance     - Node tree operations
//! ├── Enumeration  - Enumeration code decoding
//! └── Defaults     - Encoded default payload decoding
//! ```
//!
//! # Examples
//!
//! ```
//! use uanode_core::error::{ModelError, ErrorSeverity};
//!
//! let error = ModelError::invalid_enum_value("AxisMotionProfileEnumeration", 7);
//! assert!(error.is_recoverable());
//! assert_eq!(error.severity(), ErrorSeverity::Warning);
//! ```

use std::fmt;

use thiserror::Error;
use tracing::Level;

// =============================================================================
// ModelError - Main Error Type
// =============================================================================

/// The main error type for node model operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Type registry and schema validation errors.
    #[error("{0}")]
    Schema(#[from] SchemaError),

    /// Node tree operation errors.
    #[error("{0}")]
    Instance(#[from] InstanceError),

    /// Enumeration decoding errors.
    #[error("{0}")]
    Enumeration(#[from] EnumerationError),

    /// Default payload decoding errors.
    #[error("{0}")]
    Defaults(#[from] DefaultsError),
}

impl ModelError {
    // =========================================================================
    // Convenience Factory Methods
    // =========================================================================

    /// Creates an unknown type error.
    pub fn unknown_type(type_ref: impl Into<String>) -> Self {
        Self::Schema(SchemaError::unknown_type(type_ref))
    }

    /// Creates a replacement type mismatch error.
    pub fn type_mismatch(
        browse_name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Instance(InstanceError::type_mismatch(browse_name, expected, actual))
    }

    /// Creates a stale or unknown node handle error.
    pub fn node_not_found(handle: impl fmt::Display) -> Self {
        Self::Instance(InstanceError::node_not_found(handle))
    }

    /// Creates a stored value type error.
    pub fn wrong_value_type(
        browse_name: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::Instance(InstanceError::WrongValueType {
            browse_name: browse_name.into(),
            expected,
            actual,
        })
    }

    /// Creates an invalid enumeration value error.
    pub fn invalid_enum_value(enumeration: &'static str, code: i32) -> Self {
        Self::Enumeration(EnumerationError::InvalidValue { enumeration, code })
    }

    /// Creates a malformed defaults payload error.
    pub fn malformed_defaults(message: impl Into<String>) -> Self {
        Self::Defaults(DefaultsError::malformed(message))
    }

    // =========================================================================
    // Error Properties
    // =========================================================================

    /// Returns `true` if the host can recover by rejecting the single request.
    ///
    /// Schema and defaults errors mean the loaded model is broken and are
    /// never recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Schema(_) | Self::Defaults(_) => false,
            Self::Instance(e) => e.is_recoverable(),
            Self::Enumeration(_) => true,
        }
    }

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Schema(_) => ErrorSeverity::Critical,
            Self::Instance(e) => e.severity(),
            Self::Enumeration(_) => ErrorSeverity::Warning,
            Self::Defaults(_) => ErrorSeverity::Critical,
        }
    }

    /// Returns the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Schema(_) => "schema",
            Self::Instance(_) => "instance",
            Self::Enumeration(_) => "enumeration",
            Self::Defaults(_) => "defaults",
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Schema(e) => e.error_code(),
            Self::Instance(e) => e.error_code(),
            Self::Enumeration(e) => e.error_code(),
            Self::Defaults(e) => e.error_code(),
        }
    }

    /// Returns recovery hints for this error.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Schema(e) => e.recovery_hints(),
            Self::Instance(e) => e.recovery_hints(),
            Self::Enumeration(_) => vec![
                "Reject the offending value and keep the session open",
                "Check the peer uses the same model version",
            ],
            Self::Defaults(e) => e.recovery_hints(),
        }
    }

    /// Returns the tracing level for this error.
    pub fn tracing_level(&self) -> Level {
        self.severity().to_tracing_level()
    }

    /// Logs this error with appropriate level and context.
    pub fn log(&self, context: &str) {
        let code = self.error_code();

        match self.tracing_level() {
            Level::ERROR => tracing::error!(
                error_code = %code,
                category = self.category(),
                context = context,
                recoverable = self.is_recoverable(),
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                error_code = %code,
                category = self.category(),
                context = context,
                recoverable = self.is_recoverable(),
                "{self}"
            ),
            _ => tracing::debug!(
                error_code = %code,
                category = self.category(),
                context = context,
                recoverable = self.is_recoverable(),
                "{self}"
            ),
        }
    }
}

// =============================================================================
// SchemaError
// =============================================================================

/// Type registry and model validation errors.
///
/// All of these are configuration-time failures.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// No schema is registered for the type reference.
    #[error("Unknown node type: '{type_ref}'")]
    UnknownType {
        /// The NodeId or symbolic name that was looked up.
        type_ref: String,
    },

    /// Two schemas share a type ID.
    #[error("Duplicate node type ID: '{type_id}'")]
    DuplicateType {
        /// The duplicated type ID.
        type_id: String,
    },

    /// Two schemas share a symbolic name.
    #[error("Duplicate symbolic type name: '{name}'")]
    DuplicateSymbolicName {
        /// The duplicated name.
        name: String,
    },

    /// A browse name appears twice in one type's declared children.
    #[error("Duplicate browse name '{browse_name}' in type '{type_name}'")]
    DuplicateBrowseName {
        /// The declaring type.
        type_name: String,
        /// The duplicated browse name.
        browse_name: String,
    },

    /// A subtype redeclares an inherited child incompatibly.
    #[error("Invalid override of '{browse_name}' in type '{type_name}': {reason}")]
    InvalidOverride {
        /// The overriding type.
        type_name: String,
        /// The overridden browse name.
        browse_name: String,
        /// Why the override is rejected.
        reason: String,
    },

    /// The supertype chain loops back on itself.
    #[error("Cyclic supertype chain through type '{type_name}'")]
    CyclicSupertype {
        /// A type on the cycle.
        type_name: String,
    },

    /// Mandatory children form a cycle, so eager instantiation never ends.
    #[error("Mandatory children form a cycle: {path}")]
    MandatoryCycle {
        /// The cycle, rendered as `Type.Child -> Type.Child -> ...`.
        path: String,
    },

    /// A type reference or node ID string could not be parsed.
    #[error("Invalid type reference '{type_ref}': {reason}")]
    InvalidTypeRef {
        /// The offending text.
        type_ref: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl SchemaError {
    /// Creates an unknown type error.
    pub fn unknown_type(type_ref: impl Into<String>) -> Self {
        Self::UnknownType {
            type_ref: type_ref.into(),
        }
    }

    /// Creates a duplicate browse name error.
    pub fn duplicate_browse_name(type_name: impl Into<String>, browse_name: impl Into<String>) -> Self {
        Self::DuplicateBrowseName {
            type_name: type_name.into(),
            browse_name: browse_name.into(),
        }
    }

    /// Creates an invalid override error.
    pub fn invalid_override(
        type_name: impl Into<String>,
        browse_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOverride {
            type_name: type_name.into(),
            browse_name: browse_name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid type reference error.
    pub fn invalid_type_ref(type_ref: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTypeRef {
            type_ref: type_ref.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownType { .. } => ErrorCode::new(1, 1),
            Self::DuplicateType { .. } => ErrorCode::new(1, 2),
            Self::DuplicateSymbolicName { .. } => ErrorCode::new(1, 3),
            Self::DuplicateBrowseName { .. } => ErrorCode::new(1, 4),
            Self::InvalidOverride { .. } => ErrorCode::new(1, 5),
            Self::CyclicSupertype { .. } => ErrorCode::new(1, 6),
            Self::MandatoryCycle { .. } => ErrorCode::new(1, 7),
            Self::InvalidTypeRef { .. } => ErrorCode::new(1, 8),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::UnknownType { .. } => vec![
                "Check that every model file the type depends on is loaded",
                "Verify the namespace index of the type reference",
            ],
            Self::DuplicateType { .. } | Self::DuplicateSymbolicName { .. } => vec![
                "Check that no model file is loaded twice",
                "Give each type a unique NodeId and symbolic name",
            ],
            Self::DuplicateBrowseName { .. } => {
                vec!["Browse names must be unique within a type's children"]
            }
            Self::InvalidOverride { .. } => vec![
                "An override must use the inherited child type or a subtype of it",
                "An override may not relax a mandatory child to optional",
            ],
            Self::CyclicSupertype { .. } => vec!["Fix the super_type chain of the model"],
            Self::MandatoryCycle { .. } => {
                vec!["Make at least one child on the cycle optional"]
            }
            Self::InvalidTypeRef { .. } => vec![
                "Use 'ns=<index>;i=<number>' or a symbolic type name",
            ],
        }
    }
}

// =============================================================================
// InstanceError
// =============================================================================

/// Node tree operation errors.
#[derive(Debug, Error)]
pub enum InstanceError {
    /// A replacement child is not of the slot's declared type.
    #[error("Type mismatch for child '{browse_name}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// The slot browse name.
        browse_name: String,
        /// The declared slot type.
        expected: String,
        /// The replacement's type.
        actual: String,
    },

    /// The handle does not refer to a live node.
    #[error("Node not found: {handle}")]
    NodeNotFound {
        /// The stale or foreign handle.
        handle: String,
    },

    /// A replacement child already belongs to another parent.
    #[error("Node {handle} is already attached elsewhere and cannot become child '{browse_name}'")]
    AlreadyAttached {
        /// The slot browse name.
        browse_name: String,
        /// The replacement handle.
        handle: String,
    },

    /// Installing the child would make a node its own ancestor.
    #[error("Node {handle} cannot become child '{browse_name}' of its own descendant")]
    CyclicAttachment {
        /// The slot browse name.
        browse_name: String,
        /// The replacement handle.
        handle: String,
    },

    /// The parent's type declares no child with this browse name.
    #[error("Type '{type_name}' declares no child '{browse_name}'")]
    NoSuchSlot {
        /// The parent's type.
        type_name: String,
        /// The requested browse name.
        browse_name: String,
    },

    /// A node's stored value does not have the type its reader requires.
    #[error("Node '{browse_name}' holds a {actual} value, expected {expected}")]
    WrongValueType {
        /// The node browse name.
        browse_name: String,
        /// The required variant type.
        expected: &'static str,
        /// Type name of the value found.
        actual: &'static str,
    },
}

impl InstanceError {
    /// Creates a type mismatch error.
    pub fn type_mismatch(
        browse_name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            browse_name: browse_name.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a node not found error.
    pub fn node_not_found(handle: impl fmt::Display) -> Self {
        Self::NodeNotFound {
            handle: handle.to_string(),
        }
    }

    /// Returns `true` if the host can recover by rejecting the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NodeNotFound { .. })
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NodeNotFound { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::TypeMismatch { .. } => ErrorCode::new(2, 1),
            Self::NodeNotFound { .. } => ErrorCode::new(2, 2),
            Self::AlreadyAttached { .. } => ErrorCode::new(2, 3),
            Self::CyclicAttachment { .. } => ErrorCode::new(2, 4),
            Self::NoSuchSlot { .. } => ErrorCode::new(2, 5),
            Self::WrongValueType { .. } => ErrorCode::new(2, 6),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::TypeMismatch { .. } => vec![
                "Create the replacement with the slot's declared type or a subtype",
            ],
            Self::NodeNotFound { .. } => vec![
                "The node was removed; browse again from a live parent",
            ],
            Self::AlreadyAttached { .. } => vec![
                "Detach the node with remove_subtree or create a fresh node",
            ],
            Self::CyclicAttachment { .. } => vec!["Use a node outside the parent's ancestry"],
            Self::NoSuchSlot { .. } => vec![
                "Use find_child for lookups that may miss",
                "Check the browse name against the type's declared children",
            ],
            Self::WrongValueType { .. } => vec![
                "Write the value with the variable's declared data type",
            ],
        }
    }
}

// =============================================================================
// EnumerationError
// =============================================================================

/// Enumeration decoding errors.
#[derive(Debug, Error)]
pub enum EnumerationError {
    /// The integer is not a declared code.
    #[error("Invalid value {code} for enumeration {enumeration}")]
    InvalidValue {
        /// The enumeration name.
        enumeration: &'static str,
        /// The rejected code.
        code: i32,
    },

    /// The symbolic name is not declared.
    #[error("Unknown name '{name}' for enumeration {enumeration}")]
    UnknownName {
        /// The enumeration name.
        enumeration: &'static str,
        /// The rejected name.
        name: String,
    },

    /// The value carrying the code is not an integer.
    #[error("Enumeration {enumeration} expects an Int32 value, got {actual}")]
    WrongValueType {
        /// The enumeration name.
        enumeration: &'static str,
        /// Type name of the value found.
        actual: &'static str,
    },
}

impl EnumerationError {
    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidValue { .. } => ErrorCode::new(3, 1),
            Self::UnknownName { .. } => ErrorCode::new(3, 2),
            Self::WrongValueType { .. } => ErrorCode::new(3, 3),
        }
    }
}

// =============================================================================
// DefaultsError
// =============================================================================

/// Encoded default payload errors.
#[derive(Debug, Error)]
pub enum DefaultsError {
    /// The decoder does not understand the payload version.
    #[error("Unsupported defaults payload version {version} (supported: {supported})")]
    UnsupportedVersion {
        /// The payload version.
        version: u16,
        /// The version the decoder supports.
        supported: u16,
    },

    /// The payload bytes could not be decoded.
    #[error("Malformed defaults payload: {message}")]
    Malformed {
        /// Decoder message.
        message: String,
    },
}

impl DefaultsError {
    /// Creates a malformed payload error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new(4, 1),
            Self::Malformed { .. } => ErrorCode::new(4, 2),
        }
    }

    /// Returns recovery hints.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::UnsupportedVersion { .. } => vec![
                "Regenerate the model with the payload version of the host stack",
            ],
            Self::Malformed { .. } => vec![
                "Regenerate the model description from the NodeSet",
                "Check the payload was not truncated when copied",
            ],
        }
    }
}

// =============================================================================
// ErrorSeverity
// =============================================================================

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational - no action required.
    Info,
    /// Warning - the request is rejected, the model is fine.
    Warning,
    /// Error - a caller bug.
    Error,
    /// Critical - the loaded model is unusable.
    Critical,
}

impl ErrorSeverity {
    /// Converts to tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Info => Level::INFO,
            Self::Warning => Level::WARN,
            Self::Error => Level::ERROR,
            Self::Critical => Level::ERROR,
        }
    }

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// ErrorCode
// =============================================================================

/// Structured error code.
///
/// Format: `NM-XXYY` where XX is category and YY is the specific error.
///
/// Categories:
/// - 1: Schema
/// - 2: Instance
/// - 3: Enumeration
/// - 4: Defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category (1-4).
    pub category: u8,
    /// Specific error within category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }

    /// Returns the full error code as a u16.
    pub fn as_u16(&self) -> u16 {
        ((self.category as u16) << 8) | (self.code as u16)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NM-{:02X}{:02X}", self.category, self.code)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// A Result type with ModelError.
pub type ModelResult<T> = Result<T, ModelError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_is_critical() {
        let error = ModelError::unknown_type("ns=2;i=9999");
        assert_eq!(error.severity(), ErrorSeverity::Critical);
        assert!(!error.is_recoverable());
        assert_eq!(error.category(), "schema");
        assert!(error.to_string().contains("ns=2;i=9999"));
    }

    #[test]
    fn test_type_mismatch_is_caller_error() {
        let error = ModelError::type_mismatch("FlangeLoad", "LoadType", "AxisType");
        assert_eq!(error.severity(), ErrorSeverity::Error);
        assert!(!error.is_recoverable());
        assert!(error.to_string().contains("LoadType"));
        assert!(error.to_string().contains("AxisType"));
    }

    #[test]
    fn test_wrong_value_type_names_both_types() {
        let error = ModelError::wrong_value_type("EmergencyStop", "Boolean", "String");
        assert!(matches!(error, ModelError::Instance(InstanceError::WrongValueType { .. })));
        assert_eq!(error.severity(), ErrorSeverity::Error);
        assert!(!error.is_recoverable());
        assert_eq!(error.error_code(), ErrorCode::new(2, 6));
        assert!(error.to_string().contains("Boolean"));
        assert!(error.to_string().contains("String"));
    }

    #[test]
    fn test_invalid_enum_value_is_recoverable() {
        let error = ModelError::invalid_enum_value("AxisMotionProfileEnumeration", 7);
        assert!(error.is_recoverable());
        assert_eq!(error.tracing_level(), Level::WARN);
        assert!(error.to_string().contains('7'));
    }

    #[test]
    fn test_error_code_format() {
        let code = ErrorCode::new(2, 1);
        assert_eq!(code.to_string(), "NM-0201");
        assert_eq!(code.as_u16(), 0x0201);

        assert_eq!(
            ModelError::malformed_defaults("bad").error_code(),
            ErrorCode::new(4, 2)
        );
    }

    #[test]
    fn test_recovery_hints_present() {
        let error = ModelError::unknown_type("Missing");
        assert!(error
            .recovery_hints()
            .iter()
            .any(|h| h.contains("model file")));
    }
}
