//! Command validation errors.
//!
//! Two failure families, both deterministic functions of the current vector
//! state and therefore always recoverable by correcting the offending
//! fields and materializing again:
//!
//! - [`AmbiguousAction`]: the command's net effect on some element is
//!   undefined, or content sits in a field whose capability was removed.
//! - [`IllegalAction`]: a value cannot be digested (shape/type) or lies
//!   outside its field's domain.

use crate::error::{ErrorSeverity, GridError};

use crate::action::types::FieldKey;

// ============================================================================
// Ambiguity
// ============================================================================

/// The command's net effect is undefined and the simulator must not see it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AmbiguousAction {
    /// A line is both forced and toggled in the same command.
    #[error("line {line}: set_line_status and switch_line_status both target this line")]
    LineStatusConflict { line: usize },

    /// A connectivity slot is both assigned and toggled in the same command.
    #[error("topology slot {slot}: set_topo_vect and change_bus_vect both target this slot")]
    BusAssignmentConflict { slot: usize },

    /// Content survived in a field whose capability this instance removed.
    #[error("the field \"{field}\" carries values, but this action's capability set forbids it")]
    RemovedCapability { field: FieldKey },
}

impl GridError for AmbiguousAction {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::LineStatusConflict { .. } => "ACTION_LINE_STATUS_CONFLICT",
            Self::BusAssignmentConflict { .. } => "ACTION_BUS_ASSIGNMENT_CONFLICT",
            Self::RemovedCapability { .. } => "ACTION_REMOVED_CAPABILITY",
        }
    }
}

// ============================================================================
// Domain / Shape Violations
// ============================================================================

/// A supplied value cannot be represented or lies outside its field's domain.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IllegalAction {
    /// A dense vector or mask does not match the field's fixed length.
    #[error("\"{field}\" expects {expected} entries, got {got}")]
    LengthMismatch {
        field: FieldKey,
        expected: usize,
        got: usize,
    },

    /// A sparse entry or toggle index addresses a slot that does not exist.
    #[error("\"{field}\" index {index} is out of range for {len} entries")]
    IndexOutOfRange {
        field: FieldKey,
        index: usize,
        len: usize,
    },

    /// A loose entry supplied a value shape the field cannot digest.
    #[error("\"{field}\" cannot be digested from {got}")]
    TypeMismatch { field: FieldKey, got: &'static str },

    /// A forced line status outside {-1, 0, 1}.
    #[error("line {line}: {value} is not a valid forced status (expected -1, 0 or 1)")]
    LineStatusOutOfRange { line: usize, value: i32 },

    /// A bus assignment below -1 or above the layout's busbar count.
    #[error("topology slot {slot}: bus {value} is outside -1..={max_bus}")]
    BusOutOfRange {
        slot: usize,
        value: i32,
        max_bus: u32,
    },

    /// An injection vector sized inconsistently with the grid's elements.
    #[error("injection \"{key}\" expects {expected} entries, got {got}")]
    InjectionLengthMismatch {
        key: String,
        expected: usize,
        got: usize,
    },

    /// A redispatch amount that is NaN or infinite.
    #[error("generator {generator}: redispatch amount must be finite")]
    NonFiniteRedispatch { generator: usize },
}

impl GridError for IllegalAction {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::LengthMismatch { .. } => "ACTION_LENGTH_MISMATCH",
            Self::IndexOutOfRange { .. } => "ACTION_INDEX_OUT_OF_RANGE",
            Self::TypeMismatch { .. } => "ACTION_TYPE_MISMATCH",
            Self::LineStatusOutOfRange { .. } => "ACTION_LINE_STATUS_OUT_OF_RANGE",
            Self::BusOutOfRange { .. } => "ACTION_BUS_OUT_OF_RANGE",
            Self::InjectionLengthMismatch { .. } => "ACTION_INJECTION_LENGTH_MISMATCH",
            Self::NonFiniteRedispatch { .. } => "ACTION_NON_FINITE_REDISPATCH",
        }
    }
}

// ============================================================================
// Materialization Error
// ============================================================================

/// Any failure [`materialize`](crate::action::Action::materialize) can report.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Ambiguous(#[from] AmbiguousAction),

    #[error(transparent)]
    Illegal(#[from] IllegalAction),
}

impl GridError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Ambiguous(err) => err.severity(),
            Self::Illegal(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Ambiguous(err) => err.error_code(),
            Self::Illegal(err) => err.error_code(),
        }
    }
}
