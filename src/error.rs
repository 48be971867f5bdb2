//! # Error Types
//!
//! Hierarchical error type for slice planning and register derivation.
//! Each variant carries enough context to diagnose a failure without a
//! register dump: the field or feature involved and the reason.
//!
//! ## Taxonomy
//!
//! - `Config`: a frame configuration field failed validation
//! - `Capability`: the request is valid but the hardware cannot do it
//! - `PhaseOverflow`: scaler initial phase could not be folded under the limit
//! - `Geometry`: derived slice geometry became inconsistent
//! - `Timeout`: direct-mode slice completion wait expired
//! - `State`: an operation was attempted in the wrong lifecycle state

use std::{error::Error as StdError, fmt};

use slice_core::PlanError;

/// Base error type for the slice pipeline.
#[derive(Debug)]
pub enum IspError {
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
    },
    /// Valid request the hardware family cannot satisfy
    Capability {
        feature: String,
        reason: String,
    },
    /// Scaler initial phase overflow after fold-back
    PhaseOverflow {
        axis: &'static str,
        slice: u32,
        phase_int: u32,
    },
    /// Derived geometry inconsistency
    Geometry {
        item: String,
        reason: String,
    },
    /// Timeout errors
    Timeout {
        operation: String,
        duration_ms: u64,
    },
    /// State errors (invalid state transitions)
    State {
        current_state: String,
        attempted_operation: String,
        reason: String,
    },
}

impl IspError {
    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a capability error
    pub fn capability(feature: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Capability {
            feature: feature.into(),
            reason: reason.into(),
        }
    }

    /// Create a phase overflow error
    pub fn phase_overflow(axis: &'static str, slice: u32, phase_int: u32) -> Self {
        Self::PhaseOverflow { axis, slice, phase_int }
    }

    /// Create a geometry error
    pub fn geometry(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Geometry {
            item: item.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration_ms,
        }
    }

    /// Create a state error
    pub fn state(
        current_state: impl Into<String>,
        attempted_operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::State {
            current_state: current_state.into(),
            attempted_operation: attempted_operation.into(),
            reason: reason.into(),
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Capability { .. } => "capability",
            Self::PhaseOverflow { .. } => "phase_overflow",
            Self::Geometry { .. } => "geometry",
            Self::Timeout { .. } => "timeout",
            Self::State { .. } => "state",
        }
    }

    /// Whether the failure is permanent for this configuration. Timeouts may
    /// clear on the next frame; everything else needs a config change.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Timeout { .. })
    }
}

impl fmt::Display for IspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IspError::Config { field, value, reason } => {
                write!(
                    f,
                    "Configuration error in '{}': {} (value: {})",
                    field, reason, value
                )
            }
            IspError::Capability { feature, reason } => {
                write!(f, "Unsupported by hardware for {}: {}", feature, reason)
            }
            IspError::PhaseOverflow { axis, slice, phase_int } => {
                write!(
                    f,
                    "Scaler {} initial phase overflow on slice {} (ip_int {} after fold)",
                    axis, slice, phase_int
                )
            }
            IspError::Geometry { item, reason } => {
                write!(f, "Geometry error in {}: {}", item, reason)
            }
            IspError::Timeout { operation, duration_ms } => {
                write!(f, "Timeout during {} after {}ms", operation, duration_ms)
            }
            IspError::State {
                current_state,
                attempted_operation,
                reason,
            } => {
                write!(
                    f,
                    "Invalid state transition from '{}' when attempting '{}': {}",
                    current_state, attempted_operation, reason
                )
            }
        }
    }
}

impl StdError for IspError {}

impl From<PlanError> for IspError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::EmptyFrame => Self::config("frame_in", "0x0", "frame has zero size"),
            PlanError::LineBufferTooSmall { line_buffer_len, min } => Self::config(
                "line_buffer_len",
                line_buffer_len.to_string(),
                format!("must exceed worst-case overlap {}", min),
            ),
            PlanError::GridTooLarge { cols, rows } => Self::capability(
                "slice_grid",
                format!("{}x{} slice grid exceeds the hardware table", cols, rows),
            ),
        }
    }
}

/// Result type alias using our custom error type
pub type IspResult<T> = Result<T, IspError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = IspError::config("line_buffer_len", "0", "must be greater than 0");
        assert_eq!(error.category(), "config");
        assert!(error.is_fatal());
    }

    #[test]
    fn test_timeout_not_fatal() {
        let error = IspError::timeout("slice_done", 500);
        assert_eq!(error.category(), "timeout");
        assert!(!error.is_fatal());
    }

    #[test]
    fn test_plan_error_conversion() {
        let error: IspError = PlanError::GridTooLarge { cols: 16, rows: 2 }.into();
        assert_eq!(error.category(), "capability");
        assert!(error.to_string().contains("16x2"));
    }

    #[test]
    fn test_phase_overflow_display() {
        let error = IspError::phase_overflow("horizontal", 1, 18);
        assert!(error.to_string().contains("slice 1"));
        assert!(error.to_string().contains("18"));
    }
}
