//! Unified error codes for the map tooling
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Geometry and validation errors
//! - 2xxx: Interaction errors (draw/drag state machine)
//! - 9xxx: Storage and system errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Codes are represented as u16 values for efficient serialization and
/// cross-language compatibility (Rust, TypeScript frontend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 4,

    // ==================== 1xxx: Geometry ====================
    /// Polygon has fewer than three vertices
    PolygonTooSmall = 1001,
    /// Region floor set would become empty
    EmptyFloorSet = 1002,
    /// Vertex index outside the target polygon
    VertexOutOfRange = 1003,

    // ==================== 2xxx: Interaction ====================
    /// A draw session is already active
    DrawBusy = 2001,
    /// A vertex drag is already active
    DragBusy = 2002,
    /// No draw or drag session is active
    NoActiveSession = 2003,
    /// Operation requires a selected region
    RegionNotSelected = 2004,

    // ==================== 9xxx: System ====================
    /// Persistent store operation failed
    StorageError = 9001,
    /// Change subscription fell behind and was resynchronized
    SubscriptionLagged = 9002,
    /// Internal error
    InternalError = 9003,
}

/// Error category, derived from the code range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Geometry,
    Interaction,
    System,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",

            // Geometry
            ErrorCode::PolygonTooSmall => "Polygon needs at least three vertices",
            ErrorCode::EmptyFloorSet => "A region must keep at least one floor",
            ErrorCode::VertexOutOfRange => "Vertex index is outside the polygon",

            // Interaction
            ErrorCode::DrawBusy => "A draw session is already in progress",
            ErrorCode::DragBusy => "A vertex drag is already in progress",
            ErrorCode::NoActiveSession => "No draw or drag session is active",
            ErrorCode::RegionNotSelected => "No region is selected",

            // System
            ErrorCode::StorageError => "Persistent store operation failed",
            ErrorCode::SubscriptionLagged => "Change subscription lagged behind",
            ErrorCode::InternalError => "Internal error",
        }
    }

    /// Get the category for this error code
    pub const fn category(&self) -> ErrorCategory {
        match self.code() {
            1000..=1999 => ErrorCategory::Geometry,
            2000..=2999 => ErrorCategory::Interaction,
            9000..=9999 => ErrorCategory::System,
            _ => ErrorCategory::General,
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an invalid u16 to an ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::InvalidRequest),
            1001 => Ok(ErrorCode::PolygonTooSmall),
            1002 => Ok(ErrorCode::EmptyFloorSet),
            1003 => Ok(ErrorCode::VertexOutOfRange),
            2001 => Ok(ErrorCode::DrawBusy),
            2002 => Ok(ErrorCode::DragBusy),
            2003 => Ok(ErrorCode::NoActiveSession),
            2004 => Ok(ErrorCode::RegionNotSelected),
            9001 => Ok(ErrorCode::StorageError),
            9002 => Ok(ErrorCode::SubscriptionLagged),
            9003 => Ok(ErrorCode::InternalError),
            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
