//! Unified error system for the map tooling
//!
//! - [`ErrorCode`]: standardized codes for all error types
//! - [`ErrorCategory`]: classification of errors by domain
//! - [`AppError`]: rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Geometry and validation errors
//! - 2xxx: Interaction errors
//! - 9xxx: Storage and system errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::PolygonTooSmall);
//! let err = AppError::validation("floor list must not be empty")
//!     .with_detail("field", "floors");
//! ```

mod codes;
mod types;

pub use codes::{ErrorCategory, ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
