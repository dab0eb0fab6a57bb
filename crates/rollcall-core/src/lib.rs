//! # Rollcall Core
//!
//! Core types, errors, and utilities for the Rollcall API.
//!
//! - [`errors`]: the [`AppError`] type, its [`ErrorKind`] taxonomy and HTTP conversion
//! - [`password`]: bcrypt password hashing and verification
//! - [`serde`]: serde helpers for lenient query-string parsing
//!
//! # Example
//!
//! ```ignore
//! use rollcall_core::{AppError, hash_password};
//!
//! let err = AppError::not_found(anyhow::anyhow!("Leave application not found"));
//! let hash = hash_password("secure_password")?;
//! ```

pub mod errors;
pub mod password;
pub mod serde;

pub use errors::{AppError, ErrorKind, ErrorResponse};
pub use password::{hash_password, verify_password};
