//! # Rollcall Auth
//!
//! - [`claims`]: the JWT claim structure
//! - [`jwt`]: token creation and verification
//! - [`policy`]: the [`Caller`] context and the authorization decision
//!   function every operation consults
//!
//! # Example
//!
//! ```ignore
//! use rollcall_auth::{Caller, Operation, Target, authorize};
//!
//! authorize(&caller, Operation::ReviewLeave, &Target::None)?;
//! ```

pub mod claims;
pub mod jwt;
pub mod policy;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
pub use policy::{Caller, Operation, Target, allow, authorize};
