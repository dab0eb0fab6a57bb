//! # Rollcall CLI
//!
//! Administrative tooling for Rollcall: creating administrator accounts and
//! filling a development database with fake classes, people and attendance.
//!
//! ## Usage
//!
//! ```ignore
//! use rollcall_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::new(4); // 4 classes with defaults
//! seed_all(&pool, config).await?;
//! ```

pub mod seeder;
