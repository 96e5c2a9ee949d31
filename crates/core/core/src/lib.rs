//! # Workflow360 Core
//!
//! This crate provides the foundational types and traits for the Workflow360
//! account flows. It defines the core data structures (`Session`, `User`,
//! `AuthEvent`), error types, the `IdentityProvider` contract that adapters
//! implement, and the process-wide `SessionStore`.

pub mod error;
pub mod session;
pub mod traits;
pub mod types;
pub mod validate;

// Re-export commonly used items at the crate root
pub use error::{AuthError, AuthResult};
pub use session::{AuthEventStream, SessionStore};
pub use traits::IdentityProvider;
pub use types::{AuthEvent, AuthEventKind, OtpPurpose, Session, User};
pub use validate::{looks_like_email, validate_confirmation, validate_email, PasswordPolicy};
