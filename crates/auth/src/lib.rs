//! `ledgerdesk-auth` — explicit session context for outgoing collaborator calls.
//!
//! A session is created at login, passed by reference to whatever issues
//! requests, and invalidated explicitly at logout. There is no process-wide
//! token.

pub mod claims;
pub mod session;

pub use claims::{validate_claims, SessionClaims, SessionError};
pub use session::{AccessToken, SessionContext};
