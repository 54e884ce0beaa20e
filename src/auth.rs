//! Sign-in attempt tokens, session identifiers, and session records.

pub mod id;
pub mod secret;
pub mod session;
pub mod state;

pub use id::*;
pub use secret::*;
pub use session::*;
pub use state::*;
