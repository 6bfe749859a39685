//! Session management
//!
//! The session is one persisted [`Credential`] owned by a [`SessionManager`].
//! The manager decides whether the credential is usable, clears it when it is
//! not, and is the only source of [`AuthHeader`]s for authenticated calls.
//!
//! State machine of the stored credential:
//!
//! ```text
//! Absent --login--> Valid --(wall clock)--> Expired
//!   ^                 |                       |
//!   +-----logout------+----any validity check-+
//! ```

pub mod credential;
pub mod dispatch;
pub mod manager;
pub mod refresh;
pub mod store;
pub mod token;

pub use credential::Credential;
pub use dispatch::AuthHeader;
pub use manager::{SessionManager, SessionState};
pub use refresh::RefreshTask;
pub use store::{FileStore, SessionStore};
