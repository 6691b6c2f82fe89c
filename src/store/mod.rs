//! View-model state stores
//!
//! Single-instance state containers holding what the views render: the
//! analysis under review and the authenticated session. Mutation methods
//! call the model layer and replace held state from the server's response;
//! errors propagate to the caller, which routes them to the notification
//! orchestrators for display.

mod analysis;
mod auth;

pub use analysis::AnalysisStore;
pub use auth::AuthStore;
