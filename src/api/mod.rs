// ============================================================================
// Module : api
// ============================================================================
// Client HTTP du backend : /status (lecture) et /use-card (retrait)
// ============================================================================

pub mod backend; // Client du backend lazycard

// Re-export des types principaux
pub use backend::{ApiError, BackendClient, StatusResponse, WithdrawResponse};
