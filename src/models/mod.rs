// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
// ============================================================================

pub mod draft;        // Brouillon du montant de retrait
pub mod notification; // Notification à emplacement unique
pub mod session;      // Session de connexion au portefeuille
pub mod snapshot;     // État calculé côté serveur

// Re-export des structures principales pour simplifier les imports
pub use draft::WithdrawDraft;
pub use notification::{Notification, NotificationKind};
pub use session::Session;
pub use snapshot::{AccountSnapshot, SuggestionAction, TopUpDecision, TradingSuggestion};
