// ============================================================================
// LazyCard - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

use std::time::Duration;

pub mod api;    // Client HTTP du backend (/status, /use-card)
pub mod app;    // État de l'application
pub mod models; // Structures de données
pub mod poller; // Rafraîchissement périodique du statut
pub mod ui;     // Interface utilisateur
pub mod wallet; // Connexion au portefeuille

/// URL de base du backend par défaut
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Variable d'environnement pour remplacer l'URL du backend
pub const BACKEND_URL_ENV: &str = "LAZYCARD_BACKEND_URL";

/// Variable d'environnement pointant vers le endpoint JSON-RPC du wallet bridge
/// Absente : aucun provider disponible, la connexion échoue localement
pub const WALLET_RPC_ENV: &str = "LAZYCARD_WALLET_RPC_URL";

/// Intervalle entre deux rafraîchissements du statut
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);
