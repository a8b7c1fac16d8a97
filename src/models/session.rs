// ============================================================================
// Structure : Session
// ============================================================================
// Session wallet : liste ordonnée des adresses accordées par le provider
// Seule la première adresse est utilisée par le reste de l'application
// ============================================================================

/// Session de connexion au portefeuille
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Indique si un portefeuille est connecté
    pub connected: bool,

    /// Adresses accordées par le provider, dans l'ordre reçu
    pub accounts: Vec<String>,
}

impl Session {
    /// Ouvre une session avec les adresses accordées
    pub fn open(accounts: Vec<String>) -> Self {
        Self {
            connected: true,
            accounts,
        }
    }

    /// Ferme la session : purement local, aucun appel provider
    pub fn close(&mut self) {
        self.connected = false;
        self.accounts.clear();
    }

    /// Première adresse de la session, si connecté
    pub fn primary_address(&self) -> Option<&str> {
        if self.connected {
            self.accounts.first().map(String::as_str)
        } else {
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
