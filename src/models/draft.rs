// ============================================================================
// Structure : WithdrawDraft
// ============================================================================
// Brouillon du montant de retrait, texte brut non validé jusqu'au submit
// Vidé uniquement après un retrait accepté par le serveur
// ============================================================================

/// Saisie en cours du montant de retrait
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawDraft {
    pub amount_text: String,
}

impl WithdrawDraft {
    /// Ajoute un caractère à la saisie
    pub fn push_char(&mut self, c: char) {
        self.amount_text.push(c);
    }

    /// Supprime le dernier caractère
    pub fn backspace(&mut self) {
        self.amount_text.pop();
    }

    /// Vide la saisie
    pub fn clear(&mut self) {
        self.amount_text.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.amount_text.is_empty()
    }

    /// Montant saisi, si le texte est un nombre fini
    pub fn parse(&self) -> Option<f64> {
        self.amount_text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite())
    }
}

// ============================================================================
// Tests
// ============================================================================
