// ============================================================================
// Structure : AccountSnapshot
// ============================================================================
// État calculé côté serveur : soldes, prix, minimum de retrait, suggestion
//
// Invariant : ces champs ne sont jamais calculés côté client. Ils sont
// remplacés en bloc par chaque réponse serveur (réponse /status complète,
// ou les trois soldes d'une réponse /use-card).
// ============================================================================

use serde::Deserialize;

/// Photo des soldes et données marché, telle que calculée par le serveur
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountSnapshot {
    /// Solde de la carte custodiale en USD
    pub card_balance: f64,

    /// Solde ETH du portefeuille connecté
    pub eth_balance: f64,

    /// Prix ETH/USD utilisé par le serveur
    pub eth_price: f64,

    /// Prix du gas en gwei
    pub gas_price_gwei: f64,

    /// Montant minimum de retrait rentable (plancher côté client)
    pub min_profitable_amount: f64,

    /// Valeur USD du portefeuille (eth_balance * eth_price, côté serveur)
    pub metamask_balance_usd: f64,

    /// Suggestion de trading, absente tant que le serveur n'en fournit pas
    #[serde(default)]
    pub trading_suggestion: Option<TradingSuggestion>,
}

/// Action recommandée par le serveur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionAction {
    Buy,
    Sell,
    /// Toute action inconnue retombe sur Hold
    #[serde(other)]
    Hold,
}

/// Suggestion de trading calculée côté serveur
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradingSuggestion {
    pub action: SuggestionAction,
    /// Quantité d'ETH concernée
    pub amount: f64,
    pub reason: String,
}

/// Décision serveur accompagnant un /status
/// Seule action == "top-up" est montrée à l'utilisateur, jamais exécutée
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopUpDecision {
    pub action: String,
    pub reason: String,
    pub amount: f64,
}

impl TopUpDecision {
    /// Vrai si la décision recommande un rechargement de la carte
    pub fn is_top_up(&self) -> bool {
        self.action == "top-up"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_status_body() {
        let body = r#"{
            "card_balance": 200.0,
            "eth_balance": 0.2,
            "eth_price": 2000.0,
            "gas_price_gwei": 32.5,
            "min_profitable_amount": 50.0,
            "metamask_balance_usd": 400.0,
            "trading_suggestion": {"action": "sell", "amount": 0.1, "reason": "Take profit"}
        }"#;

        let snapshot: AccountSnapshot = serde_json::from_str(body).unwrap();
        assert_eq!(snapshot.card_balance, 200.0);
        assert_eq!(snapshot.min_profitable_amount, 50.0);

        let suggestion = snapshot.trading_suggestion.unwrap();
        assert_eq!(suggestion.action, SuggestionAction::Sell);
        assert_eq!(suggestion.amount, 0.1);
    }

    #[test]
    fn test_suggestion_is_optional() {
        let body = r#"{
            "card_balance": 0.0,
            "eth_balance": 0.0,
            "eth_price": 0.0,
            "gas_price_gwei": 0.0,
            "min_profitable_amount": 0.0,
            "metamask_balance_usd": 0.0
        }"#;

        let snapshot: AccountSnapshot = serde_json::from_str(body).unwrap();
        assert!(snapshot.trading_suggestion.is_none());
    }

    #[test]
    fn test_unknown_action_falls_back_to_hold() {
        let body = r#"{"action": "panic", "amount": 0.0, "reason": "?"}"#;
        let suggestion: TradingSuggestion = serde_json::from_str(body).unwrap();
        assert_eq!(suggestion.action, SuggestionAction::Hold);
    }

    #[test]
    fn test_top_up_decision() {
        let top_up = TopUpDecision {
            action: "top-up".to_string(),
            reason: "Low balance".to_string(),
            amount: 50.0,
        };
        assert!(top_up.is_top_up());

        let skip = TopUpDecision {
            action: "skip".to_string(),
            reason: "Balance above threshold".to_string(),
            amount: 0.0,
        };
        assert!(!skip.is_top_up());
    }
}
