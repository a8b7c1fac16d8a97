// ============================================================================
// API Client : Backend
// ============================================================================
// Parle au backend qui calcule soldes, minimum de retrait et suggestion
// Le client n'effectue aucun calcul : il lit /status et poste /use-card
// ============================================================================

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::models::{AccountSnapshot, TopUpDecision};

/// Échecs des appels backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// Réponse non-2xx, avec le detail renvoyé par le serveur
    #[error("{detail}")]
    RequestFailed { status: u16, detail: String },

    /// Échec réseau ou réponse illisible
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Corps d'une réponse /status
///
/// Les champs du snapshot sont à plat dans le JSON, la décision est à part :
/// elle n'est jamais conservée, seulement montrée en notification
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub snapshot: AccountSnapshot,

    #[serde(default)]
    pub decision: Option<TopUpDecision>,
}

/// Corps de la requête /use-card
#[derive(Debug, Serialize)]
struct WithdrawRequest<'a> {
    amount: f64,
    currency: &'a str,
    wallet_address: &'a str,
}

/// Corps d'une réponse /use-card acceptée
/// Les trois soldes recalculés par le serveur, le reste du corps est ignoré
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WithdrawResponse {
    pub new_balance: f64,
    pub new_metamask_balance_usd: f64,
    pub new_eth_balance: f64,
}

/// Corps d'une réponse en erreur
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// Client HTTP du backend
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Lit l'état serveur pour une adresse
    #[instrument(skip(self))]
    pub async fn status(&self, wallet_address: &str) -> Result<StatusResponse, ApiError> {
        let url = format!("{}/status", self.base_url);

        debug!("Fetching account status");
        let response = self
            .http
            .get(&url)
            .query(&[("wallet_address", wallet_address)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Le corps d'une erreur /status est ignoré au-delà du log
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Status request failed");
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                detail: format!("Status request failed (HTTP {})", status.as_u16()),
            });
        }

        let parsed: StatusResponse = response.json().await?;
        debug!(card_balance = parsed.snapshot.card_balance, "Received account status");
        Ok(parsed)
    }

    /// Poste une intention de retrait en USD
    #[instrument(skip(self))]
    pub async fn use_card(
        &self,
        amount: f64,
        wallet_address: &str,
    ) -> Result<WithdrawResponse, ApiError> {
        let url = format!("{}/use-card", self.base_url);
        let request = WithdrawRequest {
            amount,
            currency: "USD",
            wallet_address,
        };

        debug!(amount, "Submitting withdrawal");
        let response = self.http.post(&url).json(&request).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| format!("Withdrawal failed (HTTP {})", status.as_u16()));
            warn!(status = %status, detail = %detail, "Withdrawal rejected by server");
            Err(ApiError::RequestFailed {
                status: status.as_u16(),
                detail,
            })
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_withdraw_request_wire_format() {
        let request = WithdrawRequest {
            amount: 100.0,
            currency: "USD",
            wallet_address: "0xabc",
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "amount": 100.0,
                "currency": "USD",
                "wallet_address": "0xabc",
            })
        );
    }

    #[test]
    fn test_status_response_with_decision() {
        let body = r#"{
            "card_balance": 80.0,
            "eth_balance": 0.2,
            "eth_price": 2000.0,
            "gas_price_gwei": 40.0,
            "min_profitable_amount": 50.0,
            "metamask_balance_usd": 400.0,
            "trading_suggestion": {"action": "hold", "amount": 0.0, "reason": "Sideways market"},
            "decision": {"action": "top-up", "reason": "Low balance", "amount": 120.0}
        }"#;

        let parsed: StatusResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.snapshot.card_balance, 80.0);
        assert!(parsed.decision.unwrap().is_top_up());
    }

    #[test]
    fn test_withdraw_response_ignores_extra_fields() {
        // Le serveur renvoie aussi status, amount, tx_hash, min_profitable_amount
        let body = r#"{
            "status": "Card Transaction Successful",
            "amount": 100.0,
            "tx_hash": "0xdeadbeef",
            "new_balance": 50.0,
            "new_metamask_balance_usd": 30.5,
            "new_eth_balance": 0.01,
            "min_profitable_amount": 50.0
        }"#;

        let parsed: WithdrawResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.new_balance, 50.0);
        assert_eq!(parsed.new_metamask_balance_usd, 30.5);
        assert_eq!(parsed.new_eth_balance, 0.01);
    }

    #[test]
    fn test_error_body_detail_is_optional() {
        let with_detail: ErrorBody = serde_json::from_str(r#"{"detail": "Insufficient card balance"}"#).unwrap();
        assert_eq!(with_detail.detail.as_deref(), Some("Insufficient card balance"));

        let without: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(without.detail.is_none());
    }
}
