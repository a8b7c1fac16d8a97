// ============================================================================
// Provider : JSON-RPC
// ============================================================================
// Demande les comptes à un wallet bridge local via eth_requestAccounts
// Le code d'erreur 4001 (EIP-1193) signifie un refus de l'utilisateur
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::wallet::{WalletError, WalletProvider};

/// Code JSON-RPC renvoyé quand l'utilisateur refuse la demande (EIP-1193)
const USER_REJECTED_CODE: i64 = 4001;

/// Provider parlant JSON-RPC 2.0 avec un wallet bridge
pub struct RpcWalletProvider {
    http: reqwest::Client,
    endpoint: String,
}

impl RpcWalletProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_requestAccounts",
            "params": [],
        });

        debug!(endpoint = %self.endpoint, "Requesting wallet accounts");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Wallet bridge unreachable");
                WalletError::ProviderUnavailable
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Wallet bridge returned error status");
            return Err(WalletError::ProviderUnavailable);
        }

        let body: RpcResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Malformed wallet bridge response");
            WalletError::ProviderUnavailable
        })?;

        accounts_from_response(body)
    }
}

/// Réponse JSON-RPC du wallet bridge
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Vec<String>>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Convertit la réponse RPC en liste d'adresses ou en erreur wallet
fn accounts_from_response(response: RpcResponse) -> Result<Vec<String>, WalletError> {
    if let Some(error) = response.error {
        warn!(code = error.code, message = %error.message, "Wallet bridge rejected the request");
        return Err(if error.code == USER_REJECTED_CODE {
            WalletError::UserRejected
        } else {
            WalletError::ProviderUnavailable
        });
    }

    match response.result {
        // Une liste vide signifie qu'aucun compte n'a été accordé
        Some(accounts) if !accounts.is_empty() => Ok(accounts),
        Some(_) => Err(WalletError::UserRejected),
        None => Err(WalletError::ProviderUnavailable),
    }
}

// ============================================================================
// Tests
// ============================================================================
