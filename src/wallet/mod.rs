// ============================================================================
// Module : wallet
// ============================================================================
// Connexion au portefeuille via un provider externe (wallet bridge)
//
// Le provider est abstrait derrière un trait pour que les tests puissent en
// substituer un faux. La déconnexion n'existe pas ici : les providers
// n'exposent aucune API de révocation, elle est purement locale (voir App).
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

pub mod rpc; // Provider JSON-RPC (eth_requestAccounts)

pub use rpc::RpcWalletProvider;

/// Échecs de connexion au portefeuille
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WalletError {
    /// Aucun provider configuré ou provider injoignable
    #[error("No wallet provider available")]
    ProviderUnavailable,

    /// L'utilisateur a refusé la demande d'accès aux comptes
    #[error("Wallet connection rejected by user")]
    UserRejected,
}

/// Capacité d'accès aux comptes d'un portefeuille
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Demande l'accès aux comptes : liste ordonnée d'adresses, non vide
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;
}

/// Provider disponible ou non, détecté au démarrage
pub enum WalletCapability {
    Available(Box<dyn WalletProvider>),
    Unavailable,
}

impl WalletCapability {
    /// Construit la capacité depuis le endpoint configuré (env var)
    pub fn detect(endpoint: Option<String>) -> Self {
        match endpoint.filter(|url| !url.trim().is_empty()) {
            Some(url) => {
                info!(endpoint = %url, "Wallet provider configured");
                Self::Available(Box::new(RpcWalletProvider::new(url)))
            }
            None => {
                info!("No wallet provider configured");
                Self::Unavailable
            }
        }
    }

    /// Demande l'accès aux comptes au provider, s'il existe
    pub async fn connect(&self) -> Result<Vec<String>, WalletError> {
        match self {
            Self::Available(provider) => provider.request_accounts().await,
            Self::Unavailable => Err(WalletError::ProviderUnavailable),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProvider {
        accounts: Vec<String>,
    }

    #[async_trait]
    impl WalletProvider for FakeProvider {
        async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
            Ok(self.accounts.clone())
        }
    }

    #[tokio::test]
    async fn test_unavailable_capability() {
        let capability = WalletCapability::detect(None);
        assert_eq!(
            capability.connect().await,
            Err(WalletError::ProviderUnavailable)
        );
    }

    #[tokio::test]
    async fn test_blank_endpoint_is_unavailable() {
        let capability = WalletCapability::detect(Some("   ".to_string()));
        assert_eq!(
            capability.connect().await,
            Err(WalletError::ProviderUnavailable)
        );
    }

    #[tokio::test]
    async fn test_available_capability_delegates() {
        let provider = FakeProvider {
            accounts: vec!["0xabc".to_string()],
        };
        let capability = WalletCapability::Available(Box::new(provider));
        assert_eq!(
            capability.connect().await,
            Ok(vec!["0xabc".to_string()])
        );
    }
}
