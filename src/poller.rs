// ============================================================================
// Status Poller
// ============================================================================
// Rafraîchit périodiquement l'état serveur pour l'adresse suivie
//
// Cycle de vie : un poller existe seulement quand une session a une adresse.
// L'appelant doit l'arrêter quand l'adresse change ou quand la vue disparaît,
// sinon un timer fantôme continuerait d'écrire dans l'état.
//
// Échec d'un tick (réseau, non-2xx) : log seulement, aucun changement d'état,
// aucune notification, le tick suivant repart normalement.
// ============================================================================

use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::api::{ApiError, StatusResponse};

/// Résultat d'un tick de polling, appliqué sur le thread UI
#[derive(Debug)]
pub struct PollUpdate {
    /// Adresse pour laquelle le statut a été lu
    /// L'appelant ignore les mises à jour d'une adresse périmée
    pub address: String,
    pub response: StatusResponse,
}

/// Poignée d'annulation du poller
///
/// L'annulation passe par la fermeture du canal : stop() lâche le Sender,
/// le thread du poller le détecte et sort de sa boucle. Option::take garantit
/// une libération unique, et Drop appelle stop() si l'appelant a oublié.
pub struct StatusPoller {
    cancel_tx: Option<mpsc::Sender<()>>,
}

impl StatusPoller {
    /// Démarre le polling pour une adresse
    ///
    /// Le premier fetch part immédiatement, les suivants toutes les
    /// `interval`. `fetch` s'exécute dans le thread du poller.
    pub fn spawn<F>(
        address: String,
        interval: Duration,
        mut fetch: F,
        update_tx: mpsc::Sender<PollUpdate>,
    ) -> Self
    where
        F: FnMut(&str) -> Result<StatusResponse, ApiError> + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

        std::thread::spawn(move || {
            info!(address = %address, ?interval, "Status poller started");

            loop {
                match fetch(&address) {
                    Ok(response) => {
                        // Un poller annulé pendant le fetch ne publie rien
                        if !matches!(cancel_rx.try_recv(), Err(TryRecvError::Empty)) {
                            break;
                        }
                        let update = PollUpdate {
                            address: address.clone(),
                            response,
                        };
                        if update_tx.send(update).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        // Dégradation silencieuse : l'état reste inchangé
                        error!(address = %address, error = %e, "Status poll failed");
                    }
                }

                match cancel_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    _ => break,
                }
            }

            debug!(address = %address, "Status poller stopped");
        });

        Self {
            cancel_tx: Some(cancel_tx),
        }
    }

    /// Annule le poller : idempotent, la ressource n'est libérée qu'une fois
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel_tx.take() {
            drop(cancel);
            debug!("Status poller cancellation requested");
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// Tests
// ============================================================================
