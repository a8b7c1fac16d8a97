// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Les champs du snapshot viennent exclusivement des réponses serveur
// ============================================================================

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{StatusResponse, WithdrawResponse};
use crate::models::{AccountSnapshot, Notification, Session, WithdrawDraft};

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : soldes, suggestion, notification
    Dashboard,

    /// Mode saisie : capture du montant de retrait
    /// Enter valide, ESC annule (le brouillon est conservé)
    WithdrawInput,
}

/// Préconditions locales d'un retrait, vérifiées avant tout appel réseau
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Connect your wallet first")]
    NotConnected,

    #[error("Enter a valid amount greater than zero")]
    InvalidAmount,
}

/// Retrait validé localement, prêt à partir vers le backend
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalOrder {
    pub amount: f64,
    pub address: String,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Session de connexion au portefeuille
    pub session: Session,

    /// Dernier état serveur connu, remplacé en bloc à chaque réponse
    pub snapshot: AccountSnapshot,

    /// Notification courante : une nouvelle remplace la précédente
    pub notification: Option<Notification>,

    /// Saisie en cours du montant de retrait
    pub draft: WithdrawDraft,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Two-step quit : première pression de 'q' arme la confirmation
    pub confirm_quit: bool,

    /// Two-step disconnect : première pression de 'd' arme la confirmation
    pub confirm_disconnect: bool,

    /// Indique si une opération réseau est en cours (worker)
    pub is_loading: bool,

    /// Message affiché pendant le chargement
    pub loading_message: Option<String>,

    /// Heure du dernier rafraîchissement appliqué
    pub last_refresh: Option<DateTime<Local>>,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            session: Session::default(),
            snapshot: AccountSnapshot::default(),
            notification: None,
            draft: WithdrawDraft::default(),
            current_screen: Screen::Dashboard,
            confirm_quit: false,
            confirm_disconnect: false,
            is_loading: false,
            loading_message: None,
            last_refresh: None,
        }
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Session wallet
    // ========================================================================

    /// Applique une connexion acceptée par le provider
    pub fn connect_succeeded(&mut self, accounts: Vec<String>) {
        info!(accounts = accounts.len(), "Wallet connected");
        self.session = Session::open(accounts);
        let message = match self.session.primary_address() {
            Some(address) => format!("Wallet connected: {}", address),
            None => "Wallet connected".to_string(),
        };
        self.notify(Notification::success(message));
    }

    /// Applique un échec de connexion : la session reste déconnectée
    pub fn connect_failed(&mut self, message: &str) {
        warn!(error = message, "Wallet connection failed");
        self.notify(Notification::error(message));
    }

    pub fn request_disconnect(&mut self) {
        self.confirm_disconnect = true;
    }

    pub fn cancel_disconnect(&mut self) {
        self.confirm_disconnect = false;
    }

    pub fn is_awaiting_disconnect_confirmation(&self) -> bool {
        self.confirm_disconnect
    }

    /// Déconnexion purement locale : aucun appel provider
    ///
    /// Seule la valeur USD du portefeuille est remise à zéro, le reste du
    /// snapshot garde sa dernière valeur serveur
    pub fn disconnect(&mut self) {
        info!("Wallet disconnected");
        self.session.close();
        self.snapshot.metamask_balance_usd = 0.0;
        self.confirm_disconnect = false;
        self.notify(Notification::info("Wallet disconnected"));
    }

    // ========================================================================
    // Réconciliation des réponses serveur
    // ========================================================================

    /// Remplace le snapshot entier par une réponse /status
    ///
    /// Les mises à jour d'une adresse périmée (session fermée ou adresse
    /// changée depuis le départ de la requête) sont ignorées
    pub fn apply_status(&mut self, address: &str, response: StatusResponse) {
        if self.session.primary_address() != Some(address) {
            debug!(address, "Dropping status update for stale address");
            return;
        }

        self.snapshot = response.snapshot;
        self.last_refresh = Some(Local::now());

        // Décision serveur : seule "top-up" est montrée, jamais exécutée
        if let Some(decision) = response.decision {
            if decision.is_top_up() {
                self.notify(Notification::warning(format!(
                    "Low card balance! {} Auto top-up amount: ${}",
                    decision.reason, decision.amount
                )));
            }
        }
    }

    /// Applique une réponse /use-card acceptée
    ///
    /// Exactement trois champs remplacés, recalculés par le serveur, puis le
    /// brouillon est vidé
    pub fn apply_withdrawal(&mut self, amount: f64, response: &WithdrawResponse) {
        self.snapshot.card_balance = response.new_balance;
        self.snapshot.metamask_balance_usd = response.new_metamask_balance_usd;
        self.snapshot.eth_balance = response.new_eth_balance;
        self.draft.clear();
        self.notify(Notification::success(format!(
            "Withdrew ${:.2}. Card balance: ${:.2}, wallet balance: ${:.2}",
            amount, response.new_balance, response.new_metamask_balance_usd
        )));
    }

    /// Applique un refus de retrait : aucun état modifié, seulement le detail
    pub fn withdrawal_failed(&mut self, detail: &str) {
        warn!(detail, "Withdrawal rejected");
        self.notify(Notification::error(detail));
    }

    // ========================================================================
    // Retrait : saisie et préconditions
    // ========================================================================

    /// Entre en mode saisie du montant (le brouillon précédent est conservé)
    pub fn start_withdraw_input(&mut self) {
        self.cancel_quit();
        self.cancel_disconnect();
        self.current_screen = Screen::WithdrawInput;
    }

    /// Annule la saisie sans toucher au brouillon
    pub fn cancel_withdraw_input(&mut self) {
        self.current_screen = Screen::Dashboard;
    }

    pub fn is_in_withdraw_input(&self) -> bool {
        self.current_screen == Screen::WithdrawInput
    }

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    pub fn push_draft_char(&mut self, c: char) {
        self.draft.push_char(c);
    }

    pub fn draft_backspace(&mut self) {
        self.draft.backspace();
    }

    /// Éligibilité du retrait, redérivée à chaque frappe : jamais de cache
    pub fn withdraw_enabled(&self) -> bool {
        self.draft
            .parse()
            .map_or(false, |amount| amount >= self.snapshot.min_profitable_amount)
    }

    /// Vérifie les préconditions locales d'un retrait
    pub fn check_withdrawal(&self) -> Result<WithdrawalOrder, SubmitError> {
        let address = self
            .session
            .primary_address()
            .ok_or(SubmitError::NotConnected)?;
        let amount = self
            .draft
            .parse()
            .filter(|amount| *amount > 0.0)
            .ok_or(SubmitError::InvalidAmount)?;

        Ok(WithdrawalOrder {
            amount,
            address: address.to_string(),
        })
    }

    /// Valide la saisie et retourne l'ordre à poster, ou notifie l'échec
    ///
    /// None signifie qu'aucune requête réseau ne doit partir
    pub fn begin_withdrawal(&mut self) -> Option<WithdrawalOrder> {
        let order = match self.check_withdrawal() {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "Withdrawal blocked locally");
                self.notify(Notification::error(e.to_string()));
                return None;
            }
        };

        // Plancher serveur appliqué côté client, avant tout appel réseau
        if order.amount < self.snapshot.min_profitable_amount {
            self.notify(Notification::warning(format!(
                "Minimum withdrawal amount is ${:.2}",
                self.snapshot.min_profitable_amount
            )));
            return None;
        }

        self.current_screen = Screen::Dashboard;
        Some(order)
    }

    // ========================================================================
    // Notification et chargement
    // ========================================================================

    /// Remplace la notification courante (emplacement unique, pas de file)
    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::{NotificationKind, TopUpDecision, TradingSuggestion, SuggestionAction};

    fn status_response(snapshot: AccountSnapshot, decision: Option<TopUpDecision>) -> StatusResponse {
        StatusResponse { snapshot, decision }
    }

    fn connected_app(address: &str) -> App {
        let mut app = App::new();
        app.connect_succeeded(vec![address.to_string()]);
        app.notification = None;
        app
    }

    #[test]
    fn test_connect_establishes_session() {
        let mut app = App::new();
        app.connect_succeeded(vec!["0xabc".to_string(), "0xdef".to_string()]);

        assert!(app.session.connected);
        assert_eq!(app.session.accounts[0], "0xabc");
        assert_eq!(app.session.primary_address(), Some("0xabc"));
        assert_eq!(
            app.notification.as_ref().unwrap().kind,
            NotificationKind::Success
        );
    }

    #[test]
    fn test_connect_failed_leaves_session_closed() {
        let mut app = App::new();
        app.connect_failed("No wallet provider available");

        assert!(!app.session.connected);
        assert_eq!(
            app.notification.as_ref().unwrap().kind,
            NotificationKind::Error
        );
    }

    #[test]
    fn test_disconnect_resets_session_and_wallet_value() {
        let mut app = connected_app("0xabc");
        app.snapshot.card_balance = 200.0;
        app.snapshot.metamask_balance_usd = 400.0;
        app.snapshot.eth_balance = 0.2;

        app.disconnect();

        assert!(!app.session.connected);
        assert!(app.session.accounts.is_empty());
        assert_eq!(app.snapshot.metamask_balance_usd, 0.0);
        // Les autres champs gardent leur dernière valeur serveur
        assert_eq!(app.snapshot.card_balance, 200.0);
        assert_eq!(app.snapshot.eth_balance, 0.2);
        assert_eq!(
            app.notification.as_ref().unwrap().kind,
            NotificationKind::Info
        );
    }

    #[test]
    fn test_apply_status_replaces_snapshot_wholesale() {
        let mut app = connected_app("0xabc");
        app.snapshot.card_balance = 999.0;

        let snapshot = AccountSnapshot {
            card_balance: 200.0,
            eth_balance: 0.2,
            eth_price: 2000.0,
            gas_price_gwei: 32.5,
            min_profitable_amount: 50.0,
            metamask_balance_usd: 400.0,
            trading_suggestion: Some(TradingSuggestion {
                action: SuggestionAction::Buy,
                amount: 0.1,
                reason: "Dip".to_string(),
            }),
        };
        app.apply_status("0xabc", status_response(snapshot.clone(), None));

        assert_eq!(app.snapshot, snapshot);
        assert!(app.last_refresh.is_some());
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_stale_address_update_is_dropped() {
        let mut app = connected_app("0xabc");
        let before = app.snapshot.clone();

        let snapshot = AccountSnapshot {
            card_balance: 123.0,
            ..Default::default()
        };
        app.apply_status("0xdef", status_response(snapshot, None));

        assert_eq!(app.snapshot, before);
        assert!(app.last_refresh.is_none());
    }

    #[test]
    fn test_disconnected_update_is_dropped() {
        let mut app = App::new();
        let snapshot = AccountSnapshot {
            card_balance: 123.0,
            ..Default::default()
        };
        app.apply_status("0xabc", status_response(snapshot, None));

        assert_eq!(app.snapshot, AccountSnapshot::default());
    }

    #[test]
    fn test_non_top_up_decision_never_warns() {
        let mut app = connected_app("0xabc");
        let decision = TopUpDecision {
            action: "skip".to_string(),
            reason: "Balance above threshold".to_string(),
            amount: 0.0,
        };
        app.apply_status(
            "0xabc",
            status_response(AccountSnapshot::default(), Some(decision)),
        );

        assert!(app.notification.is_none());
    }

    #[test]
    fn test_top_up_decision_warning_message() {
        let mut app = connected_app("0xabc");
        let decision = TopUpDecision {
            action: "top-up".to_string(),
            reason: "Low balance".to_string(),
            amount: 50.0,
        };
        app.apply_status(
            "0xabc",
            status_response(AccountSnapshot::default(), Some(decision)),
        );

        let notification = app.notification.unwrap();
        assert_eq!(notification.kind, NotificationKind::Warning);
        assert_eq!(
            notification.message,
            "Low card balance! Low balance. Auto top-up amount: $50"
        );
    }

    #[test]
    fn test_submit_rejects_invalid_amounts() {
        for text in ["0", "-5", "abc"] {
            let mut app = connected_app("0xabc");
            app.draft.amount_text = text.to_string();

            assert_eq!(app.begin_withdrawal(), None, "amount {:?}", text);
            let notification = app.notification.unwrap();
            assert_eq!(notification.kind, NotificationKind::Error);
            assert_eq!(notification.message, SubmitError::InvalidAmount.to_string());
        }
    }

    #[test]
    fn test_submit_requires_connection() {
        let mut app = App::new();
        app.draft.amount_text = "100".to_string();

        assert_eq!(app.begin_withdrawal(), None);
        let notification = app.notification.unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, SubmitError::NotConnected.to_string());
    }

    #[test]
    fn test_submit_below_minimum_is_blocked() {
        let mut app = connected_app("0xabc");
        app.snapshot.min_profitable_amount = 50.0;
        app.draft.amount_text = "30".to_string();

        assert_eq!(app.begin_withdrawal(), None);
        let notification = app.notification.unwrap();
        assert_eq!(notification.kind, NotificationKind::Warning);
        assert_eq!(notification.message, "Minimum withdrawal amount is $50.00");
    }

    #[test]
    fn test_submit_returns_order_when_eligible() {
        let mut app = connected_app("0xabc");
        app.snapshot.min_profitable_amount = 20.0;
        app.draft.amount_text = "100".to_string();
        app.current_screen = Screen::WithdrawInput;

        let order = app.begin_withdrawal().unwrap();
        assert_eq!(order.amount, 100.0);
        assert_eq!(order.address, "0xabc");
        assert!(app.is_on_dashboard());
    }

    #[test]
    fn test_successful_withdrawal_updates_exactly_three_fields() {
        let mut app = connected_app("0xabc");
        app.snapshot = AccountSnapshot {
            card_balance: 200.0,
            eth_balance: 0.2,
            eth_price: 2000.0,
            gas_price_gwei: 32.5,
            min_profitable_amount: 20.0,
            metamask_balance_usd: 400.0,
            trading_suggestion: None,
        };
        app.draft.amount_text = "100".to_string();

        let response = WithdrawResponse {
            new_balance: 50.0,
            new_metamask_balance_usd: 30.5,
            new_eth_balance: 0.01,
        };
        app.apply_withdrawal(100.0, &response);

        assert_eq!(app.snapshot.card_balance, 50.0);
        assert_eq!(app.snapshot.metamask_balance_usd, 30.5);
        assert_eq!(app.snapshot.eth_balance, 0.01);
        // Les champs marché ne bougent pas
        assert_eq!(app.snapshot.eth_price, 2000.0);
        assert_eq!(app.snapshot.gas_price_gwei, 32.5);
        assert_eq!(app.snapshot.min_profitable_amount, 20.0);
        // Le brouillon est vidé
        assert!(app.draft.is_empty());

        let notification = app.notification.unwrap();
        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(
            notification.message,
            "Withdrew $100.00. Card balance: $50.00, wallet balance: $30.50"
        );
    }

    #[test]
    fn test_failed_withdrawal_leaves_state_untouched() {
        let mut app = connected_app("0xabc");
        app.snapshot.card_balance = 200.0;
        app.draft.amount_text = "100".to_string();

        app.withdrawal_failed("Insufficient card balance");

        assert_eq!(app.snapshot.card_balance, 200.0);
        assert_eq!(app.draft.amount_text, "100");
        let notification = app.notification.unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "Insufficient card balance");
    }

    #[test]
    fn test_withdraw_enabled_predicate() {
        let mut app = connected_app("0xabc");
        app.snapshot.min_profitable_amount = 20.0;

        for (text, expected) in [
            ("", false),
            ("abc", false),
            ("19.99", false),
            ("20", true),
            ("25", true),
        ] {
            app.draft.amount_text = text.to_string();
            assert_eq!(app.withdraw_enabled(), expected, "amount {:?}", text);
        }
    }

    #[test]
    fn test_notification_slot_is_replaced() {
        let mut app = App::new();
        app.notify(Notification::info("first"));
        app.notify(Notification::error("second"));

        let notification = app.notification.unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "second");
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new();
        assert!(app.is_running());

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        assert!(app.is_running());

        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_withdraw_input_keeps_draft_on_cancel() {
        let mut app = App::new();
        app.start_withdraw_input();
        assert!(app.is_in_withdraw_input());

        app.push_draft_char('4');
        app.push_draft_char('2');
        app.cancel_withdraw_input();

        assert!(app.is_on_dashboard());
        assert_eq!(app.draft.amount_text, "42");
    }
}
