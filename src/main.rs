// ============================================================================
// LazyCard - Dashboard carte & portefeuille
// ============================================================================
// Programme TUI affichant les soldes calculés par le backend, la suggestion
// de trading, et permettant de soumettre un retrait
//
// Architecture :
// - Event loop sur le thread UI : render, input, réconciliation des résultats
// - Worker thread : appels réseau (connexion wallet, retrait) via son runtime
// - Status poller : thread annulable rafraîchissant /status périodiquement
// ============================================================================

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use lazycard::api::{ApiError, BackendClient, WithdrawResponse};
use lazycard::app::App;
use lazycard::models::Notification;
use lazycard::poller::{PollUpdate, StatusPoller};
use lazycard::ui::{events::EventHandler, render};
use lazycard::wallet::WalletCapability;
use lazycard::{BACKEND_URL_ENV, DEFAULT_BACKEND_URL, POLL_INTERVAL, WALLET_RPC_ENV};

// ============================================================================
// AppCommand / AppResult : communication avec le worker thread
// ============================================================================
// L'event loop envoie des commandes, le worker exécute les tâches async et
// renvoie les résultats. Les résultats sont appliqués sur le thread UI, en
// une seule transition d'état chacun.
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug)]
enum AppCommand {
    /// Demander l'accès aux comptes du portefeuille
    ConnectWallet,

    /// Poster un retrait validé localement
    SubmitWithdrawal { amount: f64, address: String },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    WalletConnected { accounts: Vec<String> },

    WalletConnectFailed { message: String },

    WithdrawalApplied { amount: f64, response: WithdrawResponse },

    WithdrawalFailed { detail: String },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne, filtré via RUST_LOG
// ============================================================================

fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_dir()
        .map(|dir| dir.join("lazycard").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("./logs"));

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazycard.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazycard=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée
// ============================================================================

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("LazyCard starting up");

    let base_url =
        std::env::var(BACKEND_URL_ENV).unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
    info!(backend = %base_url, "Backend configured");

    // Capacité wallet détectée au démarrage : sans endpoint configuré, la
    // connexion échouera localement avec ProviderUnavailable
    let capability = WalletCapability::detect(std::env::var(WALLET_RPC_ENV).ok());

    let client = BackendClient::new(base_url.clone())
        .context("Échec de la création du client backend")?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let app = Arc::new(Mutex::new(App::new()));

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();
    let (poll_tx, poll_rx) = mpsc::channel::<PollUpdate>();

    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, app.clone(), capability, client);

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(
        &mut terminal,
        app.clone(),
        &events,
        command_tx,
        result_rx,
        poll_rx,
        poll_tx,
        base_url,
    );

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// Thread séparé avec son runtime tokio : exécute les appels réseau sans
// bloquer l'UI, renvoie les résultats via le canal de résultats
// ============================================================================

fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    app: Arc<Mutex<App>>,
    capability: WalletCapability,
    client: BackendClient,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = %e, "Failed to create worker runtime");
                return;
            }
        };

        loop {
            match command_rx.recv() {
                Ok(command) => {
                    info!(?command, "Worker received command");

                    match command {
                        AppCommand::ConnectWallet => {
                            {
                                let mut app_lock = app.lock().unwrap();
                                app_lock.start_loading(Some(
                                    "Connexion au portefeuille...".to_string(),
                                ));
                            }

                            match runtime.block_on(capability.connect()) {
                                Ok(accounts) => {
                                    info!(accounts = accounts.len(), "Wallet granted accounts");
                                    let _ = result_tx.send(AppResult::WalletConnected { accounts });
                                }
                                Err(e) => {
                                    warn!(error = %e, "Wallet connection failed");
                                    let _ = result_tx.send(AppResult::WalletConnectFailed {
                                        message: e.to_string(),
                                    });
                                }
                            }

                            {
                                let mut app_lock = app.lock().unwrap();
                                app_lock.stop_loading();
                            }
                        }

                        AppCommand::SubmitWithdrawal { amount, address } => {
                            {
                                let mut app_lock = app.lock().unwrap();
                                app_lock
                                    .start_loading(Some(format!("Retrait de ${:.2}...", amount)));
                            }

                            match runtime.block_on(client.use_card(amount, &address)) {
                                Ok(response) => {
                                    info!(amount, "Withdrawal accepted by server");
                                    let _ = result_tx
                                        .send(AppResult::WithdrawalApplied { amount, response });
                                }
                                Err(ApiError::RequestFailed { status, detail }) => {
                                    warn!(status, detail = %detail, "Withdrawal rejected by server");
                                    let _ =
                                        result_tx.send(AppResult::WithdrawalFailed { detail });
                                }
                                Err(e) => {
                                    error!(error = %e, "Withdrawal transport error");
                                    let _ = result_tx.send(AppResult::WithdrawalFailed {
                                        detail: format!("Network error: {}", e),
                                    });
                                }
                            }

                            {
                                let mut app_lock = app.lock().unwrap();
                                app_lock.stop_loading();
                            }
                        }
                    }
                }
                Err(_) => {
                    info!("Worker thread exiting (channel closed)");
                    break;
                }
            }
        }
    });
}

// ============================================================================
// Status Poller : démarrage
// ============================================================================

/// Démarre un poller pour une adresse : runtime et client dédiés au thread
fn start_poller(
    address: String,
    base_url: &str,
    poll_tx: mpsc::Sender<PollUpdate>,
) -> Result<StatusPoller> {
    let runtime =
        tokio::runtime::Runtime::new().context("Échec de la création du runtime du poller")?;
    let client = BackendClient::new(base_url.to_string())
        .context("Échec de la création du client backend")?;

    let fetch = move |addr: &str| runtime.block_on(client.status(addr));

    Ok(StatusPoller::spawn(address, POLL_INTERVAL, fetch, poll_tx))
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération : appliquer les résultats worker et poller, dessiner,
// traiter l'input, puis réconcilier le poller avec l'adresse de session
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
    poll_rx: mpsc::Receiver<PollUpdate>,
    poll_tx: mpsc::Sender<PollUpdate>,
    base_url: String,
) -> Result<()> {
    // Poller courant et adresse qu'il suit
    // Invariant : un poller existe exactement quand la session a une adresse
    let mut poller: Option<(String, StatusPoller)> = None;

    loop {
        {
            let app_lock = app.lock().unwrap();
            if !app_lock.is_running() {
                break;
            }
        }

        // ========================================
        // 0. RÉSULTATS : worker puis poller
        // ========================================
        match result_rx.try_recv() {
            Ok(result) => {
                let mut app_lock = app.lock().unwrap();
                match result {
                    AppResult::WalletConnected { accounts } => {
                        app_lock.connect_succeeded(accounts);
                    }
                    AppResult::WalletConnectFailed { message } => {
                        app_lock.connect_failed(&message);
                    }
                    AppResult::WithdrawalApplied { amount, response } => {
                        app_lock.apply_withdrawal(amount, &response);
                    }
                    AppResult::WithdrawalFailed { detail } => {
                        app_lock.withdrawal_failed(&detail);
                    }
                }
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                error!("Worker thread disconnected!");
            }
        }

        // Mises à jour de statut : dernière écriture gagnante, les adresses
        // périmées sont filtrées dans apply_status
        while let Ok(update) = poll_rx.try_recv() {
            let mut app_lock = app.lock().unwrap();
            app_lock.apply_status(&update.address, update.response);
        }

        // ========================================
        // 1. RENDER
        // ========================================
        {
            let app_clone = app.clone();
            terminal.draw(|frame| {
                let app_lock = app_clone.lock().unwrap();
                render(frame, &app_lock);
            })?;
        }

        // ========================================
        // 2. INPUT
        // ========================================
        if let Ok(event) = events.next() {
            let mut app_lock = app.lock().unwrap();
            handle_event(&mut app_lock, event, &command_tx);
        }

        // ========================================
        // 3. POLLER : réconciliation avec la session
        // ========================================
        let desired = {
            let app_lock = app.lock().unwrap();
            app_lock.session.primary_address().map(str::to_string)
        };
        let current = poller.as_ref().map(|(address, _)| address.clone());

        if desired != current {
            // Libéré exactement une fois, avant tout nouveau démarrage
            if let Some((address, mut old)) = poller.take() {
                info!(address = %address, "Stopping status poller");
                old.stop();
            }
            if let Some(address) = desired {
                match start_poller(address.clone(), &base_url, poll_tx.clone()) {
                    Ok(handle) => poller = Some((address, handle)),
                    Err(e) => error!(error = ?e, "Failed to start status poller"),
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
fn handle_event(
    app: &mut App,
    event: lazycard::ui::events::Event,
    command_tx: &mpsc::Sender<AppCommand>,
) {
    use lazycard::ui::events::{
        get_char_from_event, is_amount_char_event, is_backspace_event, is_connect_event,
        is_disconnect_event, is_enter_event, is_escape_event, is_quit_event, is_withdraw_event,
        Event,
    };

    match event {
        // ========================================
        // Mode saisie du montant
        // ========================================

        // ESC : retour au dashboard, le brouillon est conservé
        Event::Key(_) if is_escape_event(&event) && app.is_in_withdraw_input() => {
            debug!("User cancelled withdrawal input");
            app.cancel_withdraw_input();
        }

        // Enter : valider les préconditions locales puis poster
        Event::Key(_) if is_enter_event(&event) && app.is_in_withdraw_input() => {
            if let Some(order) = app.begin_withdrawal() {
                info!(amount = order.amount, "User submitted withdrawal");
                let _ = command_tx.send(AppCommand::SubmitWithdrawal {
                    amount: order.amount,
                    address: order.address,
                });
            }
        }

        Event::Key(_) if is_backspace_event(&event) && app.is_in_withdraw_input() => {
            app.draft_backspace();
        }

        Event::Key(_) if is_amount_char_event(&event) && app.is_in_withdraw_input() => {
            if let Some(c) = get_char_from_event(&event) {
                app.push_draft_char(c);
            }
        }

        // Toute autre touche en mode saisie : ignorée
        Event::Key(_) if app.is_in_withdraw_input() => {}

        // ========================================
        // Dashboard
        // ========================================

        // 'q' : quit avec confirmation two-step
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // 'c' : connexion du portefeuille via le worker
        Event::Key(_) if is_connect_event(&event) => {
            app.cancel_quit();
            app.cancel_disconnect();
            if app.session.connected {
                app.notify(Notification::info("Wallet already connected"));
            } else {
                info!("User requested wallet connection");
                let _ = command_tx.send(AppCommand::ConnectWallet);
            }
        }

        // 'd' : déconnexion locale avec confirmation two-step
        Event::Key(_) if is_disconnect_event(&event) && app.session.connected => {
            app.cancel_quit();
            if app.is_awaiting_disconnect_confirmation() {
                info!("User confirmed disconnect");
                app.disconnect();
            } else {
                info!("User requested disconnect (awaiting confirmation)");
                app.request_disconnect();
            }
        }

        // 'w' : saisie du montant de retrait
        Event::Key(_) if is_withdraw_event(&event) => {
            debug!("User opened withdrawal input");
            app.start_withdraw_input();
        }

        // Toute autre touche : annule les confirmations si actives
        Event::Key(_) => {
            app.cancel_quit();
            app.cancel_disconnect();
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// Raw mode + alternate screen, toujours restaurés avant de quitter
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}
