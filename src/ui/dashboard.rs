// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// Rendu pur : tout est lu depuis App, rien n'est modifié ici.
// Monnaie : 2 décimales. Quantités ETH : 4 décimales.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::models::{NotificationKind, SuggestionAction};

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);

    // Soldes : carte et portefeuille côte à côte
    let balance_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_card_panel(frame, app, balance_chunks[0]);
    render_wallet_panel(frame, app, balance_chunks[1]);

    render_suggestion_panel(frame, app, chunks[2]);
    render_withdraw_panel(frame, app, chunks[3]);
    render_notification(frame, app, chunks[4]);
    render_footer(frame, app, chunks[6]);
}

/// Crée le layout principal
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(6), // Soldes
            Constraint::Length(5), // Suggestion
            Constraint::Length(4), // Retrait
            Constraint::Length(3), // Notification
            Constraint::Min(0),    // Espace restant
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" LazyCard ")
        .title_alignment(Alignment::Center);

    let status = if app.is_loading_data() {
        Span::styled(
            app.loading_message
                .clone()
                .unwrap_or_else(|| "Chargement...".to_string()),
            Style::default().fg(Color::Yellow),
        )
    } else if let Some(refreshed) = app.last_refresh {
        Span::styled(
            format!("Dernière mise à jour : {}", refreshed.format("%H:%M:%S")),
            Style::default().fg(Color::Gray),
        )
    } else {
        Span::styled(
            "💳 Wallet & Card Dashboard",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    };

    let paragraph = Paragraph::new(vec![Line::from(status)])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Soldes
// ============================================================================

fn render_card_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 💳 Card ");

    let text = vec![
        Line::from(vec![
            Span::raw(" Balance : "),
            Span::styled(
                format_usd(app.snapshot.card_balance),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Min withdrawal : "),
            Span::styled(
                format_usd(app.snapshot.min_profitable_amount),
                Style::default().fg(Color::Gray),
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_wallet_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 🦊 Wallet ");

    let text = if let Some(address) = app.session.primary_address() {
        vec![
            Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    shorten_address(address),
                    Style::default().fg(Color::Cyan),
                ),
            ]),
            Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    format_usd(app.snapshot.metamask_balance_usd),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  ("),
                Span::raw(format_eth(app.snapshot.eth_balance)),
                Span::raw(")"),
            ]),
            Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    format!(
                        "ETH {}   Gas {:.1} gwei",
                        format_usd(app.snapshot.eth_price),
                        app.snapshot.gas_price_gwei
                    ),
                    Style::default().fg(Color::Gray),
                ),
            ]),
        ]
    } else {
        vec![
            Line::from(Span::styled(
                " Non connecté",
                Style::default().fg(Color::Gray),
            )),
            Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    "[c]",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" pour connecter le portefeuille"),
            ]),
        ]
    };

    frame.render_widget(Paragraph::new(text).block(block), area);
}

// ============================================================================
// Suggestion de trading
// ============================================================================

fn render_suggestion_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 🤖 Suggestion ");

    let text = match &app.snapshot.trading_suggestion {
        Some(suggestion) => vec![
            Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    suggestion_label(suggestion.action),
                    suggestion_style(suggestion.action).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::raw(format_eth(suggestion.amount)),
            ]),
            Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    suggestion.reason.clone(),
                    Style::default().fg(Color::Gray),
                ),
            ]),
        ],
        None => vec![Line::from(Span::styled(
            " En attente de la suggestion serveur...",
            Style::default().fg(Color::Gray),
        ))],
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Retrait
// ============================================================================

fn render_withdraw_panel(frame: &mut Frame, app: &App, area: Rect) {
    let editing = app.is_in_withdraw_input();

    let border = if editing {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(" 💸 Withdraw ");

    let mut amount_line = vec![
        Span::raw(" Amount (USD) : "),
        Span::styled(
            app.draft.amount_text.as_str(),
            Style::default().fg(Color::White),
        ),
    ];
    if editing {
        // Curseur
        amount_line.push(Span::styled(
            "█",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    // L'éligibilité est redérivée à chaque rendu, donc à chaque frappe
    let hint_line = if app.withdraw_enabled() {
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                "[Enter]",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Submit withdrawal"),
        ])
    } else {
        Line::from(Span::styled(
            format!(
                " Minimum : {}",
                format_usd(app.snapshot.min_profitable_amount)
            ),
            Style::default().fg(Color::Gray),
        ))
    };

    let text = vec![Line::from(amount_line), hint_line];

    frame.render_widget(Paragraph::new(text).block(block), area);
}

// ============================================================================
// Notification
// ============================================================================

fn render_notification(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = match &app.notification {
        Some(notification) => {
            let style = notification_style(notification.kind);
            vec![Line::from(vec![
                Span::styled(
                    format!(" {} ", notification_symbol(notification.kind)),
                    style.add_modifier(Modifier::BOLD),
                ),
                Span::styled(notification.message.clone(), style),
            ])]
        }
        None => vec![Line::from("")],
    };

    frame.render_widget(Paragraph::new(text).block(block), area);
}

// ============================================================================
// Footer
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_in_withdraw_input() {
        Line::from(vec![
            Span::styled(
                "[Enter]",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Confirm  "),
            Span::styled(
                "[ESC]",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Cancel"),
        ])
    } else if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    } else if app.is_awaiting_disconnect_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[d]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour déconnecter le portefeuille ⚠",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Quit  "),
            Span::styled(
                "[c]",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Connect  "),
            Span::styled(
                "[d]",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Disconnect  "),
            Span::styled(
                "[w]",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Withdraw"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Helpers de formatage
// ============================================================================

/// Formate un montant USD à 2 décimales
pub fn format_usd(value: f64) -> String {
    format!("${:.2}", value)
}

/// Formate une quantité ETH à 4 décimales
pub fn format_eth(value: f64) -> String {
    format!("{:.4} ETH", value)
}

/// Tronque une adresse : 0x1234…cdef
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

fn suggestion_label(action: SuggestionAction) -> &'static str {
    match action {
        SuggestionAction::Buy => "BUY",
        SuggestionAction::Sell => "SELL",
        SuggestionAction::Hold => "HOLD",
    }
}

fn suggestion_style(action: SuggestionAction) -> Style {
    match action {
        SuggestionAction::Buy => Style::default().fg(Color::Green),
        SuggestionAction::Sell => Style::default().fg(Color::Red),
        SuggestionAction::Hold => Style::default().fg(Color::Gray),
    }
}

fn notification_style(kind: NotificationKind) -> Style {
    match kind {
        NotificationKind::Success => Style::default().fg(Color::Green),
        NotificationKind::Error => Style::default().fg(Color::Red),
        NotificationKind::Warning => Style::default().fg(Color::Yellow),
        NotificationKind::Info => Style::default().fg(Color::Cyan),
    }
}

fn notification_symbol(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "✔",
        NotificationKind::Error => "✖",
        NotificationKind::Warning => "⚠",
        NotificationKind::Info => "ℹ",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1234.5), "$1234.50");
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(30.5), "$30.50");
    }

    #[test]
    fn test_format_eth() {
        assert_eq!(format_eth(0.2), "0.2000 ETH");
        assert_eq!(format_eth(0.123456), "0.1235 ETH");
    }

    #[test]
    fn test_shorten_address() {
        assert_eq!(
            shorten_address("0xdb27bf2ac5d428a9c63dbc914611036855a6c56e"),
            "0xdb27…c56e"
        );
        assert_eq!(shorten_address("0xabc"), "0xabc");
    }

    #[test]
    fn test_suggestion_label() {
        assert_eq!(suggestion_label(SuggestionAction::Buy), "BUY");
        assert_eq!(suggestion_label(SuggestionAction::Sell), "SELL");
        assert_eq!(suggestion_label(SuggestionAction::Hold), "HOLD");
    }
}
