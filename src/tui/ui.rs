//! Stateless rendering of the table.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::app::App;
use janken::{Card, CardKind, GamePhase, Player};

/// Draws the whole screen.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(4), // Opponent
            Constraint::Min(5),    // Battle
            Constraint::Length(4), // Hand
            Constraint::Length(3), // Status
            Constraint::Length(3), // Help
        ])
        .split(frame.area());

    let title = Paragraph::new(format!(
        "Janken - Round {}",
        app.state().current_round.max(1)
    ))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    draw_opponent(frame, chunks[1], app);
    draw_battle(frame, chunks[2], app);
    draw_hand(frame, chunks[3], app);

    let status = Paragraph::new(app.status())
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, chunks[4]);

    let help = Paragraph::new("1-9: Play card | R: Reset | Q: Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[5]);
}

fn coins(player: &Player) -> String {
    format!("Coins: {}", player.coins)
}

fn draw_opponent(frame: &mut Frame, area: Rect, app: &App) {
    let state = app.state();
    let text = match state.opponent() {
        Some(opponent) => vec![Line::from(vec![
            Span::styled(
                opponent.name.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "  {}  Cards: {}  Discard: {}",
                coins(opponent),
                opponent.hand.len(),
                state.discard.len()
            )),
        ])],
        None => vec![Line::from("No opponent")],
    };
    let widget = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Opponent"));
    frame.render_widget(widget, area);
}

fn draw_battle(frame: &mut Frame, area: Rect, app: &App) {
    let (human, opponent) = app.battle();
    let revealed = matches!(app.state().phase, GamePhase::RoundResult | GamePhase::GameOver);

    let face = |card: Option<&Card>, visible: bool| match card {
        Some(card) if visible => card.kind.label().to_string(),
        Some(_) => "?".to_string(),
        None => "-".to_string(),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(format!(
            "You: {}    vs    Computer: {}",
            face(human, true),
            face(opponent, revealed)
        )),
    ];
    if let Some(result) = app.game_over() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("GAME OVER - winner: {}", result.winner),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )));
    }

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Battle"));
    frame.render_widget(widget, area);
}

fn card_style(kind: CardKind) -> Style {
    let color = match kind {
        CardKind::Rock => Color::Gray,
        CardKind::Paper => Color::White,
        CardKind::Scissors => Color::Blue,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn draw_hand(frame: &mut Frame, area: Rect, app: &App) {
    let Some(human) = app.state().human() else {
        return;
    };

    let mut spans = Vec::new();
    for (index, card) in human.hand.iter().enumerate() {
        spans.push(Span::raw(format!("[{}] ", index + 1)));
        spans.push(Span::styled(card.kind.label(), card_style(card.kind)));
        spans.push(Span::raw("  "));
    }

    let title = format!("{} - {}", human.name, coins(human));
    let widget = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(widget, area);
}
