use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::app::{App, Screen, StatusLevel};
use crate::tui::pages::Page;

pub fn draw(frame: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);

    // Render the current screen
    match &app.screen {
        Screen::Loading => {
            let paragraph = Paragraph::new("Проверка настроек...")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(paragraph, chunks[1]);
        }
        Screen::Setup(page) => page.render(frame, chunks[1], app),
        Screen::Accounts(page) => page.render(frame, chunks[1], app),
        Screen::Dashboard(page) => page.render(frame, chunks[1], app),
    }

    render_footer(frame, chunks[2], app);

    // Status banner overlay replaces nothing on screen; it floats on top
    if let Some(status) = &app.status {
        render_status(frame, &status.message, status.level);
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let title = format!(
        "Тинькофф Инвестиции — портфель · {}",
        app.session.display_name
    );
    let header = Paragraph::new(title)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let hint = match &app.screen {
        Screen::Loading => "Esc/q — выход",
        Screen::Setup(_) => "Enter — проверить и сохранить токен · Esc — выход",
        Screen::Accounts(_) => {
            "↑↓ — выбор · Space — отметить · Enter — сохранить · r — обновить · q — выход"
        }
        Screen::Dashboard(_) => "i — доходность · r — обновить · q — выход",
    };
    let footer = Paragraph::new(hint).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, area);
}

/// Render a status overlay at the bottom center of the screen
fn render_status(frame: &mut Frame<'_>, message: &str, level: StatusLevel) {
    let area = frame.area();

    // Calculate banner area - centered at bottom
    let width = (message.chars().count() + 4).min(60) as u16;
    let height = 3;
    let x = (area.width.saturating_sub(width)) / 2;
    let y = area.height.saturating_sub(height + 1);

    let banner_area = Rect::new(x, y, width, height);

    let color = match level {
        StatusLevel::Info => Color::Green,
        StatusLevel::Error => Color::Red,
    };

    let banner = Paragraph::new(message)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);

    frame.render_widget(banner, banner_area);
}
