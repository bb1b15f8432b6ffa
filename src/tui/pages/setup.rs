//! Token-entry screen

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::tui::app::{Action, App};

pub struct SetupPage {
    input: String,
}

impl SetupPage {
    pub fn new() -> Self {
        Self {
            input: String::new(),
        }
    }

    /// The token never appears on screen; only its length does
    fn masked_input(&self) -> String {
        if self.input.is_empty() {
            "———".to_string()
        } else {
            "•".repeat(self.input.chars().count())
        }
    }
}

impl super::Page for SetupPage {
    fn render(&self, frame: &mut Frame, area: Rect, _app: &App) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        let intro = Paragraph::new(
            "Подключение Тинькофф Инвестиций\n\n\
             Введите API токен. Выпустить его можно в настройках\n\
             Тинькофф Инвестиций: Настройки → Токены → Токен для чтения.",
        )
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Настройка"));
        frame.render_widget(intro, chunks[0]);

        let input = Paragraph::new(self.masked_input())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title("Токен"));
        frame.render_widget(input, chunks[1]);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => Some(Action::SubmitToken(self.input.clone())),
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                None
            }
            _ => None,
        }
    }
}

impl Default for SetupPage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::pages::Page;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn typing_builds_the_token() {
        let mut page = SetupPage::new();
        for c in "t.abc".chars() {
            assert_eq!(page.handle_key(press(KeyCode::Char(c))), None);
        }
        assert_eq!(page.handle_key(press(KeyCode::Backspace)), None);

        match page.handle_key(press(KeyCode::Enter)) {
            Some(Action::SubmitToken(token)) => assert_eq!(token, "t.ab"),
            other => panic!("expected submit, got {:?}", other),
        }
    }

    #[test]
    fn input_is_masked() {
        let mut page = SetupPage::new();
        for c in "secret".chars() {
            page.handle_key(press(KeyCode::Char(c)));
        }
        assert!(!page.masked_input().contains("secret"));
        assert_eq!(page.masked_input().chars().count(), 6);
    }
}
