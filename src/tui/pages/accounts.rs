//! Account selection screen
//!
//! Every backend-known account is shown with a checkbox, pre-checked when
//! its id is in the stored selection. Saving requires at least one checked
//! account.

use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::api::Account;
use crate::format::format_rub;
use crate::tui::app::{Action, App};

pub struct AccountsPage {
    accounts: Vec<Account>,
    checked: HashSet<String>,
    selected: usize,
    loading: bool,
}

impl AccountsPage {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            checked: HashSet::new(),
            selected: 0,
            loading: true,
        }
    }

    pub fn set_accounts(&mut self, accounts: Vec<Account>, stored_selection: &[String]) {
        self.checked = stored_selection.iter().cloned().collect();
        self.accounts = accounts;
        self.selected = 0;
        self.loading = false;
    }

    pub fn load_failed(&mut self) {
        self.loading = false;
    }

    fn move_selection(&mut self, delta: i32) {
        let len = self.accounts.len();
        if len == 0 {
            return;
        }
        self.selected = if delta > 0 {
            (self.selected + 1) % len
        } else if self.selected == 0 {
            len - 1
        } else {
            self.selected - 1
        };
    }

    fn toggle_current(&mut self) {
        if let Some(account) = self.accounts.get(self.selected) {
            if !self.checked.remove(&account.id) {
                self.checked.insert(account.id.clone());
            }
        }
    }

    /// Checked ids in the order the accounts are listed
    fn checked_ids(&self) -> Vec<String> {
        self.accounts
            .iter()
            .filter(|account| self.checked.contains(&account.id))
            .map(|account| account.id.clone())
            .collect()
    }
}

impl super::Page for AccountsPage {
    fn render(&self, frame: &mut Frame, area: Rect, _app: &App) {
        if self.loading {
            let paragraph = Paragraph::new("Загрузка счетов...")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Счета"));
            frame.render_widget(paragraph, area);
            return;
        }

        if self.accounts.is_empty() {
            let paragraph = Paragraph::new("Брокерские счета не найдены")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Счета"));
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = self
            .accounts
            .iter()
            .enumerate()
            .map(|(i, account)| {
                let marker = if self.checked.contains(&account.id) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let style = if i == self.selected {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                ListItem::new(vec![
                    Line::from(Span::styled(
                        format!("{} {}", marker, account.name),
                        style,
                    )),
                    Line::from(Span::styled(
                        format!(
                            "      {} · {}",
                            account.kind,
                            format_rub(account.portfolio_value)
                        ),
                        Style::default().fg(Color::Gray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items).block(
            Block::default().borders(Borders::ALL).title(format!(
                "Выберите счета ({} отмечено) — Space отметить, Enter сохранить",
                self.checked_ids().len()
            )),
        );

        frame.render_widget(list, area);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char(' ') => {
                self.toggle_current();
                None
            }
            KeyCode::Enter => Some(Action::SaveSelection(self.checked_ids())),
            KeyCode::Char('r') => Some(Action::ReloadAccounts),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }
}

impl Default for AccountsPage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::pages::Page;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use rust_decimal::Decimal;

    fn account(id: &str) -> Account {
        Account {
            id: id.to_string(),
            name: format!("Account {}", id),
            kind: "broker".to_string(),
            portfolio_value: Decimal::ZERO,
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn stored_selection_is_prechecked() {
        let mut page = AccountsPage::new();
        page.set_accounts(
            vec![account("a"), account("b"), account("c")],
            &["b".to_string()],
        );

        assert_eq!(page.checked_ids(), vec!["b".to_string()]);
    }

    #[test]
    fn toggle_and_save_in_list_order() {
        let mut page = AccountsPage::new();
        page.set_accounts(vec![account("a"), account("b")], &[]);

        page.handle_key(press(KeyCode::Char(' ')));
        page.handle_key(press(KeyCode::Down));
        page.handle_key(press(KeyCode::Char(' ')));

        match page.handle_key(press(KeyCode::Enter)) {
            Some(Action::SaveSelection(ids)) => {
                assert_eq!(ids, vec!["a".to_string(), "b".to_string()])
            }
            other => panic!("expected save, got {:?}", other),
        }
    }

    #[test]
    fn save_with_nothing_checked_still_emits_action() {
        // Validation (and the abort) lives in the app, not the page
        let mut page = AccountsPage::new();
        page.set_accounts(vec![account("a")], &[]);

        match page.handle_key(press(KeyCode::Enter)) {
            Some(Action::SaveSelection(ids)) => assert!(ids.is_empty()),
            other => panic!("expected save, got {:?}", other),
        }
    }

    #[test]
    fn selection_wraps_around() {
        let mut page = AccountsPage::new();
        page.set_accounts(vec![account("a"), account("b")], &[]);

        page.handle_key(press(KeyCode::Up));
        assert_eq!(page.selected, 1);
        page.handle_key(press(KeyCode::Down));
        assert_eq!(page.selected, 0);
    }
}
