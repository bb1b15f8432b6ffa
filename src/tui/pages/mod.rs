use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::tui::app::{Action, App};

pub mod accounts;
pub mod dashboard;
pub mod setup;

pub use accounts::AccountsPage;
pub use dashboard::DashboardPage;
pub use setup::SetupPage;

pub trait Page {
    fn render(&self, frame: &mut Frame, area: Rect, app: &App);
    /// Returns the action the key asks the app to perform, if any
    fn handle_key(&mut self, key: KeyEvent) -> Option<Action>;
}
