use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::account_store::AccountStore;
use crate::api::{Account, Backend, ChartKind, Period};
use crate::charts::{self, DEFAULT_CHART_PERIOD};
use crate::data_paths::DataPaths;
use crate::session::Session;
use crate::setup::{self, SetupState};
use crate::token_store;
use crate::tui::events::AppEvent;
use crate::tui::pages::{AccountsPage, DashboardPage, Page, SetupPage};

/// How long a status banner stays on screen
pub const STATUS_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// Transient status banner; a new one replaces any currently shown one
#[derive(Debug, Clone)]
pub struct StatusBanner {
    pub message: String,
    pub level: StatusLevel,
    shown_at: Instant,
}

impl StatusBanner {
    fn expired(&self) -> bool {
        self.shown_at.elapsed() >= STATUS_TTL
    }
}

/// The screen currently on display. Each variant owns its view data, which
/// is discarded on transition.
pub enum Screen {
    Loading,
    Setup(SetupPage),
    Accounts(AccountsPage),
    Dashboard(DashboardPage),
}

/// What a key press asks the app to do. Collected from the page and applied
/// after the borrow of the current screen ends.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    SubmitToken(String),
    ReloadAccounts,
    SaveSelection(Vec<String>),
    RefreshDashboard,
    QueryIncome(Period),
}

/// Application context: session identity, backend handle, local stores and
/// the current screen. Constructed once in the run command and passed to
/// every handler explicitly.
pub struct App {
    pub session: Session,
    pub backend: Arc<dyn Backend>,
    pub data_paths: DataPaths,
    pub account_store: AccountStore,
    passphrase: String,
    pub screen: Screen,
    pub status: Option<StatusBanner>,
    pub should_quit: bool,
    /// Active view generation; fetch completions tagged with an older value
    /// are discarded without touching the screen
    generation: u64,
    /// A user-triggered submit/save is pending; further ones are ignored
    in_flight: bool,
    events_tx: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        session: Session,
        backend: Arc<dyn Backend>,
        data_paths: DataPaths,
        passphrase: String,
        events_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let account_store = AccountStore::new(&data_paths);
        Self {
            session,
            backend,
            data_paths,
            account_store,
            passphrase,
            screen: Screen::Loading,
            status: None,
            should_quit: false,
            generation: 0,
            in_flight: false,
            events_tx,
        }
    }

    pub fn show_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.status = Some(StatusBanner {
            message: message.into(),
            level,
            shown_at: Instant::now(),
        });
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Start a new view generation; anything still in flight for the old
    /// view becomes stale
    fn bump_generation(&mut self) {
        self.generation += 1;
        self.in_flight = false;
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => {
                if self.status.as_ref().is_some_and(|s| s.expired()) {
                    self.status = None;
                }
            }
            AppEvent::Error(message) => self.show_status(StatusLevel::Error, message),
            AppEvent::SetupResolved { generation, result } => {
                if !self.is_current(generation) {
                    debug!("Discarding stale setup resolution");
                    return;
                }
                match result {
                    Ok(state) => self.enter_state(state),
                    Err(e) => {
                        warn!("Setup check failed: {}", e);
                        self.bump_generation();
                        self.screen = Screen::Setup(SetupPage::new());
                        self.show_status(StatusLevel::Error, "Ошибка проверки настроек");
                    }
                }
            }
            AppEvent::AccountsLoaded { generation, result } => {
                if !self.is_current(generation) {
                    debug!("Discarding stale account list");
                    return;
                }
                let failed = result.is_err();
                if let Screen::Accounts(page) = &mut self.screen {
                    match result {
                        Ok((accounts, selected)) => page.set_accounts(accounts, &selected),
                        Err(e) => {
                            warn!("Account list load failed: {}", e);
                            page.load_failed();
                        }
                    }
                }
                if failed {
                    self.show_status(StatusLevel::Error, "Не удалось загрузить счета");
                }
            }
            AppEvent::TokenSubmitted { generation, result } => {
                if !self.is_current(generation) {
                    debug!("Discarding stale token verdict");
                    return;
                }
                self.in_flight = false;
                match result {
                    Ok(true) => {
                        self.show_status(StatusLevel::Info, "Токен сохранен");
                        self.spawn_resolve();
                    }
                    Ok(false) => {
                        self.show_status(StatusLevel::Error, "Неверный токен, обновите его")
                    }
                    Err(e) => {
                        warn!("Token submission failed: {}", e);
                        self.show_status(StatusLevel::Error, "Ошибка проверки токена");
                    }
                }
            }
            AppEvent::SelectionSaved { generation, result } => {
                if !self.is_current(generation) {
                    debug!("Discarding stale selection save");
                    return;
                }
                self.in_flight = false;
                match result {
                    Ok(()) => {
                        self.show_status(StatusLevel::Info, "Счета сохранены");
                        self.spawn_resolve();
                    }
                    Err(e) => {
                        warn!("Selection save failed: {}", e);
                        self.show_status(StatusLevel::Error, "Не удалось сохранить счета");
                    }
                }
            }
            AppEvent::PortfolioLoaded { generation, result } => {
                if !self.is_current(generation) {
                    debug!("Discarding stale portfolio");
                    return;
                }
                let failed = result.is_err();
                if let Screen::Dashboard(page) = &mut self.screen {
                    match result {
                        Ok(summary) => page.set_portfolio(summary),
                        Err(e) => {
                            warn!("Portfolio load failed: {}", e);
                            page.portfolio_failed();
                        }
                    }
                }
                if failed {
                    self.show_status(StatusLevel::Error, "Ошибка загрузки портфеля");
                }
            }
            AppEvent::ChartLoaded { generation, chart } => {
                if !self.is_current(generation) {
                    debug!("Discarding stale chart");
                    return;
                }
                if let Screen::Dashboard(page) = &mut self.screen {
                    page.set_chart(chart);
                }
            }
            AppEvent::IncomeLoaded {
                generation,
                period,
                result,
            } => {
                if !self.is_current(generation) {
                    debug!("Discarding stale income report");
                    return;
                }
                let failed = result.is_err();
                if let Screen::Dashboard(page) = &mut self.screen {
                    match result {
                        Ok(report) => page.set_income(period, Some(report)),
                        Err(e) => {
                            warn!("Income load failed: {}", e);
                            page.set_income(period, None);
                        }
                    }
                }
                if failed {
                    self.show_status(StatusLevel::Error, "Ошибка загрузки доходности");
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        let action = match &mut self.screen {
            Screen::Loading => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                _ => None,
            },
            Screen::Setup(page) => page.handle_key(key),
            Screen::Accounts(page) => page.handle_key(key),
            Screen::Dashboard(page) => page.handle_key(key),
        };

        if let Some(action) = action {
            self.apply(action);
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::SubmitToken(token) => {
                if self.in_flight {
                    return;
                }
                let token = token.trim().to_string();
                if token.is_empty() {
                    self.show_status(StatusLevel::Error, "Введите токен");
                    return;
                }
                self.spawn_submit_token(token);
            }
            Action::ReloadAccounts => self.enter_accounts(),
            Action::SaveSelection(account_ids) => {
                if self.in_flight {
                    return;
                }
                if account_ids.is_empty() {
                    self.show_status(StatusLevel::Error, "Выберите хотя бы один счет");
                    return;
                }
                self.spawn_save_selection(account_ids);
            }
            Action::RefreshDashboard => self.enter_dashboard(),
            Action::QueryIncome(period) => self.spawn_income(period),
        }
    }

    fn enter_state(&mut self, state: SetupState) {
        match state {
            SetupState::NeedsToken { rejected } => {
                self.bump_generation();
                self.screen = Screen::Setup(SetupPage::new());
                if rejected {
                    self.show_status(StatusLevel::Error, "Токен недействителен, обновите его");
                }
            }
            SetupState::NeedsAccounts => self.enter_accounts(),
            SetupState::Ready { .. } => self.enter_dashboard(),
        }
    }

    /// Re-run the setup resolver; used at startup and after every loop-back
    /// from the setup or accounts screen
    pub fn spawn_resolve(&mut self) {
        self.bump_generation();
        self.screen = Screen::Loading;

        let generation = self.generation;
        let tx = self.events_tx.clone();
        let backend = self.backend.clone();
        let session = self.session.clone();
        let data_paths = self.data_paths.clone();
        let account_store = self.account_store.clone();
        let passphrase = self.passphrase.clone();

        tokio::spawn(async move {
            let result =
                setup::resolve(&session, &data_paths, &passphrase, &account_store, backend.as_ref())
                    .await
                    .map_err(|e| format!("{:#}", e));
            let _ = tx.send(AppEvent::SetupResolved { generation, result });
        });
    }

    fn enter_accounts(&mut self) {
        self.bump_generation();
        self.screen = Screen::Accounts(AccountsPage::new());

        let generation = self.generation;
        let tx = self.events_tx.clone();
        let backend = self.backend.clone();
        let account_store = self.account_store.clone();
        let user_id = self.session.user_id;

        tokio::spawn(async move {
            let result: Result<(Vec<Account>, Vec<String>), String> = async {
                let accounts = backend.accounts(user_id).await.map_err(|e| e.to_string())?;
                let selected = account_store
                    .load(user_id)
                    .await
                    .map_err(|e| format!("{:#}", e))?;
                Ok((accounts, selected))
            }
            .await;
            let _ = tx.send(AppEvent::AccountsLoaded { generation, result });
        });
    }

    fn enter_dashboard(&mut self) {
        self.bump_generation();
        self.screen = Screen::Dashboard(DashboardPage::new());

        let generation = self.generation;
        let tx = self.events_tx.clone();
        let backend = self.backend.clone();
        let data_paths = self.data_paths.clone();
        let user_id = self.session.user_id;

        tokio::spawn(async move {
            let result = backend.portfolio(user_id).await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::PortfolioLoaded { generation, result });

            // Charts start only after the portfolio call has settled; the two
            // fetches are independent of each other and land in either order
            for kind in [ChartKind::Capital, ChartKind::Income] {
                let tx = tx.clone();
                let backend = backend.clone();
                let data_paths = data_paths.clone();
                tokio::spawn(async move {
                    if let Some(chart) = charts::fetch_chart(
                        backend.as_ref(),
                        &data_paths,
                        user_id,
                        kind,
                        DEFAULT_CHART_PERIOD,
                    )
                    .await
                    {
                        let _ = tx.send(AppEvent::ChartLoaded { generation, chart });
                    }
                });
            }
        });
    }

    fn spawn_submit_token(&mut self, token: String) {
        self.in_flight = true;

        let generation = self.generation;
        let tx = self.events_tx.clone();
        let backend = self.backend.clone();
        let data_paths = self.data_paths.clone();
        let passphrase = self.passphrase.clone();
        let user_id = self.session.user_id;

        tokio::spawn(async move {
            let result = match backend.validate_token(user_id, &token).await {
                // Persist only a token the backend accepted
                Ok(true) => token_store::save_token(&data_paths, user_id, &token, &passphrase)
                    .map(|()| true)
                    .map_err(|e| format!("{:#}", e)),
                Ok(false) => Ok(false),
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(AppEvent::TokenSubmitted { generation, result });
        });
    }

    fn spawn_save_selection(&mut self, account_ids: Vec<String>) {
        self.in_flight = true;

        let generation = self.generation;
        let tx = self.events_tx.clone();
        let backend = self.backend.clone();
        let account_store = self.account_store.clone();
        let user_id = self.session.user_id;

        tokio::spawn(async move {
            let result = match backend.save_accounts(user_id, &account_ids).await {
                Ok(()) => account_store
                    .save(user_id, &account_ids)
                    .await
                    .map_err(|e| format!("{:#}", e)),
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(AppEvent::SelectionSaved { generation, result });
        });
    }

    fn spawn_income(&mut self, period: Period) {
        let generation = self.generation;
        let tx = self.events_tx.clone();
        let backend = self.backend.clone();
        let user_id = self.session.user_id;

        tokio::spawn(async move {
            let result = backend.income(user_id, period).await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::IncomeLoaded {
                generation,
                period,
                result,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, IncomeReport, PortfolioSummary};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingBackend {
        save_calls: AtomicUsize,
        validate_calls: AtomicUsize,
    }

    #[async_trait]
    impl Backend for CountingBackend {
        async fn validate_token(&self, _user_id: i64, _token: &str) -> Result<bool, ApiError> {
            self.validate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }

        async fn accounts(&self, _user_id: i64) -> Result<Vec<Account>, ApiError> {
            Ok(Vec::new())
        }

        async fn save_accounts(
            &self,
            _user_id: i64,
            _account_ids: &[String],
        ) -> Result<(), ApiError> {
            self.save_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn portfolio(&self, _user_id: i64) -> Result<PortfolioSummary, ApiError> {
            Err(ApiError::Backend("unused".to_string()))
        }

        async fn chart(
            &self,
            _user_id: i64,
            _kind: ChartKind,
            _period: Period,
        ) -> Result<Vec<u8>, ApiError> {
            Err(ApiError::Backend("unused".to_string()))
        }

        async fn income(&self, _user_id: i64, _period: Period) -> Result<IncomeReport, ApiError> {
            Err(ApiError::Backend("unused".to_string()))
        }
    }

    fn test_app(backend: Arc<CountingBackend>, dir: &std::path::Path) -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(
            Session {
                user_id: 42,
                display_name: "user 42".to_string(),
                init_data: String::new(),
            },
            backend,
            DataPaths::new(dir),
            "pass".to_string(),
            tx,
        )
    }

    #[tokio::test]
    async fn empty_selection_is_rejected_without_network_call() {
        let backend = Arc::new(CountingBackend::default());
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(backend.clone(), dir.path());

        app.apply(Action::SaveSelection(Vec::new()));

        let status = app.status.expect("validation status expected");
        assert_eq!(status.level, StatusLevel::Error);
        assert!(!app.in_flight);
        // Let any wrongly spawned task run before counting
        tokio::task::yield_now().await;
        assert_eq!(backend.save_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_token_is_rejected_without_network_call() {
        let backend = Arc::new(CountingBackend::default());
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(backend.clone(), dir.path());

        app.apply(Action::SubmitToken("   ".to_string()));

        assert!(app.status.is_some());
        tokio::task::yield_now().await;
        assert_eq!(backend.validate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_token_routes_to_setup_screen() {
        let backend = Arc::new(CountingBackend::default());
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(backend, dir.path());

        app.handle_event(AppEvent::SetupResolved {
            generation: 0,
            result: Ok(SetupState::NeedsToken { rejected: true }),
        });

        assert!(matches!(app.screen, Screen::Setup(_)));
        let status = app.status.expect("invalid-token status expected");
        assert_eq!(status.level, StatusLevel::Error);
        assert!(status.message.contains("Токен"));
    }

    #[tokio::test]
    async fn stale_completions_are_discarded() {
        let backend = Arc::new(CountingBackend::default());
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(backend, dir.path());

        // Two transitions: the first dashboard's generation is now stale
        app.handle_event(AppEvent::SetupResolved {
            generation: 0,
            result: Ok(SetupState::Ready {
                account_ids: vec!["acc-1".to_string()],
            }),
        });
        let stale_generation = app.generation;
        app.apply(Action::RefreshDashboard);

        app.handle_event(AppEvent::PortfolioLoaded {
            generation: stale_generation,
            result: Err("late network failure".to_string()),
        });

        // A stale failure neither surfaces a status nor touches the screen
        assert!(app.status.is_none());
        match &app.screen {
            Screen::Dashboard(page) => assert!(page.is_loading()),
            _ => panic!("expected dashboard"),
        }
    }

    #[tokio::test]
    async fn double_submit_is_ignored_while_in_flight() {
        let backend = Arc::new(CountingBackend::default());
        let dir = tempfile::TempDir::new().unwrap();
        let mut app = test_app(backend.clone(), dir.path());

        app.apply(Action::SaveSelection(vec!["acc-1".to_string()]));
        app.apply(Action::SaveSelection(vec!["acc-1".to_string()]));

        assert!(app.in_flight);
        tokio::task::yield_now().await;
        assert!(backend.save_calls.load(Ordering::SeqCst) <= 1);
    }
}
