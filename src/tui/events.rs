use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::api::{Account, IncomeReport, Period, PortfolioSummary};
use crate::charts::ChartImage;
use crate::setup::SetupState;

/// Everything the main loop reacts to: terminal input, the tick that drives
/// status expiry, and completions of spawned backend calls. Completions carry
/// the view generation they were spawned under so stale ones can be discarded.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Error(String),
    SetupResolved {
        generation: u64,
        result: Result<SetupState, String>,
    },
    AccountsLoaded {
        generation: u64,
        /// Backend account list plus the locally stored selection
        result: Result<(Vec<Account>, Vec<String>), String>,
    },
    TokenSubmitted {
        generation: u64,
        result: Result<bool, String>,
    },
    SelectionSaved {
        generation: u64,
        result: Result<(), String>,
    },
    PortfolioLoaded {
        generation: u64,
        result: Result<PortfolioSummary, String>,
    },
    ChartLoaded {
        generation: u64,
        chart: ChartImage,
    },
    IncomeLoaded {
        generation: u64,
        period: Period,
        result: Result<IncomeReport, String>,
    },
}

pub struct EventHandler {
    tx: mpsc::UnboundedSender<AppEvent>,
    rx: mpsc::UnboundedReceiver<AppEvent>,
    _task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let input_tx = tx.clone();
        let _task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if input_tx.send(AppEvent::Tick).is_err() {
                            debug!("Event channel closed, stopping tick handler");
                            break;
                        }
                    }
                    _ = tokio::time::sleep(Duration::from_millis(1)) => {
                        // Check for key events frequently
                        if let Ok(true) = event::poll(Duration::from_millis(0)) {
                            match event::read() {
                                Ok(CrosstermEvent::Key(key)) => {
                                    if input_tx.send(AppEvent::Key(key)).is_err() {
                                        debug!("Event channel closed, stopping input handler");
                                        break;
                                    }
                                }
                                Ok(_) => {
                                    // Ignore other event types
                                }
                                Err(e) => {
                                    error!("Failed to read terminal event: {}", e);
                                    let _ = input_tx.send(AppEvent::Error(format!(
                                        "Terminal read error: {}",
                                        e
                                    )));
                                }
                            }
                        }
                    }
                }
            }

            debug!("Event handler task ended");
        });

        Self { tx, rx, _task }
    }

    /// Sender handed to spawned backend calls for reporting completions
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}
