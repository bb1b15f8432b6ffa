//! Portfolio dashboard
//!
//! Summary, ranked position list and the chart panel load when the screen
//! opens; the income breakdown is a modal fetched on demand.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
};
use rust_decimal::Decimal;

use crate::api::{ChartKind, IncomeReport, Period, PortfolioSummary};
use crate::charts::{ChartImage, DEFAULT_CHART_PERIOD};
use crate::format::{build_positions_view, format_rub, format_rub_signed, PositionsView};
use crate::tui::app::{Action, App};

pub struct DashboardPage {
    summary: Option<PortfolioSummary>,
    positions: Option<PositionsView>,
    loading: bool,
    charts: Vec<ChartImage>,
    income_open: bool,
    income_period: Period,
    income_report: Option<IncomeReport>,
    income_loading: bool,
}

impl DashboardPage {
    pub fn new() -> Self {
        Self {
            summary: None,
            positions: None,
            loading: true,
            charts: Vec::new(),
            income_open: false,
            income_period: DEFAULT_CHART_PERIOD,
            income_report: None,
            income_loading: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_portfolio(&mut self, summary: PortfolioSummary) {
        self.positions = Some(build_positions_view(&summary.positions));
        self.summary = Some(summary);
        self.loading = false;
    }

    pub fn portfolio_failed(&mut self) {
        self.loading = false;
    }

    pub fn set_chart(&mut self, chart: ChartImage) {
        self.charts.retain(|c| c.kind != chart.kind);
        self.charts.push(chart);
    }

    pub fn set_income(&mut self, period: Period, report: Option<IncomeReport>) {
        // A slow response for a period the user already moved away from
        // must not overwrite the current one
        if period == self.income_period {
            self.income_loading = false;
            self.income_report = report;
        }
    }

    fn shift_period(&mut self, delta: i32) -> Period {
        let periods = Period::all();
        let current = periods
            .iter()
            .position(|p| *p == self.income_period)
            .unwrap_or(0);
        let next = if delta > 0 {
            (current + 1) % periods.len()
        } else if current == 0 {
            periods.len() - 1
        } else {
            current - 1
        };
        self.income_period = periods[next];
        self.income_report = None;
        self.income_loading = true;
        self.income_period
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect) {
        let content = match (&self.summary, self.loading) {
            (Some(summary), _) => format!(
                "Общая стоимость: {}\n\nАкции: {}   Облигации: {}   Фонды: {}",
                format_rub(summary.total_value),
                summary.stocks.len(),
                summary.bonds.len(),
                summary.etfs.len()
            ),
            (None, true) => "Загрузка портфеля...".to_string(),
            (None, false) => String::new(),
        };

        let paragraph = Paragraph::new(content)
            .block(Block::default().borders(Borders::ALL).title("Портфель"));
        frame.render_widget(paragraph, area);
    }

    fn render_positions(&self, frame: &mut Frame, area: Rect) {
        let Some(view) = &self.positions else {
            let placeholder = Paragraph::new("")
                .block(Block::default().borders(Borders::ALL).title("Позиции"));
            frame.render_widget(placeholder, area);
            return;
        };

        let header = Row::new(vec!["Инструмент", "Стоимость", "Доходность"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let mut rows: Vec<Row> = view
            .rows
            .iter()
            .map(|position| {
                let yield_style = if position.yield_value >= Decimal::ZERO {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                };

                Row::new(vec![
                    Cell::from(position.name.clone()),
                    Cell::from(format_rub(position.value)),
                    Cell::from(format_rub_signed(position.yield_value)).style(yield_style),
                ])
            })
            .collect();

        if view.hidden > 0 {
            rows.push(
                Row::new(vec![
                    Cell::from(format!("+{} ещё", view.hidden)),
                    Cell::from(""),
                    Cell::from(""),
                ])
                .style(Style::default().fg(Color::Gray)),
            );
        }

        let table = Table::new(
            rows,
            &[
                Constraint::Percentage(50),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Позиции"));

        frame.render_widget(table, area);
    }

    fn render_charts(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        for kind in [ChartKind::Capital, ChartKind::Income] {
            let label = match kind {
                ChartKind::Capital => "График капитала",
                ChartKind::Income => "График доходности",
            };
            match self.charts.iter().find(|c| c.kind == kind) {
                Some(chart) => lines.push(Line::from(format!(
                    "{}: {}×{} → {}",
                    label,
                    chart.width,
                    chart.height,
                    chart.path.display()
                ))),
                None => lines.push(Line::from(Span::styled(
                    format!("{}: —", label),
                    Style::default().fg(Color::Gray),
                ))),
            }
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Графики"));
        frame.render_widget(paragraph, area);
    }

    fn render_income_modal(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup = Rect {
            x: area.width / 6,
            y: area.height / 6,
            width: area.width * 2 / 3,
            height: (area.height * 2 / 3).min(12),
        };

        let content = if self.income_loading {
            "Рассчитываю доходность...".to_string()
        } else if let Some(report) = &self.income_report {
            format!(
                "Общий доход:    {}\nОт облигаций:   {}\nОт дивидендов:  {}\nКомиссии:       {}\n\nЧистый доход:   {}",
                format_rub(report.total_income),
                format_rub(report.bond_income),
                format_rub(report.dividend_income),
                format_rub(report.commission_expenses),
                format_rub(report.net_income())
            )
        } else {
            "Нет данных".to_string()
        };

        let paragraph = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(format!(
                    "Доходность за {} (◀ ▶ период, Esc закрыть)",
                    self.income_period.label()
                )),
        );

        frame.render_widget(Clear, popup);
        frame.render_widget(paragraph, popup);
    }
}

impl super::Page for DashboardPage {
    fn render(&self, frame: &mut Frame, area: Rect, _app: &App) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(4),
            ])
            .split(area);

        self.render_summary(frame, chunks[0]);
        self.render_positions(frame, chunks[1]);
        self.render_charts(frame, chunks[2]);

        if self.income_open {
            self.render_income_modal(frame);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.income_open {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('i') | KeyCode::Char('q') => {
                    self.income_open = false;
                    None
                }
                KeyCode::Right => Some(Action::QueryIncome(self.shift_period(1))),
                KeyCode::Left => Some(Action::QueryIncome(self.shift_period(-1))),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('i') => {
                self.income_open = true;
                self.income_report = None;
                self.income_loading = true;
                Some(Action::QueryIncome(self.income_period))
            }
            KeyCode::Char('r') => Some(Action::RefreshDashboard),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }
}

impl Default for DashboardPage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Position;
    use crate::tui::pages::Page;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use rust_decimal_macros::dec;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn summary() -> PortfolioSummary {
        PortfolioSummary {
            total_value: dec!(150000),
            stocks: vec![
                Position {
                    name: "a".to_string(),
                    value: dec!(1),
                    yield_value: dec!(0),
                },
                Position {
                    name: "b".to_string(),
                    value: dec!(2),
                    yield_value: dec!(0),
                },
            ],
            bonds: vec![],
            etfs: vec![Position {
                name: "c".to_string(),
                value: dec!(3),
                yield_value: dec!(0),
            }],
            positions: vec![Position {
                name: "X".to_string(),
                value: dec!(1000),
                yield_value: dec!(50),
            }],
        }
    }

    #[test]
    fn portfolio_fills_the_view() {
        let mut page = DashboardPage::new();
        page.set_portfolio(summary());

        assert!(!page.is_loading());
        let summary = page.summary.as_ref().unwrap();
        assert_eq!(format_rub(summary.total_value), "150 000 ₽");
        assert_eq!(
            (summary.stocks.len(), summary.bonds.len(), summary.etfs.len()),
            (2, 0, 1)
        );

        let view = page.positions.as_ref().unwrap();
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.hidden, 0);
        assert_eq!(format_rub_signed(view.rows[0].yield_value), "+50 ₽");
        assert!(view.rows[0].yield_value >= Decimal::ZERO);
    }

    #[test]
    fn opening_income_queries_current_period() {
        let mut page = DashboardPage::new();
        page.set_portfolio(summary());

        match page.handle_key(press(KeyCode::Char('i'))) {
            Some(Action::QueryIncome(period)) => assert_eq!(period, DEFAULT_CHART_PERIOD),
            other => panic!("expected income query, got {:?}", other),
        }
        assert!(page.income_open);
        assert!(page.income_loading);
    }

    #[test]
    fn period_shift_wraps_and_refetches() {
        let mut page = DashboardPage::new();
        page.income_open = true;

        match page.handle_key(press(KeyCode::Left)) {
            Some(Action::QueryIncome(period)) => assert_eq!(period, Period::Day),
            other => panic!("expected income query, got {:?}", other),
        }
    }

    #[test]
    fn late_income_for_old_period_is_ignored() {
        let mut page = DashboardPage::new();
        page.income_open = true;
        page.shift_period(1); // now Month, loading

        let report = IncomeReport {
            total_income: dec!(10),
            bond_income: dec!(1),
            dividend_income: dec!(9),
            commission_expenses: dec!(2),
        };
        page.set_income(Period::Week, Some(report.clone()));
        assert!(page.income_report.is_none());

        page.set_income(Period::Month, Some(report));
        assert!(page.income_report.is_some());
        assert!(!page.income_loading);
    }

    #[test]
    fn chart_of_same_kind_is_replaced() {
        let mut page = DashboardPage::new();
        let chart = |w| ChartImage {
            kind: ChartKind::Capital,
            width: w,
            height: 10,
            path: std::path::PathBuf::from("capital.png"),
        };

        page.set_chart(chart(100));
        page.set_chart(chart(200));
        assert_eq!(page.charts.len(), 1);
        assert_eq!(page.charts[0].width, 200);
    }
}
