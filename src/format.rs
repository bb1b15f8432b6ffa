//! Locale formatting and dashboard view shaping
//!
//! Amounts render the way the backend's audience expects them: thousands
//! grouped with spaces, comma as the decimal separator, trailing "₽".
//! Fractional digits are kept exactly as they arrive; no rounding happens
//! on this side.

use rust_decimal::Decimal;

use crate::api::Position;

/// Maximum number of positions shown on the dashboard
pub const MAX_POSITIONS: usize = 10;

/// Format an amount as rubles: `150 000 ₽`, `1 234,56 ₽`
pub fn format_rub(amount: Decimal) -> String {
    let text = amount.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut out = String::new();
    if amount.is_sign_negative() && !amount.is_zero() {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out.push_str(" ₽");
    out
}

/// Format an amount with an explicit sign: `+50 ₽`, `-10 ₽`
pub fn format_rub_signed(amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        format_rub(amount)
    } else {
        format!("+{}", format_rub(amount))
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Ranked position list as shown on the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct PositionsView {
    /// Top positions, descending by value; ties keep their original order
    pub rows: Vec<Position>,
    /// How many positions did not fit ("+N ещё" suffix when non-zero)
    pub hidden: usize,
}

/// Rank positions by value and cut the list to [`MAX_POSITIONS`].
pub fn build_positions_view(positions: &[Position]) -> PositionsView {
    let mut rows: Vec<Position> = positions.to_vec();
    // Stable sort: equal values keep the backend's original order
    rows.sort_by(|a, b| b.value.cmp(&a.value));

    let hidden = rows.len().saturating_sub(MAX_POSITIONS);
    rows.truncate(MAX_POSITIONS);

    PositionsView { rows, hidden }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(name: &str, value: Decimal) -> Position {
        Position {
            name: name.to_string(),
            value,
            yield_value: Decimal::ZERO,
        }
    }

    #[test]
    fn test_format_rub_groups_thousands() {
        assert_eq!(format_rub(dec!(150000)), "150 000 ₽");
        assert_eq!(format_rub(dec!(1000000)), "1 000 000 ₽");
        assert_eq!(format_rub(dec!(999)), "999 ₽");
        assert_eq!(format_rub(dec!(0)), "0 ₽");
    }

    #[test]
    fn test_format_rub_keeps_input_precision() {
        assert_eq!(format_rub(dec!(1234.56)), "1 234,56 ₽");
        assert_eq!(format_rub(dec!(987.50)), "987,50 ₽");
    }

    #[test]
    fn test_format_rub_signed() {
        assert_eq!(format_rub_signed(dec!(50)), "+50 ₽");
        assert_eq!(format_rub_signed(dec!(0)), "+0 ₽");
        assert_eq!(format_rub_signed(dec!(-1000)), "-1 000 ₽");
    }

    #[test]
    fn test_positions_view_is_ranked_and_cut() {
        let positions: Vec<Position> = (0..12)
            .map(|i| position(&format!("P{}", i), Decimal::from(i)))
            .collect();

        let view = build_positions_view(&positions);
        assert_eq!(view.rows.len(), MAX_POSITIONS);
        assert_eq!(view.hidden, 2);
        assert_eq!(view.rows[0].name, "P11");
        assert_eq!(view.rows[9].name, "P2");
    }

    #[test]
    fn test_positions_view_short_list_has_no_suffix() {
        let positions = vec![position("A", dec!(1)), position("B", dec!(2))];

        let view = build_positions_view(&positions);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.hidden, 0);
        assert_eq!(view.rows[0].name, "B");
    }

    #[test]
    fn test_positions_view_ties_are_stable() {
        let positions = vec![
            position("first", dec!(10)),
            position("second", dec!(10)),
            position("third", dec!(10)),
        ];

        let view = build_positions_view(&positions);
        let names: Vec<&str> = view.rows.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_positions_view_exact_boundary() {
        let positions: Vec<Position> = (0..10)
            .map(|i| position(&format!("P{}", i), Decimal::from(i)))
            .collect();

        let view = build_positions_view(&positions);
        assert_eq!(view.rows.len(), 10);
        assert_eq!(view.hidden, 0);
    }
}
