pub const DAILY_CAP: f64 = 24.0;
pub const MIN_HOURS: f64 = 0.25;
pub const MAX_HOURS: f64 = 24.0;
pub const INCREMENT: f64 = 0.25;

/// One hour cell. `Empty` is a real state, not a synonym for zero: a cell
/// the user has not filled in stays `Empty` until save-time serialization.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HourField {
    #[default]
    Empty,
    Set(f64),
}

impl HourField {
    pub fn from_wire(value: f64) -> Self {
        if value == 0.0 {
            HourField::Empty
        } else {
            HourField::Set(value)
        }
    }

    /// Save-time coercion: this is the only place an empty cell becomes zero.
    pub fn to_wire(self) -> f64 {
        match self {
            HourField::Empty => 0.0,
            HourField::Set(value) => value,
        }
    }

    pub fn value(self) -> f64 {
        self.to_wire()
    }

    pub fn display(self) -> String {
        match self {
            HourField::Empty => String::new(),
            HourField::Set(value) => {
                if value.fract() == 0.0 {
                    format!("{}", value as i64)
                } else {
                    format!("{value}")
                }
            }
        }
    }
}

/// Parses raw cell input. Blank input is the empty state; a number is
/// accepted only if it is zero or within [0.25, 24] on a 0.25 step.
/// Rejected input means the edit is not applied.
pub fn parse_hours(input: &str) -> Result<HourField, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(HourField::Empty);
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| format!("'{trimmed}' is not a number"))?;

    if value == 0.0 {
        return Ok(HourField::Empty);
    }
    if !(MIN_HOURS..=MAX_HOURS).contains(&value) {
        return Err(format!("Hours must be 0 or between {MIN_HOURS} and {MAX_HOURS}"));
    }
    let steps = value / INCREMENT;
    if (steps - steps.round()).abs() > 1e-9 {
        return Err(format!("Hours must be in {INCREMENT} increments"));
    }

    Ok(HourField::Set(value))
}

pub fn daily_total(rows: &[[HourField; 7]], day: usize) -> f64 {
    rows.iter().map(|row| row[day].value()).sum()
}

/// Returns the first day whose column sum exceeds the 24-hour cap.
pub fn daily_cap_violation(rows: &[[HourField; 7]]) -> Option<usize> {
    (0..7).find(|&day| daily_total(rows, day) > DAILY_CAP + 1e-9)
}

/// Pre-checks a single cell edit: would setting `rows[row][day]` to `field`
/// push that day's total over the cap?
pub fn edit_exceeds_cap(rows: &[[HourField; 7]], row: usize, day: usize, field: HourField) -> bool {
    let total: f64 = rows
        .iter()
        .enumerate()
        .map(|(index, cells)| {
            if index == row {
                field.value()
            } else {
                cells[day].value()
            }
        })
        .sum();
    total > DAILY_CAP + 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_empty_not_zero() {
        assert_eq!(parse_hours("").unwrap(), HourField::Empty);
        assert_eq!(parse_hours("   ").unwrap(), HourField::Empty);
        assert_eq!(HourField::Empty.display(), "");
    }

    #[test]
    fn zero_is_accepted() {
        assert_eq!(parse_hours("0").unwrap(), HourField::Empty);
        assert_eq!(parse_hours("0").unwrap().to_wire(), 0.0);
    }

    #[test]
    fn in_range_values_accepted() {
        assert_eq!(parse_hours("0.25").unwrap(), HourField::Set(0.25));
        assert_eq!(parse_hours("8").unwrap(), HourField::Set(8.0));
        assert_eq!(parse_hours("24").unwrap(), HourField::Set(24.0));
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(parse_hours("0.1").is_err());
        assert!(parse_hours("24.25").is_err());
        assert!(parse_hours("-1").is_err());
        assert!(parse_hours("abc").is_err());
    }

    #[test]
    fn off_step_values_rejected() {
        assert!(parse_hours("0.3").is_err());
        assert!(parse_hours("7.99").is_err());
        assert!(parse_hours("1.125").is_err());
    }

    #[test]
    fn empty_serializes_to_zero_only_at_wire_time() {
        let field = parse_hours("").unwrap();
        assert_eq!(field, HourField::Empty);
        assert_eq!(field.to_wire(), 0.0);
    }

    #[test]
    fn cap_blocks_increment_past_24() {
        // Two rows already summing to exactly 24 on Monday.
        let rows = vec![
            [HourField::Set(12.0), HourField::Empty, HourField::Empty, HourField::Empty, HourField::Empty, HourField::Empty, HourField::Empty],
            [HourField::Set(12.0), HourField::Empty, HourField::Empty, HourField::Empty, HourField::Empty, HourField::Empty, HourField::Empty],
        ];
        assert!(daily_cap_violation(&rows).is_none());
        assert!(edit_exceeds_cap(&rows, 1, 0, HourField::Set(12.25)));
        assert!(!edit_exceeds_cap(&rows, 1, 0, HourField::Set(11.75)));
    }

    #[test]
    fn cap_violation_names_the_day() {
        let mut row = [HourField::Empty; 7];
        row[3] = HourField::Set(24.0);
        let rows = vec![row, row];
        assert_eq!(daily_cap_violation(&rows), Some(3));
    }

    #[test]
    fn daily_total_ignores_empty_cells() {
        let rows = vec![
            [HourField::Set(8.0), HourField::Empty, HourField::Empty, HourField::Empty, HourField::Empty, HourField::Empty, HourField::Empty],
            [HourField::Empty; 7],
        ];
        assert_eq!(daily_total(&rows, 0), 8.0);
        assert_eq!(daily_total(&rows, 1), 0.0);
    }
}
