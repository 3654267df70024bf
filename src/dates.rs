use chrono::{Datelike, Duration, Local, NaiveDate};

pub const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Normalizes any date to the Monday of its week. Every period start date
/// that leaves this module goes through here.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRange {
    monday: NaiveDate,
}

impl WeekRange {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            monday: week_start_of(date),
        }
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn monday(&self) -> NaiveDate {
        self.monday
    }

    pub fn days(&self) -> [NaiveDate; 7] {
        let mut days = [self.monday; 7];
        for (offset, day) in days.iter_mut().enumerate() {
            *day = self.monday + Duration::days(offset as i64);
        }
        days
    }

    pub fn prev(&self) -> Self {
        Self {
            monday: self.monday - Duration::days(7),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            monday: self.monday + Duration::days(7),
        }
    }

    /// Grid column headers: day name plus day of month.
    pub fn day_labels(&self) -> [String; 7] {
        let days = self.days();
        std::array::from_fn(|day| format!("{} {}", DAY_NAMES[day], days[day].format("%d")))
    }

    pub fn label(&self) -> String {
        let sunday = self.monday + Duration::days(6);
        format!(
            "W{:02} {} ({} → {})",
            self.monday.iso_week().week(),
            self.monday.iso_week().year(),
            self.monday.format("%Y-%m-%d"),
            sunday.format("%Y-%m-%d")
        )
    }

}

/// Accepts any date in `YYYY-MM-DD` form and snaps it to its week.
pub fn parse_week_input(value: &str) -> Result<WeekRange, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(WeekRange::containing)
        .map_err(|_| "Invalid date format. Use YYYY-MM-DD.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn week_start_snaps_to_monday() {
        // 2026-02-05 is a Thursday
        let thursday = NaiveDate::from_ymd_opt(2026, 2, 5).unwrap();
        let monday = week_start_of(thursday);
        assert_eq!(monday, NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());
        assert_eq!(monday.weekday(), Weekday::Mon);
    }

    #[test]
    fn week_start_is_identity_on_monday() {
        let monday = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        assert_eq!(week_start_of(monday), monday);
    }

    #[test]
    fn days_cover_monday_through_sunday() {
        let week = WeekRange::containing(NaiveDate::from_ymd_opt(2026, 2, 4).unwrap());
        let days = week.days();
        assert_eq!(days[0].weekday(), Weekday::Mon);
        assert_eq!(days[6].weekday(), Weekday::Sun);
        assert_eq!(days[6] - days[0], Duration::days(6));
    }

    #[test]
    fn day_labels_carry_the_dates() {
        let week = WeekRange::containing(NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());
        let labels = week.day_labels();
        assert_eq!(labels[0], "Mon 02");
        assert_eq!(labels[6], "Sun 08");
    }

    #[test]
    fn prev_and_next_move_whole_weeks() {
        let week = WeekRange::containing(NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());
        assert_eq!(
            week.prev().monday(),
            NaiveDate::from_ymd_opt(2026, 1, 26).unwrap()
        );
        assert_eq!(
            week.next().monday(),
            NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
        );
    }

    #[test]
    fn parse_week_input_snaps_any_day() {
        let week = parse_week_input("2026-02-07").unwrap();
        assert_eq!(week.monday(), NaiveDate::from_ymd_opt(2026, 2, 2).unwrap());
    }

    #[test]
    fn parse_week_input_rejects_garbage() {
        assert!(parse_week_input("02/07/2026").is_err());
    }
}
