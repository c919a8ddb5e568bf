use chrono::{Datelike, NaiveDate};

/// Day of month on which a new billing cycle starts.
///
/// A statement covers the 25th of one month through the 24th of the next,
/// so a transaction dated on day 1-24 belongs to the cycle that started the
/// previous month.
pub const CYCLE_START_DAY: u32 = 25;

/// Maps a transaction date to its billing-period label.
///
/// The label is the `YYYY-MM` of the cycle start: `2025-01-24` falls in
/// `"2024-12"`, `2025-01-25` opens `"2025-01"`.
pub fn billing_period(date: NaiveDate) -> String {
    let (year, month) = if date.day() >= CYCLE_START_DAY {
        (date.year(), date.month())
    } else if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    };
    format!("{year:04}-{month:02}")
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::billing_period;
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn should_bucket_days_before_the_cutover_into_the_previous_cycle() {
        assert_eq!("2025-07", billing_period(date(2025, 8, 1)));
        assert_eq!("2025-07", billing_period(date(2025, 8, 24)));
    }

    #[test]
    fn should_bucket_the_cutover_day_into_a_new_cycle() {
        assert_eq!("2025-08", billing_period(date(2025, 8, 25)));
        assert_eq!("2025-08", billing_period(date(2025, 8, 31)));
    }

    #[test]
    fn should_roll_january_back_into_december_of_the_previous_year() {
        assert_eq!("2024-12", billing_period(date(2025, 1, 24)));
        assert_eq!("2025-01", billing_period(date(2025, 1, 25)));
    }

    #[test]
    fn should_be_stable_for_the_same_date() {
        let d = date(2025, 3, 12);
        assert_eq!(billing_period(d), billing_period(d));
    }
}
