use chrono::{Datelike, Duration, NaiveDate};

/// Number of days in `year`, 366 for leap years.
pub fn days_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 31)
        .map(|last| last.ordinal())
        .unwrap_or(0)
}

/// Every date of `year` in order. Yields nothing for years chrono can't represent.
pub fn days_of_year(year: i32) -> impl Iterator<Item = NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .into_iter()
        .flat_map(|first| first.iter_days())
        .take_while(move |date| date.year() == year)
}

/// The Sunday on or before January 1st of `year`.
pub fn grid_origin(year: i32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let offset = first.weekday().num_days_from_sunday();
    first.checked_sub_signed(Duration::days(i64::from(offset)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_days_in_year() {
        assert_eq!(days_in_year(2023), 365);
        assert_eq!(days_in_year(2024), 366);
        assert_eq!(days_in_year(1900), 365);
        assert_eq!(days_in_year(2000), 366);
    }

    #[test]
    fn test_days_of_year_matches_length() {
        for year in [1999, 2000, 2023, 2024, 2100] {
            let days: Vec<_> = days_of_year(year).collect();
            assert_eq!(days.len() as u32, days_in_year(year));
            assert_eq!(days.first().map(|d| d.ordinal()), Some(1));
            assert!(days.iter().all(|d| d.year() == year));
        }
    }

    #[test]
    fn test_grid_origin_is_sunday() {
        // 2023-01-01 is itself a Sunday
        assert_eq!(grid_origin(2023), NaiveDate::from_ymd_opt(2023, 1, 1));
        // 2024-01-01 is a Monday
        assert_eq!(grid_origin(2024), NaiveDate::from_ymd_opt(2023, 12, 31));
        for year in 2015..2030 {
            let origin = grid_origin(year).unwrap();
            assert_eq!(origin.weekday(), Weekday::Sun);
            assert!(origin.year() <= year);
        }
    }
}
