//! Parser for the detail text Postgres attaches to a violation of the
//! `bookings_no_overlap` exclusion constraint, e.g.
//! "Key (room_number, daterange(check_in_date, check_out_date))=(101, [2025-01-12,2025-01-14)) conflicts with existing key (room_number, daterange(check_in_date, check_out_date))=(101, [2025-01-10,2025-01-13))."

use core::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use regex::Regex;

use crate::RoomNumber;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingConflictInfo {
    Parsed(BookingConflict),
    Unparsed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConflict {
    pub new: BookingWindow,
    pub old: BookingWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingWindow {
    pub room_number: RoomNumber,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl BookingWindow {
    pub fn new(room_number: RoomNumber, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            room_number,
            check_in,
            check_out,
        }
    }
}

impl From<&str> for BookingConflictInfo {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(conflict) => Self::Parsed(conflict),
            Err(_) => Self::Unparsed(s.to_string()),
        }
    }
}

impl FromStr for BookingConflict {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // each key renders as "=(<room>, [<check-in>,<check-out>))";
        // the new window comes first, the existing one second
        let re = Regex::new(
            r"=\((?P<room>\d+),\s*\[(?P<start>\d{4}-\d{2}-\d{2}),(?P<end>\d{4}-\d{2}-\d{2})\)\)",
        )
        .map_err(|_| ())?;

        let mut windows = vec![];
        for cap in re.captures_iter(s) {
            windows.push(BookingWindow {
                room_number: cap["room"].parse().map_err(|_| ())?,
                check_in: cap["start"].parse().map_err(|_| ())?,
                check_out: cap["end"].parse().map_err(|_| ())?,
            });
        }

        if windows.len() != 2 {
            return Err(());
        }

        let old = windows.pop().ok_or(())?;
        let new = windows.pop().ok_or(())?;
        Ok(Self { new, old })
    }
}

impl fmt::Display for BookingConflictInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(conflict) => write!(f, "{}", conflict),
            Self::Unparsed(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for BookingConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "room {} is booked [{}, {}), requested [{}, {})",
            self.old.room_number,
            self.old.check_in,
            self.old.check_out,
            self.new.check_in,
            self.new.check_out
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_DETAIL: &str = "Key (room_number, daterange(check_in_date, check_out_date))=(101, [2025-01-12,2025-01-14)) conflicts with existing key (room_number, daterange(check_in_date, check_out_date))=(101, [2025-01-10,2025-01-13)).";

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn conflict_detail_should_parse() {
        let conflict: BookingConflict = TEST_DETAIL.parse().unwrap();
        assert_eq!(conflict.new.room_number, 101);
        assert_eq!(conflict.new.check_in, date("2025-01-12"));
        assert_eq!(conflict.new.check_out, date("2025-01-14"));
        assert_eq!(conflict.old.room_number, 101);
        assert_eq!(conflict.old.check_in, date("2025-01-10"));
        assert_eq!(conflict.old.check_out, date("2025-01-13"));
    }

    #[test]
    fn unparsable_detail_should_be_kept_verbatim() {
        let info: BookingConflictInfo = "something unexpected".into();
        assert_eq!(
            info,
            BookingConflictInfo::Unparsed("something unexpected".to_string())
        );
    }

    #[test]
    fn parsed_conflict_should_display_both_windows() {
        let info: BookingConflictInfo = TEST_DETAIL.into();
        assert_eq!(
            info.to_string(),
            "room 101 is booked [2025-01-10, 2025-01-13), requested [2025-01-12, 2025-01-14)"
        );
    }
}
