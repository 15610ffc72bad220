//! Calendar dates and conversion
//!
//! Event dates keep the calendar they were recorded in. Anything that has
//! to land on a Gregorian month/day is moved there through a Julian Day
//! Number (JDN).

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// JDN of the day before 0001-01-01 (proleptic Gregorian)
const CE_OFFSET: i64 = 1_721_425;

// ============================================================================
// Calendar & DateValue
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Calendar {
    #[default]
    Gregorian,
    Julian,
    Hebrew,
    French,
    Persian,
    Islamic,
    Swedish,
}

impl Calendar {
    /// Gramps XML `cformat` attribute; absent or unknown means Gregorian
    pub fn from_xml(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "julian" => Calendar::Julian,
            "hebrew" => Calendar::Hebrew,
            "french" | "french republican" => Calendar::French,
            "persian" => Calendar::Persian,
            "islamic" => Calendar::Islamic,
            "swedish" => Calendar::Swedish,
            _ => Calendar::Gregorian,
        }
    }

    pub fn as_xml(&self) -> &'static str {
        match self {
            Calendar::Gregorian => "Gregorian",
            Calendar::Julian => "Julian",
            Calendar::Hebrew => "Hebrew",
            Calendar::French => "French Republican",
            Calendar::Persian => "Persian",
            Calendar::Islamic => "Islamic",
            Calendar::Swedish => "Swedish",
        }
    }

    fn months(&self) -> u8 {
        match self {
            Calendar::Hebrew | Calendar::French => 13,
            _ => 12,
        }
    }
}

/// A single date as recorded on an event. Zero means unknown for each part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateValue {
    pub calendar: Calendar,
    pub year: i32,
    pub month: u8,
    pub day: u8,
    /// Free-text date that could not be interpreted
    pub text_only: bool,
}

impl DateValue {
    pub fn new(calendar: Calendar, year: i32, month: u8, day: u8) -> Self {
        Self {
            calendar,
            year,
            month,
            day,
            text_only: false,
        }
    }

    pub fn gregorian(year: i32, month: u8, day: u8) -> Self {
        Self::new(Calendar::Gregorian, year, month, day)
    }

    pub fn text() -> Self {
        Self {
            text_only: true,
            ..Self::default()
        }
    }

    /// Parse a Gramps ISO value (`1850`, `1850-03`, `1850-03-12`, `????-03-12`)
    pub fn parse(calendar: Calendar, value: &str) -> Self {
        match parse_iso(value) {
            Some((year, month, day)) => Self::new(calendar, year, month, day),
            None => Self::text(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.text_only && !(self.year == 0 && self.month == 0 && self.day == 0)
    }

    /// Same date on the Gregorian calendar.
    ///
    /// Non-Gregorian dates need all three parts to be converted; partial
    /// ones give `None`.
    pub fn to_gregorian(&self) -> Option<DateValue> {
        if self.calendar == Calendar::Gregorian {
            return Some(*self);
        }
        if self.text_only || self.year == 0 || self.month == 0 || self.day == 0 {
            return None;
        }
        let jdn = to_jdn(self.calendar, self.year, self.month, self.day)?;
        let (year, month, day) = from_jdn(Calendar::Gregorian, jdn)?;
        Some(DateValue::gregorian(year, month, day))
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text_only {
            return f.write_str("(text)");
        }
        if self.year == 0 {
            write!(f, "????")?;
        } else {
            write!(f, "{:04}", self.year)?;
        }
        if self.month > 0 {
            write!(f, "-{:02}", self.month)?;
            if self.day > 0 {
                write!(f, "-{:02}", self.day)?;
            }
        }
        if self.calendar != Calendar::Gregorian {
            write!(f, " ({})", self.calendar.as_xml())?;
        }
        Ok(())
    }
}

fn parse_iso(value: &str) -> Option<(i32, u8, u8)> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let (negative, value) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    let mut parts = value.split('-');
    let year_part = parts.next()?;
    let year = if !year_part.is_empty() && year_part.chars().all(|c| c == '?') {
        0
    } else {
        let year: i32 = year_part.parse().ok()?;
        if negative {
            -year
        } else {
            year
        }
    };
    let month: u8 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    let day: u8 = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || month > 13 || day > 31 {
        return None;
    }
    Some((year, month, day))
}

// ============================================================================
// Julian Day Number conversion
// ============================================================================

/// Day number of a date on the given calendar
pub fn to_jdn(calendar: Calendar, year: i32, month: u8, day: u8) -> Option<i64> {
    if month == 0 || month > calendar.months() || day == 0 || day > 31 {
        return None;
    }
    let (y, m, d) = (year as i64, month as i64, day as i64);
    let jdn = match calendar {
        Calendar::Gregorian => {
            let date = NaiveDate::from_ymd_opt(year, month as u32, day as u32)?;
            date.num_days_from_ce() as i64 + CE_OFFSET
        }
        Calendar::Julian => julian_to_jdn(y, m, d),
        Calendar::Hebrew => hebrew::to_fixed(y, hebrew::from_gramps_month(y, m), d) + CE_OFFSET,
        Calendar::French => french_to_jdn(y, m, d),
        Calendar::Persian => persian_to_jdn(y, m, d),
        Calendar::Islamic => islamic_to_jdn(y, m, d),
        Calendar::Swedish => swedish_to_jdn(y, m, d),
    };
    Some(jdn)
}

/// (year, month, day) of a day number on the given calendar
pub fn from_jdn(calendar: Calendar, jdn: i64) -> Option<(i32, u8, u8)> {
    let (y, m, d) = match calendar {
        Calendar::Gregorian => {
            let days = i32::try_from(jdn - CE_OFFSET).ok()?;
            let date = NaiveDate::from_num_days_from_ce_opt(days)?;
            (date.year() as i64, date.month() as i64, date.day() as i64)
        }
        Calendar::Julian => julian_from_jdn(jdn),
        Calendar::Hebrew => {
            let (y, m, d) = hebrew::from_fixed(jdn - CE_OFFSET);
            (y, hebrew::to_gramps_month(m), d)
        }
        Calendar::French => french_from_jdn(jdn),
        Calendar::Persian => persian_from_jdn(jdn),
        Calendar::Islamic => islamic_from_jdn(jdn),
        Calendar::Swedish => swedish_from_jdn(jdn),
    };
    Some((i32::try_from(y).ok()?, m as u8, d as u8))
}

fn julian_to_jdn(y: i64, m: i64, d: i64) -> i64 {
    let a = (14 - m) / 12;
    let y2 = y + 4800 - a;
    let m2 = m + 12 * a - 3;
    d + (153 * m2 + 2) / 5 + 365 * y2 + y2.div_euclid(4) - 32083
}

fn julian_from_jdn(jdn: i64) -> (i64, i64, i64) {
    let c = jdn + 32082;
    let d = (4 * c + 3).div_euclid(1461);
    let e = c - (1461 * d).div_euclid(4);
    let m = (5 * e + 2) / 153;
    let day = e - (153 * m + 2) / 5 + 1;
    let month = m + 3 - 12 * (m / 10);
    let year = d - 4800 + m / 10;
    (year, month, day)
}

// Romme rule: every fourth year is sextile
const FRENCH_OFFSET: i64 = 2_375_474;
const FRENCH_DAYS_PER_4_YEARS: i64 = 1461;

fn french_to_jdn(y: i64, m: i64, d: i64) -> i64 {
    (y * FRENCH_DAYS_PER_4_YEARS).div_euclid(4) + (m - 1) * 30 + d + FRENCH_OFFSET
}

fn french_from_jdn(jdn: i64) -> (i64, i64, i64) {
    let temp = (jdn - FRENCH_OFFSET) * 4 - 1;
    let year = temp.div_euclid(FRENCH_DAYS_PER_4_YEARS);
    let day_of_year = temp.rem_euclid(FRENCH_DAYS_PER_4_YEARS) / 4;
    (year, day_of_year / 30 + 1, day_of_year % 30 + 1)
}

const PERSIAN_EPOCH: i64 = 1_948_320;

fn persian_to_jdn(y: i64, m: i64, d: i64) -> i64 {
    let epbase = if y >= 0 { y - 474 } else { y - 473 };
    let epyear = 474 + epbase.rem_euclid(2820);
    let month_days = if m <= 7 { (m - 1) * 31 } else { (m - 1) * 30 + 6 };
    month_days
        + (epyear * 682 - 110).div_euclid(2816)
        + (epyear - 1) * 365
        + d
        + epbase.div_euclid(2820) * 1_029_983
        + PERSIAN_EPOCH
}

fn persian_from_jdn(jdn: i64) -> (i64, i64, i64) {
    let depoch = jdn - persian_to_jdn(475, 1, 1);
    let cycle = depoch.div_euclid(1_029_983);
    let cyear = depoch.rem_euclid(1_029_983);
    let ycycle = if cyear == 1_029_982 {
        2820
    } else {
        let aux1 = cyear / 366;
        let aux2 = cyear % 366;
        (2134 * aux1 + 2816 * aux2 + 2815) / 1_028_522 + aux1 + 1
    };
    let mut year = ycycle + 2820 * cycle + 474;
    if year <= 0 {
        year -= 1;
    }
    let yday = jdn - persian_to_jdn(year, 1, 1) + 1;
    let month = if yday <= 186 {
        (yday + 30) / 31
    } else {
        (yday - 6 + 29) / 30
    };
    let day = jdn - persian_to_jdn(year, month, 1) + 1;
    (year, month, day)
}

const ISLAMIC_EPOCH: i64 = 1_948_439;

fn islamic_to_jdn(y: i64, m: i64, d: i64) -> i64 {
    // ceil(29.5 * (m - 1))
    let month_days = (59 * (m - 1) + 1) / 2;
    d + month_days + (y - 1) * 354 + (3 + 11 * y).div_euclid(30) + ISLAMIC_EPOCH
}

fn islamic_from_jdn(jdn: i64) -> (i64, i64, i64) {
    let year = (30 * (jdn - ISLAMIC_EPOCH - 1) + 10646).div_euclid(10631);
    let into_year = (jdn - (29 + islamic_to_jdn(year, 1, 1))) as f64;
    let month = ((into_year / 29.5).ceil() as i64 + 1).clamp(1, 12);
    let day = jdn - islamic_to_jdn(year, month, 1) + 1;
    (year, month, day)
}

// Sweden ran one day behind the Julian calendar from 1700-03-01 until
// 1712-02-30, then switched to Gregorian on 1753-03-01.
fn swedish_to_jdn(y: i64, m: i64, d: i64) -> i64 {
    let date = (y, m, d);
    if (1700, 3, 1) <= date && date <= (1712, 2, 30) {
        julian_to_jdn(y, m, d) - 1
    } else if (1753, 3, 1) <= date {
        gregorian_to_jdn(y, m, d)
    } else {
        julian_to_jdn(y, m, d)
    }
}

fn swedish_from_jdn(jdn: i64) -> (i64, i64, i64) {
    let start = julian_to_jdn(1700, 3, 1) - 1;
    let end = julian_to_jdn(1712, 2, 30) - 1;
    if jdn == end {
        (1712, 2, 30)
    } else if (start..end).contains(&jdn) {
        julian_from_jdn(jdn + 1)
    } else if jdn >= gregorian_to_jdn(1753, 3, 1) {
        gregorian_from_jdn(jdn)
    } else {
        julian_from_jdn(jdn)
    }
}

fn gregorian_to_jdn(y: i64, m: i64, d: i64) -> i64 {
    let a = (14 - m) / 12;
    let y2 = y + 4800 - a;
    let m2 = m + 12 * a - 3;
    d + (153 * m2 + 2) / 5 + 365 * y2 + y2.div_euclid(4) - y2.div_euclid(100)
        + y2.div_euclid(400)
        - 32045
}

fn gregorian_from_jdn(jdn: i64) -> (i64, i64, i64) {
    let a = jdn + 32044;
    let b = (4 * a + 3).div_euclid(146_097);
    let c = a - (146_097 * b).div_euclid(4);
    let d = (4 * c + 3) / 1461;
    let e = c - (1461 * d) / 4;
    let m = (5 * e + 2) / 153;
    let day = e - (153 * m + 2) / 5 + 1;
    let month = m + 3 - 12 * (m / 10);
    let year = 100 * b + d - 4800 + m / 10;
    (year, month, day)
}

/// Arithmetic Hebrew calendar on fixed day numbers (day 1 = 0001-01-01 CE).
///
/// Internally months count from Nisan (1) to Adar II (13) with Tishri = 7;
/// Gramps numbers them from Tishri (1) with Adar I = 6, Adar II = 7.
mod hebrew {
    const EPOCH: i64 = -1_373_427;
    const TISHRI: i64 = 7;
    const NISAN: i64 = 1;

    fn leap_year(y: i64) -> bool {
        (7 * y + 1).rem_euclid(19) < 7
    }

    fn last_month(y: i64) -> i64 {
        if leap_year(y) {
            13
        } else {
            12
        }
    }

    fn elapsed_days(y: i64) -> i64 {
        let months = (235 * y - 234).div_euclid(19);
        let parts = 12084 + 13753 * months;
        let days = 29 * months + parts.div_euclid(25920);
        if (3 * (days + 1)).rem_euclid(7) < 3 {
            days + 1
        } else {
            days
        }
    }

    fn year_length_correction(y: i64) -> i64 {
        let ny0 = elapsed_days(y - 1);
        let ny1 = elapsed_days(y);
        let ny2 = elapsed_days(y + 1);
        if ny2 - ny1 == 356 {
            2
        } else if ny1 - ny0 == 382 {
            1
        } else {
            0
        }
    }

    fn new_year(y: i64) -> i64 {
        EPOCH + elapsed_days(y) + year_length_correction(y)
    }

    fn days_in_year(y: i64) -> i64 {
        new_year(y + 1) - new_year(y)
    }

    fn month_length(y: i64, m: i64) -> i64 {
        let long_marheshvan = days_in_year(y).rem_euclid(10) == 5;
        let short_kislev = days_in_year(y).rem_euclid(10) == 3;
        match m {
            2 | 4 | 6 | 10 | 13 => 29,
            12 if !leap_year(y) => 29,
            8 if !long_marheshvan => 29,
            9 if short_kislev => 29,
            _ => 30,
        }
    }

    pub(super) fn to_fixed(y: i64, m: i64, d: i64) -> i64 {
        let mut days = new_year(y) + d - 1;
        if m < TISHRI {
            days += (TISHRI..=last_month(y)).map(|mm| month_length(y, mm)).sum::<i64>();
            days += (NISAN..m).map(|mm| month_length(y, mm)).sum::<i64>();
        } else {
            days += (TISHRI..m).map(|mm| month_length(y, mm)).sum::<i64>();
        }
        days
    }

    pub(super) fn from_fixed(date: i64) -> (i64, i64, i64) {
        let approx = ((date - EPOCH) as f64 / (35_975_351.0 / 98_496.0)).floor() as i64 + 1;
        let mut year = approx - 1;
        while new_year(year + 1) <= date {
            year += 1;
        }
        let mut month = if date < to_fixed(year, NISAN, 1) {
            TISHRI
        } else {
            NISAN
        };
        while month < last_month(year) && date > to_fixed(year, month, month_length(year, month)) {
            month += 1;
        }
        let day = date - to_fixed(year, month, 1) + 1;
        (year, month, day)
    }

    pub(super) fn from_gramps_month(y: i64, m: i64) -> i64 {
        match m {
            1..=5 => m + 6,
            6 => 12,
            7 if leap_year(y) => 13,
            7 => 12,
            _ => m - 7,
        }
    }

    pub(super) fn to_gramps_month(m: i64) -> i64 {
        match m {
            7..=11 => m - 6,
            12 => 6,
            13 => 7,
            _ => m + 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greg(cal: Calendar, y: i32, m: u8, d: u8) -> (i32, u8, u8) {
        let date = DateValue::new(cal, y, m, d).to_gregorian().unwrap();
        (date.year, date.month, date.day)
    }

    #[test]
    fn test_parse_iso_values() {
        let d = DateValue::parse(Calendar::Gregorian, "1850-03-12");
        assert_eq!((d.year, d.month, d.day), (1850, 3, 12));
        assert!(d.is_valid());

        let partial = DateValue::parse(Calendar::Gregorian, "1850-03");
        assert_eq!((partial.year, partial.month, partial.day), (1850, 3, 0));

        let no_year = DateValue::parse(Calendar::Gregorian, "????-07-04");
        assert_eq!((no_year.year, no_year.month, no_year.day), (0, 7, 4));
        assert!(no_year.is_valid());

        assert!(DateValue::parse(Calendar::Gregorian, "abt. spring").text_only);
        assert!(!DateValue::parse(Calendar::Gregorian, "").is_valid());
    }

    #[test]
    fn test_julian_to_gregorian() {
        // Britain skipped 1752-09-03 .. 1752-09-13
        assert_eq!(greg(Calendar::Julian, 1752, 9, 2), (1752, 9, 13));
        assert_eq!(greg(Calendar::Julian, 1600, 2, 29), (1600, 3, 10));
    }

    #[test]
    fn test_epochs() {
        // 1 Vendemiaire an I
        assert_eq!(greg(Calendar::French, 1, 1, 1), (1792, 9, 22));
        // 1 Tishri 5784
        assert_eq!(greg(Calendar::Hebrew, 5784, 1, 1), (2023, 9, 16));
        assert_eq!(to_jdn(Calendar::Islamic, 1, 1, 1), Some(julian_to_jdn(622, 7, 16)));
        assert_eq!(to_jdn(Calendar::Persian, 1, 1, 1), Some(julian_to_jdn(622, 3, 19)));
    }

    #[test]
    fn test_round_trips() {
        for cal in [
            Calendar::Julian,
            Calendar::Hebrew,
            Calendar::French,
            Calendar::Persian,
            Calendar::Islamic,
            Calendar::Swedish,
        ] {
            for jdn in (2_360_000..2_460_000).step_by(997) {
                let (y, m, d) = from_jdn(cal, jdn).unwrap();
                assert_eq!(to_jdn(cal, y, m, d), Some(jdn), "{:?} {}-{}-{}", cal, y, m, d);
            }
        }
    }

    #[test]
    fn test_swedish_leap_day() {
        assert_eq!(greg(Calendar::Swedish, 1712, 2, 30), (1712, 3, 11));
        assert_eq!(greg(Calendar::Swedish, 1753, 3, 1), (1753, 3, 1));
    }

    #[test]
    fn test_partial_foreign_dates_are_not_placed() {
        assert!(DateValue::new(Calendar::Julian, 0, 3, 12).to_gregorian().is_none());
        let greg_partial = DateValue::gregorian(0, 3, 12).to_gregorian().unwrap();
        assert_eq!((greg_partial.month, greg_partial.day), (3, 12));
    }
}
