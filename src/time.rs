//! Calendar/clock value type for the DS3231 and its BCD register image.
//!
//! [`RtcTime`] is the validated, field-wise representation used to program
//! alarms and to snapshot firing context. `RawDateTime` is the crate-internal
//! image of the seven consecutive date/time registers, always 24-hour.
//!
//! Conversion errors are reported via [`RtcTimeError`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::registers::{Date, Day, Hours, Minutes, Month, Seconds, Year};

/// A point in calendar time as the DS3231 represents it.
///
/// Years are stored as an offset from 2000 (0-199, the century flag covers
/// 2100-2199). Day of week is 1-7 with 1 = Sunday, matching the convention
/// the DS3231 datasheet suggests. All fields are validated at construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcTime {
    /// Seconds (0-59)
    pub seconds: u8,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Hours (0-23)
    pub hours: u8,
    /// Day of week (1-7, 1 = Sunday)
    pub day: u8,
    /// Date of month (1-31)
    pub date: u8,
    /// Month (1-12)
    pub month: u8,
    /// Years since 2000 (0-199)
    pub year: u8,
}

/// Errors that can occur constructing or converting an [`RtcTime`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcTimeError {
    /// A clock field (seconds, minutes or hours) is out of range
    InvalidTime,
    /// A calendar field (day, date or month) is out of range or the
    /// combination does not name a real date
    InvalidDate,
    /// The year falls outside 2000-2199
    YearOutOfRange,
}

impl RtcTime {
    /// Creates a validated `RtcTime` from individual fields.
    pub fn new(
        seconds: u8,
        minutes: u8,
        hours: u8,
        day: u8,
        date: u8,
        month: u8,
        year: u8,
    ) -> Result<Self, RtcTimeError> {
        if seconds > 59 || minutes > 59 || hours > 23 {
            return Err(RtcTimeError::InvalidTime);
        }
        if !(1..=7).contains(&day) || !(1..=31).contains(&date) || !(1..=12).contains(&month) {
            return Err(RtcTimeError::InvalidDate);
        }
        if year > 199 {
            return Err(RtcTimeError::YearOutOfRange);
        }
        Ok(RtcTime {
            seconds,
            minutes,
            hours,
            day,
            date,
            month,
            year,
        })
    }

    /// Seconds elapsed since midnight, 0-86399.
    ///
    /// This is the anchor arithmetic interval alarms are computed from.
    pub fn seconds_of_day(&self) -> u32 {
        u32::from(self.hours) * 3600 + u32::from(self.minutes) * 60 + u32::from(self.seconds)
    }

    /// Converts a chrono `NaiveDateTime` into an `RtcTime`.
    pub fn from_datetime(datetime: &NaiveDateTime) -> Result<Self, RtcTimeError> {
        let year = datetime.year();
        if !(2000..=2199).contains(&year) {
            error!("Year out of range for the DS3231, must be 2000-2199");
            return Err(RtcTimeError::YearOutOfRange);
        }
        let year = u8::try_from(year - 2000).map_err(|_| RtcTimeError::YearOutOfRange)?;
        let to_u8 = |v: u32| u8::try_from(v).map_err(|_| RtcTimeError::InvalidDate);
        RtcTime::new(
            to_u8(datetime.second())?,
            to_u8(datetime.minute())?,
            to_u8(datetime.hour())?,
            to_u8(datetime.weekday().number_from_sunday())?,
            to_u8(datetime.day())?,
            to_u8(datetime.month())?,
            year,
        )
    }

    /// Converts this `RtcTime` into a chrono `NaiveDateTime`, validating
    /// that the calendar fields name a real date.
    pub fn into_datetime(self) -> Result<NaiveDateTime, RtcTimeError> {
        NaiveDate::from_ymd_opt(
            2000 + i32::from(self.year),
            u32::from(self.month),
            u32::from(self.date),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(self.hours),
                u32::from(self.minutes),
                u32::from(self.seconds),
            )
        })
        .ok_or(RtcTimeError::InvalidDate)
    }
}

/// Helper to split a value into BCD (ones, tens) digits with validation.
pub(crate) fn make_bcd(value: u8, max_value: u8) -> Result<(u8, u8), RtcTimeError> {
    if value > max_value {
        return Err(RtcTimeError::InvalidTime);
    }
    Ok((value % 10, value / 10))
}

/// Encodes an hour (0-23) into the 24-hour register layout.
pub(crate) fn encode_hours(hour: u8) -> Result<Hours, RtcTimeError> {
    if hour > 23 {
        return Err(RtcTimeError::InvalidTime);
    }
    let mut value = Hours::default();
    value.set_twelve_hour(false);
    value.set_hours(hour % 10);
    value.set_ten_hours(u8::from((10..20).contains(&hour)));
    value.set_twenty_hours(u8::from(hour >= 20));
    Ok(value)
}

/// Decodes a 24-hour register layout; rejects clocks left in 12-hour mode.
pub(crate) fn decode_hours(hours: Hours) -> Result<u8, RtcTimeError> {
    if hours.twelve_hour() {
        error!("Clock is in 12-hour mode, refusing to decode");
        return Err(RtcTimeError::InvalidTime);
    }
    Ok(20 * hours.twenty_hours() + 10 * hours.ten_hours() + hours.hours())
}

/// Register image of the DS3231's seven consecutive date/time registers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct RawDateTime {
    seconds: Seconds,
    minutes: Minutes,
    hours: Hours,
    day: Day,
    date: Date,
    month: Month,
    year: Year,
}

impl RawDateTime {
    pub(crate) fn from_time(time: &RtcTime) -> Result<Self, RtcTimeError> {
        let (ones, tens) = make_bcd(time.seconds, 59)?;
        let mut seconds = Seconds::default();
        seconds.set_seconds(ones);
        seconds.set_ten_seconds(tens);

        let (ones, tens) = make_bcd(time.minutes, 59)?;
        let mut minutes = Minutes::default();
        minutes.set_minutes(ones);
        minutes.set_ten_minutes(tens);

        let hours = encode_hours(time.hours)?;

        if !(1..=7).contains(&time.day) {
            return Err(RtcTimeError::InvalidDate);
        }
        let mut day = Day::default();
        day.set_day(time.day);

        if time.date == 0 {
            return Err(RtcTimeError::InvalidDate);
        }
        let (ones, tens) = make_bcd(time.date, 31).map_err(|_| RtcTimeError::InvalidDate)?;
        let mut date = Date::default();
        date.set_date(ones);
        date.set_ten_date(tens);

        if time.month == 0 {
            return Err(RtcTimeError::InvalidDate);
        }
        let (ones, tens) = make_bcd(time.month, 12).map_err(|_| RtcTimeError::InvalidDate)?;
        let mut month = Month::default();
        month.set_month(ones);
        month.set_ten_month(tens);

        let mut year_offset = time.year;
        if year_offset > 199 {
            return Err(RtcTimeError::YearOutOfRange);
        }
        if year_offset > 99 {
            year_offset -= 100;
            month.set_century(true);
        }
        let mut year = Year::default();
        year.set_year(year_offset % 10);
        year.set_ten_year(year_offset / 10);

        Ok(RawDateTime {
            seconds,
            minutes,
            hours,
            day,
            date,
            month,
            year,
        })
    }

    pub(crate) fn into_time(self) -> Result<RtcTime, RtcTimeError> {
        let seconds = 10 * self.seconds.ten_seconds() + self.seconds.seconds();
        let minutes = 10 * self.minutes.ten_minutes() + self.minutes.minutes();
        let hours = decode_hours(self.hours)?;
        let date = 10 * self.date.ten_date() + self.date.date();
        let month = 10 * self.month.ten_month() + self.month.month();
        let year = 10 * u16::from(self.year.ten_year())
            + u16::from(self.year.year())
            + if self.month.century() { 100 } else { 0 };
        let year = u8::try_from(year).map_err(|_| RtcTimeError::YearOutOfRange)?;
        RtcTime::new(seconds, minutes, hours, self.day.day(), date, month, year)
    }
}

impl From<[u8; 7]> for RawDateTime {
    fn from(data: [u8; 7]) -> Self {
        RawDateTime {
            seconds: Seconds(data[0]),
            minutes: Minutes(data[1]),
            hours: Hours(data[2]),
            day: Day(data[3]),
            date: Date(data[4]),
            month: Month(data[5]),
            year: Year(data[6]),
        }
    }
}

impl From<&RawDateTime> for [u8; 7] {
    fn from(dt: &RawDateTime) -> [u8; 7] {
        [
            dt.seconds.0,
            dt.minutes.0,
            dt.hours.0,
            dt.day.0,
            dt.date.0,
            dt.month.0,
            dt.year.0,
        ]
    }
}
