//! Alarm trigger policies and their hardware match configurations.
//!
//! An [`AlarmPolicy`] says when the caller wants an alarm to fire. An
//! [`AlarmMatch`] is what the DS3231 can actually be told to match on; the
//! variants carry exactly the fields their match mode uses, so a match can
//! never hold fields inconsistent with its mode.
//!
//! [`AlarmProgram::materialize`] is the pure translation between the two.
//! Every policy except `Interval` maps to a fixed match; `Interval` folds
//! the current RTC time into a daily-wrapping time match and is re-derived
//! after each firing.

use crate::driver::Channel;
use crate::time::{RtcTime, RtcTimeError};

/// Longest expressible interval, one second short of a full day.
pub const MAX_INTERVAL_SECONDS: u32 = 86_399;

const SECONDS_PER_DAY: u32 = 86_400;

/// When an alarm channel should fire.
///
/// Channel capability is constrained by the hardware: alarm 2 has no
/// seconds register, so second-granular policies need channel 1 and
/// minute-boundary policies need channel 2.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmPolicy {
    /// Fire once per second (channel 1 only)
    EverySecond,
    /// Fire at the top of every minute (channel 2 only)
    EveryMinute,
    /// Fire when the seconds hand matches, once per minute (channel 1 only)
    AtSeconds {
        /// Seconds value to match (0-59)
        seconds: u8,
    },
    /// Fire at a time of day, once per day
    AtTime {
        /// Hours (0-23)
        hours: u8,
        /// Minutes (0-59)
        minutes: u8,
        /// Seconds (0-59); must be 0 on channel 2
        seconds: u8,
    },
    /// Fire at a time of day on a date of the month, once per month
    AtTimeOnDate {
        /// Date of month (1-31)
        date: u8,
        /// Hours (0-23)
        hours: u8,
        /// Minutes (0-59)
        minutes: u8,
        /// Seconds (0-59); must be 0 on channel 2
        seconds: u8,
    },
    /// Fire every `seconds` seconds by rescheduling after each firing
    /// (channel 1 only)
    Interval {
        /// Interval length in seconds, 1..=[`MAX_INTERVAL_SECONDS`]
        seconds: u32,
    },
}

/// A concrete match configuration the DS3231 alarm registers can express.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmMatch {
    /// All mask bits set on alarm 1
    EverySecond,
    /// All mask bits set on alarm 2
    EveryMinute,
    /// Match seconds only
    Seconds {
        /// Seconds value (0-59)
        seconds: u8,
    },
    /// Match hours, minutes and seconds
    Time {
        /// Hours (0-23)
        hours: u8,
        /// Minutes (0-59)
        minutes: u8,
        /// Seconds (0-59)
        seconds: u8,
    },
    /// Match date of month plus hours, minutes and seconds
    Date {
        /// Date of month (1-31)
        date: u8,
        /// Hours (0-23)
        hours: u8,
        /// Minutes (0-59)
        minutes: u8,
        /// Seconds (0-59)
        seconds: u8,
    },
}

impl AlarmMatch {
    /// The match a disarmed channel is parked on: date 1, 00:00:00.
    ///
    /// With a date match armed but the interrupt masked and the flag
    /// cleared, the channel is inert for all practical purposes.
    pub const INERT: AlarmMatch = AlarmMatch::Date {
        date: 1,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };
}

/// Errors raised while validating or materializing an alarm program.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmError {
    /// A time field is out of range
    InvalidTime,
    /// The date of month is out of range
    InvalidDate,
    /// The interval is zero or spans a day or more
    InvalidInterval,
    /// The policy cannot run on the requested channel
    UnsupportedPolicy(&'static str),
    /// A time conversion failed
    Time(RtcTimeError),
}

impl From<RtcTimeError> for AlarmError {
    fn from(err: RtcTimeError) -> Self {
        AlarmError::Time(err)
    }
}

/// A validated pairing of a policy with the channel that will run it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmProgram {
    channel: Channel,
    policy: AlarmPolicy,
}

impl AlarmProgram {
    /// Validates `policy` against `channel` capability and field ranges.
    pub fn for_channel(channel: Channel, policy: AlarmPolicy) -> Result<Self, AlarmError> {
        match policy {
            AlarmPolicy::EverySecond => {
                if channel != Channel::One {
                    return Err(AlarmError::UnsupportedPolicy(
                        "every-second firing needs the seconds register of alarm 1",
                    ));
                }
            }
            AlarmPolicy::EveryMinute => {
                if channel != Channel::Two {
                    return Err(AlarmError::UnsupportedPolicy(
                        "minute-boundary firing is the every-field match of alarm 2",
                    ));
                }
            }
            AlarmPolicy::AtSeconds { seconds } => {
                if channel != Channel::One {
                    return Err(AlarmError::UnsupportedPolicy(
                        "seconds matching needs the seconds register of alarm 1",
                    ));
                }
                if seconds > 59 {
                    return Err(AlarmError::InvalidTime);
                }
            }
            AlarmPolicy::AtTime {
                hours,
                minutes,
                seconds,
            } => {
                Self::check_hms(channel, hours, minutes, seconds)?;
            }
            AlarmPolicy::AtTimeOnDate {
                date,
                hours,
                minutes,
                seconds,
            } => {
                if !(1..=31).contains(&date) {
                    return Err(AlarmError::InvalidDate);
                }
                Self::check_hms(channel, hours, minutes, seconds)?;
            }
            AlarmPolicy::Interval { seconds } => {
                if channel != Channel::One {
                    return Err(AlarmError::UnsupportedPolicy(
                        "interval rescheduling needs the seconds register of alarm 1",
                    ));
                }
                if seconds == 0 || seconds > MAX_INTERVAL_SECONDS {
                    return Err(AlarmError::InvalidInterval);
                }
            }
        }
        Ok(AlarmProgram { channel, policy })
    }

    fn check_hms(channel: Channel, hours: u8, minutes: u8, seconds: u8) -> Result<(), AlarmError> {
        if hours > 23 || minutes > 59 || seconds > 59 {
            return Err(AlarmError::InvalidTime);
        }
        if channel == Channel::Two && seconds != 0 {
            return Err(AlarmError::UnsupportedPolicy(
                "alarm 2 matches on minute boundaries only, seconds must be 0",
            ));
        }
        Ok(())
    }

    /// The channel this program runs on.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The policy this program was built from.
    pub fn policy(&self) -> AlarmPolicy {
        self.policy
    }

    /// Whether this program must be re-armed after each firing.
    pub fn needs_reschedule(&self) -> bool {
        matches!(self.policy, AlarmPolicy::Interval { .. })
    }

    /// Translates the policy into the match configuration to program.
    ///
    /// Pure: the same `(now, policy)` always yields the same match. `now`
    /// is only consulted for `Interval`, which anchors at the current time
    /// of day and wraps across midnight.
    pub fn materialize(&self, now: &RtcTime) -> Result<AlarmMatch, AlarmError> {
        let m = match self.policy {
            AlarmPolicy::EverySecond => AlarmMatch::EverySecond,
            AlarmPolicy::EveryMinute => AlarmMatch::EveryMinute,
            AlarmPolicy::AtSeconds { seconds } => AlarmMatch::Seconds { seconds },
            AlarmPolicy::AtTime {
                hours,
                minutes,
                seconds,
            } => AlarmMatch::Time {
                hours,
                minutes,
                seconds,
            },
            AlarmPolicy::AtTimeOnDate {
                date,
                hours,
                minutes,
                seconds,
            } => AlarmMatch::Date {
                date,
                hours,
                minutes,
                seconds,
            },
            AlarmPolicy::Interval { seconds } => {
                let target = (now.seconds_of_day() + seconds) % SECONDS_PER_DAY;
                AlarmMatch::Time {
                    hours: (target / 3600) as u8,
                    minutes: (target % 3600 / 60) as u8,
                    seconds: (target % 60) as u8,
                }
            }
        };
        Ok(m)
    }
}
