//! Dual-channel alarm scheduling and detection engine for the DS3231
//! precision real-time clock.
//!
//! The DS3231 has two hardware alarm slots: alarm 1 matches down to the
//! second, alarm 2 to the minute. This crate turns them into a small
//! scheduling engine:
//!
//! - [`AlarmPolicy`] describes when a channel should fire (every second,
//!   at a time of day, every N seconds, ...); the engine translates it
//!   into the mask-bit configuration the hardware understands.
//! - Firings are confirmed either by polling the flag registers
//!   ([`PollingDetector`]) or by watching the shared INT/SQW pin for
//!   falling edges ([`InterruptDetector`]).
//! - Intervals the hardware cannot express natively are run by
//!   re-arming an absolute time match after every firing.
//! - A [`Controller`] owns the whole lifecycle: it normalizes both
//!   channels to a known state, arms the configured policies, runs the
//!   detection loop until a cancellation token is set, and always tears
//!   the hardware back down on the way out.
//!
//! [`Ds3231`] is the bundled `embedded-hal` I2C driver; anything else
//! implementing [`RtcDriver`] works too.
//!
//! # Example
//!
//! ```no_run
//! # use ds3231_alarms::*;
//! # use core::sync::atomic::AtomicBool;
//! # fn demo<I2C, D>(i2c: I2C, delay: D) -> Result<(), AlarmError>
//! # where I2C: embedded_hal::i2c::I2c, D: embedded_hal::delay::DelayNs {
//! static CANCEL: AtomicBool = AtomicBool::new(false);
//!
//! let rtc = Ds3231::new(i2c);
//! let mut controller = Controller::new(
//!     rtc,
//!     PollingDetector::new(),
//!     delay,
//!     ControllerConfig {
//!         alarm1: Some(AlarmPolicy::Interval { seconds: 10 }),
//!         alarm2: Some(AlarmPolicy::EveryMinute),
//!         quantum_ms: 100,
//!         cancel: &CANCEL,
//!     },
//! )?;
//! let _ = controller.run(|event| {
//!     // one call per confirmed firing, channel 1 first on coincidence
//!     let _ = event.channel;
//! });
//! # Ok(())
//! # }
//! ```
//!
//! Logging goes through the optional `log` or `defmt` features and
//! compiles out entirely when neither is enabled.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

mod channel;
mod controller;
mod detect;
mod driver;
mod ds3231;
mod program;
mod registers;
mod reschedule;
#[cfg(test)]
pub(crate) mod testutil;
mod time;

pub use channel::AlarmChannel;
pub use controller::{Controller, ControllerConfig, RunState};
pub use detect::{DetectionEvent, DetectionSource, EventBatch, InterruptDetector, PollingDetector};
pub use driver::{Channel, EdgeInput, Error, RtcDriver, SharedLineMode};
pub use ds3231::{Ds3231, Ds3231Error, DEVICE_ADDRESS};
pub use program::{AlarmError, AlarmMatch, AlarmPolicy, AlarmProgram, MAX_INTERVAL_SECONDS};
pub use registers::{InterruptControl, SquareWaveFrequency};
pub use reschedule::Rescheduler;
pub use time::{RtcTime, RtcTimeError};
