//! Hardware seams the alarm engine runs against.
//!
//! [`RtcDriver`] abstracts the RTC itself; the crate ships [`crate::Ds3231`]
//! as the I2C implementation, and tests substitute a simulated clock.
//! [`EdgeInput`] abstracts the latched falling-edge watch on the shared
//! INT/SQW pin for interrupt-mode detection.

use crate::program::{AlarmError, AlarmMatch};
use crate::registers::SquareWaveFrequency;
use crate::time::RtcTime;

/// One of the DS3231's two hardware alarm slots.
///
/// Channel 1 matches down to the second; channel 2 has no seconds register
/// and matches on minute boundaries.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Alarm 1, second-granular
    One,
    /// Alarm 2, minute-granular
    Two,
}

impl Channel {
    /// Zero-based index, used for per-channel storage.
    pub fn index(self) -> usize {
        match self {
            Channel::One => 0,
            Channel::Two => 1,
        }
    }

    /// Both channels in detection order, channel 1 first.
    pub const ALL: [Channel; 2] = [Channel::One, Channel::Two];
}

/// Function of the shared INT/SQW output pin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SharedLineMode {
    /// Square wave output at the given frequency
    SquareWave(SquareWaveFrequency),
    /// Alarm interrupt output (active low on a matched, enabled alarm)
    AlarmInterrupt,
    /// Neither: interrupt routing selected but no alarm sources enabled
    Disabled,
}

/// Register-level operations the engine needs from an RTC.
pub trait RtcDriver {
    /// Transport error type.
    type Error;

    /// Reads the current date and time.
    fn read_time(&mut self) -> Result<RtcTime, Self::Error>;

    /// Sets the date and time.
    fn write_time(&mut self, time: &RtcTime) -> Result<(), Self::Error>;

    /// Writes a match configuration into a channel's alarm registers.
    ///
    /// The whole register block for the channel is replaced in one
    /// operation; a partially programmed alarm is never observable.
    fn program_alarm(&mut self, channel: Channel, alarm: &AlarmMatch) -> Result<(), Self::Error>;

    /// Reads a channel's fired flag and clears it, returning whether it
    /// was set. Clearing must leave the other channel's flag untouched.
    fn read_and_clear_flag(&mut self, channel: Channel) -> Result<bool, Self::Error>;

    /// Enables or disables a channel's contribution to the interrupt line.
    fn set_interrupt_enable(&mut self, channel: Channel, enabled: bool)
        -> Result<(), Self::Error>;

    /// Selects the function of the shared INT/SQW pin.
    fn set_shared_line_mode(&mut self, mode: SharedLineMode) -> Result<(), Self::Error>;
}

/// A latched watch on the shared interrupt pin.
///
/// Implementations latch falling edges as they happen (typically from an
/// ISR or a kernel edge-detect facility) and report them on demand.
pub trait EdgeInput {
    /// Returns true if at least one falling edge occurred since the last
    /// call, consuming the latch.
    fn edge_occurred(&mut self) -> bool;

    /// Releases the edge watch. Called once during shutdown.
    fn release(&mut self);
}

/// Errors surfaced by the alarm engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The RTC driver failed; alarm state is unknown afterwards
    Driver(E),
    /// An alarm program was invalid
    Alarm(AlarmError),
}

impl<E> From<AlarmError> for Error<E> {
    fn from(err: AlarmError) -> Self {
        Error::Alarm(err)
    }
}
