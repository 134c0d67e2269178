//! Simulated RTC and edge pin for engine-level tests.

use std::vec::Vec;

use crate::driver::{Channel, EdgeInput, RtcDriver, SharedLineMode};
use crate::program::AlarmMatch;
use crate::time::RtcTime;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct SimError;

/// An in-memory DS3231: holds a clock, two alarm slots, the fired flags
/// and the interrupt plumbing. `advance_to` moves the clock and latches
/// flags for any programmed match satisfied at the new time.
#[derive(Debug)]
pub(crate) struct SimRtc {
    time: RtcTime,
    alarms: [Option<AlarmMatch>; 2],
    flags: [bool; 2],
    int_enable: [bool; 2],
    line_mode: Option<SharedLineMode>,
    fail: bool,
    pending_flag_reads: [Option<u32>; 2],
    pub(crate) program_log: Vec<(Channel, AlarmMatch)>,
}

impl SimRtc {
    pub(crate) fn new(time: RtcTime) -> Self {
        SimRtc {
            time,
            alarms: [None, None],
            flags: [false, false],
            int_enable: [false, false],
            line_mode: None,
            fail: false,
            pending_flag_reads: [None, None],
            program_log: Vec::new(),
        }
    }

    /// Fails the next driver operation, then recovers.
    pub(crate) fn fail_next(&mut self) {
        self.fail = true;
    }

    fn check_fail(&mut self) -> Result<(), SimError> {
        if self.fail {
            self.fail = false;
            return Err(SimError);
        }
        Ok(())
    }

    /// Sets a flag directly, as the hardware would on a match.
    pub(crate) fn latch_flag(&mut self, channel: Channel) {
        self.flags[channel.index()] = true;
    }

    /// Latches the channel's flag just before its Nth flag read from now
    /// (0 means the very next read sees it). Lets run-loop tests inject a
    /// firing partway through a run.
    pub(crate) fn schedule_flag(&mut self, channel: Channel, after_reads: u32) {
        self.pending_flag_reads[channel.index()] = Some(after_reads);
    }

    pub(crate) fn flag(&self, channel: Channel) -> bool {
        self.flags[channel.index()]
    }

    pub(crate) fn alarm(&self, channel: Channel) -> Option<AlarmMatch> {
        self.alarms[channel.index()]
    }

    pub(crate) fn interrupt_enabled(&self, channel: Channel) -> bool {
        self.int_enable[channel.index()]
    }

    pub(crate) fn line_mode(&self) -> Option<SharedLineMode> {
        self.line_mode
    }

    /// Moves the clock to `time` and latches the flag of every channel
    /// whose programmed match is satisfied there.
    pub(crate) fn advance_to(&mut self, time: RtcTime) {
        self.time = time;
        for (i, alarm) in self.alarms.iter().enumerate() {
            if let Some(alarm) = alarm {
                if Self::matches(alarm, &time) {
                    self.flags[i] = true;
                }
            }
        }
    }

    fn matches(alarm: &AlarmMatch, t: &RtcTime) -> bool {
        match *alarm {
            AlarmMatch::EverySecond => true,
            AlarmMatch::EveryMinute => t.seconds == 0,
            AlarmMatch::Seconds { seconds } => t.seconds == seconds,
            AlarmMatch::Time {
                hours,
                minutes,
                seconds,
            } => t.hours == hours && t.minutes == minutes && t.seconds == seconds,
            AlarmMatch::Date {
                date,
                hours,
                minutes,
                seconds,
            } => {
                t.date == date && t.hours == hours && t.minutes == minutes && t.seconds == seconds
            }
        }
    }
}

impl RtcDriver for SimRtc {
    type Error = SimError;

    fn read_time(&mut self) -> Result<RtcTime, Self::Error> {
        self.check_fail()?;
        Ok(self.time)
    }

    fn write_time(&mut self, time: &RtcTime) -> Result<(), Self::Error> {
        self.check_fail()?;
        self.time = *time;
        Ok(())
    }

    fn program_alarm(&mut self, channel: Channel, alarm: &AlarmMatch) -> Result<(), Self::Error> {
        self.check_fail()?;
        self.alarms[channel.index()] = Some(*alarm);
        self.program_log.push((channel, *alarm));
        Ok(())
    }

    fn read_and_clear_flag(&mut self, channel: Channel) -> Result<bool, Self::Error> {
        self.check_fail()?;
        let i = channel.index();
        match self.pending_flag_reads[i] {
            Some(0) => {
                self.flags[i] = true;
                self.pending_flag_reads[i] = None;
            }
            Some(n) => self.pending_flag_reads[i] = Some(n - 1),
            None => {}
        }
        let fired = self.flags[channel.index()];
        self.flags[channel.index()] = false;
        Ok(fired)
    }

    fn set_interrupt_enable(
        &mut self,
        channel: Channel,
        enabled: bool,
    ) -> Result<(), Self::Error> {
        self.check_fail()?;
        self.int_enable[channel.index()] = enabled;
        Ok(())
    }

    fn set_shared_line_mode(&mut self, mode: SharedLineMode) -> Result<(), Self::Error> {
        self.check_fail()?;
        self.line_mode = Some(mode);
        if mode == SharedLineMode::Disabled {
            self.int_enable = [false, false];
        }
        Ok(())
    }
}

/// A latched edge pin the test body triggers by hand.
#[derive(Debug, Default)]
pub(crate) struct SimEdge {
    pending: bool,
    released: bool,
}

impl SimEdge {
    pub(crate) fn new() -> Self {
        SimEdge::default()
    }

    /// Latches one falling edge.
    pub(crate) fn trigger(&mut self) {
        self.pending = true;
    }

    pub(crate) fn released(&self) -> bool {
        self.released
    }
}

impl EdgeInput for SimEdge {
    fn edge_occurred(&mut self) -> bool {
        core::mem::take(&mut self.pending)
    }

    fn release(&mut self) {
        self.released = true;
    }
}
