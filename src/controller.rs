//! The run loop that owns both alarm channels.
//!
//! A [`Controller`] takes exclusive ownership of the driver, the chosen
//! detection source and a delay provider, and drives the whole lifecycle:
//!
//! `Uninitialized -> Normalized -> Armed -> Detecting -> Terminated`
//!
//! Normalization forces both channels to a known-disarmed state before
//! anything is armed, so leftovers from a previous run (or from other
//! software) cannot produce phantom firings. Shutdown is best effort and
//! always runs, whatever state the run ends in.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;

use crate::channel::AlarmChannel;
use crate::detect::{DetectionEvent, DetectionSource};
use crate::driver::{Channel, Error, RtcDriver, SharedLineMode};
use crate::program::{AlarmError, AlarmMatch, AlarmPolicy, AlarmProgram};
use crate::reschedule::Rescheduler;

/// Lifecycle state of a [`Controller`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Constructed, hardware untouched
    Uninitialized,
    /// Both channels forced inert, flags clear, line disabled
    Normalized,
    /// Configured policies programmed and enabled
    Armed,
    /// Detection loop running
    Detecting,
    /// Shutdown complete
    Terminated,
}

/// Per-run configuration.
pub struct ControllerConfig<'a> {
    /// Policy for alarm channel 1, if any
    pub alarm1: Option<AlarmPolicy>,
    /// Policy for alarm channel 2, if any
    pub alarm2: Option<AlarmPolicy>,
    /// Sleep between detection passes, in milliseconds
    pub quantum_ms: u32,
    /// Cancellation token, observed at loop boundaries
    pub cancel: &'a AtomicBool,
}

/// Owns the driver, channels and detection source for one run.
pub struct Controller<'a, D, S, DELAY> {
    driver: D,
    source: S,
    delay: DELAY,
    cancel: &'a AtomicBool,
    quantum_ms: u32,
    channels: [AlarmChannel; 2],
    programs: [Option<AlarmProgram>; 2],
    rescheduler: Rescheduler,
    state: RunState,
    tick: u64,
}

impl<'a, D, S, DELAY> Controller<'a, D, S, DELAY>
where
    D: RtcDriver,
    S: DetectionSource<D>,
    DELAY: DelayNs,
{
    /// Creates a controller, validating both policies eagerly.
    ///
    /// No hardware is touched until [`Controller::run`].
    pub fn new(
        driver: D,
        source: S,
        delay: DELAY,
        config: ControllerConfig<'a>,
    ) -> Result<Self, AlarmError> {
        let program_for = |channel, policy: Option<AlarmPolicy>| {
            policy
                .map(|p| AlarmProgram::for_channel(channel, p))
                .transpose()
        };
        let programs = [
            program_for(Channel::One, config.alarm1)?,
            program_for(Channel::Two, config.alarm2)?,
        ];
        Ok(Controller {
            driver,
            source,
            delay,
            cancel: config.cancel,
            quantum_ms: config.quantum_ms,
            channels: [AlarmChannel::new(Channel::One), AlarmChannel::new(Channel::Two)],
            programs,
            rescheduler: Rescheduler,
            state: RunState::Uninitialized,
            tick: 0,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Normalizes, arms and runs detection until cancelled or failed.
    ///
    /// `on_fire` is called once per confirmed firing, after any interval
    /// reschedule for that channel. Shutdown always runs before this
    /// returns, including on error paths.
    pub fn run<F>(&mut self, mut on_fire: F) -> Result<(), Error<D::Error>>
    where
        F: FnMut(&DetectionEvent),
    {
        let result = self
            .normalize()
            .and_then(|()| self.arm())
            .and_then(|()| self.detect_loop(&mut on_fire));
        self.shutdown();
        result
    }

    /// Forces both channels to a known-disarmed state.
    fn normalize(&mut self) -> Result<(), Error<D::Error>> {
        debug!("normalizing alarm channels");
        for channel in self.channels.iter_mut() {
            channel
                .set_interrupt(&mut self.driver, false)
                .map_err(Error::Driver)?;
            channel
                .program(&mut self.driver, &AlarmMatch::INERT, false)
                .map_err(Error::Driver)?;
            channel.acknowledge(&mut self.driver).map_err(Error::Driver)?;
        }
        self.driver
            .set_shared_line_mode(SharedLineMode::Disabled)
            .map_err(Error::Driver)?;
        self.state = RunState::Normalized;
        Ok(())
    }

    /// Programs each configured policy and enables detection plumbing.
    fn arm(&mut self) -> Result<(), Error<D::Error>> {
        let now = self.driver.read_time().map_err(Error::Driver)?;
        for i in 0..self.channels.len() {
            if let Some(program) = self.programs[i] {
                let alarm = program.materialize(&now)?;
                let channel = &mut self.channels[i];
                channel.set_policy(Some(program.policy()));
                channel
                    .program(&mut self.driver, &alarm, true)
                    .map_err(Error::Driver)?;
                // A match may have latched between normalization and
                // here; discard it so the first event is a real firing.
                channel.acknowledge(&mut self.driver).map_err(Error::Driver)?;
            }
        }
        if self.source.drives_interrupt_pin() {
            self.driver
                .set_shared_line_mode(SharedLineMode::AlarmInterrupt)
                .map_err(Error::Driver)?;
            for channel in self.channels.iter_mut() {
                if channel.is_armed() {
                    channel
                        .set_interrupt(&mut self.driver, true)
                        .map_err(Error::Driver)?;
                }
            }
        }
        self.state = RunState::Armed;
        Ok(())
    }

    fn detect_loop<F>(&mut self, on_fire: &mut F) -> Result<(), Error<D::Error>>
    where
        F: FnMut(&DetectionEvent),
    {
        self.state = RunState::Detecting;
        while !self.cancel.load(Ordering::Acquire) {
            let batch = self
                .source
                .detect(&mut self.driver, &mut self.channels, self.tick)?;
            self.tick = self.tick.wrapping_add(1);
            for event in batch.iter() {
                let i = event.channel.index();
                if let Some(program) = self.programs[i] {
                    if program.needs_reschedule() {
                        self.rescheduler.reschedule(
                            &mut self.driver,
                            &mut self.channels[i],
                            &program,
                        )?;
                    }
                }
                on_fire(event);
            }
            self.delay.delay_ms(self.quantum_ms);
        }
        debug!("cancellation requested, leaving detection loop");
        Ok(())
    }

    /// Returns the hardware to a quiet state, best effort.
    ///
    /// Steps are independent; one failing never stops the rest.
    fn shutdown(&mut self) {
        debug!("shutting down alarm channels");
        for channel in self.channels.iter_mut() {
            if channel.set_interrupt(&mut self.driver, false).is_err() {
                warning!("failed to disable alarm interrupt during shutdown");
            }
            if channel
                .program(&mut self.driver, &AlarmMatch::INERT, false)
                .is_err()
            {
                warning!("failed to park alarm during shutdown");
            }
            if channel.acknowledge(&mut self.driver).is_err() {
                warning!("failed to clear alarm flag during shutdown");
            }
        }
        if self
            .driver
            .set_shared_line_mode(SharedLineMode::Disabled)
            .is_err()
        {
            warning!("failed to disable the INT/SQW line during shutdown");
        }
        self.source.release();
        self.state = RunState::Terminated;
    }
}
