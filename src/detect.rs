//! Firing detection over the two alarm channels.
//!
//! Two interchangeable mechanisms answer "has this channel fired":
//! [`PollingDetector`] reads the flag registers each pass, and
//! [`InterruptDetector`] waits for edges on the shared INT/SQW pin and
//! reads the flags only when an edge was seen. Exactly one is in use per
//! run. Both check channel 1 before channel 2, so coincident firings
//! always produce events in the same order.

use crate::channel::AlarmChannel;
use crate::driver::{Channel, EdgeInput, Error, RtcDriver};
use crate::time::RtcTime;

/// One confirmed alarm firing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DetectionEvent {
    /// Which channel fired
    pub channel: Channel,
    /// RTC time read when the firing was confirmed
    pub fired_at: RtcTime,
    /// Detection pass counter, monotonic over a run; orders events
    /// without consulting the wall clock
    pub tick: u64,
}

/// Events from one detection pass, at most one per channel.
#[derive(Debug, Default)]
pub struct EventBatch {
    events: [Option<DetectionEvent>; 2],
    len: usize,
}

impl EventBatch {
    pub(crate) fn push(&mut self, event: DetectionEvent) {
        self.events[self.len] = Some(event);
        self.len += 1;
    }

    /// Number of events in the batch.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the pass confirmed no firings.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Events in detection order, channel 1 first.
    pub fn iter(&self) -> impl Iterator<Item = &DetectionEvent> {
        self.events.iter().flatten()
    }
}

/// A mechanism for confirming alarm firings.
pub trait DetectionSource<D: RtcDriver> {
    /// Runs one detection pass over both channels.
    ///
    /// Every confirmed firing is acknowledged (flag cleared) before it is
    /// reported, so a firing is never reported twice.
    fn detect(
        &mut self,
        driver: &mut D,
        channels: &mut [AlarmChannel; 2],
        tick: u64,
    ) -> Result<EventBatch, Error<D::Error>>;

    /// Whether this source needs the shared INT/SQW pin routed to the
    /// alarm interrupt output.
    fn drives_interrupt_pin(&self) -> bool;

    /// Releases any resources held for detection. Called once during
    /// shutdown.
    fn release(&mut self) {}
}

/// Confirms firings by reading the flag registers every pass.
#[derive(Debug, Default)]
pub struct PollingDetector;

impl PollingDetector {
    /// Creates a polling detector.
    pub fn new() -> Self {
        PollingDetector
    }
}

fn collect_events<D: RtcDriver>(
    driver: &mut D,
    channels: &mut [AlarmChannel; 2],
    tick: u64,
    want: impl Fn(&AlarmChannel) -> bool,
) -> Result<EventBatch, Error<D::Error>> {
    let mut batch = EventBatch::default();
    let mut snapshot: Option<RtcTime> = None;
    for channel in channels.iter_mut() {
        if !want(channel) {
            continue;
        }
        if channel.acknowledge(driver).map_err(Error::Driver)? {
            let fired_at = match snapshot {
                Some(t) => t,
                None => {
                    let t = driver.read_time().map_err(Error::Driver)?;
                    snapshot = Some(t);
                    t
                }
            };
            batch.push(DetectionEvent {
                channel: channel.id(),
                fired_at,
                tick,
            });
        }
    }
    Ok(batch)
}

impl<D: RtcDriver> DetectionSource<D> for PollingDetector {
    fn detect(
        &mut self,
        driver: &mut D,
        channels: &mut [AlarmChannel; 2],
        tick: u64,
    ) -> Result<EventBatch, Error<D::Error>> {
        collect_events(driver, channels, tick, AlarmChannel::is_armed)
    }

    fn drives_interrupt_pin(&self) -> bool {
        false
    }
}

/// Confirms firings from falling edges on the shared interrupt pin.
///
/// The line carries no channel identity and both channels may fire
/// coincidentally, so every interrupt-enabled channel's flag is checked
/// on each edge.
#[derive(Debug)]
pub struct InterruptDetector<P: EdgeInput> {
    pin: P,
}

impl<P: EdgeInput> InterruptDetector<P> {
    /// Creates an interrupt detector over a latched edge watch.
    pub fn new(pin: P) -> Self {
        InterruptDetector { pin }
    }

    #[cfg(test)]
    pub(crate) fn pin(&self) -> &P {
        &self.pin
    }
}

impl<D: RtcDriver, P: EdgeInput> DetectionSource<D> for InterruptDetector<P> {
    fn detect(
        &mut self,
        driver: &mut D,
        channels: &mut [AlarmChannel; 2],
        tick: u64,
    ) -> Result<EventBatch, Error<D::Error>> {
        if !self.pin.edge_occurred() {
            return Ok(EventBatch::default());
        }
        let batch = collect_events(driver, channels, tick, AlarmChannel::interrupt_enabled)?;
        if batch.is_empty() {
            // An edge with no pending flag means the flag was already
            // acknowledged between the edge and this pass. Benign.
            debug!("interrupt edge with no pending alarm flag");
        }
        Ok(batch)
    }

    fn drives_interrupt_pin(&self) -> bool {
        true
    }

    fn release(&mut self) {
        self.pin.release();
    }
}
