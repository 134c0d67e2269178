//! Per-channel alarm state.
//!
//! The controller owns two [`AlarmChannel`] instances, one per hardware
//! slot. All channel state changes go through the methods here so the
//! shadow state (what we believe the hardware holds) stays in step with
//! the registers.

use crate::driver::{Channel, RtcDriver};
use crate::program::{AlarmMatch, AlarmPolicy};

/// Shadow state of one hardware alarm slot.
#[derive(Debug)]
pub struct AlarmChannel {
    id: Channel,
    policy: Option<AlarmPolicy>,
    applied: Option<AlarmMatch>,
    armed: bool,
    interrupt_enabled: bool,
}

impl AlarmChannel {
    pub(crate) fn new(id: Channel) -> Self {
        AlarmChannel {
            id,
            policy: None,
            applied: None,
            armed: false,
            interrupt_enabled: false,
        }
    }

    /// Which hardware slot this channel shadows.
    pub fn id(&self) -> Channel {
        self.id
    }

    /// The policy this channel is running, if any.
    pub fn policy(&self) -> Option<AlarmPolicy> {
        self.policy
    }

    /// The match configuration last written to hardware.
    pub fn applied(&self) -> Option<AlarmMatch> {
        self.applied
    }

    /// Whether the channel is armed with a live policy.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether this channel contributes to the shared interrupt line.
    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_enabled
    }

    pub(crate) fn set_policy(&mut self, policy: Option<AlarmPolicy>) {
        self.policy = policy;
    }

    /// Writes `alarm` into the hardware slot and records it as applied.
    ///
    /// The driver emits the channel's whole register block in one write,
    /// so from here a program application is atomic.
    pub(crate) fn program<D: RtcDriver>(
        &mut self,
        driver: &mut D,
        alarm: &AlarmMatch,
        armed: bool,
    ) -> Result<(), D::Error> {
        driver.program_alarm(self.id, alarm)?;
        self.applied = Some(*alarm);
        self.armed = armed;
        Ok(())
    }

    /// Reads and clears the fired flag, returning whether the channel
    /// fired since the previous acknowledgement.
    ///
    /// This mutates hardware state even when called only to observe;
    /// every call counts as a real acknowledgement.
    pub(crate) fn acknowledge<D: RtcDriver>(&mut self, driver: &mut D) -> Result<bool, D::Error> {
        driver.read_and_clear_flag(self.id)
    }

    /// Toggles this channel's contribution to the shared interrupt line.
    pub(crate) fn set_interrupt<D: RtcDriver>(
        &mut self,
        driver: &mut D,
        enabled: bool,
    ) -> Result<(), D::Error> {
        driver.set_interrupt_enable(self.id, enabled)?;
        self.interrupt_enabled = enabled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::SimRtc;
    use crate::time::RtcTime;

    #[test]
    fn test_program_updates_shadow_state() {
        let mut rtc = SimRtc::new(RtcTime::new(0, 0, 0, 1, 1, 1, 24).unwrap());
        let mut channel = AlarmChannel::new(Channel::One);
        assert!(!channel.is_armed());
        assert_eq!(channel.applied(), None);

        channel
            .program(&mut rtc, &AlarmMatch::Seconds { seconds: 5 }, true)
            .unwrap();
        assert!(channel.is_armed());
        assert_eq!(channel.applied(), Some(AlarmMatch::Seconds { seconds: 5 }));
        assert_eq!(rtc.alarm(Channel::One), Some(AlarmMatch::Seconds { seconds: 5 }));
    }

    #[test]
    fn test_program_inert_disarms() {
        let mut rtc = SimRtc::new(RtcTime::new(0, 0, 0, 1, 1, 1, 24).unwrap());
        let mut channel = AlarmChannel::new(Channel::One);
        channel
            .program(&mut rtc, &AlarmMatch::EverySecond, true)
            .unwrap();
        channel.program(&mut rtc, &AlarmMatch::INERT, false).unwrap();
        assert!(!channel.is_armed());
        assert_eq!(channel.applied(), Some(AlarmMatch::INERT));
    }

    #[test]
    fn test_acknowledge_clears_flag() {
        let mut rtc = SimRtc::new(RtcTime::new(0, 0, 0, 1, 1, 1, 24).unwrap());
        let mut channel = AlarmChannel::new(Channel::Two);
        rtc.latch_flag(Channel::Two);
        assert!(channel.acknowledge(&mut rtc).unwrap());
        assert!(!channel.acknowledge(&mut rtc).unwrap());
    }

    #[test]
    fn test_arm_then_acknowledge_is_quiet_for_all_policies() {
        use crate::program::{AlarmPolicy, AlarmProgram};

        let now = RtcTime::new(30, 15, 12, 3, 10, 6, 24).unwrap();
        let cases = [
            (Channel::One, AlarmPolicy::EverySecond),
            (Channel::One, AlarmPolicy::AtSeconds { seconds: 5 }),
            (
                Channel::One,
                AlarmPolicy::AtTime {
                    hours: 8,
                    minutes: 0,
                    seconds: 30,
                },
            ),
            (
                Channel::One,
                AlarmPolicy::AtTimeOnDate {
                    date: 25,
                    hours: 8,
                    minutes: 0,
                    seconds: 0,
                },
            ),
            (Channel::One, AlarmPolicy::Interval { seconds: 10 }),
            (Channel::Two, AlarmPolicy::EveryMinute),
            (
                Channel::Two,
                AlarmPolicy::AtTime {
                    hours: 8,
                    minutes: 0,
                    seconds: 0,
                },
            ),
        ];
        for (id, policy) in cases {
            let mut rtc = SimRtc::new(now);
            let mut channel = AlarmChannel::new(id);
            let alarm = AlarmProgram::for_channel(id, policy)
                .unwrap()
                .materialize(&now)
                .unwrap();
            channel.program(&mut rtc, &alarm, true).unwrap();
            assert!(!channel.acknowledge(&mut rtc).unwrap());
        }
    }

    #[test]
    fn test_set_interrupt_tracks_state() {
        let mut rtc = SimRtc::new(RtcTime::new(0, 0, 0, 1, 1, 1, 24).unwrap());
        let mut channel = AlarmChannel::new(Channel::One);
        channel.set_interrupt(&mut rtc, true).unwrap();
        assert!(channel.interrupt_enabled());
        assert!(rtc.interrupt_enabled(Channel::One));
        channel.set_interrupt(&mut rtc, false).unwrap();
        assert!(!channel.interrupt_enabled());
    }
}
