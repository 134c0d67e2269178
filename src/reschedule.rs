//! Re-arming of interval alarms after each firing.
//!
//! The DS3231 cannot express "every N seconds" natively, so interval
//! policies are run as absolute time matches that get rewritten after
//! every firing: read the clock, materialize `now + interval`, reprogram.
//! This happens before the user callback, so a slow callback cannot push
//! the next firing past its slot. Drift equal to detection latency
//! accumulates by design and is not compensated.

use crate::channel::AlarmChannel;
use crate::driver::{Error, RtcDriver};
use crate::program::AlarmProgram;

/// Rewrites interval channels' programs after each firing.
#[derive(Debug, Default)]
pub struct Rescheduler;

impl Rescheduler {
    /// Computes and programs the next trigger for an interval channel.
    ///
    /// Anchored at the clock as read now, not at the previous target, so
    /// detection latency shifts subsequent firings rather than bunching
    /// them.
    pub(crate) fn reschedule<D: RtcDriver>(
        &self,
        driver: &mut D,
        channel: &mut AlarmChannel,
        program: &AlarmProgram,
    ) -> Result<(), Error<D::Error>> {
        let now = driver.read_time().map_err(Error::Driver)?;
        let next = program.materialize(&now)?;
        debug!("rescheduling interval alarm");
        channel.program(driver, &next, true).map_err(Error::Driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Channel;
    use crate::program::{AlarmMatch, AlarmPolicy};
    use crate::testutil::SimRtc;
    use crate::time::RtcTime;

    fn at(h: u8, m: u8, s: u8) -> RtcTime {
        RtcTime::new(s, m, h, 1, 1, 1, 24).unwrap()
    }

    #[test]
    fn test_reschedule_advances_target() {
        let mut rtc = SimRtc::new(at(0, 0, 10));
        let mut channel = AlarmChannel::new(Channel::One);
        let program =
            AlarmProgram::for_channel(Channel::One, AlarmPolicy::Interval { seconds: 10 })
                .unwrap();

        let rescheduler = Rescheduler;
        rescheduler
            .reschedule(&mut rtc, &mut channel, &program)
            .unwrap();
        assert_eq!(
            rtc.alarm(Channel::One),
            Some(AlarmMatch::Time {
                hours: 0,
                minutes: 0,
                seconds: 20
            })
        );
        assert!(channel.is_armed());

        // Next firing at 00:00:20 pushes the target to 00:00:30
        rtc.advance_to(at(0, 0, 20));
        rescheduler
            .reschedule(&mut rtc, &mut channel, &program)
            .unwrap();
        assert_eq!(
            rtc.alarm(Channel::One),
            Some(AlarmMatch::Time {
                hours: 0,
                minutes: 0,
                seconds: 30
            })
        );
    }

    #[test]
    fn test_reschedule_wraps_midnight() {
        let mut rtc = SimRtc::new(at(23, 59, 55));
        let mut channel = AlarmChannel::new(Channel::One);
        let program =
            AlarmProgram::for_channel(Channel::One, AlarmPolicy::Interval { seconds: 10 })
                .unwrap();
        Rescheduler
            .reschedule(&mut rtc, &mut channel, &program)
            .unwrap();
        assert_eq!(
            rtc.alarm(Channel::One),
            Some(AlarmMatch::Time {
                hours: 0,
                minutes: 0,
                seconds: 5
            })
        );
    }

    #[test]
    fn test_reschedule_propagates_driver_failure() {
        let mut rtc = SimRtc::new(at(0, 0, 0));
        rtc.fail_next();
        let mut channel = AlarmChannel::new(Channel::One);
        let program =
            AlarmProgram::for_channel(Channel::One, AlarmPolicy::Interval { seconds: 10 })
                .unwrap();
        assert!(Rescheduler
            .reschedule(&mut rtc, &mut channel, &program)
            .is_err());
    }
}
