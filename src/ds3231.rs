//! I2C driver for the DS3231, implementing [`RtcDriver`].
//!
//! Register reads and writes go through `embedded-hal` 1.0 blocking I2C.
//! Alarm register blocks are always written in a single I2C transaction so
//! a partially programmed alarm is never observable on the bus.

use embedded_hal::i2c::I2c;

use crate::driver::{Channel, RtcDriver, SharedLineMode};
use crate::program::AlarmMatch;
use crate::registers::{
    AlarmDayDate, AlarmHours, AlarmMinutes, AlarmSeconds, Control, DayDateSelect,
    InterruptControl, RegAddr, Status,
};
use crate::time::{encode_hours, make_bcd, RawDateTime, RtcTime, RtcTimeError};

/// Fixed I2C bus address of the DS3231.
pub const DEVICE_ADDRESS: u8 = 0x68;

/// Errors from the DS3231 driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ds3231Error<E> {
    /// I2C transport error
    I2c(E),
    /// Date/time conversion or encoding error
    Time(RtcTimeError),
}

impl<E> From<RtcTimeError> for Ds3231Error<E> {
    fn from(err: RtcTimeError) -> Self {
        Ds3231Error::Time(err)
    }
}

/// A DS3231 on an I2C bus.
pub struct Ds3231<I2C> {
    i2c: I2C,
    address: u8,
}

// Generates a typed getter/setter pair for a single register.
macro_rules! register_access {
    ($(#[$meta:meta])* $name:ident, $typ:ty, $addr:expr) => {
        paste::paste! {
            $(#[$meta])*
            pub fn [<get_ $name>](&mut self) -> Result<$typ, Ds3231Error<I2C::Error>> {
                Ok(self.read_register($addr)?.into())
            }

            #[doc = "Writes the " $name " register."]
            pub fn [<set_ $name>](&mut self, value: $typ) -> Result<(), Ds3231Error<I2C::Error>> {
                self.write_register($addr, value.into())
            }
        }
    };
}

impl<I2C: I2c> Ds3231<I2C> {
    /// Creates a driver on the standard DS3231 address.
    pub fn new(i2c: I2C) -> Self {
        Ds3231 {
            i2c,
            address: DEVICE_ADDRESS,
        }
    }

    fn read_register(&mut self, reg: RegAddr) -> Result<u8, Ds3231Error<I2C::Error>> {
        let mut data = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg as u8], &mut data)
            .map_err(Ds3231Error::I2c)?;
        Ok(data[0])
    }

    fn write_register(&mut self, reg: RegAddr, value: u8) -> Result<(), Ds3231Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg as u8, value])
            .map_err(Ds3231Error::I2c)
    }

    register_access!(
        /// Reads the control register.
        control, Control, RegAddr::Control
    );
    register_access!(
        /// Reads the status register.
        status, Status, RegAddr::ControlStatus
    );

    /// Reads the current date and time from the seven clock registers.
    pub fn datetime(&mut self) -> Result<RtcTime, Ds3231Error<I2C::Error>> {
        let mut data = [0u8; 7];
        self.i2c
            .write_read(self.address, &[RegAddr::Seconds as u8], &mut data)
            .map_err(Ds3231Error::I2c)?;
        Ok(RawDateTime::from(data).into_time()?)
    }

    /// Sets the date and time, writing all seven clock registers at once.
    pub fn set_datetime(&mut self, time: &RtcTime) -> Result<(), Ds3231Error<I2C::Error>> {
        let raw = RawDateTime::from_time(time)?;
        let regs: [u8; 7] = (&raw).into();
        let mut data = [0u8; 8];
        data[0] = RegAddr::Seconds as u8;
        data[1..].copy_from_slice(&regs);
        self.i2c.write(self.address, &data).map_err(Ds3231Error::I2c)
    }

    fn encode_alarm1(alarm: &AlarmMatch) -> Result<[u8; 4], RtcTimeError> {
        let mut sec = AlarmSeconds::default();
        let mut min = AlarmMinutes::default();
        let mut hrs = AlarmHours::default();
        let mut dd = AlarmDayDate::default();

        match *alarm {
            AlarmMatch::EverySecond => {
                sec.set_alarm_mask1(true);
                min.set_alarm_mask2(true);
                hrs.set_alarm_mask3(true);
                dd.set_alarm_mask4(true);
            }
            AlarmMatch::Seconds { seconds } => {
                let (ones, tens) = make_bcd(seconds, 59)?;
                sec.set_seconds(ones);
                sec.set_ten_seconds(tens);
                min.set_alarm_mask2(true);
                hrs.set_alarm_mask3(true);
                dd.set_alarm_mask4(true);
            }
            AlarmMatch::Time {
                hours,
                minutes,
                seconds,
            } => {
                Self::encode_hms(&mut sec, &mut min, &mut hrs, hours, minutes, seconds)?;
                dd.set_alarm_mask4(true);
            }
            AlarmMatch::Date {
                date,
                hours,
                minutes,
                seconds,
            } => {
                Self::encode_hms(&mut sec, &mut min, &mut hrs, hours, minutes, seconds)?;
                if date == 0 {
                    return Err(RtcTimeError::InvalidDate);
                }
                let (ones, tens) = make_bcd(date, 31).map_err(|_| RtcTimeError::InvalidDate)?;
                dd.set_day_date_select(DayDateSelect::Date);
                dd.set_day_or_date(ones);
                dd.set_ten_date(tens);
            }
            AlarmMatch::EveryMinute => return Err(RtcTimeError::InvalidTime),
        }
        Ok([sec.0, min.0, hrs.0, dd.0])
    }

    fn encode_alarm2(alarm: &AlarmMatch) -> Result<[u8; 3], RtcTimeError> {
        let mut min = AlarmMinutes::default();
        let mut hrs = AlarmHours::default();
        let mut dd = AlarmDayDate::default();

        match *alarm {
            AlarmMatch::EveryMinute => {
                min.set_alarm_mask2(true);
                hrs.set_alarm_mask3(true);
                dd.set_alarm_mask4(true);
            }
            AlarmMatch::Time {
                hours,
                minutes,
                seconds,
            } => {
                if seconds != 0 {
                    return Err(RtcTimeError::InvalidTime);
                }
                let mut unused = AlarmSeconds::default();
                Self::encode_hms(&mut unused, &mut min, &mut hrs, hours, minutes, 0)?;
                dd.set_alarm_mask4(true);
            }
            AlarmMatch::Date {
                date,
                hours,
                minutes,
                seconds,
            } => {
                if seconds != 0 {
                    return Err(RtcTimeError::InvalidTime);
                }
                let mut unused = AlarmSeconds::default();
                Self::encode_hms(&mut unused, &mut min, &mut hrs, hours, minutes, 0)?;
                if date == 0 {
                    return Err(RtcTimeError::InvalidDate);
                }
                let (ones, tens) = make_bcd(date, 31).map_err(|_| RtcTimeError::InvalidDate)?;
                dd.set_day_date_select(DayDateSelect::Date);
                dd.set_day_or_date(ones);
                dd.set_ten_date(tens);
            }
            AlarmMatch::EverySecond | AlarmMatch::Seconds { .. } => {
                return Err(RtcTimeError::InvalidTime)
            }
        }
        Ok([min.0, hrs.0, dd.0])
    }

    fn encode_hms(
        sec: &mut AlarmSeconds,
        min: &mut AlarmMinutes,
        hrs: &mut AlarmHours,
        hours: u8,
        minutes: u8,
        seconds: u8,
    ) -> Result<(), RtcTimeError> {
        let (ones, tens) = make_bcd(seconds, 59)?;
        sec.set_seconds(ones);
        sec.set_ten_seconds(tens);
        let (ones, tens) = make_bcd(minutes, 59)?;
        min.set_minutes(ones);
        min.set_ten_minutes(tens);
        let encoded = encode_hours(hours)?;
        hrs.0 |= encoded.0;
        Ok(())
    }
}

impl<I2C: I2c> RtcDriver for Ds3231<I2C> {
    type Error = Ds3231Error<I2C::Error>;

    fn read_time(&mut self) -> Result<RtcTime, Self::Error> {
        self.datetime()
    }

    fn write_time(&mut self, time: &RtcTime) -> Result<(), Self::Error> {
        self.set_datetime(time)
    }

    fn program_alarm(&mut self, channel: Channel, alarm: &AlarmMatch) -> Result<(), Self::Error> {
        debug!("programming alarm");
        match channel {
            Channel::One => {
                let regs = Self::encode_alarm1(alarm)?;
                let data = [
                    RegAddr::Alarm1Seconds as u8,
                    regs[0],
                    regs[1],
                    regs[2],
                    regs[3],
                ];
                self.i2c.write(self.address, &data).map_err(Ds3231Error::I2c)
            }
            Channel::Two => {
                let regs = Self::encode_alarm2(alarm)?;
                let data = [RegAddr::Alarm2Minutes as u8, regs[0], regs[1], regs[2]];
                self.i2c.write(self.address, &data).map_err(Ds3231Error::I2c)
            }
        }
    }

    fn read_and_clear_flag(&mut self, channel: Channel) -> Result<bool, Self::Error> {
        let mut status = self.get_status()?;
        let fired = match channel {
            Channel::One => status.alarm1_flag(),
            Channel::Two => status.alarm2_flag(),
        };
        if fired {
            // Flag bits ignore written ones, so writing the register back
            // with only this channel's bit zeroed leaves the other
            // channel's pending flag intact.
            match channel {
                Channel::One => status.set_alarm1_flag(false),
                Channel::Two => status.set_alarm2_flag(false),
            }
            self.set_status(status)?;
        }
        Ok(fired)
    }

    fn set_interrupt_enable(
        &mut self,
        channel: Channel,
        enabled: bool,
    ) -> Result<(), Self::Error> {
        let mut control = self.get_control()?;
        match channel {
            Channel::One => control.set_alarm1_interrupt_enable(enabled),
            Channel::Two => control.set_alarm2_interrupt_enable(enabled),
        }
        self.set_control(control)
    }

    fn set_shared_line_mode(&mut self, mode: SharedLineMode) -> Result<(), Self::Error> {
        let mut control = self.get_control()?;
        match mode {
            SharedLineMode::SquareWave(frequency) => {
                control.set_interrupt_control(InterruptControl::SquareWave);
                control.set_square_wave_frequency(frequency);
            }
            SharedLineMode::AlarmInterrupt => {
                control.set_interrupt_control(InterruptControl::Interrupt);
            }
            SharedLineMode::Disabled => {
                control.set_interrupt_control(InterruptControl::Interrupt);
                control.set_alarm1_interrupt_enable(false);
                control.set_alarm2_interrupt_enable(false);
            }
        }
        self.set_control(control)
    }
}
