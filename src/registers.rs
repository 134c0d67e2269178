//! Register definitions and bitfield structures for the DS3231 RTC.
//!
//! Only the registers the alarm engine touches are modeled: the seven
//! date/time registers, the two alarm register blocks with their mask
//! bits, and the control/status pair. All multi-digit fields are BCD.
//!
//! The engine runs the clock in 24-hour mode exclusively; the 12-hour
//! select bit is modeled so that reads can detect (and reject) a clock
//! that was left in 12-hour mode by other software.

use bitfield::bitfield;

/// Register addresses for the DS3231 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59)
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (0-23)
    Hours = 0x02,
    /// Day register (1-7)
    Day = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Month register (1-12) with century flag
    Month = 0x05,
    /// Year register (0-99)
    Year = 0x06,
    /// Alarm 1 seconds register
    Alarm1Seconds = 0x07,
    /// Alarm 1 minutes register
    Alarm1Minutes = 0x08,
    /// Alarm 1 hours register
    Alarm1Hours = 0x09,
    /// Alarm 1 day/date register
    Alarm1DayDate = 0x0A,
    /// Alarm 2 minutes register
    Alarm2Minutes = 0x0B,
    /// Alarm 2 hours register
    Alarm2Hours = 0x0C,
    /// Alarm 2 day/date register
    Alarm2DayDate = 0x0D,
    /// Control register
    Control = 0x0E,
    /// Control/Status register
    ControlStatus = 0x0F,
}

/// INT/SQW pin function control (INTCN bit).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptControl {
    /// Output square wave on INT/SQW pin
    SquareWave = 0,
    /// Output alarm interrupt signal on INT/SQW pin
    Interrupt = 1,
}
impl From<u8> for InterruptControl {
    /// Creates an `InterruptControl` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => InterruptControl::SquareWave,
            1 => InterruptControl::Interrupt,
            _ => panic!("Invalid value for InterruptControl: {}", v),
        }
    }
}
impl From<InterruptControl> for u8 {
    fn from(v: InterruptControl) -> Self {
        v as u8
    }
}

/// Square wave output frequency options.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWaveFrequency {
    /// 1 Hz square wave output
    Hz1 = 0b00,
    /// 1.024 kHz square wave output
    Hz1024 = 0b01,
    /// 4.096 kHz square wave output
    Hz4096 = 0b10,
    /// 8.192 kHz square wave output
    Hz8192 = 0b11,
}
impl From<u8> for SquareWaveFrequency {
    /// Creates a `SquareWaveFrequency` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0b00, 0b01, 0b10, or 0b11.
    fn from(v: u8) -> Self {
        match v {
            0b00 => SquareWaveFrequency::Hz1,
            0b01 => SquareWaveFrequency::Hz1024,
            0b10 => SquareWaveFrequency::Hz4096,
            0b11 => SquareWaveFrequency::Hz8192,
            _ => panic!("Invalid value for SquareWaveFrequency: {}", v),
        }
    }
}
impl From<SquareWaveFrequency> for u8 {
    fn from(v: SquareWaveFrequency) -> Self {
        v as u8
    }
}

/// Day/Date select for alarm registers (DY/DT bit).
///
/// Controls whether the alarm day/date register matches against the day
/// of the week or the date of the month.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DayDateSelect {
    /// Match against date of the month (1-31)
    Date = 0,
    /// Match against day of the week (1-7, where 1=Sunday)
    Day = 1,
}
impl From<u8> for DayDateSelect {
    /// Creates a `DayDateSelect` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => DayDateSelect::Date,
            1 => DayDateSelect::Day,
            _ => panic!("Invalid value for DayDateSelect: {}", v),
        }
    }
}
impl From<DayDateSelect> for u8 {
    fn from(v: DayDateSelect) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Seconds register (0-59) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(Seconds);

bitfield! {
    /// Minutes register (0-59) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Minutes(u8);
    impl Debug;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 6, 4;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(Minutes);

bitfield! {
    /// Hours register (0-23), 24-hour layout.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// 12-hour select bit; always written 0 by this crate
    pub twelve_hour, set_twelve_hour: 6;
    /// Twenty-hours bit (set for hours 20-23)
    pub twenty_hours, set_twenty_hours: 5, 5;
    /// Ten-hours bit (set for hours 10-19)
    pub ten_hours, set_ten_hours: 4, 4;
    /// Ones place of hours
    pub hours, set_hours: 3, 0;
}
from_register_u8!(Hours);

bitfield! {
    /// Day of week register (1-7).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Day(u8);
    impl Debug;
    /// Day of week (1-7)
    pub day, set_day: 2, 0;
}
from_register_u8!(Day);

bitfield! {
    /// Date register (1-31) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Date(u8);
    impl Debug;
    /// Tens place of date (0-3)
    pub ten_date, set_ten_date: 5, 4;
    /// Ones place of date (0-9)
    pub date, set_date: 3, 0;
}
from_register_u8!(Date);

bitfield! {
    /// Month register (1-12) with century flag and BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Month(u8);
    impl Debug;
    /// Century flag (1 = year 2100+)
    pub century, set_century: 7;
    /// Tens place of month (0-1)
    pub ten_month, set_ten_month: 4, 4;
    /// Ones place of month (0-9)
    pub month, set_month: 3, 0;
}
from_register_u8!(Month);

bitfield! {
    /// Year register (0-99) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Year(u8);
    impl Debug;
    /// Tens place of year (0-9)
    pub ten_year, set_ten_year: 7, 4;
    /// Ones place of year (0-9)
    pub year, set_year: 3, 0;
}
from_register_u8!(Year);

bitfield! {
    /// Control register for device configuration.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control(u8);
    impl Debug;
    /// Oscillator disable (EOSC, active low enable)
    pub oscillator_disable, set_oscillator_disable: 7;
    /// Enable square wave output on battery power
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    /// Force temperature conversion
    pub convert_temperature, set_convert_temperature: 5;
    /// Square wave output frequency selection
    pub from into SquareWaveFrequency, square_wave_frequency, set_square_wave_frequency: 4, 3;
    /// INT/SQW pin function control
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    /// Enable alarm 2 interrupt
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    /// Enable alarm 1 interrupt
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
from_register_u8!(Control);

#[cfg(feature = "defmt")]
impl defmt::Format for Control {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Control(INTCN={}, A1IE={}, A2IE={})",
            self.interrupt_control(),
            self.alarm1_interrupt_enable(),
            self.alarm2_interrupt_enable()
        );
    }
}

bitfield! {
    /// Status register for device state and flags.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    /// Oscillator stop flag
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// Enable 32kHz output
    pub enable_32khz_output, set_enable_32khz_output: 3;
    /// Device busy flag
    pub busy, set_busy: 2;
    /// Alarm 2 triggered flag
    pub alarm2_flag, set_alarm2_flag: 1;
    /// Alarm 1 triggered flag
    pub alarm1_flag, set_alarm1_flag: 0;
}
from_register_u8!(Status);

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Status(A1F={}, A2F={})",
            self.alarm1_flag(),
            self.alarm2_flag()
        );
    }
}

// Alarm register types with mask bits and special control bits

bitfield! {
    /// Alarm Seconds register with mask bit (only used by Alarm 1).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmSeconds(u8);
    impl Debug;
    /// Alarm mask bit 1 (A1M1)
    pub alarm_mask1, set_alarm_mask1: 7;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u8!(AlarmSeconds);

bitfield! {
    /// Alarm Minutes register with mask bit (used by both alarms).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmMinutes(u8);
    impl Debug;
    /// Alarm mask bit 2 (A1M2/A2M2)
    pub alarm_mask2, set_alarm_mask2: 7;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 6, 4;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 3, 0;
}
from_register_u8!(AlarmMinutes);

bitfield! {
    /// Alarm Hours register with mask bit, 24-hour layout (used by both alarms).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmHours(u8);
    impl Debug;
    /// Alarm mask bit 3 (A1M3/A2M3)
    pub alarm_mask3, set_alarm_mask3: 7;
    /// 12-hour select bit; always written 0 by this crate
    pub twelve_hour, set_twelve_hour: 6;
    /// Twenty-hours bit (set for hours 20-23)
    pub twenty_hours, set_twenty_hours: 5, 5;
    /// Ten-hours bit (set for hours 10-19)
    pub ten_hours, set_ten_hours: 4, 4;
    /// Ones place of hours
    pub hours, set_hours: 3, 0;
}
from_register_u8!(AlarmHours);

bitfield! {
    /// Alarm Day/Date register with mask bit and DY/DT control (used by both alarms).
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmDayDate(u8);
    impl Debug;
    /// Alarm mask bit 4 (A1M4/A2M4)
    pub alarm_mask4, set_alarm_mask4: 7;
    /// Day/Date select (1=day of week, 0=date of month)
    pub from into DayDateSelect, day_date_select, set_day_date_select: 6, 6;
    /// Tens place of date (0-3) when DY/DT=0, unused when DY/DT=1
    pub ten_date, set_ten_date: 5, 4;
    /// Day of week (1-7) when DY/DT=1, ones place of date when DY/DT=0
    pub day_or_date, set_day_or_date: 3, 0;
}
from_register_u8!(AlarmDayDate);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_date_select_conversions() {
        assert_eq!(DayDateSelect::from(0), DayDateSelect::Date);
        assert_eq!(DayDateSelect::from(1), DayDateSelect::Day);
        assert_eq!(u8::from(DayDateSelect::Date), 0);
        assert_eq!(u8::from(DayDateSelect::Day), 1);
    }

    #[test]
    #[should_panic(expected = "Invalid value for DayDateSelect: 2")]
    fn test_invalid_day_date_select_conversion() {
        let _ = DayDateSelect::from(2);
    }

    #[test]
    #[should_panic(expected = "Invalid value for SquareWaveFrequency: 4")]
    fn test_invalid_square_wave_frequency_conversion() {
        let _ = SquareWaveFrequency::from(4);
    }

    #[test]
    fn test_bcd_register_conversions() {
        let seconds = Seconds::from(0x59);
        assert_eq!(seconds.ten_seconds(), 5);
        assert_eq!(seconds.seconds(), 9);
        assert_eq!(u8::from(seconds), 0x59);

        let minutes = Minutes::from(0x45);
        assert_eq!(minutes.ten_minutes(), 4);
        assert_eq!(minutes.minutes(), 5);

        let date = Date::from(0x31);
        assert_eq!(date.ten_date(), 3);
        assert_eq!(date.date(), 1);

        let month = Month::from(0x81); // January with century bit
        assert!(month.century());
        assert_eq!(month.ten_month(), 0);
        assert_eq!(month.month(), 1);

        let year = Year::from(0x24);
        assert_eq!(year.ten_year(), 2);
        assert_eq!(year.year(), 4);
    }

    #[test]
    fn test_hours_register_24h_layout() {
        let hours = Hours::from(0x23); // 23:xx
        assert!(!hours.twelve_hour());
        assert_eq!(hours.twenty_hours(), 1);
        assert_eq!(hours.ten_hours(), 0);
        assert_eq!(hours.hours(), 3);

        let hours = Hours::from(0x15); // 15:xx
        assert_eq!(hours.twenty_hours(), 0);
        assert_eq!(hours.ten_hours(), 1);
        assert_eq!(hours.hours(), 5);

        // A clock left in 12-hour mode is detectable
        let hours = Hours::from(0x72);
        assert!(hours.twelve_hour());
    }

    #[test]
    fn test_control_register_conversions() {
        let control = Control::from(0x1C);
        assert!(!control.oscillator_disable());
        assert_eq!(control.square_wave_frequency(), SquareWaveFrequency::Hz8192);
        assert_eq!(control.interrupt_control(), InterruptControl::Interrupt);
        assert!(!control.alarm2_interrupt_enable());
        assert!(!control.alarm1_interrupt_enable());

        let mut control = Control::from(0x00);
        control.set_interrupt_control(InterruptControl::Interrupt);
        control.set_alarm1_interrupt_enable(true);
        assert_eq!(u8::from(control), 0b0000_0101);
    }

    #[test]
    fn test_status_register_flags() {
        let status = Status::from(0x03);
        assert!(status.alarm1_flag());
        assert!(status.alarm2_flag());

        let mut status = status;
        status.set_alarm1_flag(false);
        assert!(!status.alarm1_flag());
        assert!(status.alarm2_flag());
        assert_eq!(u8::from(status), 0x02);
    }

    #[test]
    fn test_alarm_register_mask_bits() {
        let mut sec = AlarmSeconds::default();
        sec.set_alarm_mask1(true);
        sec.set_ten_seconds(3);
        sec.set_seconds(5);
        assert_eq!(u8::from(sec), 0xB5);

        let min = AlarmMinutes::from(0xD7); // masked, 57 minutes
        assert!(min.alarm_mask2());
        assert_eq!(min.ten_minutes(), 5);
        assert_eq!(min.minutes(), 7);

        let hrs = AlarmHours::from(0x95); // masked, 15 hours
        assert!(hrs.alarm_mask3());
        assert_eq!(hrs.ten_hours(), 1);
        assert_eq!(hrs.hours(), 5);

        let dd = AlarmDayDate::from(0x15); // date mode, date 15
        assert!(!dd.alarm_mask4());
        assert_eq!(dd.day_date_select(), DayDateSelect::Date);
        assert_eq!(dd.ten_date(), 1);
        assert_eq!(dd.day_or_date(), 5);
    }

    #[test]
    fn test_register_roundtrip_conversions() {
        let test_values = [0x00, 0x55, 0xAA, 0xFF, 0x12, 0x34, 0x9A];
        for &value in &test_values {
            assert_eq!(u8::from(Seconds::from(value)), value);
            assert_eq!(u8::from(Minutes::from(value)), value);
            assert_eq!(u8::from(Hours::from(value)), value);
            assert_eq!(u8::from(Day::from(value)), value);
            assert_eq!(u8::from(Date::from(value)), value);
            assert_eq!(u8::from(Month::from(value)), value);
            assert_eq!(u8::from(Year::from(value)), value);
            assert_eq!(u8::from(Control::from(value)), value);
            assert_eq!(u8::from(Status::from(value)), value);
            assert_eq!(u8::from(AlarmSeconds::from(value)), value);
            assert_eq!(u8::from(AlarmMinutes::from(value)), value);
            assert_eq!(u8::from(AlarmHours::from(value)), value);
            assert_eq!(u8::from(AlarmDayDate::from(value)), value);
        }
    }
}
