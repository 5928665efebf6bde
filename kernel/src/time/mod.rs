//! Public façade for time-related facilities.
//!
//! The tick counter advances once per timer interrupt, `TICKS_PER_SECOND`
//! times a second. Alarm deadlines are expressed in ticks.

pub mod alarm;
pub mod timer;

pub use alarm::{check_alarms, AlarmTimer};
pub use timer::{Clock, TickClock};
