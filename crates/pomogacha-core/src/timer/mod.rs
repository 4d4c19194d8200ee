mod countdown;
mod driver;

pub use countdown::{Countdown, TimerState, TICK_MS};
pub use driver::{CompletionHook, TimerDriver};
