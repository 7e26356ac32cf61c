use std::time::Duration;

/// timers count down at 60Hz regardless of how fast instructions run
pub const TIMER_HZ: u32 = 60;

/// wallclock time between timer ticks
pub const TICK_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / TIMER_HZ as u64);

/// the delay and sound timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Timers::default()
    }

    /// one 1/60s tick: both counters drop by one, stopping at zero
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// the tone should be audible while the sound timer is running
    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}
