use std::time::Duration;

/// how long one throughput window lasts
pub const WINDOW: Duration = Duration::from_secs(1);

/// Caps how many instructions run per window. Pacing only; has no effect on
/// what the instructions do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    limit: u32,
    executed: u32,
}

impl Throttle {
    pub fn new(limit: u32) -> Self {
        Throttle { limit, executed: 0 }
    }

    /// claim a slot for one instruction; false once the window is used up
    pub fn try_acquire(&mut self) -> bool {
        if self.executed >= self.limit {
            return false;
        }
        self.executed += 1;
        true
    }

    /// start a new window
    pub fn reset_window(&mut self) {
        self.executed = 0;
    }

    pub fn executed(&self) -> u32 {
        self.executed
    }

    /// average time an instruction gets if the cap is spread over the window
    pub fn pace(&self) -> Duration {
        if self.limit == 0 {
            return WINDOW;
        }
        WINDOW / self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_reached() {
        let mut t = Throttle::new(700);
        for _ in 0..700 {
            assert!(t.try_acquire());
        }
        assert!(!t.try_acquire());
        assert_eq!(t.executed(), 700);
    }

    #[test]
    fn test_reset_window() {
        let mut t = Throttle::new(2);
        assert!(t.try_acquire());
        assert!(t.try_acquire());
        assert!(!t.try_acquire());
        t.reset_window();
        assert_eq!(t.executed(), 0);
        assert!(t.try_acquire());
    }

    #[test]
    fn test_zero_limit_never_runs() {
        let mut t = Throttle::new(0);
        assert!(!t.try_acquire());
        assert_eq!(t.pace(), WINDOW);
    }

    #[test]
    fn test_pace() {
        let t = Throttle::new(1000);
        assert_eq!(t.pace(), Duration::from_millis(1));
    }
}
