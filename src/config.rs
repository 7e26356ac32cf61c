/// historically divergent instruction behaviours. `Default` matches the
/// original COSMAC VIP interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// FX55/FX65 leave I pointing one past the last register transferred
    pub memory_index_advance: bool,
    /// 8XY6/8XYE copy VY into VX before shifting
    pub shift_uses_vy: bool,
    /// BNNN jumps to NNN + V0 (otherwise NNN + VX, X taken from NNN)
    pub jump_uses_v0: bool,
    /// 8XY1/8XY2/8XY3 zero VF after the operation
    pub logic_clears_vf: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Quirks {
            memory_index_advance: true,
            shift_uses_vy: true,
            jump_uses_v0: true,
            logic_clears_vf: true,
        }
    }
}

impl Quirks {
    /// the behaviour most later interpreters (CHIP-48, SUPER-CHIP) settled on
    pub fn modern() -> Self {
        Quirks {
            memory_index_advance: false,
            shift_uses_vy: false,
            jump_uses_v0: false,
            logic_clears_vf: false,
        }
    }
}

pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;
pub const DEFAULT_STACK_DEPTH: usize = 16;

/// fixed for the whole run once handed to the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub quirks: Quirks,
    pub instructions_per_second: u32,
    pub stack_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quirks: Quirks::default(),
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            stack_depth: DEFAULT_STACK_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let c = Config::default();
        assert_eq!(c.instructions_per_second, 700);
        assert_eq!(c.stack_depth, 16);
        assert!(c.quirks.memory_index_advance);
        assert!(c.quirks.shift_uses_vy);
        assert!(c.quirks.jump_uses_v0);
        assert!(c.quirks.logic_clears_vf);
    }

    #[test]
    fn test_modern_quirks_all_off() {
        let q = Quirks::modern();
        assert!(!q.memory_index_advance);
        assert!(!q.shift_uses_vy);
        assert!(!q.jump_uses_v0);
        assert!(!q.logic_clears_vf);
    }
}
