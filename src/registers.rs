use crate::error::Fault;
use crate::memory::RAM_SIZE_BYTES;

/// number of general purpose registers
pub const REGISTER_COUNT: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG: usize = 0xf;

/// V0-VF, the index register and the program counter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Registers {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pc: u16,
}

impl Registers {
    pub fn new(pc: u16) -> Self {
        Registers {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc,
        }
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// move the program counter. targets outside RAM are refused and the
    /// counter keeps its old value
    pub fn set_pc(&mut self, target: u32) -> Result<(), Fault> {
        if target >= RAM_SIZE_BYTES as u32 {
            return Err(Fault::PcOutOfBounds(target));
        }
        self.pc = target as u16;
        Ok(())
    }

    /// move the program counter relative to where it is now
    pub fn offset_pc(&mut self, delta: i32) -> Result<(), Fault> {
        let target = self.pc as i64 + delta as i64;
        if target < 0 {
            return Err(Fault::PcOutOfBounds(target as u32));
        }
        self.set_pc(target as u32)
    }

    pub fn set_flag(&mut self, value: bool) {
        self.v[FLAG] = value as u8;
    }
}

/// return addresses for subroutine calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStack {
    frames: Vec<u16>,
    depth: usize,
}

impl CallStack {
    pub fn new(depth: usize) -> Self {
        CallStack {
            frames: Vec::with_capacity(depth),
            depth,
        }
    }

    pub fn push(&mut self, addr: u16) -> Result<(), Fault> {
        if self.frames.len() >= self.depth {
            return Err(Fault::StackOverflow(self.depth));
        }
        self.frames.push(addr);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Fault> {
        self.frames.pop().ok_or(Fault::StackUnderflow)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
