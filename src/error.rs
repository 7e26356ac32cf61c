use std::io;
use thiserror::Error;

/// Something went wrong while executing a single instruction. None of these
/// are fatal: the machine is left in a consistent state and the host can
/// carry on stepping.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("program counter out of bounds: 0x{0:04x}")]
    PcOutOfBounds(u32),

    #[error("unrecognised instruction 0x{0:04x}")]
    UnknownInstruction(u16),

    #[error("return with an empty call stack")]
    StackUnderflow,

    #[error("call stack is full ({0} entries)")]
    StackOverflow(usize),
}

/// A program couldn't be put into memory, so a run can't start.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read program: {0}")]
    Io(#[from] io::Error),

    #[error("program is {len} bytes but only {max} fit in memory")]
    RomTooLarge { len: usize, max: usize },

    #[error("program is empty")]
    EmptyRom,
}
