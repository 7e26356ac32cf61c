use crate::config::Quirks;
use std::fmt;

/// the raw fields of a 16-bit instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    /// two bytes from memory, big-endian
    pub fn from_bytes(hi: u8, lo: u8) -> Self {
        Opcode(u16::from_be_bytes([hi, lo]))
    }

    pub fn op(&self) -> u8 {
        (self.0 >> 12) as u8 & 0xf
    }

    pub fn x(&self) -> u8 {
        (self.0 >> 8) as u8 & 0xf
    }

    pub fn y(&self) -> u8 {
        (self.0 >> 4) as u8 & 0xf
    }

    pub fn n(&self) -> u8 {
        self.0 as u8 & 0xf
    }

    pub fn nn(&self) -> u8 {
        self.0 as u8
    }

    pub fn nnn(&self) -> u16 {
        self.0 & 0x0fff
    }
}

/// register index, 0x0-0xf
pub type Reg = u8;

/// One decoded instruction. Anything that doesn't match a known pattern
/// decodes to `Unknown` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm(Reg, u8),
    /// 4XNN
    SkipNeImm(Reg, u8),
    /// 5XY_
    SkipEqReg(Reg, Reg),
    /// 6XNN
    LoadImm(Reg, u8),
    /// 7XNN
    AddImm(Reg, u8),
    /// 8XY0
    Move(Reg, Reg),
    /// 8XY1
    Or(Reg, Reg),
    /// 8XY2
    And(Reg, Reg),
    /// 8XY3
    Xor(Reg, Reg),
    /// 8XY4
    Add(Reg, Reg),
    /// 8XY5
    Sub(Reg, Reg),
    /// 8XY6
    ShiftRight(Reg, Reg),
    /// 8XY7
    SubReverse(Reg, Reg),
    /// 8XYE
    ShiftLeft(Reg, Reg),
    /// 9XY_
    SkipNeReg(Reg, Reg),
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpOffset(u16),
    /// CXNN
    Random(Reg, u8),
    /// DXYN
    Draw(Reg, Reg, u8),
    /// EX9E
    SkipKeyPressed(Reg),
    /// EXA1
    SkipKeyReleased(Reg),
    /// FX07
    LoadDelay(Reg),
    /// FX0A
    WaitKey(Reg),
    /// FX15
    SetDelay(Reg),
    /// FX18
    SetSound(Reg),
    /// FX1E
    AddIndex(Reg),
    /// FX29
    LoadGlyph(Reg),
    /// FX33
    StoreBcd(Reg),
    /// FX55
    StoreRegisters(Reg),
    /// FX65
    LoadRegisters(Reg),
    Unknown(u16),
}

impl Instruction {
    pub fn decode(word: u16) -> Self {
        use Instruction::*;
        let op = Opcode(word);
        let (x, y, n, nn, nnn) = (op.x(), op.y(), op.n(), op.nn(), op.nnn());
        match op.op() {
            0x0 => match word {
                0x00e0 => ClearScreen,
                0x00ee => Return,
                _ => Unknown(word),
            },
            0x1 => Jump(nnn),
            0x2 => Call(nnn),
            0x3 => SkipEqImm(x, nn),
            0x4 => SkipNeImm(x, nn),
            0x5 => SkipEqReg(x, y),
            0x6 => LoadImm(x, nn),
            0x7 => AddImm(x, nn),
            0x8 => match n {
                0x0 => Move(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => Add(x, y),
                0x5 => Sub(x, y),
                0x6 => ShiftRight(x, y),
                0x7 => SubReverse(x, y),
                0xe => ShiftLeft(x, y),
                _ => Unknown(word),
            },
            0x9 => SkipNeReg(x, y),
            0xa => LoadIndex(nnn),
            0xb => JumpOffset(nnn),
            0xc => Random(x, nn),
            0xd => Draw(x, y, n),
            0xe => match nn {
                0x9e => SkipKeyPressed(x),
                0xa1 => SkipKeyReleased(x),
                _ => Unknown(word),
            },
            0xf => match nn {
                0x07 => LoadDelay(x),
                0x0a => WaitKey(x),
                0x15 => SetDelay(x),
                0x18 => SetSound(x),
                0x1e => AddIndex(x),
                0x29 => LoadGlyph(x),
                0x33 => StoreBcd(x),
                0x55 => StoreRegisters(x),
                0x65 => LoadRegisters(x),
                _ => Unknown(word),
            },
            _ => Unknown(word),
        }
    }
}

impl Instruction {
    /// disassembly that knows which register BNNN adds
    pub fn listing(self, quirks: Quirks) -> Listing {
        Listing {
            instruction: self,
            quirks,
        }
    }
}

/// an instruction rendered under a particular set of quirks
#[derive(Debug, Clone, Copy)]
pub struct Listing {
    instruction: Instruction,
    quirks: Quirks,
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.instruction {
            Instruction::JumpOffset(a) if !self.quirks.jump_uses_v0 => {
                write!(f, "JP   V{:X}, 0x{:03x}", (a >> 8) & 0xf, a)
            }
            other => fmt::Display::fmt(&other, f),
        }
    }
}

/// disassembly, used for instruction traces. BNNN is shown the way the
/// original interpreter runs it; see `listing`
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(a) => write!(f, "JP   0x{:03x}", a),
            Call(a) => write!(f, "CALL 0x{:03x}", a),
            SkipEqImm(x, nn) => write!(f, "SE   V{:X}, 0x{:02x}", x, nn),
            SkipNeImm(x, nn) => write!(f, "SNE  V{:X}, 0x{:02x}", x, nn),
            SkipEqReg(x, y) => write!(f, "SE   V{:X}, V{:X}", x, y),
            LoadImm(x, nn) => write!(f, "LD   V{:X}, 0x{:02x}", x, nn),
            AddImm(x, nn) => write!(f, "ADD  V{:X}, 0x{:02x}", x, nn),
            Move(x, y) => write!(f, "LD   V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR   V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND  V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR  V{:X}, V{:X}", x, y),
            Add(x, y) => write!(f, "ADD  V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB  V{:X}, V{:X}", x, y),
            ShiftRight(x, y) => write!(f, "SHR  V{:X}, V{:X}", x, y),
            SubReverse(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x, y) => write!(f, "SHL  V{:X}, V{:X}", x, y),
            SkipNeReg(x, y) => write!(f, "SNE  V{:X}, V{:X}", x, y),
            LoadIndex(a) => write!(f, "LD   I, 0x{:03x}", a),
            JumpOffset(a) => write!(f, "JP   V0, 0x{:03x}", a),
            Random(x, nn) => write!(f, "RND  V{:X}, 0x{:02x}", x, nn),
            Draw(x, y, n) => write!(f, "DRW  V{:X}, V{:X}, {}", x, y, n),
            SkipKeyPressed(x) => write!(f, "SKP  V{:X}", x),
            SkipKeyReleased(x) => write!(f, "SKNP V{:X}", x),
            LoadDelay(x) => write!(f, "LD   V{:X}, DT", x),
            WaitKey(x) => write!(f, "LD   V{:X}, K", x),
            SetDelay(x) => write!(f, "LD   DT, V{:X}", x),
            SetSound(x) => write!(f, "LD   ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD  I, V{:X}", x),
            LoadGlyph(x) => write!(f, "LD   F, V{:X}", x),
            StoreBcd(x) => write!(f, "LD   B, V{:X}", x),
            StoreRegisters(x) => write!(f, "LD   [I], V{:X}", x),
            LoadRegisters(x) => write!(f, "LD   V{:X}, [I]", x),
            Unknown(w) => write!(f, "???  0x{:04x}", w),
        }
    }
}
