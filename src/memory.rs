use crate::error::LoadError;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// how much RAM we have
pub const RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const PROGRAM_ADDR: u16 = 0x0200;

/// biggest program that fits between PROGRAM_ADDR and the top of RAM
pub const MAX_PROGRAM_BYTES: usize = RAM_SIZE_BYTES - PROGRAM_ADDR as usize;

/// where the hex digit sprites live
pub const FONT_ADDR: u16 = 0x050;

/// each glyph is 5 rows tall
pub const FONT_GLYPH_BYTES: u16 = 5;

/// Represents the addressable RAM. Every access is folded into the address
/// space, so programs can't reach outside it no matter what I holds.
pub trait MemoryMap {
    /// read one byte
    fn read_byte(&self, addr: u16) -> u8;

    /// write one byte
    fn write_byte(&mut self, addr: u16, value: u8);

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: u16) -> u16 {
        u16::from_be_bytes([self.read_byte(addr), self.read_byte(addr.wrapping_add(1))])
    }

    /// copy a chunk of bytes into "RAM", wrapping at the top
    fn write(&mut self, data: &[u8], addr: u16) {
        for (offset, byte) in data.iter().enumerate() {
            self.write_byte(addr.wrapping_add(offset as u16), *byte);
        }
    }

    /// copy a chunk of "RAM" out, wrapping at the top
    fn read_into(&self, addr: u16, buf: &mut [u8]) {
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_byte(addr.wrapping_add(offset as u16));
        }
    }
}

/// Defines the CHIP-8 standard memory map (4K configuration):
///   0x0000-0x004f  interpreter (unused)
///   0x0050-0x009f  font
///   0x00a0-0x01ff  interpreter (unused)
///   0x0200-0x0fff  program
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize % RAM_SIZE_BYTES]
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize % RAM_SIZE_BYTES] = value;
    }
}

impl Chip8MemoryMap {
    /// zeroed RAM with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.write(&CHIP8_FONT, FONT_ADDR);
        mm
    }

    /// load a CHIP-8 program at 0x200. nothing is written unless the whole
    /// image fits
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, LoadError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_bytes(&buf)
    }

    /// ditto, from a slice already in memory
    pub fn load_bytes(&mut self, program: &[u8]) -> Result<usize, LoadError> {
        if program.is_empty() {
            return Err(LoadError::EmptyRom);
        }
        if program.len() > MAX_PROGRAM_BYTES {
            return Err(LoadError::RomTooLarge {
                len: program.len(),
                max: MAX_PROGRAM_BYTES,
            });
        }
        let start = PROGRAM_ADDR as usize;
        self.bytes[start..start + program.len()].copy_from_slice(program);
        Ok(program.len())
    }

    /// address of the glyph for the low nibble of `digit`
    pub fn glyph_addr(digit: u8) -> u16 {
        FONT_ADDR + (digit & 0x0f) as u16 * FONT_GLYPH_BYTES
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

#[rustfmt::skip]
const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
