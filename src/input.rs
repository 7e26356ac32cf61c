use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

/// number of keys on the hex keypad
pub const KEY_COUNT: u8 = 16;

/// terminals only report key presses, never releases; a key counts as held
/// for this long after its last press (or auto-repeat) event
const KEY_HOLD: Duration = Duration::from_millis(150);

/// map of characters read from the keyboard to what the chip8 might expect
/// where '1' => 0x01 and 'a' => 0x0a
const CHIP8_LITERAL_KEYMAP: [(char, u8); 16] = [
    ('0', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('4', 0x04),
    ('5', 0x05),
    ('6', 0x06),
    ('7', 0x07),
    ('8', 0x08),
    ('9', 0x09),
    ('a', 0x0a),
    ('b', 0x0b),
    ('c', 0x0c),
    ('d', 0x0d),
    ('e', 0x0e),
    ('f', 0x0f),
];

/// ditto using left-hand side of qwerty keyboard, laid out like the COSMAC
/// keypad:
///   1 2 3 C      1 2 3 4
///   4 5 6 D  =>  q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// which physical layout drives the keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keymap {
    Conventional,
    Literal,
}

impl Keymap {
    fn table(&self) -> &'static [(char, u8); 16] {
        match self {
            Keymap::Conventional => &CHIP8_CONVENTIONAL_KEYMAP,
            Keymap::Literal => &CHIP8_LITERAL_KEYMAP,
        }
    }
}

/// the interpreter's view of the keypad: is logical key 0x0-0xf down?
pub trait Keypad {
    fn is_pressed(&self, key: u8) -> bool;

    /// lowest numbered key currently down
    fn first_pressed(&self) -> Option<u8> {
        (0..KEY_COUNT).find(|k| self.is_pressed(*k))
    }
}

/// things the person at the keyboard asks of the host, rather than the program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Quit,
    /// run one instruction while single-stepping
    Step,
    /// log the registers
    DumpRegisters,
}

/// reads keypresses
pub trait Input: Keypad {
    /// refresh key state, returning any host commands seen since last time
    fn poll(&mut self) -> Result<Vec<HostCommand>, io::Error>;
}

/// implementation of Input reading the terminal in raw mode
pub struct StdinInput {
    keymap: HashMap<char, u8>,
    last_seen: [Option<Instant>; KEY_COUNT as usize],
}

impl StdinInput {
    pub fn new(keymap: Keymap) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            keymap: HashMap::from(*keymap.table()),
            last_seen: [None; KEY_COUNT as usize],
        })
    }

    fn press(&mut self, key: char) {
        match self.keymap.get(&key.to_ascii_lowercase()) {
            Some(mapped_key) => {
                debug!("key {:?} => 0x{:x}", key, mapped_key);
                self.last_seen[*mapped_key as usize] = Some(Instant::now());
            }
            None => {
                warn!("can't map {:?} to a COSMAC key", key);
            }
        }
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("failed to leave raw mode: {}", e);
        }
    }
}

impl Keypad for StdinInput {
    fn is_pressed(&self, key: u8) -> bool {
        self.last_seen[(key & 0xf) as usize].map_or(false, |t| t.elapsed() < KEY_HOLD)
    }
}

impl Input for StdinInput {
    fn poll(&mut self) -> Result<Vec<HostCommand>, io::Error> {
        let mut commands = Vec::new();
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char(key) => self.press(key),
                    KeyCode::Esc => commands.push(HostCommand::Quit),
                    KeyCode::Right => commands.push(HostCommand::Step),
                    KeyCode::Up => commands.push(HostCommand::DumpRegisters),
                    other => debug!("ignoring key {:?}", other),
                },
                Event::Resize(..) => {}
                other => debug!("ignoring event {:?}", other),
            }
        }
        Ok(commands)
    }
}

/// dummy Input implementation for testing; keys stay down until released
#[derive(Debug, Default, Clone)]
pub struct DummyInput {
    pressed: [bool; KEY_COUNT as usize],
    commands: Vec<HostCommand>,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        let mut input = DummyInput::default();
        for k in keys {
            input.press(*k);
        }
        input
    }

    pub fn press(&mut self, key: u8) {
        self.pressed[(key & 0xf) as usize] = true;
    }

    pub fn release(&mut self, key: u8) {
        self.pressed[(key & 0xf) as usize] = false;
    }

    /// queue a host command for the next poll
    pub fn queue(&mut self, command: HostCommand) {
        self.commands.push(command);
    }
}

impl Keypad for DummyInput {
    fn is_pressed(&self, key: u8) -> bool {
        self.pressed[(key & 0xf) as usize]
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<Vec<HostCommand>, io::Error> {
        Ok(std::mem::take(&mut self.commands))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymaps_cover_every_key() {
        for keymap in [Keymap::Conventional, Keymap::Literal] {
            let mut seen: Vec<u8> = keymap.table().iter().map(|(_, k)| *k).collect();
            seen.sort();
            assert_eq!(seen, (0..16).collect::<Vec<u8>>());
        }
    }

    #[test]
    fn test_dummy_press_release() {
        let mut input = DummyInput::new(&[0x3]);
        assert!(input.is_pressed(0x3));
        assert!(!input.is_pressed(0x4));
        input.release(0x3);
        assert!(!input.is_pressed(0x3));
    }

    #[test]
    fn test_first_pressed_is_lowest() {
        let input = DummyInput::new(&[0xb, 0x5, 0xe]);
        assert_eq!(input.first_pressed(), Some(0x5));
        assert_eq!(DummyInput::new(&[]).first_pressed(), None);
    }

    #[test]
    fn test_dummy_poll_drains_commands() -> Result<(), io::Error> {
        let mut input = DummyInput::new(&[]);
        input.queue(HostCommand::Step);
        input.queue(HostCommand::Quit);
        assert_eq!(input.poll()?, vec![HostCommand::Step, HostCommand::Quit]);
        assert!(input.poll()?.is_empty());
        Ok(())
    }
}
