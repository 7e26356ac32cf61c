//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the interpreter owns the whole machine (RAM, registers, stack, frame
//!   buffer, timers) and does one instruction per `step()`; it never blocks
//! * timers tick at 60Hz of wallclock time, not per instruction
//! * instructions run at a capped rate (700/s by default), spread over each
//!   one second window
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * input device, with trait for reading key-presses
//! * audio device, with trait for making beeps
//! * compatibility quirks are fixed config, handed over at construction
//!
//! Model
//!
//! Environment
//!  |-- display, input, sound, config
//!  |-- interpreter(config)
//!  |    |-- memory map, registers, call stack, frame buffer, timers
//!  |    `-- instruction set (decode -> execute)
//!  `-- main loop
//!       |-- poll input (keypad state + host commands)
//!       |-- every 1/60s: tick timers, follow sound, present frame if dirty
//!       |-- every 1s: re-arm the instruction cap
//!       `-- if paced and under the cap: interpreter.step(keypad)
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod sound;
pub mod throttle;
pub mod timers;

pub use config::{Config, Quirks};
pub use error::{Fault, LoadError};
pub use interpreter::Chip8Interpreter;
