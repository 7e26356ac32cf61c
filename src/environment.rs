//! # environment
//!
//! Sets everything up and runs the main loop. Three cadences are kept apart
//! and never folded into `step()`:
//!
//!  * the 60Hz timer tick, which also presents the frame if it changed
//!  * the 1s throughput window, which re-arms the instruction cap
//!  * instructions themselves, spread evenly over the window
//!
//! Every pass of the loop polls input first, so the keypad is fresh for
//! each `step()` and FX0A's spin sees new presses.
use crate::config::Config;
use crate::display::Display;
use crate::input::{HostCommand, Input};
use crate::interpreter::Chip8Interpreter;
use crate::sound::Sound;
use crate::throttle::{Throttle, WINDOW};
use crate::timers::TICK_INTERVAL;
use log::{info, warn};
use std::error::Error;
use std::time::{Duration, Instant};

/// longest the loop will sleep before polling input again
const MAX_IDLE: Duration = Duration::from_millis(5);

/// what happened over a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub steps: u64,
    pub faults: u64,
    pub ticks: u64,
    pub frames: u64,
}

/// what one pass of the loop did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Stepped,
    Idle,
    Quit,
}

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    throttle: Throttle,
    single_step: bool,
    pending_steps: u32,
    next_tick: Instant,
    next_window: Instant,
    next_step: Instant,
    summary: RunSummary,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        config: &Config,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Self {
        let now = Instant::now();
        Environment {
            interpreter,
            display,
            input,
            sound,
            throttle: Throttle::new(config.instructions_per_second),
            single_step: false,
            pending_steps: 0,
            next_tick: now + TICK_INTERVAL,
            next_window: now + WINDOW,
            next_step: now,
            summary: RunSummary::default(),
        }
    }

    /// only run instructions when asked to with HostCommand::Step
    pub fn single_step(mut self, on: bool) -> Self {
        self.single_step = on;
        self
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// restart all the cadences from `now`
    pub fn reset_clock(&mut self, now: Instant) {
        self.next_tick = now + TICK_INTERVAL;
        self.next_window = now + WINDOW;
        self.next_step = now;
        self.throttle.reset_window();
    }

    /// one pass of the host loop as of `now`
    pub fn cycle(&mut self, now: Instant) -> Result<Pass, Box<dyn Error>> {
        for command in self.input.poll()? {
            match command {
                HostCommand::Quit => return Ok(Pass::Quit),
                HostCommand::Step if self.single_step => self.pending_steps += 1,
                HostCommand::Step => {}
                HostCommand::DumpRegisters => self.dump_registers(),
            }
        }

        while now >= self.next_tick {
            self.tick()?;
            self.next_tick += TICK_INTERVAL;
        }

        while now >= self.next_window {
            self.throttle.reset_window();
            self.next_window += WINDOW;
        }

        if now < self.next_step {
            return Ok(Pass::Idle);
        }
        if self.single_step {
            if self.pending_steps == 0 {
                return Ok(Pass::Idle);
            }
            self.pending_steps -= 1;
        }
        if !self.throttle.try_acquire() {
            return Ok(Pass::Idle);
        }

        if let Err(fault) = self.interpreter.step(&*self.input) {
            warn!("{:03x}: {}", self.interpreter.registers().pc(), fault);
            self.summary.faults += 1;
        }
        self.summary.steps += 1;
        self.next_step = (self.next_step + self.throttle.pace()).max(now);
        Ok(Pass::Stepped)
    }

    /// run until quit, or until `max_steps` instructions have executed
    pub fn main_loop(&mut self, max_steps: Option<u64>) -> Result<RunSummary, Box<dyn Error>> {
        self.reset_clock(Instant::now());
        self.display.draw(self.interpreter.frame_buffer())?;
        loop {
            let now = Instant::now();
            match self.cycle(now)? {
                Pass::Quit => break,
                Pass::Stepped => {
                    if max_steps.map_or(false, |max| self.summary.steps >= max) {
                        break;
                    }
                }
                Pass::Idle => {}
            }
            let wake = self.next_tick.min(self.next_window).min(self.next_step);
            let idle = wake.saturating_duration_since(Instant::now()).min(MAX_IDLE);
            if !idle.is_zero() {
                spin_sleep::sleep(idle);
            }
        }
        self.sound.follow(false)?;
        info!(
            "stopped after {} instructions ({} faults)",
            self.summary.steps, self.summary.faults
        );
        Ok(self.summary)
    }

    /// 60Hz: count the timers down, keep the tone in step, show any new frame
    fn tick(&mut self) -> Result<(), Box<dyn Error>> {
        self.interpreter.tick_timers();
        self.summary.ticks += 1;
        self.sound.follow(self.interpreter.timers().sound_active())?;
        if self.interpreter.take_redraw() {
            self.display.draw(self.interpreter.frame_buffer())?;
            self.summary.frames += 1;
        }
        Ok(())
    }

    fn dump_registers(&self) {
        let r = self.interpreter.registers();
        let v: Vec<String> = r
            .v
            .iter()
            .enumerate()
            .map(|(n, v)| format!("V{:X}:{:02x}", n, v))
            .collect();
        info!("{} I:{:03x} PC:{:03x}", v.join(" "), r.i, r.pc());
    }
}
