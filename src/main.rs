use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};

use chip8vm::config::{Config, Quirks, DEFAULT_INSTRUCTIONS_PER_SECOND, DEFAULT_STACK_DEPTH};
use chip8vm::display::MonoTermDisplay;
use chip8vm::environment::Environment;
use chip8vm::input::{Keymap, StdinInput};
use chip8vm::interpreter::Chip8Interpreter;
use chip8vm::sound::{Mute, SimpleBeep, Sound};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Layout {
    /// 1234/qwer/asdf/zxcv, shaped like the COSMAC keypad
    Conventional,
    /// 0-9 and a-f type the key they name
    Literal,
}

/// Run a CHIP-8 program in the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// program image to load at 0x200
    rom: PathBuf,

    /// instructions per second
    #[arg(long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND)]
    ips: u32,

    /// FX55/FX65 leave I where it was
    #[arg(long)]
    no_memory_quirk: bool,

    /// 8XY6/8XYE shift VX in place
    #[arg(long)]
    no_shift_quirk: bool,

    /// BNNN jumps to NNN + VX
    #[arg(long)]
    no_jump_quirk: bool,

    /// 8XY1/8XY2/8XY3 leave VF alone
    #[arg(long)]
    no_logic_quirk: bool,

    #[arg(long, value_enum, default_value_t = Layout::Conventional)]
    keymap: Layout,

    /// no beeping
    #[arg(long)]
    mute: bool,

    /// single-step: right arrow runs one instruction, up arrow dumps registers
    #[arg(long)]
    step: bool,

    /// log every instruction executed
    #[arg(long)]
    trace: bool,

    /// stop after this many instructions
    #[arg(long)]
    max_steps: Option<u64>,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            quirks: Quirks {
                memory_index_advance: !self.no_memory_quirk,
                shift_uses_vy: !self.no_shift_quirk,
                jump_uses_v0: !self.no_jump_quirk,
                logic_clears_vf: !self.no_logic_quirk,
            },
            instructions_per_second: self.ips,
            stack_depth: DEFAULT_STACK_DEPTH,
        }
    }
}

/// filter comes from `var`, info when it's unset; --trace wins over both
fn logger(var: &str, trace: bool) -> env_logger::Builder {
    let mut logger = env_logger::Builder::from_env(env_logger::Env::new().filter_or(var, "info"));
    if trace {
        logger.filter_level(LevelFilter::Trace);
    }
    logger
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    logger(env_logger::DEFAULT_FILTER_ENV, args.trace).init();

    // load the program before touching the terminal, so a bad ROM never
    // starts a run
    let config = args.config();
    let mut interpreter = Chip8Interpreter::new(&config);
    let mut f = File::open(&args.rom)?;
    let len = interpreter.load_program(&mut f)?;
    info!("loaded {} bytes from {}", len, args.rom.display());

    let keymap = match args.keymap {
        Layout::Conventional => Keymap::Conventional,
        Layout::Literal => Keymap::Literal,
    };
    let mut display = MonoTermDisplay::new("CHIP-8")?;
    let mut input = StdinInput::new(keymap)?;
    let mut mute = Mute::new();
    let mut beep = SimpleBeep::new();
    let sound: &mut dyn Sound = if args.mute { &mut mute } else { &mut beep };

    let mut environment = Environment::new(interpreter, &config, &mut display, &mut input, sound)
        .single_step(args.step);
    let summary = environment.main_loop(args.max_steps)?;
    drop(environment);
    drop(input);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..12 {
        println!();
    }
    println!(
        "{} instructions, {} faults, {} timer ticks",
        summary.steps, summary.faults, summary.ticks
    );
    Ok(())
}
