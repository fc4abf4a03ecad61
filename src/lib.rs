//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the interpreter is a plain state machine: `step()` runs exactly one
//!   fetch/decode/execute/tick cycle and hands control back
//! * no globals; all machine state lives in one `Chip8State` owned by the
//!   interpreter
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * input device, with trait for filling the keypad snapshot
//! * the sound timer is kept, but nothing beeps
//!
//! Model
//!
//! Environment
//!  |-- display, input, config
//!  |-- interpreter(config)
//!  |    |-- state: memory (font + program), registers, stack, timers,
//!  |    |          keypad, framebuffer
//!  |    `-- opcode decoder -> instruction -> executor
//!  `-- main loop, once per frame
//!       |-- input.poll_keys(&mut keypad)
//!       |-- for _ in 0..steps_per_frame { interpreter.step()? }
//!       |-- timers.tick() if the host owns them
//!       |-- display.draw(framebuffer) if it needs a redraw
//!       `-- sleep off the rest of the frame
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod state;

use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::path::PathBuf;

pub use config::{Config, TimerMode};
pub use error::Chip8Error;
pub use interpreter::Chip8Interpreter;

use config::{DEFAULT_FRAME_RATE, DEFAULT_INSTRUCTIONS_PER_SECOND};
use display::MonoTermDisplay;
use environment::Environment;
use input::CrosstermInput;

#[derive(Debug, clap::Parser)]
#[command(author, version, about = "A CHIP-8 emulator for the terminal", long_about = None)]
pub struct Params {
    /// A path to the ROM file
    rom: PathBuf,

    /// Instructions per second
    #[arg(long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND)]
    ips: u32,

    /// Screen refresh rate, and the timer rate with --timer-mode fixed
    #[arg(long, default_value_t = DEFAULT_FRAME_RATE)]
    frame_rate: u32,

    /// Tick the delay and sound timers per frame (fixed) or per instruction
    #[arg(long, value_enum, default_value_t = TimerMode::Fixed)]
    timer_mode: TimerMode,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,
}

impl From<Params> for Config {
    fn from(params: Params) -> Self {
        Config {
            rom_path: params.rom,
            instructions_per_second: params.ips,
            frame_rate: params.frame_rate,
            timer_mode: params.timer_mode,
            seed: params.seed,
        }
    }
}

pub fn run(params: Params) -> Result<()> {
    let config = Config::from(params);

    // open the ROM before the terminal goes raw
    let mut rom = File::open(&config.rom_path)
        .with_context(|| format!("opening ROM {}", config.rom_path.display()))?;
    info!("loading ROM {}", config.rom_path.display());

    let title = config
        .rom_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut display = MonoTermDisplay::new(&title).context("setting up the terminal")?;
    let mut input = CrosstermInput::new().context("setting up the keyboard")?;
    let mut env = Environment::new(&config, &mut display, &mut input);

    env.load_program(&mut rom)
        .with_context(|| format!("loading ROM {}", config.rom_path.display()))?;
    env.main_loop(None)
}
