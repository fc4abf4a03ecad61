use crate::display::Framebuffer;
use crate::error::Chip8Error;
use crate::input::Keypad;
use crate::memory::{Chip8MemoryMap, PROGRAM_ADDR};
use std::io;

/// call stack depth
pub const STACK_DEPTH: usize = 16;

/// index of the flag register
pub const VF: usize = 0xf;

/// The two 60Hz countdowns. Both only ever count down, unless an
/// instruction sets them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    /// count each non-zero timer down by one
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// a tone would be playing right now
    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}

/// Everything the machine is. Plain data; the interpreter does the work.
pub struct Chip8State {
    pub memory: Chip8MemoryMap,
    /// V0-VF
    pub registers: [u8; 16],
    /// I
    pub index: u16,
    pub program_counter: u16,
    pub stack: [u16; STACK_DEPTH],
    /// number of occupied stack slots, 0..=16
    pub stack_pointer: usize,
    pub timers: Timers,
    pub keypad: Keypad,
    pub framebuffer: Framebuffer,
}

impl Chip8State {
    /// power-on state: font installed, PC at the program origin, everything
    /// else zero and the screen flagged for an initial paint
    pub fn new() -> Self {
        Chip8State {
            memory: Chip8MemoryMap::new(),
            registers: [0; 16],
            index: 0,
            program_counter: PROGRAM_ADDR,
            stack: [0; STACK_DEPTH],
            stack_pointer: 0,
            timers: Timers::default(),
            keypad: Keypad::new(),
            framebuffer: Framebuffer::new(),
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        self.memory.load_program(reader)
    }
}

impl Default for Chip8State {
    fn default() -> Self {
        Self::new()
    }
}
