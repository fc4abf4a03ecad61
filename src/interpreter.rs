//! # interpreter
//!
//! One call to `step` is one whole machine cycle:
//!  1. fetch the big-endian word at PC and decode it
//!  2. advance PC by 2 (branches overwrite it, skips add another 2)
//!  3. execute
//!  4. tick the timers, if they run per step
//!
//! Fx0A (wait for key) is the only instruction that can leave PC where it
//! was; the host keeps calling `step` and the same instruction runs again
//! until the keypad shows something pressed.
//!
//! A failing step leaves PC on the instruction that failed.
use crate::config::TimerMode;
use crate::display::Framebuffer;
use crate::error::Chip8Error;
use crate::input::Keypad;
use crate::memory::{MemoryMap, FONT_ADDR, FONT_GLYPH_BYTES};
use crate::opcode::{Instruction, Opcode};
use crate::state::{Chip8State, STACK_DEPTH, VF};
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;

pub struct Chip8Interpreter {
    state: Chip8State,
    rng: StdRng,
    timer_mode: TimerMode,
    waiting_for_key: bool,
}

impl Chip8Interpreter {
    /// per-step timers, random numbers from entropy
    pub fn new() -> Self {
        Self::with_config(TimerMode::PerStep, None)
    }

    pub fn with_config(timer_mode: TimerMode, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8Interpreter {
            state: Chip8State::new(),
            rng,
            timer_mode,
            waiting_for_key: false,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        self.state.load_program(reader)
    }

    pub fn state(&self) -> &Chip8State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut Chip8State {
        &mut self.state
    }

    pub fn timer_mode(&self) -> TimerMode {
        self.timer_mode
    }

    /// replace the keypad snapshot; call between steps
    pub fn set_keypad(&mut self, keypad: Keypad) {
        self.state.keypad = keypad;
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.state.keypad
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.state.framebuffer
    }

    /// the host has presented the framebuffer
    pub fn clear_redraw(&mut self) {
        self.state.framebuffer.clear_redraw();
    }

    /// is the machine parked on Fx0A
    pub fn is_waiting_for_key(&self) -> bool {
        self.waiting_for_key
    }

    /// tick both timers once; the host calls this at 60Hz in TimerMode::Fixed
    pub fn tick_timers(&mut self) {
        self.state.timers.tick();
    }

    /// run one fetch-decode-execute-tick cycle
    pub fn step(&mut self) -> Result<(), Chip8Error> {
        let pc = self.state.program_counter;
        let opcode = Opcode::new(self.state.memory.get_word(pc));
        let instruction = Instruction::decode(opcode).ok_or(Chip8Error::UnknownOpcode {
            opcode: opcode.word,
            pc,
        })?;
        trace!("{:#05x}: {:04x} {:?}", pc, opcode.word, instruction);

        self.state.program_counter = pc.wrapping_add(2);
        if let Err(e) = self.execute(instruction, pc) {
            self.state.program_counter = pc;
            return Err(e);
        }

        if self.timer_mode == TimerMode::PerStep {
            self.state.timers.tick();
        }
        Ok(())
    }

    /// apply one instruction; PC has already moved past it, `pc` is where
    /// it was fetched from
    fn execute(&mut self, instruction: Instruction, pc: u16) -> Result<(), Chip8Error> {
        use Instruction::*;

        let s = &mut self.state;
        match instruction {
            Cls => s.framebuffer.clear(),
            Ret => {
                if s.stack_pointer == 0 {
                    warn!("return with an empty stack at {:#05x}", pc);
                    return Err(Chip8Error::StackUnderflow { pc });
                }
                s.stack_pointer -= 1;
                s.program_counter = s.stack[s.stack_pointer];
            }
            Jp(addr) => s.program_counter = addr,
            Call(addr) => {
                if s.stack_pointer == STACK_DEPTH {
                    warn!("call stack full at {:#05x}", pc);
                    return Err(Chip8Error::StackOverflow { pc });
                }
                s.stack[s.stack_pointer] = s.program_counter;
                s.stack_pointer += 1;
                s.program_counter = addr;
            }
            SeByte(x, kk) => {
                let cond = s.registers[x] == kk;
                self.skip_if(cond);
            }
            SneByte(x, kk) => {
                let cond = s.registers[x] != kk;
                self.skip_if(cond);
            }
            SeReg(x, y) => {
                let cond = s.registers[x] == s.registers[y];
                self.skip_if(cond);
            }
            SneReg(x, y) => {
                let cond = s.registers[x] != s.registers[y];
                self.skip_if(cond);
            }
            LdByte(x, kk) => s.registers[x] = kk,
            AddByte(x, kk) => s.registers[x] = s.registers[x].wrapping_add(kk),
            LdReg(x, y) => s.registers[x] = s.registers[y],
            Or(x, y) => s.registers[x] |= s.registers[y],
            And(x, y) => s.registers[x] &= s.registers[y],
            Xor(x, y) => s.registers[x] ^= s.registers[y],
            // the flag is written after the result, so with x = F the flag wins
            AddReg(x, y) => {
                let sum = s.registers[x] as u16 + s.registers[y] as u16;
                s.registers[x] = sum as u8;
                s.registers[VF] = (sum > 0xff) as u8;
            }
            Sub(x, y) => {
                let (vx, vy) = (s.registers[x], s.registers[y]);
                s.registers[x] = vx.wrapping_sub(vy);
                s.registers[VF] = (vx >= vy) as u8;
            }
            Subn(x, y) => {
                let (vx, vy) = (s.registers[x], s.registers[y]);
                s.registers[x] = vy.wrapping_sub(vx);
                s.registers[VF] = (vy >= vx) as u8;
            }
            Shr(x) => {
                let vx = s.registers[x];
                s.registers[x] = vx >> 1;
                s.registers[VF] = vx & 1;
            }
            Shl(x) => {
                let vx = s.registers[x];
                s.registers[x] = vx << 1;
                s.registers[VF] = (vx >> 7) & 1;
            }
            LdI(addr) => s.index = addr,
            JpV0(addr) => s.program_counter = addr.wrapping_add(s.registers[0] as u16),
            Rnd(x, kk) => s.registers[x] = self.rng.gen::<u8>() & kk,
            Drw(x, y, n) => {
                let mut rows = [0u8; 15];
                let rows = &mut rows[..n as usize];
                s.memory.read(s.index, rows);
                let collided = s
                    .framebuffer
                    .draw_sprite(s.registers[x], s.registers[y], rows);
                s.registers[VF] = collided as u8;
            }
            Skp(x) => {
                let cond = s.keypad.is_pressed(s.registers[x]);
                self.skip_if(cond);
            }
            Sknp(x) => {
                let cond = !s.keypad.is_pressed(s.registers[x]);
                self.skip_if(cond);
            }
            LdFromDelay(x) => s.registers[x] = s.timers.delay,
            WaitKey(x) => match s.keypad.first_pressed() {
                Some(key) => {
                    s.registers[x] = key;
                    if self.waiting_for_key {
                        debug!("key {:x} released the wait at {:#05x}", key, pc);
                    }
                    self.waiting_for_key = false;
                }
                None => {
                    if !self.waiting_for_key {
                        debug!("waiting for a key at {:#05x}", pc);
                    }
                    self.waiting_for_key = true;
                    s.program_counter = pc;
                }
            },
            LdDelay(x) => s.timers.delay = s.registers[x],
            LdSound(x) => s.timers.sound = s.registers[x],
            AddI(x) => s.index = s.index.wrapping_add(s.registers[x] as u16),
            LdFont(x) => s.index = FONT_ADDR + s.registers[x] as u16 * FONT_GLYPH_BYTES,
            Bcd(x) => {
                let vx = s.registers[x];
                s.memory.write(&[vx / 100, (vx / 10) % 10, vx % 10], s.index);
            }
            StoreRegs(x) => s.memory.write(&s.registers[..=x], s.index),
            LoadRegs(x) => s.memory.read(s.index, &mut s.registers[..=x]),
        }
        Ok(())
    }

    fn skip_if(&mut self, cond: bool) {
        if cond {
            self.state.program_counter = self.state.program_counter.wrapping_add(2);
        }
    }
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
