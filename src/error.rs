use std::io;
use thiserror::Error;

/// Everything that can stop the machine. None of these are raised by the
/// normal operation of an instruction; they all mean the run is over.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("unknown opcode {opcode:#06x} at pc {pc:#05x}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("ROM is larger than the {max} bytes that fit above the program origin (read {size})")]
    RomTooLarge { size: usize, max: usize },

    #[error("call stack overflow at pc {pc:#05x}")]
    StackOverflow { pc: u16 },

    #[error("return with an empty call stack at pc {pc:#05x}")]
    StackUnderflow { pc: u16 },

    #[error("could not read ROM")]
    Io(#[from] io::Error),
}
