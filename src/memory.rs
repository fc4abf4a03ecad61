use crate::error::Chip8Error;
use log::info;
use std::io::{self, Read};

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Byte-addressable memory. Every address is truncated to 12 bits, so no
/// access can land outside the 4K the machine has.
pub trait MemoryMap {
    /// read one byte
    fn read_byte(&self, addr: u16) -> u8;

    /// write one byte
    fn write_byte(&mut self, addr: u16, value: u8);

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: u16) -> u16 {
        ((self.read_byte(addr) as u16) << 8) | self.read_byte(addr.wrapping_add(1)) as u16
    }

    /// write a chunk of bytes starting at addr
    fn write(&mut self, data: &[u8], addr: u16) {
        for (offset, byte) in data.iter().enumerate() {
            self.write_byte(addr.wrapping_add(offset as u16), *byte);
        }
    }

    /// fill buf with the bytes starting at addr
    fn read(&self, addr: u16, buf: &mut [u8]) {
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_byte(addr.wrapping_add(offset as u16));
        }
    }
}

/// how much RAM we have
pub const RAM_SIZE_BYTES: usize = 4096;

/// mask applied to every address
const ADDR_MASK: u16 = 0x0fff;

/// where the program is loaded
pub const PROGRAM_ADDR: u16 = 0x0200;

/// the largest ROM that fits between the program origin and the top of RAM
pub const MAX_PROGRAM_SIZE: usize = RAM_SIZE_BYTES - PROGRAM_ADDR as usize;

/// where the built-in hex font lives
pub const FONT_ADDR: u16 = 0x000;

/// each glyph is 5 rows of 8 pixels
pub const FONT_GLYPH_BYTES: u16 = 5;

/// Standard CHIP-8 memory map:
///   0x0000-0x004f  font
///   0x0050-0x01ff  unused (interpreter on the original hardware)
///   0x0200-0x0fff  program
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[(addr & ADDR_MASK) as usize]
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[(addr & ADDR_MASK) as usize] = value;
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the font installed
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: Box::new([0u8; RAM_SIZE_BYTES]),
        };
        mm.write(&CHIP8_FONT, FONT_ADDR);
        mm
    }

    /// load a CHIP-8 program at 0x200, returning its size; never reads
    /// more than one byte past the limit
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        let mut buf = Vec::new();
        let len = reader
            .take(MAX_PROGRAM_SIZE as u64 + 1)
            .read_to_end(&mut buf)?;
        if len > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: len,
                max: MAX_PROGRAM_SIZE,
            });
        }
        self.write(&buf, PROGRAM_ADDR);
        info!("loaded {} byte program at {:#05x}", len, PROGRAM_ADDR);
        Ok(len)
    }

    /// the whole of RAM, for inspection
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

pub const CHIP8_FONT: [u8; 80] = [
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed_above_font() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[0x50..], [0; 0xfb0]);
    }

    #[test]
    fn test_font_installed() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[..80], CHIP8_FONT);
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8MemoryMap::new();
        let src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        dst.write(src, 0x308);
        assert_eq!(
            dst.bytes[0x300..0x310],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300);
        assert_eq!(m.get_word(0x304), 0x0405);
    }

    #[test]
    fn test_addresses_wrap_at_4k() {
        let mut m = Chip8MemoryMap::new();
        m.write_byte(0x1234, 0xab);
        assert_eq!(m.read_byte(0x0234), 0xab);

        // a word fetched from the last byte wraps round to the font
        m.write_byte(0x0fff, 0x12);
        assert_eq!(m.get_word(0x0fff), 0x12f0);
    }

    #[test]
    fn test_read_into_buffer() {
        let m = Chip8MemoryMap::new();
        let mut buf = [0u8; 5];
        m.read(5 * FONT_GLYPH_BYTES, &mut buf);
        assert_eq!(buf, [0xF0, 0x80, 0xF0, 0x10, 0xF0]);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.load_program(&mut prog)?, 2);
        assert_eq!(dst.bytes[0x200..0x202], [0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_load_max_size_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        let rom = vec![0xaa; MAX_PROGRAM_SIZE];
        dst.load_program(&mut rom.as_slice())?;
        assert_eq!(dst.bytes[0xfff], 0xaa);
        assert_eq!(dst.bytes[..80], CHIP8_FONT);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut dst = Chip8MemoryMap::new();
        let rom = vec![0; MAX_PROGRAM_SIZE + 1];
        match dst.load_program(&mut rom.as_slice()) {
            Err(Chip8Error::RomTooLarge { size, max }) => {
                assert_eq!(size, 0xe01);
                assert_eq!(max, 0xe00);
            }
            other => panic!("expected RomTooLarge, got {:?}", other),
        }
        // nothing was written
        assert_eq!(dst.bytes[0x200], 0);
    }

    /// counts how much of an endless stream was consumed
    struct Counting<R> {
        inner: R,
        consumed: usize,
    }

    impl<R: io::Read> io::Read for Counting<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.consumed += n;
            Ok(n)
        }
    }

    #[test]
    fn test_endless_rom_rejected_after_limit() {
        let mut dst = Chip8MemoryMap::new();
        let mut src = Counting {
            inner: io::repeat(0xaa),
            consumed: 0,
        };
        assert!(matches!(
            dst.load_program(&mut src),
            Err(Chip8Error::RomTooLarge { size: 0xe01, max: 0xe00 })
        ));
        assert_eq!(src.consumed, MAX_PROGRAM_SIZE + 1);
        assert_eq!(dst.bytes[0x200], 0);
    }
}
