/// The canonical field split of a two-byte instruction word. Which fields
/// mean anything depends on `op`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// the raw word
    pub word: u16,
    /// bits 15-12, the instruction family
    pub op: u8,
    /// bits 11-8, usually a register
    pub x: usize,
    /// bits 7-4, usually a register
    pub y: usize,
    /// bits 3-0
    pub n: u8,
    /// bits 7-0
    pub kk: u8,
    /// bits 11-0
    pub addr: u16,
}

impl Opcode {
    pub fn new(word: u16) -> Self {
        Opcode {
            word,
            op: (word >> 12) as u8,
            x: ((word >> 8) & 0x0f) as usize,
            y: ((word >> 4) & 0x0f) as usize,
            n: (word & 0x0f) as u8,
            kk: (word & 0xff) as u8,
            addr: word & 0x0fff,
        }
    }
}

/// Vx, Vy etc. are register indices (0..16); everything else is an immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jp(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SeByte(usize, u8),
    /// 4xkk
    SneByte(usize, u8),
    /// 5xy0
    SeReg(usize, usize),
    /// 6xkk
    LdByte(usize, u8),
    /// 7xkk
    AddByte(usize, u8),
    /// 8xy0
    LdReg(usize, usize),
    /// 8xy1
    Or(usize, usize),
    /// 8xy2
    And(usize, usize),
    /// 8xy3
    Xor(usize, usize),
    /// 8xy4
    AddReg(usize, usize),
    /// 8xy5
    Sub(usize, usize),
    /// 8xy6
    Shr(usize),
    /// 8xy7
    Subn(usize, usize),
    /// 8xyE
    Shl(usize),
    /// 9xy0
    SneReg(usize, usize),
    /// Annn
    LdI(u16),
    /// Bnnn
    JpV0(u16),
    /// Cxkk
    Rnd(usize, u8),
    /// Dxyn
    Drw(usize, usize, u8),
    /// Ex9E
    Skp(usize),
    /// ExA1
    Sknp(usize),
    /// Fx07
    LdFromDelay(usize),
    /// Fx0A
    WaitKey(usize),
    /// Fx15
    LdDelay(usize),
    /// Fx18
    LdSound(usize),
    /// Fx1E
    AddI(usize),
    /// Fx29
    LdFont(usize),
    /// Fx33
    Bcd(usize),
    /// Fx55
    StoreRegs(usize),
    /// Fx65
    LoadRegs(usize),
}

impl Instruction {
    /// None for any word that isn't a CHIP-8 instruction
    pub fn decode(o: Opcode) -> Option<Instruction> {
        use Instruction::*;

        let i = match (o.op, o.n) {
            (0x0, _) => match o.addr {
                0x0e0 => Cls,
                0x0ee => Ret,
                _ => return None,
            },
            (0x1, _) => Jp(o.addr),
            (0x2, _) => Call(o.addr),
            (0x3, _) => SeByte(o.x, o.kk),
            (0x4, _) => SneByte(o.x, o.kk),
            (0x5, 0x0) => SeReg(o.x, o.y),
            (0x6, _) => LdByte(o.x, o.kk),
            (0x7, _) => AddByte(o.x, o.kk),
            (0x8, 0x0) => LdReg(o.x, o.y),
            (0x8, 0x1) => Or(o.x, o.y),
            (0x8, 0x2) => And(o.x, o.y),
            (0x8, 0x3) => Xor(o.x, o.y),
            (0x8, 0x4) => AddReg(o.x, o.y),
            (0x8, 0x5) => Sub(o.x, o.y),
            (0x8, 0x6) => Shr(o.x),
            (0x8, 0x7) => Subn(o.x, o.y),
            (0x8, 0xe) => Shl(o.x),
            (0x9, 0x0) => SneReg(o.x, o.y),
            (0xa, _) => LdI(o.addr),
            (0xb, _) => JpV0(o.addr),
            (0xc, _) => Rnd(o.x, o.kk),
            (0xd, _) => Drw(o.x, o.y, o.n),
            (0xe, _) => match o.kk {
                0x9e => Skp(o.x),
                0xa1 => Sknp(o.x),
                _ => return None,
            },
            (0xf, _) => match o.kk {
                0x07 => LdFromDelay(o.x),
                0x0a => WaitKey(o.x),
                0x15 => LdDelay(o.x),
                0x18 => LdSound(o.x),
                0x1e => AddI(o.x),
                0x29 => LdFont(o.x),
                0x33 => Bcd(o.x),
                0x55 => StoreRegs(o.x),
                0x65 => LoadRegs(o.x),
                _ => return None,
            },
            _ => return None,
        };
        Some(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields() {
        let o = Opcode::new(0xd12f);
        assert_eq!(o.op, 0xd);
        assert_eq!(o.x, 0x1);
        assert_eq!(o.y, 0x2);
        assert_eq!(o.n, 0xf);
        assert_eq!(o.kk, 0x2f);
        assert_eq!(o.addr, 0x12f);
    }

    #[test]
    fn test_decode_families() {
        let cases = [
            (0x00e0, Instruction::Cls),
            (0x00ee, Instruction::Ret),
            (0x1abc, Instruction::Jp(0xabc)),
            (0x2abc, Instruction::Call(0xabc)),
            (0x3a42, Instruction::SeByte(0xa, 0x42)),
            (0x4a42, Instruction::SneByte(0xa, 0x42)),
            (0x5ab0, Instruction::SeReg(0xa, 0xb)),
            (0x6a42, Instruction::LdByte(0xa, 0x42)),
            (0x7a42, Instruction::AddByte(0xa, 0x42)),
            (0x8ab0, Instruction::LdReg(0xa, 0xb)),
            (0x8ab1, Instruction::Or(0xa, 0xb)),
            (0x8ab2, Instruction::And(0xa, 0xb)),
            (0x8ab3, Instruction::Xor(0xa, 0xb)),
            (0x8ab4, Instruction::AddReg(0xa, 0xb)),
            (0x8ab5, Instruction::Sub(0xa, 0xb)),
            (0x8ab6, Instruction::Shr(0xa)),
            (0x8ab7, Instruction::Subn(0xa, 0xb)),
            (0x8abe, Instruction::Shl(0xa)),
            (0x9ab0, Instruction::SneReg(0xa, 0xb)),
            (0xaabc, Instruction::LdI(0xabc)),
            (0xbabc, Instruction::JpV0(0xabc)),
            (0xca42, Instruction::Rnd(0xa, 0x42)),
            (0xdab5, Instruction::Drw(0xa, 0xb, 5)),
            (0xea9e, Instruction::Skp(0xa)),
            (0xeaa1, Instruction::Sknp(0xa)),
            (0xfa07, Instruction::LdFromDelay(0xa)),
            (0xfa0a, Instruction::WaitKey(0xa)),
            (0xfa15, Instruction::LdDelay(0xa)),
            (0xfa18, Instruction::LdSound(0xa)),
            (0xfa1e, Instruction::AddI(0xa)),
            (0xfa29, Instruction::LdFont(0xa)),
            (0xfa33, Instruction::Bcd(0xa)),
            (0xfa55, Instruction::StoreRegs(0xa)),
            (0xfa65, Instruction::LoadRegs(0xa)),
        ];
        for (word, expected) in cases {
            assert_eq!(
                Instruction::decode(Opcode::new(word)),
                Some(expected),
                "{:#06x}",
                word
            );
        }
    }

    #[test]
    fn test_decode_unknown() {
        for word in [0x0000, 0x0123, 0x5121, 0x8008, 0x800f, 0x9001, 0xe000, 0xf000, 0xffff] {
            assert_eq!(Instruction::decode(Opcode::new(word)), None, "{:#06x}", word);
        }
    }

    #[test]
    fn test_decode_is_total() {
        // every word either decodes or is reported; just make sure nothing panics
        let known = (0..=u16::MAX)
            .filter(|w| Instruction::decode(Opcode::new(*w)).is_some())
            .count();
        assert!(known > 0 && known < 0x10000);
    }
}
