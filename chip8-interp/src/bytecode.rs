//! Helpers for extracting data from instruction words.
use std::fmt;

use crate::constants::*;

/// A single 16-bit instruction word.
///
/// Each instruction is two bytes, stored big-endian, with the opcode identity
/// in the first 4-bit nibble. Operands are extracted by masking fixed bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Instr(pub u16);

impl Instr {
    /// Read the instruction word at the given address.
    ///
    /// Both byte addresses are wrapped into the memory space, so a program counter
    /// left past the end of memory never reads outside the buffer.
    #[inline(always)]
    pub fn fetch(memory: &[u8; MEM_SIZE], pc: usize) -> Self {
        let a = memory[pc & MEM_MASK];
        let b = memory[(pc + 1) & MEM_MASK];
        Self::from_bytes([a, b])
    }

    #[inline(always)]
    pub fn from_bytes([a, b]: [u8; 2]) -> Self {
        Instr(((a as u16) << 8) | b as u16)
    }

    /// Opcode family in the leading nibble. (0xF000)
    #[inline(always)]
    pub fn op(self) -> u8 {
        (self.0 >> 12) as u8
    }

    /// Operand VX. (0x0F00)
    #[inline(always)]
    pub fn x(self) -> usize {
        ((self.0 & 0x0F00) >> 8) as usize
    }

    /// Operand VY. (0x00F0)
    #[inline(always)]
    pub fn y(self) -> usize {
        ((self.0 & 0x00F0) >> 4) as usize
    }

    /// Operand N, the lowest nibble. (0x000F)
    #[inline(always)]
    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    /// Operand NN, the low byte. (0x00FF)
    #[inline(always)]
    pub fn nn(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// Operand NNN, a 12-bit address. (0x0FFF)
    #[inline(always)]
    pub fn nnn(self) -> Address {
        self.0 & 0x0FFF
    }
}

impl From<u16> for Instr {
    fn from(word: u16) -> Self {
        Instr(word)
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_operands() {
        let instr = Instr(0xD12F);
        assert_eq!(instr.op(), 0xD);
        assert_eq!(instr.x(), 0x1);
        assert_eq!(instr.y(), 0x2);
        assert_eq!(instr.n(), 0xF);
        assert_eq!(instr.nn(), 0x2F);
        assert_eq!(instr.nnn(), 0x12F);
    }

    #[test]
    fn test_fetch_big_endian() {
        let mut memory = [0; MEM_SIZE];
        memory[MEM_START] = 0x6A;
        memory[MEM_START + 1] = 0x42;

        assert_eq!(Instr::fetch(&memory, MEM_START), Instr(0x6A42));
    }

    /// The fetch must never index outside of memory, even when the
    /// program counter has run off the end.
    #[test]
    fn test_fetch_wraps_memory() {
        let mut memory = [0; MEM_SIZE];
        memory[0xFFF] = 0x12;
        memory[0x000] = 0x34;
        memory[0x0FE] = 0xAB;
        memory[0x0FF] = 0xCD;

        assert_eq!(Instr::fetch(&memory, 0xFFF), Instr(0x1234));
        assert_eq!(Instr::fetch(&memory, 0x10FE), Instr(0xABCD));
    }
}
