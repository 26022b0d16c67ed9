//! Disassembler.
use std::fmt::{self, Write as FmtWrite};

use crate::{bytecode::Instr, constants::*};

pub struct Disassembler<'a> {
    bytecode: &'a [u8],
    cursor: usize,
}

impl<'a> Disassembler<'a> {
    pub fn new(bytecode: &'a [u8]) -> Self {
        Self {
            bytecode,
            cursor: 0,
        }
    }

    pub fn print_bytecode(&mut self) -> fmt::Result {
        let mut s = String::new();
        self.disassemble(&mut s)?;
        println!("{}", s);
        Ok(())
    }

    /// Write the whole program to the given writer, one instruction per line.
    ///
    /// Addresses are given as they would be once the program is loaded at [`MEM_START`].
    pub fn disassemble<W: FmtWrite>(&mut self, w: &mut W) -> fmt::Result {
        self.cursor = 0;

        while self.cursor + 1 < self.bytecode.len() {
            let instr = Instr::from_bytes([
                self.bytecode[self.cursor],
                self.bytecode[self.cursor + 1],
            ]);
            writeln!(
                w,
                "{:04X}: {}  {}",
                MEM_START + self.cursor,
                instr,
                mnemonic(instr)
            )?;
            self.cursor += 2;
        }

        // Trailing odd byte of data.
        if let Some(byte) = self.bytecode.get(self.cursor) {
            writeln!(w, "{:04X}: {:02X}    DB {:02X}", MEM_START + self.cursor, byte, byte)?;
        }

        self.cursor = 0;
        Ok(())
    }
}

/// Assembly mnemonic for a single instruction word.
///
/// Words that don't encode an instruction are shown as data (`DW`).
pub fn mnemonic(instr: Instr) -> String {
    let (x, y, n, nn, nnn) = (instr.x(), instr.y(), instr.n(), instr.nn(), instr.nnn());

    match instr.op() {
        0x0 => match n {
            0x0 => "CLS".to_string(),
            0xE => "RET".to_string(),
            _ => format!("SYS {nnn:03X}"),
        },
        0x1 => format!("JP {nnn:03X}"),
        0x2 => format!("CALL {nnn:03X}"),
        0x3 => format!("SE V{x:X}, {nn:02X}"),
        0x4 => format!("SNE V{x:X}, {nn:02X}"),
        0x5 => format!("SE V{x:X}, V{y:X}"),
        0x6 => format!("LD V{x:X}, {nn:02X}"),
        0x7 => format!("ADD V{x:X}, {nn:02X}"),
        0x8 => match n {
            0x0 => format!("LD V{x:X}, V{y:X}"),
            0x1 => format!("OR V{x:X}, V{y:X}"),
            0x2 => format!("AND V{x:X}, V{y:X}"),
            0x3 => format!("XOR V{x:X}, V{y:X}"),
            0x4 => format!("ADD V{x:X}, V{y:X}"),
            0x5 => format!("SUB V{x:X}, V{y:X}"),
            0x6 => format!("SHR V{x:X}"),
            0x7 => format!("SUBN V{x:X}, V{y:X}"),
            0xE => format!("SHL V{x:X}"),
            _ => data(instr),
        },
        0x9 => format!("SNE V{x:X}, V{y:X}"),
        0xA => format!("LD I, {nnn:03X}"),
        0xB => format!("JP V0, {nnn:03X}"),
        0xC => format!("RND V{x:X}, {nn:02X}"),
        0xD => format!("DRW V{x:X}, V{y:X}, {n:X}"),
        0xE => match n {
            0xE => format!("SKP V{x:X}"),
            0x1 => format!("SKNP V{x:X}"),
            _ => data(instr),
        },
        0xF => match nn {
            0x07 => format!("LD V{x:X}, DT"),
            0x0A => format!("LD V{x:X}, K"),
            0x15 => format!("LD DT, V{x:X}"),
            0x18 => format!("LD ST, V{x:X}"),
            0x1E => format!("ADD I, V{x:X}"),
            0x29 => format!("LD F, V{x:X}"),
            0x33 => format!("LD B, V{x:X}"),
            0x55 => format!("LD [I], V{x:X}"),
            0x65 => format!("LD V{x:X}, [I]"),
            _ => data(instr),
        },
        _ => unreachable!("opcode is a 4-bit nibble"),
    }
}

fn data(instr: Instr) -> String {
    format!("DW {instr}")
}
