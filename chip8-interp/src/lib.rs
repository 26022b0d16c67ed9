mod bytecode;
pub mod constants;
mod cpu;
mod disasm;
mod dispatch;
mod error;
mod keypad;
mod ops;
mod vm;

pub use self::{
    bytecode::Instr,
    error::{Chip8Error, Chip8Result},
    keypad::{InvalidKeyCode, KeyCode},
};

pub mod prelude {
    pub use super::{
        bytecode::Instr,
        disasm::{mnemonic, Disassembler},
        error::{Chip8Error, Chip8Result},
        keypad::KeyCode,
        vm::{check_program_size, Chip8Conf, Chip8DisplayBuffer, Chip8Vm, Flow},
    };
}
