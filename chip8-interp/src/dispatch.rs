//! Two-level opcode dispatch.
//!
//! The leading nibble selects a handler from [`MAIN`]. The families `0`, `8`,
//! `E` and `F` pack several instructions behind one nibble, and route through a
//! second table keyed on the low nibble (or the low byte, for `F`).
//!
//! Every table is immutable and built at compile time. Unmapped slots hold
//! [`op_null`], so any 16-bit word resolves to a handler.
use crate::{bytecode::Instr, cpu::Chip8Cpu, ops::*, vm::Flow};

pub type OpHandler = fn(&mut Chip8Cpu, Instr) -> Flow;

static MAIN: [OpHandler; 1 << 4] = {
    let mut lut = [op_null as OpHandler; 1 << 4];

    lut[0x0] = exec_family_0 as OpHandler;
    lut[0x1] = op_jp as OpHandler;
    lut[0x2] = op_call as OpHandler;
    lut[0x3] = op_se_imm as OpHandler;
    lut[0x4] = op_sne_imm as OpHandler;
    lut[0x5] = op_se_reg as OpHandler;
    lut[0x6] = op_ld_imm as OpHandler;
    lut[0x7] = op_add_imm as OpHandler;
    lut[0x8] = exec_family_8 as OpHandler;
    lut[0x9] = op_sne_reg as OpHandler;
    lut[0xA] = op_ld_i as OpHandler;
    lut[0xB] = op_jp_v0 as OpHandler;
    lut[0xC] = op_rnd as OpHandler;
    lut[0xD] = op_drw as OpHandler;
    lut[0xE] = exec_family_e as OpHandler;
    lut[0xF] = exec_family_f as OpHandler;
    lut
};

/// 0NN_, keyed by the low nibble.
static FAMILY_0: [OpHandler; 1 << 4] = {
    let mut lut = [op_null as OpHandler; 1 << 4];

    lut[0x0] = op_cls as OpHandler;
    lut[0xE] = op_ret as OpHandler;
    lut
};

/// 8XY_, keyed by the low nibble.
static FAMILY_8: [OpHandler; 1 << 4] = {
    let mut lut = [op_null as OpHandler; 1 << 4];

    lut[0x0] = op_ld_reg as OpHandler;
    lut[0x1] = op_or as OpHandler;
    lut[0x2] = op_and as OpHandler;
    lut[0x3] = op_xor as OpHandler;
    lut[0x4] = op_add_reg as OpHandler;
    lut[0x5] = op_sub as OpHandler;
    lut[0x6] = op_shr as OpHandler;
    lut[0x7] = op_subn as OpHandler;
    lut[0xE] = op_shl as OpHandler;
    lut
};

/// EX__, keyed by the low nibble.
static FAMILY_E: [OpHandler; 1 << 4] = {
    let mut lut = [op_null as OpHandler; 1 << 4];

    lut[0xE] = op_skp as OpHandler; // EX9E
    lut[0x1] = op_sknp as OpHandler; // EXA1
    lut
};

/// FX__, keyed by the low byte.
static FAMILY_F: [OpHandler; 1 << 8] = {
    let mut lut = [op_null as OpHandler; 1 << 8];

    lut[0x07] = op_ld_vx_dt as OpHandler;
    lut[0x0A] = op_ld_key as OpHandler;
    lut[0x15] = op_ld_dt_vx as OpHandler;
    lut[0x18] = op_ld_st_vx as OpHandler;
    lut[0x1E] = op_add_i as OpHandler;
    lut[0x29] = op_ld_font as OpHandler;
    lut[0x33] = op_bcd as OpHandler;
    lut[0x55] = op_store_regs as OpHandler;
    lut[0x65] = op_load_regs as OpHandler;
    lut
};

/// Execute a single decoded instruction against the machine state.
#[inline]
pub fn dispatch(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    MAIN[instr.op() as usize](cpu, instr)
}

/// Only the low nibble is decoded, so the middle byte of `0NNN` is ignored.
fn exec_family_0(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    FAMILY_0[instr.n() as usize](cpu, instr)
}

fn exec_family_8(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    FAMILY_8[instr.n() as usize](cpu, instr)
}

fn exec_family_e(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    FAMILY_E[instr.n() as usize](cpu, instr)
}

fn exec_family_f(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    FAMILY_F[instr.nn() as usize](cpu, instr)
}
