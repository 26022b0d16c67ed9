//! Opcode handlers.
//!
//! Every handler mutates the machine state for exactly one instruction
//! semantic. By the time a handler runs, the program counter already
//! points past the instruction being executed, so jumps and calls overwrite
//! it and skips add a further 2 on top.
//!
//! Register VF is written before the destination register in every instruction
//! that reports a flag, so when VX is VF the result overwrites the flag.
use rand::Rng;

use crate::{bytecode::Instr, constants::*, cpu::Chip8Cpu, vm::Flow};

/// Unmapped instruction encoding. Does nothing.
pub fn op_null(_cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    log::debug!("unsupported opcode {instr}, ignored");
    Flow::NoOp
}

// ----------------------------------------------------------------------------
// Flow control

/// 00E0 (CLS)
///
/// Clear display
pub fn op_cls(cpu: &mut Chip8Cpu, _instr: Instr) -> Flow {
    cpu.clear_display();
    Flow::Draw
}

/// 00EE (RET)
///
/// Return from a subroutine.
/// Set the program counter to the address popped off the top of the stack.
///
/// # Panics
///
/// When the call stack is empty.
pub fn op_ret(cpu: &mut Chip8Cpu, _instr: Instr) -> Flow {
    let addr = cpu.pop();
    cpu.jump(addr);
    Flow::Jump
}

/// 1NNN (JP addr)
///
/// Jump to address.
pub fn op_jp(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.jump(instr.nnn());
    Flow::Jump
}

/// 2NNN (CALL addr)
///
/// Call subroutine at NNN. The return address is the instruction following the call.
///
/// # Panics
///
/// When the call stack is already [`STACK_SIZE`] levels deep.
pub fn op_call(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.push(cpu.pc);
    cpu.jump(instr.nnn());
    Flow::Jump
}

/// BNNN (JP V0, addr)
///
/// Jump to address NNN plus the value of register V0.
/// A target past the end of memory wraps around to the start.
pub fn op_jp_v0(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.jump(instr.nnn() + cpu.registers[0] as Address);
    Flow::Jump
}

#[inline(always)]
fn skip_if(cpu: &mut Chip8Cpu, cond: bool) -> Flow {
    if cond {
        cpu.jump(cpu.pc.wrapping_add(2));
    }
    Flow::Ok
}

/// 3XNN (SE Vx, byte)
///
/// Skip the next instruction if register VX equals value NN.
pub fn op_se_imm(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let cond = cpu.registers[instr.x()] == instr.nn();
    skip_if(cpu, cond)
}

/// 4XNN (SNE Vx, byte)
///
/// Skip the next instruction if register VX does not equal value NN.
pub fn op_sne_imm(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let cond = cpu.registers[instr.x()] != instr.nn();
    skip_if(cpu, cond)
}

/// 5XY0 (SE Vx, Vy)
///
/// Skip the next instruction if register VX equals register VY.
pub fn op_se_reg(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let cond = cpu.registers[instr.x()] == cpu.registers[instr.y()];
    skip_if(cpu, cond)
}

/// 9XY0 (SNE Vx, Vy)
///
/// Skip the next instruction if register VX does not equal register VY.
pub fn op_sne_reg(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let cond = cpu.registers[instr.x()] != cpu.registers[instr.y()];
    skip_if(cpu, cond)
}

// ----------------------------------------------------------------------------
// Immediate values

/// 6XNN (LD Vx, byte)
///
/// Set register VX to value NN.
pub fn op_ld_imm(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.registers[instr.x()] = instr.nn();
    Flow::Ok
}

/// 7XNN (ADD Vx, byte)
///
/// Add value NN to register VX. Carry flag is not set.
pub fn op_add_imm(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let vx = instr.x();
    cpu.registers[vx] = cpu.registers[vx].wrapping_add(instr.nn());
    Flow::Ok
}

/// CXNN (RND Vx, byte)
///
/// Set register VX to the result of bitwise AND between a random number and NN.
pub fn op_rnd(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.registers[instr.x()] = cpu.rng.gen::<u8>() & instr.nn();
    Flow::Ok
}

// ----------------------------------------------------------------------------
// Arithmetic

/// 8XY0 (LD Vx, Vy)
///
/// Store the value of register VY in register VX.
pub fn op_ld_reg(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.registers[instr.x()] = cpu.registers[instr.y()];
    Flow::Ok
}

/// 8XY1 (OR Vx, Vy)
pub fn op_or(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.registers[instr.x()] |= cpu.registers[instr.y()];
    Flow::Ok
}

/// 8XY2 (AND Vx, Vy)
pub fn op_and(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.registers[instr.x()] &= cpu.registers[instr.y()];
    Flow::Ok
}

/// 8XY3 (XOR Vx, Vy)
pub fn op_xor(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.registers[instr.x()] ^= cpu.registers[instr.y()];
    Flow::Ok
}

/// 8XY4 (ADD Vx, Vy)
///
/// Adds VY to VX, and stores the result in VX.
/// Overflow is wrapped.
/// If overflow, set VF to 1, else 0.
pub fn op_add_reg(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let (x, y) = (cpu.registers[instr.x()], cpu.registers[instr.y()]);
    let (result, carry) = x.overflowing_add(y);
    cpu.set_flag(carry);
    cpu.registers[instr.x()] = result;
    Flow::Ok
}

/// 8XY5 (SUB Vx, Vy)
///
/// Subtracts VY from VX, and stores the result in VX.
/// VF is set to 0 when there is a borrow, set to 1 when there isn't.
pub fn op_sub(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let (x, y) = (cpu.registers[instr.x()], cpu.registers[instr.y()]);
    let (result, borrow) = x.overflowing_sub(y);
    cpu.set_flag(!borrow);
    cpu.registers[instr.x()] = result;
    Flow::Ok
}

/// 8XY7 (SUBN Vx, Vy)
///
/// Subtracts VX from VY, and stores the result in VX.
/// VF is set to 0 when there is a borrow, set to 1 when there isn't.
pub fn op_subn(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let (x, y) = (cpu.registers[instr.x()], cpu.registers[instr.y()]);
    let (result, borrow) = y.overflowing_sub(x);
    cpu.set_flag(!borrow);
    cpu.registers[instr.x()] = result;
    Flow::Ok
}

/// 8XY6 (SHR Vx)
///
/// VF is set to the least-significant bit of VX, then VX is shifted right by 1.
/// VY is unused.
pub fn op_shr(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let x = cpu.registers[instr.x()];
    cpu.set_flag(x & 1 == 1);
    cpu.registers[instr.x()] = x >> 1;
    Flow::Ok
}

/// 8XYE (SHL Vx)
///
/// VF is set to the most-significant bit of VX, then VX is shifted left by 1.
/// VY is unused.
pub fn op_shl(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let x = cpu.registers[instr.x()];
    cpu.set_flag(x & 0x80 != 0);
    cpu.registers[instr.x()] = x << 1;
    Flow::Ok
}

// ----------------------------------------------------------------------------
// Memory

/// ANNN (LD I, addr)
///
/// Set address register I to value NNN.
pub fn op_ld_i(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.address = instr.nnn();
    Flow::Ok
}

/// FX1E (ADD I, Vx)
///
/// Add VX to I. No flag is set.
pub fn op_add_i(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let x = cpu.registers[instr.x()] as Address;
    cpu.address = cpu.address.wrapping_add(x);
    Flow::Ok
}

/// FX29 (LD F, Vx)
///
/// Set I to the location of the font sprite for digit VX.
pub fn op_ld_font(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let x = cpu.registers[instr.x()] as Address;
    cpu.address = FONTSET_START + x * FONTSET_HEIGHT as Address;
    Flow::Ok
}

/// FX33 (LD B, Vx)
///
/// Store the binary-coded decimal representation of VX
/// in the memory locations I, I+1, and I+2.
///
/// # Panics
///
/// When I+2 is past the end of memory.
#[rustfmt::skip]
pub fn op_bcd(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let addr = cpu.address as usize;
    let x = cpu.registers[instr.x()];
    cpu.ram[addr]     = x / 100;
    cpu.ram[addr + 1] = x / 10 % 10;
    cpu.ram[addr + 2] = x % 10;
    Flow::Ok
}

/// FX55 (LD [I], Vx)
///
/// Store registers V0 through VX in memory starting at location I.
/// I is left unchanged.
///
/// # Panics
///
/// When I+X is past the end of memory.
pub fn op_store_regs(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let (addr, x) = (cpu.address as usize, instr.x());
    cpu.ram[addr..=addr + x].copy_from_slice(&cpu.registers[..=x]);
    Flow::Ok
}

/// FX65 (LD Vx, [I])
///
/// Read registers V0 through VX from memory starting at location I.
/// I is left unchanged.
///
/// # Panics
///
/// When I+X is past the end of memory.
pub fn op_load_regs(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let (addr, x) = (cpu.address as usize, instr.x());
    cpu.registers[..=x].copy_from_slice(&cpu.ram[addr..=addr + x]);
    Flow::Ok
}

// ----------------------------------------------------------------------------
// Display

/// DXYN (DRW Vx, Vy, nibble)
///
/// Draw sprite to the display buffer, at coordinate as per registers VX and VY.
/// Sprite is encoded as 8 pixels wide, N pixels high, stored in bits located in
/// memory pointed to by address register I.
///
/// The starting coordinate wraps around the display. Pixels of the sprite that
/// then extend past the right or bottom edge are clipped.
///
/// If the drawing operation erases existing pixels in the display buffer, register VF is set to
/// 1, and set to 0 if no display bits are unset. This is used for collision detection.
///
/// # Panics
///
/// When a visible sprite row lies past the end of memory.
pub fn op_drw(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let x0 = cpu.registers[instr.x()] as usize % DISPLAY_WIDTH;
    let y0 = cpu.registers[instr.y()] as usize % DISPLAY_HEIGHT;
    let addr = cpu.address as usize;
    let mut is_erased = false;

    let rows = (instr.n() as usize).min(DISPLAY_HEIGHT - y0);
    let cols = 8_usize.min(DISPLAY_WIDTH - x0);

    for r in 0..rows {
        // Each row is 8 bits representing the 8 pixels of the sprite.
        let row = cpu.ram[addr + r];
        let offset = (y0 + r) * DISPLAY_WIDTH + x0;

        for c in 0..cols {
            if row & (0x80 >> c) != 0 {
                let px = &mut cpu.display[offset + c];

                // XOR erases a pixel when both the old and new values are both 1.
                is_erased |= *px;
                *px = !*px;
            }
        }
    }

    cpu.set_flag(is_erased);
    Flow::Draw
}

// ----------------------------------------------------------------------------
// Keyboard

/// EX9E (SKP Vx)
///
/// Skip the next instruction if the key with the value of VX is pressed.
pub fn op_skp(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let key = cpu.registers[instr.x()] % KEY_COUNT;
    let cond = cpu.key_state(key);
    skip_if(cpu, cond)
}

/// EXA1 (SKNP Vx)
///
/// Skip the next instruction if the key with the value of VX is not pressed.
pub fn op_sknp(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    let key = cpu.registers[instr.x()] % KEY_COUNT;
    let cond = !cpu.key_state(key);
    skip_if(cpu, cond)
}

/// FX0A (LD Vx, K)
///
/// Wait for a key press, store the value of the key in VX.
///
/// While no key is pressed the program counter is rewound, so the
/// same instruction is fetched again on the next step.
pub fn op_ld_key(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    match cpu.first_key() {
        Some(k) => {
            cpu.registers[instr.x()] = k;
            Flow::Ok
        }
        None => {
            // rewind the program counter to stall the machine
            cpu.jump(cpu.pc.wrapping_sub(2));
            Flow::KeyWait
        }
    }
}

// ----------------------------------------------------------------------------
// Timers

/// FX07 (LD Vx, DT)
///
/// Set VX = delay timer value.
pub fn op_ld_vx_dt(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.registers[instr.x()] = cpu.delay_timer;
    Flow::Ok
}

/// FX15 (LD DT, Vx)
///
/// Set delay timer = VX.
pub fn op_ld_dt_vx(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.delay_timer = cpu.registers[instr.x()];
    Flow::Ok
}

/// FX18 (LD ST, Vx)
///
/// Set sound timer = VX.
pub fn op_ld_st_vx(cpu: &mut Chip8Cpu, instr: Instr) -> Flow {
    cpu.sound_timer = cpu.registers[instr.x()];
    Flow::Sound
}
