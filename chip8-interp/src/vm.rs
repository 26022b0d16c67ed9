//! Virtual machine.
use std::fmt::{self, Write};

use crate::{
    bytecode::Instr,
    constants::*,
    cpu::Chip8Cpu,
    dispatch::dispatch,
    error::{Chip8Error, Chip8Result},
    keypad::KeyCode,
};

pub type Chip8DisplayBuffer<'a> = &'a [bool; DISPLAY_BUFFER_SIZE];

/// A single emulation session.
///
/// The owner drives execution by calling [`Chip8Vm::step`] at its own pace,
/// writing the key snapshot before each step and reading the display after.
/// There is no halt state. The session ends when the owner stops stepping.
pub struct Chip8Vm {
    cpu: Chip8Cpu,
    conf: Chip8Conf,
}

impl Chip8Vm {
    pub fn new(conf: Chip8Conf) -> Self {
        Chip8Vm {
            cpu: Chip8Cpu::new(conf.seed),
            conf,
        }
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &Chip8Conf {
        &self.conf
    }

    /// Copy a program image into memory at [`MEM_START`].
    ///
    /// The image is copied verbatim, without any validation beyond its size.
    pub fn load_bytecode(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if !check_program_size(bytecode) {
            return Err(Chip8Error::LargeProgram {
                size: bytecode.len(),
            });
        }

        // Start with clean memory to avoid leaking previous program.
        // This also resets the program counter to prepare for execution.
        self.cpu.reset();

        // Reset fonts
        self.cpu.load_font();

        // Load program into virtual RAM
        self.cpu.ram[MEM_START..MEM_START + bytecode.len()].copy_from_slice(bytecode);

        log::debug!("loaded program of {} bytes", bytecode.len());

        Ok(())
    }

    pub fn display_buffer(&self) -> Chip8DisplayBuffer {
        &self.cpu.display
    }
}

/// Whether the program image fits in the program memory space.
#[inline]
pub fn check_program_size(bytecode: &[u8]) -> bool {
    bytecode.len() <= MAX_PROGRAM_SIZE
}

/// What happened during a step.
///
/// The machine state is the same whichever flow is returned. The hint only
/// lets the owner react, for example by presenting the display after `Draw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Flow {
    Ok,
    /// Program counter has jumped to a new address.
    ///
    /// This is useful for the caller to avoid being
    /// blocked on infinite or long running loops.
    ///
    /// This is returned when the interpreter encounters:
    ///
    /// - 1nnn (`JP addr`)
    /// - 2nnn (`CALL addr`)
    /// - 00EE (`RET`)
    /// - Bnnn (`JP V0, addr`)
    Jump,
    /// Display buffer was changed by `CLS` or `DRW`.
    Draw,
    /// Sound timer was set by `LD ST, Vx`.
    Sound,
    /// Wait for a keypress.
    ///
    /// This is triggered by the opcode `Fx0A` (`LD Vx, K`), which stalls
    /// execution until a key is pressed, and loads the key value into `Vx`.
    KeyWait,
    /// Instruction word has no meaning and was skipped.
    NoOp,
}

/// VM Configuration Parameters.
#[derive(Debug, Default, Clone)]
pub struct Chip8Conf {
    /// Seed for the random number instruction.
    ///
    /// Each session is seeded from OS entropy when not given. Setting it makes
    /// runs reproducible, which is only intended for tooling and tests.
    pub seed: Option<u64>,
}

/// Interpreter
impl Chip8Vm {
    /// Sets the keyboard key input state.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        self.cpu.set_key_state(key.as_u8(), pressed);
    }

    /// Clear the keyboard input state, setting all keys to up.
    pub fn clear_keys(&mut self) {
        self.cpu.clear_keys()
    }

    /// Execute exactly one instruction, then count down the timers.
    ///
    /// # Panics
    ///
    /// When the program violates the architecture's contract: nesting calls
    /// deeper than [`STACK_SIZE`], returning with an empty call stack, or
    /// indexing memory past the end via the `I` register. These are left
    /// undefined by the architecture and are not guarded.
    pub fn step(&mut self) -> Flow {
        // Fetch
        let instr = Instr::fetch(&self.cpu.ram, self.cpu.pc as usize);
        self.cpu.instr = instr;
        op_trace(self.cpu.pc, instr);

        // Skips and jumps act on the already advanced counter.
        self.cpu.jump(self.cpu.pc.wrapping_add(2));

        let control_flow = dispatch(&mut self.cpu, instr);

        self.cpu.tick_timers();

        control_flow
    }

    /// Execute the given number of steps, returning the flow of the last one.
    pub fn run_steps(&mut self, step_count: usize) -> Flow {
        let mut control_flow = Flow::Ok;

        for _ in 0..step_count {
            control_flow = self.step();
        }

        control_flow
    }
}

/// Inspection
impl Chip8Vm {
    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.cpu.registers
    }

    /// Value of register VX.
    ///
    /// # Panics
    ///
    /// When `x` is not a register index `0x0..=0xF`.
    pub fn register(&self, x: usize) -> u8 {
        self.cpu.registers[x]
    }

    pub fn memory(&self) -> &[u8; MEM_SIZE] {
        &self.cpu.ram
    }

    /// Address register `I`.
    pub fn index(&self) -> Address {
        self.cpu.address
    }

    pub fn program_counter(&self) -> Address {
        self.cpu.pc
    }

    /// Return addresses currently on the call stack, oldest first.
    pub fn stack(&self) -> &[Address] {
        &self.cpu.stack[..self.cpu.sp]
    }

    pub fn stack_pointer(&self) -> usize {
        self.cpu.sp
    }

    pub fn delay_timer(&self) -> u8 {
        self.cpu.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.cpu.sound_timer
    }

    /// The buzzer should sound while the sound timer counts down.
    pub fn is_beeping(&self) -> bool {
        self.cpu.sound_timer > 0
    }

    /// The instruction word fetched by the most recent step.
    pub fn current_instruction(&self) -> Instr {
        self.cpu.instr
    }

    pub fn key_state(&self, key: KeyCode) -> bool {
        self.cpu.key_state(key.as_u8())
    }

    /// Whether the pixel at the given coordinate is set.
    ///
    /// Coordinates outside of the display are never set.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT && self.cpu.display[x + y * DISPLAY_WIDTH]
    }

    /// Display buffer as 32-bit colors, row by row.
    pub fn display_rgba(&self) -> Vec<u32> {
        self.cpu
            .display
            .iter()
            .map(|px| if *px { PIXEL_ON } else { PIXEL_OFF })
            .collect()
    }
}

/// Troubleshooting
impl Chip8Vm {
    /// Returns the instruction words in program memory as a human readable string.
    pub fn dump_ram(&self, count: usize) -> Result<String, fmt::Error> {
        let iter = self
            .cpu
            .ram
            .iter()
            .enumerate()
            .skip(MEM_START)
            .take(count)
            .step_by(2);
        let mut buf = String::new();

        for (i, op) in iter {
            let next = self.cpu.ram[(i + 1) & MEM_MASK];
            writeln!(buf, "{:04X}: {:02X}{:02X}", i, op, next)?;
        }

        Ok(buf)
    }

    pub fn dump_display(&self) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                if self.cpu.display[x + y * DISPLAY_WIDTH] {
                    write!(buf, "#")?;
                } else {
                    write!(buf, ".")?;
                }
            }
            writeln!(buf)?;
        }

        Ok(buf)
    }

    pub fn dump_keys(&self) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        if self.cpu.any_key() {
            write!(buf, "keys:")?;
            for i in 0..KEY_COUNT {
                if self.cpu.key_state(i) {
                    write!(buf, " k{i:x}")?;
                }
            }
        }

        Ok(buf)
    }
}

impl fmt::Debug for Chip8Vm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let registers: Vec<String> = self
            .cpu
            .registers
            .iter()
            .enumerate()
            .map(|(i, v)| format!("V{i:X}={v:02X}"))
            .collect();

        f.debug_struct("Chip8Vm")
            .field("registers", &registers)
            .field("pc", &format!("{:04X}", self.cpu.pc))
            .field("i", &format!("{:04X}", self.cpu.address))
            .field("dt", &format!("{:02X}", self.cpu.delay_timer))
            .field("st", &format!("{:02X}", self.cpu.sound_timer))
            .field("stack", &self.stack())
            .finish()
    }
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(pc: Address, instr: Instr) {
    log::trace!("{:04X}: {}", pc, crate::disasm::mnemonic(instr));
}

#[cfg(not(feature = "op_trace"))]
#[inline]
fn op_trace(_: Address, _: Instr) {}
