//! CPU and memory state.
use rand::{rngs::StdRng, SeedableRng};

use crate::{bytecode::Instr, constants::*};

/// Core state for a chip8 interpreter.
///
/// A single aggregate, exclusively owned and mutated by one VM for the
/// lifetime of an emulation session.
pub struct Chip8Cpu {
    // ------------------------------------------------------------------------
    // Registers
    /// Program counter pointing to the next instruction to fetch.
    pub(crate) pc: Address,
    /// Stack pointer, the number of return addresses on the stack.
    pub(crate) sp: usize,
    /// General purpose registers for temporary values.
    ///
    /// Register 16 (VF) is used for either the carry flag or borrow switch depending on opcode.
    pub(crate) registers: [u8; REGISTER_COUNT],
    /// Pointer register used for memory indexed instructions. It is not range checked.
    pub(crate) address: Address,
    /// (DT) Delay timer that counts down to 0.
    pub(crate) delay_timer: u8,
    /// (ST) Sound timer that counts down to 0. When it has a non-zero value, a beep is played.
    pub(crate) sound_timer: u8,
    /// Keyboard input state. Pressed is a 1 bit, released is a 0 bit.
    pub(crate) key_state: u16,
    /// The instruction word fetched by the most recent step.
    pub(crate) instr: Instr,

    // ------------------------------------------------------------------------
    // Memory
    /// Main memory storage space.
    pub(crate) ram: Box<[u8; MEM_SIZE]>,
    /// Stack of return pointers used for jumping when a routine call finishes.
    pub(crate) stack: [Address; STACK_SIZE],
    /// Screen buffer that is drawn to.
    pub(crate) display: Box<[bool; DISPLAY_BUFFER_SIZE]>,

    /// Random source for `Cxnn`, seeded once per session.
    pub(crate) rng: StdRng,
}

impl Chip8Cpu {
    /// Create a machine with zeroed state, the font installed, and the program
    /// counter at the start of program memory.
    ///
    /// The random source is seeded from OS entropy unless a seed is given.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut cpu = Self {
            pc: MEM_START as Address,
            sp: 0,
            registers: [0; REGISTER_COUNT],
            address: 0,
            delay_timer: 0,
            sound_timer: 0,
            key_state: 0,
            instr: Instr::default(),

            ram: Box::new([0; MEM_SIZE]),
            stack: [0; STACK_SIZE],
            display: Box::new([false; DISPLAY_BUFFER_SIZE]),

            rng,
        };
        cpu.load_font();
        cpu
    }

    /// Erase the contents of the memory buffers `ram`, `stack` and `display`,
    /// and zero the registers and timers.
    ///
    /// The key state belongs to the host and the random source to the
    /// session, so both are left alone.
    pub(crate) fn reset(&mut self) {
        self.ram.fill(0);
        self.stack.fill(0);
        self.display.fill(false);

        self.pc = MEM_START as Address;
        self.sp = 0;
        self.registers = [0; REGISTER_COUNT];
        self.address = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.instr = Instr::default();
    }

    pub(crate) fn load_font(&mut self) {
        let start = FONTSET_START as usize;
        self.ram[start..start + FONTSET_DATA_LENGTH].copy_from_slice(&FONTSET);
    }

    pub fn clear_display(&mut self) {
        self.display.fill(false);
    }

    /// Move the program counter, wrapping it into the memory space.
    #[inline(always)]
    pub fn jump(&mut self, addr: Address) {
        self.pc = addr & MEM_MASK as Address;
    }

    /// Write the flag register VF.
    #[inline(always)]
    pub fn set_flag(&mut self, flag: bool) {
        self.registers[FLAG_REGISTER] = flag as u8;
    }

    pub fn set_key_state(&mut self, key_id: u8, state: bool) {
        if key_id < KEY_COUNT {
            if state {
                self.key_state |= 1 << key_id;
            } else {
                self.key_state &= !(1 << key_id);
            }
        }
    }

    pub fn key_state(&self, key_id: u8) -> bool {
        if key_id < KEY_COUNT {
            self.key_state & (1 << key_id) > 0
        } else {
            false
        }
    }

    /// Check whether any key is pressed down.
    #[inline(always)]
    pub fn any_key(&self) -> bool {
        self.key_state > 0
    }

    /// Retrieve the value of the lowest key that is pressed down.
    #[inline]
    pub fn first_key(&self) -> Option<u8> {
        if self.any_key() {
            Some(self.key_state.trailing_zeros() as u8)
        } else {
            None
        }
    }

    /// Clear the keyboard input state, setting all keys to up.
    #[inline(always)]
    pub fn clear_keys(&mut self) {
        self.key_state = 0;
    }

    /// Count down the delay and sound timers by one, stopping at zero.
    #[inline]
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Push a return address onto the call stack.
    ///
    /// # Panics
    ///
    /// Nesting deeper than [`STACK_SIZE`] calls is a program error the
    /// architecture leaves undefined. It is not guarded, and panics on the stack bound.
    #[inline]
    pub fn push(&mut self, addr: Address) {
        self.stack[self.sp] = addr;
        self.sp += 1;
    }

    /// Pop the most recent return address off the call stack.
    ///
    /// # Panics
    ///
    /// Returning with an empty call stack is a program error the architecture
    /// leaves undefined. It is not guarded, and panics.
    #[inline]
    pub fn pop(&mut self) -> Address {
        self.sp -= 1;
        self.stack[self.sp]
    }
}

impl Default for Chip8Cpu {
    fn default() -> Self {
        Self::new(None)
    }
}
