//! Whole-machine behaviour, driven through small hand-assembled programs.
use chip8_interp::{constants::*, prelude::*};

fn vm_with(bytecode: &[u8]) -> Chip8Vm {
    let mut vm = Chip8Vm::new(Chip8Conf { seed: Some(8) });
    vm.load_bytecode(bytecode).unwrap();
    vm
}

fn ld_imm(x: usize, nn: u8) -> [u8; 2] {
    [0x60 | x as u8, nn]
}

fn alu(x: usize, y: usize, n: u8) -> [u8; 2] {
    [0x80 | x as u8, (y as u8) << 4 | n]
}

/// Load two registers, then apply one 8XYN instruction.
fn run_alu(x: usize, y: usize, a: u8, b: u8, n: u8) -> Chip8Vm {
    let program = [ld_imm(x, a), ld_imm(y, b), alu(x, y, n)].concat();
    let mut vm = vm_with(&program);
    vm.run_steps(3);
    vm
}

#[test]
fn test_add_carry() {
    let values = [0x00, 0x01, 0x7F, 0x80, 0xC8, 0xFE, 0xFF];

    for x in 0..0xF {
        for y in (0..0xF).filter(|y| *y != x) {
            for a in values {
                for b in values {
                    let vm = run_alu(x, y, a, b, 0x4);
                    let sum = a as u16 + b as u16;

                    assert_eq!(vm.register(x), (sum & 0xFF) as u8);
                    assert_eq!(vm.register(0xF), (sum > 0xFF) as u8);
                }
            }
        }
    }
}

#[test]
fn test_sub_borrow() {
    let values = [0x00, 0x01, 0x7F, 0x80, 0xC8, 0xFE, 0xFF];

    for (x, y) in [(0x0, 0x1), (0x3, 0xE), (0xB, 0x2)] {
        for a in values {
            for b in values {
                let vm = run_alu(x, y, a, b, 0x5);
                assert_eq!(vm.register(x), a.wrapping_sub(b));
                assert_eq!(vm.register(0xF), (a >= b) as u8);

                let vm = run_alu(x, y, a, b, 0x7);
                assert_eq!(vm.register(x), b.wrapping_sub(a));
                assert_eq!(vm.register(0xF), (b >= a) as u8);
            }
        }
    }
}

#[test]
fn test_flag_register_as_destination() {
    // The result wins over the flag when VX is VF.
    let vm = run_alu(0xF, 0x1, 0xFF, 0x03, 0x4);
    assert_eq!(vm.register(0xF), 0x02);

    let vm = run_alu(0xF, 0x1, 0x05, 0x02, 0x5);
    assert_eq!(vm.register(0xF), 0x03);
}

#[test]
fn test_shifts() {
    let vm = run_alu(0x1, 0x2, 0b11, 0xAA, 0x6);
    assert_eq!(vm.register(0x1), 0b01);
    assert_eq!(vm.register(0xF), 1);
    assert_eq!(vm.register(0x2), 0xAA);

    let vm = run_alu(0x1, 0x2, 0b1000_0001, 0xAA, 0xE);
    assert_eq!(vm.register(0x1), 0b0000_0010);
    assert_eq!(vm.register(0xF), 1);

    let vm = run_alu(0x1, 0x2, 0b10, 0xAA, 0x6);
    assert_eq!(vm.register(0x1), 0b01);
    assert_eq!(vm.register(0xF), 0);
}

#[test]
#[rustfmt::skip]
fn test_draw_twice_restores_display() {
    let mut vm = vm_with(&[
        0xA0, 0x50, // LD I, 0x050 ; glyph 0
        0x60, 0x3D, // LD v0, 61
        0x61, 0x1E, // LD v1, 30
        0xD0, 0x15, // DRW v0, v1, 5 ; clipped at both edges
        0x60, 0x3E, // LD v0, 62
        0x61, 0x04, // LD v1, 4
        0xF2, 0x29, // LD F, v2 ; glyph 0 again
        0xD0, 0x15, // DRW v0, v1, 5
        0xD0, 0x15, // DRW v0, v1, 5
    ]);

    assert_eq!(vm.run_steps(4), Flow::Draw);
    assert_eq!(vm.register(0xF), 0);
    let before = vm.display_buffer().to_vec();

    vm.run_steps(3);
    assert_eq!(vm.index(), FONTSET_START);

    assert_eq!(vm.step(), Flow::Draw);
    assert_eq!(vm.register(0xF), 0);
    assert!(vm.pixel(62, 4));
    assert!(vm.pixel(63, 4));

    assert_eq!(vm.step(), Flow::Draw);
    assert_eq!(vm.register(0xF), 1);
    assert_eq!(vm.display_buffer().to_vec(), before);
}

#[test]
#[rustfmt::skip]
fn test_draw_start_coordinate_wraps() {
    let mut vm = vm_with(&[
        0xA0, 0x50, // LD I, 0x050
        0x60, 0x42, // LD v0, 66
        0x61, 0x21, // LD v1, 33
        0xD0, 0x11, // DRW v0, v1, 1
    ]);
    vm.run_steps(4);

    assert!(vm.pixel(2, 1));
    assert!(vm.pixel(5, 1));
    assert!(!vm.pixel(6, 1));
}

#[test]
#[rustfmt::skip]
fn test_store_load_round_trip() {
    let mut program = Vec::new();
    for x in 0..=0xF {
        program.extend_from_slice(&ld_imm(x, 0x10 + x as u8 * 3));
    }
    program.extend_from_slice(&[
        0xA3, 0x00, // LD I, 0x300
        0xFF, 0x55, // LD [I], vF
    ]);
    for x in 0..=0xF {
        program.extend_from_slice(&ld_imm(x, 0));
    }
    program.extend_from_slice(&[
        0xFF, 0x65, // LD vF, [I]
    ]);

    let mut vm = vm_with(&program);
    vm.run_steps(18);

    let stored: Vec<u8> = (0..=0xF).map(|x| 0x10 + x * 3).collect();
    assert_eq!(&vm.memory()[0x300..0x310], stored.as_slice());
    assert_eq!(vm.index(), 0x300);

    vm.run_steps(16);
    assert_eq!(vm.registers(), &[0; REGISTER_COUNT]);

    vm.step();
    assert_eq!(vm.registers().as_slice(), stored.as_slice());
    assert_eq!(vm.index(), 0x300);
}

#[test]
fn test_store_partial_leaves_rest() {
    let mut vm = vm_with(&[0x60, 0xAA, 0x61, 0xBB, 0x62, 0xCC, 0xA3, 0x00, 0xF1, 0x55]);
    vm.run_steps(5);

    assert_eq!(&vm.memory()[0x300..0x303], &[0xAA, 0xBB, 0x00]);
}

#[test]
fn test_bcd() {
    for (value, digits) in [(255, [2, 5, 5]), (7, [0, 0, 7]), (100, [1, 0, 0]), (0, [0, 0, 0])] {
        let mut vm = vm_with(&[0x65, value, 0xA4, 0x00, 0xF5, 0x33]);
        vm.run_steps(3);
        assert_eq!(&vm.memory()[0x400..0x403], &digits);
    }
}

#[test]
#[rustfmt::skip]
fn test_wait_for_key() {
    let mut vm = vm_with(&[
        0xF3, 0x0A, // LD v3, K
        0x13, 0x00, // JP 0x300
    ]);

    for _ in 0..10 {
        assert_eq!(vm.step(), Flow::KeyWait);
        assert_eq!(vm.program_counter(), 0x200);
    }

    vm.set_key(KeyCode::KeyB, true);
    vm.set_key(KeyCode::KeyE, true);
    assert_eq!(vm.step(), Flow::Ok);
    assert_eq!(vm.program_counter(), 0x202);
    assert_eq!(vm.register(0x3), 0xB);
}

#[test]
#[rustfmt::skip]
fn test_key_skips() {
    let mut vm = vm_with(&[
        0x64, 0x17, // LD v4, 0x17 ; key 7
        0xE4, 0x9E, // SKP v4
        0x00, 0x00,
        0xE4, 0xA1, // SKNP v4
        0x00, 0x00,
    ]);
    vm.set_key(KeyCode::Key7, true);

    vm.run_steps(2);
    assert_eq!(vm.program_counter(), 0x206);

    vm.step();
    assert_eq!(vm.program_counter(), 0x208);
}

#[test]
#[rustfmt::skip]
fn test_call_and_return() {
    let mut vm = vm_with(&[
        0x22, 0x06, // CALL 0x206
        0x61, 0x02, // LD v1, 2
        0x12, 0x04, // JP 0x204
        0x22, 0x0A, // CALL 0x20A
        0x00, 0xEE, // RET
        0x60, 0x01, // LD v0, 1
        0x00, 0xEE, // RET
    ]);

    assert_eq!(vm.step(), Flow::Jump);
    assert_eq!(vm.step(), Flow::Jump);
    assert_eq!(vm.stack(), &[0x202, 0x208]);

    vm.run_steps(2);
    assert_eq!(vm.register(0x0), 1);
    assert_eq!(vm.stack(), &[0x202]);
    assert_eq!(vm.program_counter(), 0x208);

    vm.run_steps(2);
    assert_eq!(vm.stack_pointer(), 0);
    assert_eq!(vm.register(0x1), 2);
    assert_eq!(vm.run_steps(8), Flow::Jump);
    assert_eq!(vm.program_counter(), 0x204);
}

#[test]
fn test_random_is_masked_and_seeded() {
    let program = [0xC0, 0x0F, 0xC1, 0xF0, 0xC2, 0x00, 0xC3, 0xFF];
    let mut a = vm_with(&program);
    let mut b = vm_with(&program);
    a.run_steps(4);
    b.run_steps(4);

    assert_eq!(a.register(0x0) & 0xF0, 0);
    assert_eq!(a.register(0x1) & 0x0F, 0);
    assert_eq!(a.register(0x2), 0);
    assert_eq!(a.registers(), b.registers());
}

#[test]
fn test_random_differs_between_sessions() {
    let program: Vec<u8> = (0..=0xF_u8).flat_map(|x| [0xC0 | x, 0xFF]).collect();

    let mut a = Chip8Vm::new(Chip8Conf::default());
    let mut b = Chip8Vm::new(Chip8Conf::default());
    a.load_bytecode(&program).unwrap();
    b.load_bytecode(&program).unwrap();
    a.run_steps(16);
    b.run_steps(16);

    assert_ne!(a.registers(), b.registers());
}

/// Control flow words keep the program counter inside memory for any operand,
/// including the largest offset added by `BNNN`.
#[test]
fn test_control_flow_never_escapes() {
    let words = (0x1000..=0x5FFF_u16)
        .chain(0x9000..=0x9FFF)
        .chain(0xB000..=0xBFFF);

    for word in words {
        let [hi, lo] = word.to_be_bytes();
        let mut vm = vm_with(&[0x60, 0xFF, 0x61, 0xFF, hi, lo]);

        vm.run_steps(4);
        assert!(vm.stack_pointer() <= STACK_SIZE, "{word:04X}");
        assert!((vm.program_counter() as usize) < MEM_SIZE, "{word:04X}");
    }
}

/// Every word other than `0NNE` (return), which needs a caller, runs on a fresh machine.
#[test]
fn test_every_word_executes() {
    let mut vm = Chip8Vm::new(Chip8Conf { seed: Some(1) });

    for word in (0..=0xFFFF_u16).filter(|w| w & 0xF00F != 0x000E) {
        vm.load_bytecode(&word.to_be_bytes()).unwrap();
        vm.step();

        assert_eq!(vm.current_instruction(), Instr(word));
        assert!(vm.stack_pointer() <= 1);
        assert!((vm.program_counter() as usize) < MEM_SIZE);
    }
}

#[test]
fn test_disassemble_listing() {
    let program = [0x00, 0xE0, 0xA2, 0x0A, 0xD0, 0x15, 0x12, 0x00];
    let mut listing = String::new();
    Disassembler::new(&program).disassemble(&mut listing).unwrap();

    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(
        lines,
        [
            "0200: 00E0  CLS",
            "0202: A20A  LD I, 20A",
            "0204: D015  DRW V0, V1, 5",
            "0206: 1200  JP 200",
        ]
    );
}
