#![allow(clippy::unwrap_used)]
/// core-lib/src/cpu/tests.rs
use super::*;
use crate::interrupts::{InterruptFlag, Interrupts};
use crate::mmu::MMU;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use test_case::test_case;

/// 64 KiB of flat RAM with an interrupt controller.
struct FlatBus {
    memory: Vec<u8>,
    interrupts: Interrupts,
}

impl FlatBus {
    fn with_program(origin: u16, program: &[u8]) -> Self {
        let mut memory = vec![0; 0x10000];
        let start = usize::from(origin);
        memory[start..start + program.len()].copy_from_slice(program);
        Self {
            memory,
            interrupts: Interrupts::new(),
        }
    }
}

impl MemoryBus for FlatBus {
    fn read(&self, addr: u16) -> u8 {
        self.memory[usize::from(addr)]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.memory[usize::from(addr)] = value;
    }

    fn get_interrupt(&self) -> Option<InterruptFlag> {
        self.interrupts.get_interrupt()
    }

    fn clear_interrupt(&mut self, flag: InterruptFlag) {
        self.interrupts.clear(flag);
    }
}

/// CPU in `Running` mode with PC at 0x0100 and `program` loaded there.
fn setup(program: &[u8]) -> (CPU, FlatBus) {
    let mut cpu = CPU::new();
    cpu.mode = CpuMode::Running;
    cpu.regs.pc = 0x0100;
    (cpu, FlatBus::with_program(0x0100, program))
}

/// Every base opcode from 0x00 to 0x7F in order. 8-bit immediates are 0xAA,
/// 16-bit immediates 0xCAFE and relative jumps 0 so control falls through.
fn boot_fixture() -> Vec<u8> {
    let mut rom = Vec::with_capacity(0x100);
    for opcode in 0x00u8..=0x7F {
        rom.push(opcode);
        match OPCODES[usize::from(opcode)] {
            entry if entry.mnemonic == Mnemonic::Jr => rom.push(0x00),
            entry if entry.length == 2 => rom.push(0xAA),
            entry if entry.length == 3 => rom.extend([0xFE, 0xCA]),
            _ => {}
        }
    }
    rom.resize(0x100, 0x00);
    rom
}

#[test]
fn test_boot_fixture_cumulative_cycles() {
    const EXPECTED: [u64; 128] = [
        1, 4, 6, 8, 9, 10, 12, 13, 18, 20, 22, 24, 25, 26, 28, 29, //
        30, 33, 35, 37, 38, 39, 41, 42, 45, 47, 49, 51, 52, 53, 55, 56, //
        58, 61, 63, 65, 66, 67, 69, 70, 72, 74, 76, 78, 79, 80, 82, 83, //
        85, 88, 90, 92, 95, 98, 101, 102, 104, 106, 108, 110, 111, 112, 114, 115, //
        116, 117, 118, 119, 120, 121, 123, 124, 125, 126, 127, 128, 129, 130, 132, 133, //
        134, 135, 136, 137, 138, 139, 141, 142, 143, 144, 145, 146, 147, 148, 150, 151, //
        152, 153, 154, 155, 156, 157, 159, 160, 161, 162, 163, 164, 165, 166, 168, 169, //
        171, 173, 175, 177, 179, 181, 182, 184, 185, 186, 187, 188, 189, 190, 192, 193,
    ];

    let mut mmu = MMU::with_boot_rom(&boot_fixture(), None).unwrap();
    let mut cpu = CPU::new();

    for (index, expected) in EXPECTED.iter().enumerate() {
        // Conditional jumps see whatever flags the preceding ops left.
        if mmu.read(cpu.regs.pc) == 0x70 {
            cpu.regs.set_hl(0xC000);
        }
        cpu.step(&mut mmu);
        assert_eq!(cpu.get_cycles(), *expected, "after step {index}");
        if cpu.mode.is_sleeping() {
            cpu.mode = CpuMode::Running;
        }

        match index {
            1 => assert_eq!(cpu.regs.bc(), 0xCAFE),
            2 => assert_eq!(mmu.read(cpu.regs.bc()), cpu.regs.a()),
            3 => assert_eq!(cpu.regs.bc(), 0xCAFF),
            4 => assert_eq!(cpu.regs.b(), 0xCB),
            5 => assert_eq!(cpu.regs.b(), 0xCA),
            6 => assert_eq!(cpu.regs.b(), 0xAA),
            8 => {
                let [lo, hi] = cpu.regs.sp.to_le_bytes();
                assert_eq!(mmu.read(0xCAFE), lo);
                assert_eq!(mmu.read(0xCAFF), hi);
            }
            9 => assert_eq!(cpu.regs.hl(), 0xAAFF),
            10 => assert_eq!(cpu.regs.a(), mmu.read(0xAAFF)),
            11 => assert_eq!(cpu.regs.bc(), 0xAAFE),
            12 => assert_eq!(cpu.regs.c(), 0xFF),
            13 => assert_eq!(cpu.regs.c(), 0xFE),
            14 => assert_eq!(cpu.regs.c(), 0xAA),
            17 => assert_eq!(cpu.regs.de(), 0xCAFE),
            _ => {}
        }
    }
    assert_eq!(cpu.regs.pc, 0x0097);
    assert_eq!(cpu.mode, CpuMode::Running);
}

#[test]
fn test_new_starts_booting_at_zero() {
    let cpu = CPU::new();
    assert_eq!(cpu.mode, CpuMode::Booting);
    assert_eq!(cpu.regs.pc, 0x0000);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert!(!cpu.ime);
    assert_eq!(cpu.get_cycles(), 0);
}

#[test]
fn test_post_boot_state() {
    let cpu = CPU::post_boot();
    assert_eq!(cpu.mode, CpuMode::Running);
    assert_eq!(cpu.regs.af(), 0x01B0);
    assert_eq!(cpu.regs.bc(), 0x0013);
    assert_eq!(cpu.regs.de(), 0x00D8);
    assert_eq!(cpu.regs.hl(), 0x014D);
    assert_eq!(cpu.regs.sp, 0xFFFE);
    assert_eq!(cpu.regs.pc, 0x0100);
}

#[test]
fn test_booting_switches_to_running_when_boot_rom_unmaps() {
    let mut boot = [0u8; 0x100];
    // LD A, 1; LDH (0x50), A
    boot[..4].copy_from_slice(&[0x3E, 0x01, 0xE0, 0x50]);
    let mut mmu = MMU::with_boot_rom(&boot, None).unwrap();
    let mut cpu = CPU::new();

    cpu.step(&mut mmu);
    assert_eq!(cpu.mode, CpuMode::Booting);
    assert_eq!(cpu.step(&mut mmu), 3);
    assert_eq!(cpu.mode, CpuMode::Running);
    assert!(!mmu.boot_rom_active());
}

#[test_case(0x80, 0x3A, 0xC6, 0x00, Flags::ZERO | Flags::HALF_CARRY | Flags::CARRY ; "add a b to zero")]
#[test_case(0x80, 0x0F, 0x01, 0x10, Flags::HALF_CARRY ; "add a b half carry")]
#[test_case(0x90, 0x3E, 0x3E, 0x00, Flags::ZERO | Flags::SUBTRACT ; "sub a b to zero")]
#[test_case(0x90, 0x10, 0x01, 0x0F, Flags::SUBTRACT | Flags::HALF_CARRY ; "sub a b half borrow")]
#[test_case(0x90, 0x00, 0x01, 0xFF, Flags::SUBTRACT | Flags::HALF_CARRY | Flags::CARRY ; "sub a b borrow")]
#[test_case(0xA0, 0xF0, 0x0F, 0x00, Flags::ZERO | Flags::HALF_CARRY ; "and a b")]
#[test_case(0xA8, 0xFF, 0xFF, 0x00, Flags::ZERO ; "xor a b")]
#[test_case(0xB0, 0x50, 0x05, 0x55, Flags::empty() ; "or a b")]
#[test_case(0xB8, 0x42, 0x42, 0x42, Flags::ZERO | Flags::SUBTRACT ; "cp a b keeps a")]
fn test_alu_a_b(opcode: u8, a: u8, b: u8, result: u8, flags: Flags) {
    let (mut cpu, mut bus) = setup(&[opcode]);
    cpu.regs.set_a(a);
    cpu.regs.set_b(b);
    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.a(), result);
    assert_eq!(cpu.regs.flags(), flags);
}

#[test]
fn test_adc_and_sbc_use_carry() {
    let (mut cpu, mut bus) = setup(&[0xCE, 0x01, 0xDE, 0x01]);
    cpu.regs.set_a(0x0E);
    cpu.regs.set_flag(Flags::CARRY, true);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x10);
    assert_eq!(cpu.regs.flags(), Flags::HALF_CARRY);

    cpu.regs.set_flag(Flags::CARRY, true);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x0E);
    assert_eq!(cpu.regs.flags(), Flags::SUBTRACT | Flags::HALF_CARRY);
}

#[test]
fn test_inc_dec_preserve_carry() {
    let (mut cpu, mut bus) = setup(&[0x04, 0x05, 0x05]);
    cpu.regs.set_b(0xFF);
    cpu.regs.set_flag(Flags::CARRY, true);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.b(), 0x00);
    assert_eq!(cpu.regs.flags(), Flags::ZERO | Flags::HALF_CARRY | Flags::CARRY);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.b(), 0xFF);
    assert_eq!(cpu.regs.flags(), Flags::SUBTRACT | Flags::HALF_CARRY | Flags::CARRY);

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.b(), 0xFE);
    assert_eq!(cpu.regs.flags(), Flags::SUBTRACT | Flags::CARRY);
}

#[test]
fn test_add_hl_keeps_zero_flag() {
    let (mut cpu, mut bus) = setup(&[0x09]);
    cpu.regs.set_hl(0x8FFF);
    cpu.regs.set_bc(0x8001);
    cpu.regs.set_flag(Flags::ZERO, true);
    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.hl(), 0x1000);
    assert_eq!(cpu.regs.flags(), Flags::ZERO | Flags::HALF_CARRY | Flags::CARRY);
}

#[test]
fn test_add_sp_and_ld_hl_sp_offset() {
    // ADD SP, -1; LD HL, SP+2
    let (mut cpu, mut bus) = setup(&[0xE8, 0xFF, 0xF8, 0x02]);
    cpu.regs.sp = 0x00FF;
    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.sp, 0x00FE);
    assert_eq!(cpu.regs.flags(), Flags::HALF_CARRY | Flags::CARRY);

    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.hl(), 0x0100);
    assert_eq!(cpu.regs.sp, 0x00FE);
    assert_eq!(cpu.regs.flags(), Flags::HALF_CARRY | Flags::CARRY);
}

#[test_case(0x15, 0x27, false, 0x42 ; "bcd addition")]
#[test_case(0x99, 0x01, false, 0x00 ; "bcd addition wraps")]
#[test_case(0x42, 0x15, true, 0x27 ; "bcd subtraction")]
fn test_daa(a: u8, b: u8, subtract: bool, expected: u8) {
    let opcode = if subtract { 0x90 } else { 0x80 };
    let (mut cpu, mut bus) = setup(&[opcode, 0x27]);
    cpu.regs.set_a(a);
    cpu.regs.set_b(b);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), expected);
    assert_eq!(cpu.regs.flag(Flags::ZERO), expected == 0);
    assert_eq!(cpu.regs.flag(Flags::SUBTRACT), subtract);
}

#[test]
fn test_cpl_scf_ccf() {
    let (mut cpu, mut bus) = setup(&[0x2F, 0x37, 0x3F]);
    cpu.regs.set_a(0x35);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0xCA);
    assert_eq!(cpu.regs.flags(), Flags::SUBTRACT | Flags::HALF_CARRY);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.flags(), Flags::CARRY);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.flags(), Flags::empty());
}

#[test]
fn test_rotate_accumulator_clears_zero() {
    let (mut cpu, mut bus) = setup(&[0x07, 0x17]);
    cpu.regs.set_a(0x80);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x01);
    assert_eq!(cpu.regs.flags(), Flags::CARRY);

    cpu.regs.set_a(0x80);
    cpu.regs.set_flag(Flags::CARRY, false);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x00);
    assert_eq!(cpu.regs.flags(), Flags::CARRY);
}

#[test_case(&[0xCB, 0x00], 0x80, 0x01, Flags::CARRY ; "rlc b")]
#[test_case(&[0xCB, 0x08], 0x01, 0x80, Flags::CARRY ; "rrc b")]
#[test_case(&[0xCB, 0x20], 0x80, 0x00, Flags::ZERO | Flags::CARRY ; "sla b")]
#[test_case(&[0xCB, 0x28], 0x81, 0xC0, Flags::CARRY ; "sra b keeps sign")]
#[test_case(&[0xCB, 0x30], 0xF1, 0x1F, Flags::empty() ; "swap b")]
#[test_case(&[0xCB, 0x38], 0x01, 0x00, Flags::ZERO | Flags::CARRY ; "srl b")]
#[test_case(&[0xCB, 0x80], 0xFF, 0xFE, Flags::empty() ; "res 0 b")]
#[test_case(&[0xCB, 0xF8], 0x00, 0x80, Flags::empty() ; "set 7 b")]
fn test_cb_on_b(program: &[u8], b: u8, result: u8, flags: Flags) {
    let (mut cpu, mut bus) = setup(program);
    cpu.regs.set_b(b);
    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.b(), result);
    assert_eq!(cpu.regs.flags(), flags);
    assert_eq!(cpu.regs.pc, 0x0102);
}

#[test]
fn test_bit_on_memory_keeps_carry() {
    // BIT 7, (HL)
    let (mut cpu, mut bus) = setup(&[0xCB, 0x7E]);
    cpu.regs.set_hl(0xC000);
    bus.write(0xC000, 0x7F);
    cpu.regs.set_flag(Flags::CARRY, true);
    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.flags(), Flags::ZERO | Flags::HALF_CARRY | Flags::CARRY);
}

#[test]
fn test_set_on_memory_costs_four() {
    // SET 0, (HL)
    let (mut cpu, mut bus) = setup(&[0xCB, 0xC6]);
    cpu.regs.set_hl(0xC000);
    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(bus.read(0xC000), 0x01);
}

#[test]
fn test_hl_increment_and_decrement_pointers() {
    // LD (HL+), A; LD (HL-), A
    let (mut cpu, mut bus) = setup(&[0x22, 0x32]);
    cpu.regs.set_a(0x5A);
    cpu.regs.set_hl(0xC000);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.hl(), 0xC001);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.hl(), 0xC000);
    assert_eq!(bus.read(0xC000), 0x5A);
    assert_eq!(bus.read(0xC001), 0x5A);
}

#[test]
fn test_high_page_loads() {
    // LDH (0x80), A; LD C, 0x81; LD (C), A; LDH A, (0x80)
    let (mut cpu, mut bus) = setup(&[0xE0, 0x80, 0x0E, 0x81, 0xE2, 0xF0, 0x80]);
    cpu.regs.set_a(0x77);
    assert_eq!(cpu.step(&mut bus), 3);
    cpu.step(&mut bus);
    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(bus.read(0xFF80), 0x77);
    assert_eq!(bus.read(0xFF81), 0x77);
    cpu.regs.set_a(0);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.a(), 0x77);
}

#[test]
fn test_push_pop_roundtrip() {
    // PUSH BC; POP DE
    let (mut cpu, mut bus) = setup(&[0xC5, 0xD1]);
    cpu.regs.sp = 0xFFFE;
    cpu.regs.set_bc(0xBEEF);
    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.read(0xFFFD), 0xBE);
    assert_eq!(bus.read(0xFFFC), 0xEF);
    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.de(), 0xBEEF);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn test_pop_af_masks_low_nibble() {
    let (mut cpu, mut bus) = setup(&[0xF1]);
    cpu.regs.sp = 0xC000;
    bus.write(0xC000, 0xFF);
    bus.write(0xC001, 0x12);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.af(), 0x12F0);
}

#[test]
fn test_jr_not_zero_costs_two_or_three() {
    let (mut cpu, mut bus) = setup(&[0x20, 0x02]);
    cpu.regs.set_flag(Flags::ZERO, false);
    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.pc, 0x0102);

    let (mut cpu, mut bus) = setup(&[0x20, 0x02]);
    cpu.regs.set_flag(Flags::ZERO, true);
    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.pc, 0x0104);
}

#[test]
fn test_jr_backwards() {
    let (mut cpu, mut bus) = setup(&[0x18, 0xFE]);
    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.pc, 0x0100);
}

#[test_case(&[0xC3, 0x34, 0x12], Flags::empty(), 4, 0x1234 ; "jp")]
#[test_case(&[0xCA, 0x34, 0x12], Flags::empty(), 4, 0x1234 ; "jp z taken")]
#[test_case(&[0xCA, 0x34, 0x12], Flags::ZERO, 3, 0x0103 ; "jp z not taken")]
#[test_case(&[0xD2, 0x34, 0x12], Flags::CARRY, 4, 0x1234 ; "jp nc taken")]
#[test_case(&[0xD2, 0x34, 0x12], Flags::empty(), 3, 0x0103 ; "jp nc not taken")]
#[test_case(&[0xDA, 0x34, 0x12], Flags::empty(), 4, 0x1234 ; "jp c taken")]
#[test_case(&[0xDA, 0x34, 0x12], Flags::CARRY, 3, 0x0103 ; "jp c not taken")]
#[test_case(&[0xE9], Flags::empty(), 1, 0x4000 ; "jp hl")]
fn test_jumps(program: &[u8], flags: Flags, cycles: u32, pc: u16) {
    let (mut cpu, mut bus) = setup(program);
    cpu.regs.set_flags(flags);
    cpu.regs.set_hl(0x4000);
    assert_eq!(cpu.step(&mut bus), cycles);
    assert_eq!(cpu.regs.pc, pc);
}

#[test]
fn test_call_and_ret() {
    let mut program = vec![0xCD, 0x10, 0x01];
    program.resize(0x10, 0x00);
    program.push(0xC9);
    let (mut cpu, mut bus) = setup(&program);
    cpu.regs.sp = 0xFFFE;

    assert_eq!(cpu.step(&mut bus), 6);
    assert_eq!(cpu.regs.pc, 0x0110);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.read_word(0xFFFC), 0x0103);

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x0103);
    assert_eq!(cpu.regs.sp, 0xFFFE);
}

#[test]
fn test_conditional_call_and_ret_costs() {
    // CALL NZ, 0x0108 not taken then taken
    let mut program = vec![0xC4, 0x08, 0x01, 0xC4, 0x08, 0x01];
    program.resize(0x08, 0x00);
    // RET Z not taken, RET NZ taken
    program.extend([0xC8, 0xC0]);
    let (mut cpu, mut bus) = setup(&program);
    cpu.regs.sp = 0xFFFE;

    cpu.regs.set_flag(Flags::ZERO, false);
    assert_eq!(cpu.step(&mut bus), 3);
    assert_eq!(cpu.regs.pc, 0x0103);

    cpu.regs.set_flag(Flags::ZERO, true);
    assert_eq!(cpu.step(&mut bus), 6);
    assert_eq!(cpu.regs.pc, 0x0108);

    assert_eq!(cpu.step(&mut bus), 2);
    assert_eq!(cpu.regs.pc, 0x0109);
    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(cpu.regs.pc, 0x0106);
}

#[test]
fn test_rst_pushes_return_address() {
    let (mut cpu, mut bus) = setup(&[0xEF]);
    cpu.regs.sp = 0xFFFE;
    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x0028);
    assert_eq!(bus.read_word(0xFFFC), 0x0101);
}

#[test]
fn test_illegal_opcode_is_one_cycle_noop() {
    let (mut cpu, mut bus) = setup(&[0xD3]);
    let before = cpu.regs.clone();
    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.pc, 0x0101);
    assert_eq!(cpu.regs.af(), before.af());
    assert_eq!(cpu.regs.sp, before.sp);
}

#[test]
fn test_ei_takes_effect_after_next_instruction() {
    let (mut cpu, mut bus) = setup(&[0xFB, 0x00, 0x00]);
    cpu.regs.sp = 0xFFFE;
    bus.interrupts.write_ie(0x01);
    bus.interrupts.request(InterruptFlag::VBlank);

    cpu.step(&mut bus);
    assert!(!cpu.ime);
    assert!(cpu.ime_pending());
    // The instruction after EI still runs before the interrupt.
    assert_eq!(cpu.step(&mut bus), 1);
    assert!(cpu.ime);
    assert_eq!(cpu.regs.pc, 0x0102);

    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(cpu.regs.pc, InterruptFlag::VBlank.vector());
    assert_eq!(bus.read_word(0xFFFC), 0x0102);
    assert!(!cpu.ime);
    assert_eq!(bus.interrupts.get_interrupt(), None);
}

#[test]
fn test_di_cancels_pending_ei() {
    let (mut cpu, mut bus) = setup(&[0xFB, 0xF3, 0x00]);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert!(!cpu.ime);
    assert!(!cpu.ime_pending());
}

#[test]
fn test_reti_enables_immediately() {
    let (mut cpu, mut bus) = setup(&[0xD9]);
    cpu.regs.sp = 0xC000;
    bus.write(0xC000, 0x34);
    bus.write(0xC001, 0x12);
    assert_eq!(cpu.step(&mut bus), 4);
    assert!(cpu.ime);
    assert_eq!(cpu.regs.pc, 0x1234);
}

#[test]
fn test_interrupt_priority_lowest_bit_first() {
    let (mut cpu, mut bus) = setup(&[0x00]);
    cpu.ime = true;
    cpu.regs.sp = 0xFFFE;
    bus.interrupts.write_ie(0x1F);
    bus.interrupts.request(InterruptFlag::Timer);
    bus.interrupts.request(InterruptFlag::LcdStat);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, InterruptFlag::LcdStat.vector());
    assert_eq!(bus.interrupts.get_interrupt(), Some(InterruptFlag::Timer));
}

#[test]
fn test_halt_idles_until_interrupt() {
    let (mut cpu, mut bus) = setup(&[0x76, 0x00]);
    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.mode, CpuMode::Halted);
    for _ in 0..3 {
        assert_eq!(cpu.step(&mut bus), 1);
        assert_eq!(cpu.regs.pc, 0x0101);
    }

    // With IME off the CPU wakes without servicing.
    bus.interrupts.write_ie(0x04);
    bus.interrupts.request(InterruptFlag::Timer);
    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.mode, CpuMode::Running);
    assert_eq!(cpu.regs.pc, 0x0102);
    assert_eq!(bus.interrupts.get_interrupt(), Some(InterruptFlag::Timer));
}

#[test]
fn test_stop_sleeps_like_halt() {
    let (mut cpu, mut bus) = setup(&[0x10]);
    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.mode, CpuMode::Stopped);
    assert!(cpu.mode.is_sleeping());
    assert_eq!(cpu.step(&mut bus), 1);
    assert_eq!(cpu.regs.pc, 0x0101);
}

#[test]
fn test_cycles_accumulate() {
    let (mut cpu, mut bus) = setup(&[0x00, 0x01, 0x00, 0x00, 0xC5]);
    let spent: u32 = (0..3).map(|_| cpu.step(&mut bus)).sum();
    assert_eq!(spent, 8);
    assert_eq!(cpu.get_cycles(), 8);
}

proptest! {
    #[test]
    fn prop_pair_halves_alias_word(high in any::<u8>(), low in any::<u8>()) {
        let mut regs = Registers::new();
        regs.set_d(high);
        regs.set_e(low);
        prop_assert_eq!(regs.de(), u16::from_be_bytes([high, low]));
        regs.set_hl(u16::from_be_bytes([high, low]));
        prop_assert_eq!(regs.h(), high);
        prop_assert_eq!(regs.l(), low);
    }

    #[test]
    fn prop_f_low_nibble_always_zero(value in any::<u16>()) {
        let mut regs = Registers::new();
        regs.set_af(value);
        prop_assert_eq!(regs.f() & 0x0F, 0);
        prop_assert_eq!(regs.a(), (value >> 8) as u8);
    }

    #[test]
    fn prop_ld_r_r_copies(value in any::<u8>()) {
        // LD D, B
        let (mut cpu, mut bus) = setup(&[0x50]);
        cpu.regs.set_b(value);
        prop_assert_eq!(cpu.step(&mut bus), 1);
        prop_assert_eq!(cpu.regs.d(), value);
    }
}
