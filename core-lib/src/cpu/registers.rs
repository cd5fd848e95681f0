/// core-lib/src/cpu/registers.rs
use bitflags::bitflags;

bitflags! {
    /// Status bits held in the high nibble of F.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u8 {
        const ZERO       = 0b1000_0000;
        const SUBTRACT   = 0b0100_0000;
        const HALF_CARRY = 0b0010_0000;
        const CARRY      = 0b0001_0000;
    }
}

/// Two 8-bit registers sharing one 16-bit storage cell.
///
/// The first-named register of a pair is the high byte, so writing `B`
/// is visible through `BC` and the other way around.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegisterPair(u16);

impl RegisterPair {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    pub fn set(&mut self, value: u16) {
        self.0 = value;
    }

    pub const fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn low(self) -> u8 {
        self.0 as u8
    }

    pub fn set_high(&mut self, value: u8) {
        self.0 = (u16::from(value) << 8) | (self.0 & 0x00FF);
    }

    pub fn set_low(&mut self, value: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(value);
    }
}

/// Named 8-bit registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
}

/// Named 16-bit registers (four pairs plus the stack pointer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register16 {
    AF,
    BC,
    DE,
    HL,
    SP,
}

/// The LR35902 register file.
///
/// The pairs are private so that every write to F goes through a path that
/// keeps its low nibble clear.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    af: RegisterPair,
    bc: RegisterPair,
    de: RegisterPair,
    hl: RegisterPair,
    pub sp: u16,
    pub pc: u16,
}

macro_rules! byte_accessors {
    ($($get:ident, $set:ident => $pair:ident.$half:ident / $set_half:ident;)*) => {
        $(
            pub const fn $get(&self) -> u8 {
                self.$pair.$half()
            }

            pub fn $set(&mut self, value: u8) {
                self.$pair.$set_half(value);
            }
        )*
    };
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register state the DMG boot ROM leaves behind when it hands over to
    /// the cartridge at 0x0100.
    pub const fn post_boot() -> Self {
        Self {
            af: RegisterPair::new(0x01B0),
            bc: RegisterPair::new(0x0013),
            de: RegisterPair::new(0x00D8),
            hl: RegisterPair::new(0x014D),
            sp: 0xFFFE,
            pc: 0x0100,
        }
    }

    byte_accessors! {
        a, set_a => af.high / set_high;
        b, set_b => bc.high / set_high;
        c, set_c => bc.low / set_low;
        d, set_d => de.high / set_high;
        e, set_e => de.low / set_low;
        h, set_h => hl.high / set_high;
        l, set_l => hl.low / set_low;
    }

    pub const fn f(&self) -> u8 {
        self.af.low()
    }

    pub fn set_f(&mut self, value: u8) {
        self.af.set_low(value & 0xF0);
    }

    pub const fn af(&self) -> u16 {
        self.af.get()
    }

    pub fn set_af(&mut self, value: u16) {
        self.af.set(value & 0xFFF0);
    }

    pub const fn bc(&self) -> u16 {
        self.bc.get()
    }

    pub fn set_bc(&mut self, value: u16) {
        self.bc.set(value);
    }

    pub const fn de(&self) -> u16 {
        self.de.get()
    }

    pub fn set_de(&mut self, value: u16) {
        self.de.set(value);
    }

    pub const fn hl(&self) -> u16 {
        self.hl.get()
    }

    pub fn set_hl(&mut self, value: u16) {
        self.hl.set(value);
    }

    /// Returns the value of the named 8-bit register.
    pub const fn get8(&self, reg: Register8) -> u8 {
        match reg {
            Register8::A => self.a(),
            Register8::F => self.f(),
            Register8::B => self.b(),
            Register8::C => self.c(),
            Register8::D => self.d(),
            Register8::E => self.e(),
            Register8::H => self.h(),
            Register8::L => self.l(),
        }
    }

    pub fn set8(&mut self, reg: Register8, value: u8) {
        match reg {
            Register8::A => self.set_a(value),
            Register8::F => self.set_f(value),
            Register8::B => self.set_b(value),
            Register8::C => self.set_c(value),
            Register8::D => self.set_d(value),
            Register8::E => self.set_e(value),
            Register8::H => self.set_h(value),
            Register8::L => self.set_l(value),
        }
    }

    /// Returns the value of the named 16-bit register.
    pub const fn get16(&self, reg: Register16) -> u16 {
        match reg {
            Register16::AF => self.af(),
            Register16::BC => self.bc(),
            Register16::DE => self.de(),
            Register16::HL => self.hl(),
            Register16::SP => self.sp,
        }
    }

    pub fn set16(&mut self, reg: Register16, value: u16) {
        match reg {
            Register16::AF => self.set_af(value),
            Register16::BC => self.set_bc(value),
            Register16::DE => self.set_de(value),
            Register16::HL => self.set_hl(value),
            Register16::SP => self.sp = value,
        }
    }

    pub const fn flags(&self) -> Flags {
        Flags::from_bits_truncate(self.f())
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.set_f(flags.bits());
    }

    pub const fn flag(&self, flag: Flags) -> bool {
        self.flags().contains(flag)
    }

    pub fn set_flag(&mut self, flag: Flags, value: bool) {
        let mut flags = self.flags();
        flags.set(flag, value);
        self.set_flags(flags);
    }
}
