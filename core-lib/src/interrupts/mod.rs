/// core-lib/src/interrupts/mod.rs
use bitflags::bitflags;

bitflags! {
    /// Request/enable bits shared by IF (0xFF0F) and IE (0xFFFF).
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct InterruptMask: u8 {
        const VBLANK   = 0b0000_0001;
        const LCD_STAT = 0b0000_0010;
        const TIMER    = 0b0000_0100;
        const SERIAL   = 0b0000_1000;
        const JOYPAD   = 0b0001_0000;
    }
}

/// Interrupt sources, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptFlag {
    VBlank = 0,
    LcdStat = 1,
    Timer = 2,
    Serial = 3,
    Joypad = 4,
}

impl InterruptFlag {
    pub const ALL: [Self; 5] = [
        Self::VBlank,
        Self::LcdStat,
        Self::Timer,
        Self::Serial,
        Self::Joypad,
    ];

    pub const fn mask(self) -> InterruptMask {
        InterruptMask::from_bits_truncate(1 << self as u8)
    }

    /// Address the CPU jumps to when servicing this interrupt.
    pub const fn vector(self) -> u16 {
        match self {
            Self::VBlank => 0x0040,
            Self::LcdStat => 0x0048,
            Self::Timer => 0x0050,
            Self::Serial => 0x0058,
            Self::Joypad => 0x0060,
        }
    }
}

/// IE and IF registers. IME lives in the CPU.
#[derive(Debug, Default, Clone)]
pub struct Interrupts {
    pub ie: InterruptMask,
    pub if_: InterruptMask,
}

impl Interrupts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest-priority interrupt that is enabled and requested.
    pub fn get_interrupt(&self) -> Option<InterruptFlag> {
        let active = self.ie & self.if_;
        InterruptFlag::ALL
            .into_iter()
            .find(|flag| active.contains(flag.mask()))
    }

    pub fn request(&mut self, flag: InterruptFlag) {
        self.if_.insert(flag.mask());
    }

    pub fn clear(&mut self, flag: InterruptFlag) {
        self.if_.remove(flag.mask());
    }

    /// Upper 3 bits always read as 1
    pub const fn read_if(&self) -> u8 {
        self.if_.bits() | 0xE0
    }

    pub fn write_if(&mut self, value: u8) {
        self.if_ = InterruptMask::from_bits_truncate(value);
    }

    /// IE is a plain byte; the upper bits are kept but enable nothing.
    pub const fn read_ie(&self) -> u8 {
        self.ie.bits()
    }

    pub fn write_ie(&mut self, value: u8) {
        self.ie = InterruptMask::from_bits_retain(value);
    }
}
