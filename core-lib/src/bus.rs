/// core-lib/src/bus.rs
use crate::interrupts::InterruptFlag;

/// Byte-addressed view of the 16-bit address space.
///
/// Every address resolves to some byte: implementations must not panic and
/// must document what unmapped regions read as.
pub trait MemoryBus {
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);

    /// Read a 16-bit value from memory in little-endian format
    fn read_word(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    /// Write a 16-bit value to memory in little-endian format
    fn write_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(addr, lo);
        self.write(addr.wrapping_add(1), hi);
    }

    /// Whether the boot ROM still overlays 0x0000..=0x00FF.
    fn boot_rom_active(&self) -> bool {
        false
    }

    /// Highest-priority interrupt that is both enabled and requested,
    /// regardless of IME.
    fn get_interrupt(&self) -> Option<InterruptFlag> {
        None
    }

    /// Acknowledges an interrupt by clearing its request bit.
    fn clear_interrupt(&mut self, _flag: InterruptFlag) {}
}
