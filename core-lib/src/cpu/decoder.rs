//! Instruction decoding over a byte stream or the memory bus.

use crate::cpu::opcodes::{Instruction, CB_OPCODES, CB_PREFIX, OPCODES};

const ADDRESS_SPACE: usize = 0x1_0000;

/// Decodes the instruction starting at offset 0 of `fetch`.
///
/// `fetch(n)` returns the byte `n` positions after the opcode. At most three
/// bytes are requested. The immediate payload is spliced into the left-hand
/// operand when it takes one, otherwise into the right-hand operand.
pub fn decode_with(fetch: impl Fn(u16) -> u8) -> Instruction {
    let opcode = fetch(0);
    if opcode == CB_PREFIX {
        return Instruction::from(CB_OPCODES[usize::from(fetch(1))]);
    }

    let entry = OPCODES[usize::from(opcode)];
    let mut instr = Instruction::from(entry);
    let (lo, hi) = match entry.payload_size() {
        0 => return instr,
        1 => (fetch(1), 0),
        _ => (fetch(1), fetch(2)),
    };
    if entry.lhs.payload_size() > 0 {
        instr.lhs = entry.lhs.with_payload(lo, hi);
    } else {
        instr.rhs = entry.rhs.with_payload(lo, hi);
    }
    instr
}

/// Decodes one instruction at `cursor` and returns it with the cursor of the
/// next instruction.
///
/// Reads and the returned cursor wrap modulo the stream length. Only the
/// first 64 KiB of a longer stream are addressable, so the wrap happens
/// there. An empty stream decodes as `noop` and leaves the cursor where it
/// was.
pub fn decode_one(bytes: &[u8], cursor: u16) -> (Instruction, u16) {
    if bytes.is_empty() {
        return (Instruction::from(OPCODES[0]), cursor);
    }
    let len = bytes.len().min(ADDRESS_SPACE);
    let start = usize::from(cursor) % len;
    let instr = decode_with(|offset| bytes[(start + usize::from(offset)) % len]);
    let next = (start + usize::from(instr.length)) % len;
    // `next < ADDRESS_SPACE`, so the cast is lossless.
    (instr, next as u16)
}

/// Iterator over the instructions of a byte stream, yielding each
/// instruction with its offset.
///
/// Unlike [`decode_one`] it stops at the end of the stream; operand bytes
/// missing from a truncated final instruction read as zero.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Decoder<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub const fn at(bytes: &'a [u8], offset: usize) -> Self {
        Self { bytes, offset }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl Iterator for Decoder<'_> {
    type Item = (usize, Instruction);

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.bytes.len() {
            return None;
        }
        let start = self.offset;
        let bytes = self.bytes;
        let instr = decode_with(|n| bytes.get(start + usize::from(n)).copied().unwrap_or(0));
        self.offset = start + usize::from(instr.length);
        Some((start, instr))
    }
}
