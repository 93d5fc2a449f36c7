//! Fixed 16-colour palette (spec.md §6).

/// RGB triples for the 16 palette entries, indexed 0..16.
pub const PALETTE: [(u8, u8, u8); 16] = [
    (0x00, 0x00, 0x00), // 0  black
    (0x00, 0x00, 0xAA), // 1  blue
    (0x00, 0xAA, 0x00), // 2  green
    (0x00, 0xAA, 0xAA), // 3  cyan
    (0xAA, 0x00, 0x00), // 4  red
    (0xAA, 0x00, 0xAA), // 5  magenta
    (0xAA, 0x55, 0x00), // 6  brown
    (0xAA, 0xAA, 0xAA), // 7  light grey
    (0x55, 0x55, 0x55), // 8  dark grey
    (0x55, 0x55, 0xFF), // 9  bright blue
    (0x55, 0xFF, 0x55), // 10 bright green
    (0x55, 0xFF, 0xFF), // 11 bright cyan
    (0xFF, 0x55, 0x55), // 12 bright red
    (0xFF, 0x55, 0xFF), // 13 bright magenta
    (0xFF, 0xFF, 0x55), // 14 bright yellow
    (0xFF, 0xFF, 0xFF), // 15 bright white
];

/// Colour used for recoverable shell errors (spec.md §7).
pub const COLOR_ERROR: u8 = 12;

pub fn rgb(index: u8) -> (u8, u8, u8) {
    PALETTE[(index as usize) & 0x0F]
}
