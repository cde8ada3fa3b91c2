// Memory - 4 KiB of RAM with the hexadecimal font preloaded
//
// Layout:
// ```text
// 0x000-0x04F  font glyphs 0-F (5 bytes each)
// 0x050-0x1FF  reserved
// 0x200-0xFFF  program image and working memory
// ```

use super::LoadError;

/// Total RAM size in bytes
pub const MEMORY_SIZE: usize = 4096;

/// Address programs are loaded at
pub const PROGRAM_START: usize = 0x200;

/// Maximum program image size in bytes
pub const PROGRAM_CAPACITY: usize = MEMORY_SIZE - PROGRAM_START;

/// Address of the first font glyph
pub const FONT_OFFSET: usize = 0x000;

/// Bytes per font glyph
pub const FONT_GLYPH_SIZE: usize = 5;

/// 4x5 glyphs for the hexadecimal digits 0-F
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// System RAM
pub struct Memory {
    data: [u8; MEMORY_SIZE],
}

impl Memory {
    /// Create zeroed RAM with the font installed
    pub fn new() -> Self {
        let mut data = [0; MEMORY_SIZE];
        data[FONT_OFFSET..FONT_OFFSET + FONT.len()].copy_from_slice(&FONT);
        Self { data }
    }

    /// Reset RAM and copy a program to `PROGRAM_START`
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > PROGRAM_CAPACITY {
            return Err(LoadError::ImageTooLarge {
                size: program.len(),
                capacity: PROGRAM_CAPACITY,
            });
        }

        *self = Self::new();
        self.data[PROGRAM_START..PROGRAM_START + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// Read a byte, `None` past the end of RAM
    #[inline]
    pub fn read(&self, address: usize) -> Option<u8> {
        self.data.get(address).copied()
    }

    /// Write a byte, `None` past the end of RAM
    #[inline]
    pub fn write(&mut self, address: usize, value: u8) -> Option<()> {
        let slot = self.data.get_mut(address)?;
        *slot = value;
        Some(())
    }

    /// Read a big-endian opcode
    #[inline]
    pub fn read_opcode(&self, address: usize) -> Option<u16> {
        let high = self.read(address)?;
        let low = self.read(address + 1)?;
        Some(u16::from(high) << 8 | u16::from(low))
    }

    /// Address of the glyph for hexadecimal digit `digit` (low nibble)
    pub fn glyph_address(digit: u8) -> usize {
        FONT_OFFSET + (digit & 0x0F) as usize * FONT_GLYPH_SIZE
    }

    /// Raw RAM contents
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
