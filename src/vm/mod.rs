// VM module - Engine contract and the bundled CHIP-8 engine
//
// The frame driver only ever talks to an engine through `VmHandle`. The
// `Chip8` type is the engine the binary ships with; tests drive the frame
// loop with stubs instead.

mod bus;
mod chip8;
mod cpu;
mod memory;

pub use bus::{Bus, Keypad, Timers};
pub use chip8::Chip8;
pub use cpu::Cpu;
pub use memory::{Memory, FONT, FONT_OFFSET, MEMORY_SIZE, PROGRAM_CAPACITY, PROGRAM_START};

use crate::image::ProgramImage;

/// Logical display width in cells
pub const DISPLAY_WIDTH: usize = 64;

/// Logical display height in cells
pub const DISPLAY_HEIGHT: usize = 32;

/// Number of keys on the hexadecimal keypad
pub const KEY_COUNT: usize = 16;

/// Narrow contract between the frame driver and an emulation engine
///
/// The driver owns its handle exclusively and calls these from a single
/// thread. `is_pixel_set` is only ever called with `x < DISPLAY_WIDTH` and
/// `y < DISPLAY_HEIGHT`.
pub trait VmHandle {
    /// Install a program image at the engine-defined start location
    fn load(&mut self, image: ProgramImage) -> Result<(), LoadError>;

    /// Execute one engine-defined unit of work
    fn step(&mut self) -> Result<(), StepError>;

    /// Whether display cell `(x, y)` is lit
    fn is_pixel_set(&self, x: usize, y: usize) -> bool;

    /// Advance real-time subsystems (timers) by `dt_seconds`
    fn advance_time(&mut self, dt_seconds: f64);

    /// Deliver a keypad transition; engines without input ignore it
    fn set_key(&mut self, _key: u8, _pressed: bool) {}
}

/// Errors returned by `VmHandle::load`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The image does not fit in program memory
    ImageTooLarge { size: usize, capacity: usize },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::ImageTooLarge { size, capacity } => write!(
                f,
                "Program image too large: {} bytes (capacity {} bytes)",
                size, capacity
            ),
        }
    }
}

impl std::error::Error for LoadError {}

/// Errors returned by `VmHandle::step`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// `step` called before any image was loaded
    NotLoaded,

    /// Opcode not part of the instruction set
    UnknownOpcode { opcode: u16, pc: u16 },

    /// Subroutine call with a full stack
    StackOverflow { pc: u16 },

    /// Return with an empty stack
    StackUnderflow { pc: u16 },

    /// Memory access past the end of RAM
    AddressOutOfRange { address: usize, pc: u16 },
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepError::NotLoaded => write!(f, "No program loaded"),
            StepError::UnknownOpcode { opcode, pc } => {
                write!(f, "Unknown opcode 0x{:04X} at 0x{:03X}", opcode, pc)
            }
            StepError::StackOverflow { pc } => write!(f, "Stack overflow at 0x{:03X}", pc),
            StepError::StackUnderflow { pc } => write!(f, "Stack underflow at 0x{:03X}", pc),
            StepError::AddressOutOfRange { address, pc } => write!(
                f,
                "Address 0x{:04X} out of range at 0x{:03X}",
                address, pc
            ),
        }
    }
}

impl std::error::Error for StepError {}
