// Bus - Display, keypad, and timers shared by the CPU
//
// The timers count down at 60 Hz in real time rather than per instruction,
// so they are advanced by the host with a measured delta.

use super::{DISPLAY_HEIGHT, DISPLAY_WIDTH, KEY_COUNT};

/// Timer decrement rate in Hz
pub const TIMER_HZ: f64 = 60.0;

/// Delay and sound timers
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timers {
    delay: f64,
    sound: f64,
}

impl Timers {
    /// Current delay timer value as seen by programs
    pub fn delay(&self) -> u8 {
        self.delay as u8
    }

    /// Set the delay timer
    pub fn set_delay(&mut self, value: u8) {
        self.delay = f64::from(value);
    }

    /// Set the sound timer
    pub fn set_sound(&mut self, value: u8) {
        self.sound = f64::from(value);
    }

    /// Whether the sound timer is still running
    pub fn sound_active(&self) -> bool {
        self.sound > 0.0
    }

    /// Count both timers down by `dt` seconds, clamping at zero
    pub fn advance(&mut self, dt: f64) {
        let ticks = dt.max(0.0) * TIMER_HZ;
        self.delay = (self.delay - ticks).max(0.0);
        self.sound = (self.sound - ticks).max(0.0);
    }
}

/// 16-key hexadecimal keypad
#[derive(Debug, Clone, Copy, Default)]
pub struct Keypad {
    pressed: [bool; KEY_COUNT],
}

impl Keypad {
    /// Whether `key` (low nibble) is held
    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed[(key & 0x0F) as usize]
    }

    /// Update the state of `key` (low nibble)
    pub fn set(&mut self, key: u8, pressed: bool) {
        self.pressed[(key & 0x0F) as usize] = pressed;
    }
}

/// Devices reachable from the CPU
pub struct Bus {
    display: [bool; DISPLAY_WIDTH * DISPLAY_HEIGHT],
    keypad: Keypad,
    timers: Timers,
}

impl Bus {
    /// Create a bus with a blank display, released keys, and stopped timers
    pub fn new() -> Self {
        Self {
            display: [false; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            keypad: Keypad::default(),
            timers: Timers::default(),
        }
    }

    /// Whether cell `(x, y)` is lit
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.display[y * DISPLAY_WIDTH + x]
    }

    /// XOR a pixel into the display, returning true if it was erased
    #[inline]
    pub fn toggle_pixel(&mut self, x: usize, y: usize) -> bool {
        let cell = &mut self.display[y * DISPLAY_WIDTH + x];
        let erased = *cell;
        *cell = !*cell;
        erased
    }

    /// Turn every pixel off
    pub fn clear_display(&mut self) {
        self.display.fill(false);
    }

    /// Row-major display contents
    pub fn display(&self) -> &[bool] {
        &self.display
    }

    /// Keypad state
    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// Mutable keypad state
    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    /// Timer state
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Mutable timer state
    pub fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
