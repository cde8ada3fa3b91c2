// Keyboard mapping - winit key codes to keypad keys

use std::collections::HashMap;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Mapping from physical keys to keypad keys `0x0..=0xF`
#[derive(Debug, Clone)]
pub struct KeypadMapping {
    keys: HashMap<KeyCode, u8>,
}

impl KeypadMapping {
    /// Default QWERTY layout
    ///
    /// # Default Mappings
    /// ```text
    /// 1 2 3 4      1 2 3 C
    /// Q W E R  ->  4 5 6 D
    /// A S D F      7 8 9 E
    /// Z X C V      A 0 B F
    /// ```
    ///
    /// The arrow keys double as 2/4/6/8, the usual steering keys.
    pub fn qwerty() -> Self {
        let layout = [
            (KeyCode::Digit1, 0x1),
            (KeyCode::Digit2, 0x2),
            (KeyCode::Digit3, 0x3),
            (KeyCode::Digit4, 0xC),
            (KeyCode::KeyQ, 0x4),
            (KeyCode::KeyW, 0x5),
            (KeyCode::KeyE, 0x6),
            (KeyCode::KeyR, 0xD),
            (KeyCode::KeyA, 0x7),
            (KeyCode::KeyS, 0x8),
            (KeyCode::KeyD, 0x9),
            (KeyCode::KeyF, 0xE),
            (KeyCode::KeyZ, 0xA),
            (KeyCode::KeyX, 0x0),
            (KeyCode::KeyC, 0xB),
            (KeyCode::KeyV, 0xF),
            (KeyCode::ArrowUp, 0x2),
            (KeyCode::ArrowLeft, 0x4),
            (KeyCode::ArrowRight, 0x6),
            (KeyCode::ArrowDown, 0x8),
        ];

        Self {
            keys: layout.into_iter().collect(),
        }
    }

    /// Keypad key for a key code, if mapped
    pub fn key_for(&self, code: KeyCode) -> Option<u8> {
        self.keys.get(&code).copied()
    }

    /// Keypad key for a physical key, if mapped
    pub fn key_for_physical(&self, key: PhysicalKey) -> Option<u8> {
        match key {
            PhysicalKey::Code(code) => self.key_for(code),
            PhysicalKey::Unidentified(_) => None,
        }
    }

    /// Rebind `code` to keypad key `key` (low nibble)
    pub fn bind(&mut self, code: KeyCode, key: u8) {
        self.keys.insert(code, key & 0x0F);
    }
}

impl Default for KeypadMapping {
    fn default() -> Self {
        Self::qwerty()
    }
}
