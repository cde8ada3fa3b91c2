// Input module - Host keyboard to hexadecimal keypad
//
// The device has a 16-key keypad laid out as:
// ```text
// 1 2 3 C
// 4 5 6 D
// 7 8 9 E
// A 0 B F
// ```
// The default mapping puts it on the left-hand block of a QWERTY keyboard.

mod keyboard;

pub use keyboard::KeypadMapping;
