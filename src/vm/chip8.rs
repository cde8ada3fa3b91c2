// Chip8 - The bundled engine behind `VmHandle`
//
// One `step` executes one instruction. Timers are advanced separately by the
// host with the measured wall-clock delta.

use super::bus::Bus;
use super::cpu::Cpu;
use super::memory::Memory;
use super::{LoadError, StepError, VmHandle};
use crate::image::ProgramImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// CHIP-8 interpreter
pub struct Chip8 {
    cpu: Cpu,
    memory: Memory,
    bus: Bus,
    rng: StdRng,
    loaded: bool,
}

impl Chip8 {
    /// Create an engine with zeroed state and an entropy-seeded RNG
    ///
    /// # Example
    ///
    /// ```
    /// use rust8::image::ProgramImage;
    /// use rust8::vm::{Chip8, VmHandle};
    ///
    /// let mut chip8 = Chip8::new();
    /// chip8.load(ProgramImage::new(vec![0x00, 0xE0])).unwrap();
    /// chip8.step().unwrap();
    /// ```
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an engine whose CXNN results are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            cpu: Cpu::new(),
            memory: Memory::new(),
            bus: Bus::new(),
            rng,
            loaded: false,
        }
    }

    /// Get reference to CPU
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Get reference to memory
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Get reference to Bus
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Whether a program has been loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

impl VmHandle for Chip8 {
    fn load(&mut self, image: ProgramImage) -> Result<(), LoadError> {
        self.memory.load_program(image.as_bytes())?;
        self.cpu.reset();
        self.bus = Bus::new();
        self.loaded = true;

        info!(
            bytes = image.len(),
            instructions = image.len() / 2,
            "program loaded"
        );
        Ok(())
    }

    fn step(&mut self) -> Result<(), StepError> {
        if !self.loaded {
            return Err(StepError::NotLoaded);
        }
        self.cpu
            .step(&mut self.memory, &mut self.bus, &mut self.rng)
    }

    fn is_pixel_set(&self, x: usize, y: usize) -> bool {
        self.bus.pixel(x, y)
    }

    fn advance_time(&mut self, dt_seconds: f64) {
        self.bus.timers_mut().advance(dt_seconds);
    }

    fn set_key(&mut self, key: u8, pressed: bool) {
        debug!(key, pressed, "keypad");
        self.bus.keypad_mut().set(key, pressed);
        if pressed {
            self.cpu.key_pressed(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::PROGRAM_CAPACITY;

    #[test]
    fn test_step_before_load() {
        let mut chip8 = Chip8::with_seed(1);
        assert!(!chip8.is_loaded());
        assert_eq!(chip8.step(), Err(StepError::NotLoaded));
    }

    #[test]
    fn test_load_too_large_keeps_engine_unloaded() {
        let mut chip8 = Chip8::with_seed(1);
        let image = ProgramImage::new(vec![0; PROGRAM_CAPACITY + 2]);
        assert!(matches!(
            chip8.load(image),
            Err(LoadError::ImageTooLarge { .. })
        ));
        assert!(!chip8.is_loaded());
    }

    #[test]
    fn test_draw_then_query_pixels() {
        let mut chip8 = Chip8::with_seed(1);
        // V0 = 1; I = glyph(1); V1 = 10; V2 = 4; draw (V1, V2) height 5
        let program = vec![0x60, 0x01, 0xF0, 0x29, 0x61, 0x0A, 0x62, 0x04, 0xD1, 0x25];
        chip8.load(ProgramImage::new(program)).unwrap();
        for _ in 0..5 {
            chip8.step().unwrap();
        }

        // Glyph '1' top row is 0x20: only column 2 lit
        assert!(chip8.is_pixel_set(12, 4));
        assert!(!chip8.is_pixel_set(10, 4));
        assert!(!chip8.is_pixel_set(0, 0));
    }

    #[test]
    fn test_advance_time_drives_delay_timer() {
        let mut chip8 = Chip8::with_seed(1);
        // V0 = 60; delay = V0; V1 = delay
        chip8
            .load(ProgramImage::new(vec![0x60, 0x3C, 0xF0, 0x15, 0xF1, 0x07]))
            .unwrap();
        chip8.step().unwrap();
        chip8.step().unwrap();
        chip8.advance_time(0.25);
        chip8.step().unwrap();
        assert_eq!(chip8.cpu().v[1], 45);
    }

    #[test]
    fn test_set_key_resumes_wait() {
        let mut chip8 = Chip8::with_seed(1);
        chip8.load(ProgramImage::new(vec![0xF2, 0x0A])).unwrap();
        chip8.step().unwrap();
        assert!(chip8.cpu().is_waiting_for_key());

        chip8.set_key(0x7, true);
        assert!(!chip8.cpu().is_waiting_for_key());
        assert_eq!(chip8.cpu().v[2], 0x7);
        assert!(chip8.bus().keypad().is_pressed(0x7));

        chip8.set_key(0x7, false);
        assert!(!chip8.bus().keypad().is_pressed(0x7));
    }

    #[test]
    fn test_reload_resets_state() {
        let mut chip8 = Chip8::with_seed(1);
        chip8.load(ProgramImage::new(vec![0x63, 0x09])).unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.cpu().v[3], 9);

        chip8.load(ProgramImage::new(vec![0x00, 0xE0])).unwrap();
        assert_eq!(chip8.cpu().v[3], 0);
        assert_eq!(chip8.cpu().pc, 0x200);
    }
}
