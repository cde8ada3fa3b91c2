// CPU - Instruction fetch, decode, and execute
//
// Every instruction is two bytes, big-endian. Nibble notation below:
// `X`/`Y` register indices, `N` 4-bit, `NN` 8-bit, `NNN` 12-bit immediates.

use super::bus::Bus;
use super::memory::{Memory, PROGRAM_START};
use super::{StepError, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use rand::Rng;

/// Call stack depth
pub const STACK_DEPTH: usize = 16;

/// Flag register index
const VF: usize = 0xF;

/// CPU structure representing the interpreter state
pub struct Cpu {
    // Registers
    pub v: [u8; 16], // General purpose V0-VF
    pub i: u16,      // Index register
    pub pc: u16,     // Program counter

    stack: [u16; STACK_DEPTH],
    sp: usize,

    /// Register waiting for a key press (FX0A)
    key_wait: Option<usize>,
}

impl Cpu {
    /// Create a CPU at the program entry point
    pub fn new() -> Self {
        Self {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START as u16,
            stack: [0; STACK_DEPTH],
            sp: 0,
            key_wait: None,
        }
    }

    /// Return to the power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether execution is halted on FX0A
    pub fn is_waiting_for_key(&self) -> bool {
        self.key_wait.is_some()
    }

    /// Deliver a key press; resumes execution if halted on FX0A
    pub fn key_pressed(&mut self, key: u8) {
        if let Some(register) = self.key_wait.take() {
            self.v[register] = key & 0x0F;
        }
    }

    /// Current call stack depth
    pub fn stack_depth(&self) -> usize {
        self.sp
    }

    /// Fetch and execute one instruction
    ///
    /// While waiting for a key this does nothing and succeeds.
    pub fn step<R: Rng>(
        &mut self,
        memory: &mut Memory,
        bus: &mut Bus,
        rng: &mut R,
    ) -> Result<(), StepError> {
        if self.key_wait.is_some() {
            return Ok(());
        }

        let pc = self.pc;
        let opcode = memory
            .read_opcode(pc as usize)
            .ok_or(StepError::AddressOutOfRange {
                address: pc as usize,
                pc,
            })?;
        self.pc = self.pc.wrapping_add(2);

        self.execute(opcode, pc, memory, bus, rng)
    }

    fn execute<R: Rng>(
        &mut self,
        opcode: u16,
        pc: u16,
        memory: &mut Memory,
        bus: &mut Bus,
        rng: &mut R,
    ) -> Result<(), StepError> {
        let nnn = opcode & 0x0FFF;
        let nn = (opcode & 0x00FF) as u8;
        let n = (opcode & 0x000F) as u8;
        let x = ((opcode >> 8) & 0xF) as usize;
        let y = ((opcode >> 4) & 0xF) as usize;

        let unknown = StepError::UnknownOpcode { opcode, pc };

        match opcode >> 12 {
            0x0 => match opcode {
                // 00E0: clear screen
                0x00E0 => bus.clear_display(),
                // 00EE: return from subroutine
                0x00EE => {
                    if self.sp == 0 {
                        return Err(StepError::StackUnderflow { pc });
                    }
                    self.sp -= 1;
                    self.pc = self.stack[self.sp];
                }
                // 0NNN machine routines are not supported
                _ => return Err(unknown),
            },
            // 1NNN: jump
            0x1 => self.pc = nnn,
            // 2NNN: call
            0x2 => {
                if self.sp == STACK_DEPTH {
                    return Err(StepError::StackOverflow { pc });
                }
                self.stack[self.sp] = self.pc;
                self.sp += 1;
                self.pc = nnn;
            }
            // 3XNN / 4XNN: skip if VX == NN / VX != NN
            0x3 => self.skip_if(self.v[x] == nn),
            0x4 => self.skip_if(self.v[x] != nn),
            // 5XY0: skip if VX == VY
            0x5 if n == 0 => self.skip_if(self.v[x] == self.v[y]),
            // 6XNN: VX = NN
            0x6 => self.v[x] = nn,
            // 7XNN: VX += NN, carry untouched
            0x7 => self.v[x] = self.v[x].wrapping_add(nn),
            0x8 => self.execute_alu(x, y, n).ok_or(unknown)?,
            // 9XY0: skip if VX != VY
            0x9 if n == 0 => self.skip_if(self.v[x] != self.v[y]),
            // ANNN: I = NNN
            0xA => self.i = nnn,
            // BNNN: jump to NNN + V0
            0xB => self.pc = nnn.wrapping_add(u16::from(self.v[0])),
            // CXNN: VX = rand() & NN
            0xC => self.v[x] = rng.gen::<u8>() & nn,
            // DXYN: draw sprite
            0xD => self.draw_sprite(x, y, n, pc, memory, bus)?,
            0xE => match nn {
                // EX9E / EXA1: skip if key VX is / is not pressed
                0x9E => self.skip_if(bus.keypad().is_pressed(self.v[x])),
                0xA1 => self.skip_if(!bus.keypad().is_pressed(self.v[x])),
                _ => return Err(unknown),
            },
            0xF => match nn {
                // FX07: VX = delay timer
                0x07 => self.v[x] = bus.timers().delay(),
                // FX0A: wait for a key press
                0x0A => self.key_wait = Some(x),
                // FX15 / FX18: set delay / sound timer
                0x15 => bus.timers_mut().set_delay(self.v[x]),
                0x18 => bus.timers_mut().set_sound(self.v[x]),
                // FX1E: I += VX
                0x1E => self.i = self.i.wrapping_add(u16::from(self.v[x])) & 0x0FFF,
                // FX29: I = glyph address for VX
                0x29 => self.i = Memory::glyph_address(self.v[x]) as u16,
                // FX33: BCD of VX at I, I+1, I+2
                0x33 => {
                    let value = self.v[x];
                    let digits = [value / 100, (value / 10) % 10, value % 10];
                    for (offset, digit) in digits.into_iter().enumerate() {
                        self.store(memory, self.i as usize + offset, digit, pc)?;
                    }
                }
                // FX55: store V0..=VX at I
                0x55 => {
                    for r in 0..=x {
                        self.store(memory, self.i as usize + r, self.v[r], pc)?;
                    }
                }
                // FX65: load V0..=VX from I
                0x65 => {
                    for r in 0..=x {
                        self.v[r] = self.load(memory, self.i as usize + r, pc)?;
                    }
                }
                _ => return Err(unknown),
            },
            _ => return Err(unknown),
        }

        Ok(())
    }

    /// 8XYN arithmetic group, `None` for unassigned N
    fn execute_alu(&mut self, x: usize, y: usize, n: u8) -> Option<()> {
        let (vx, vy) = (self.v[x], self.v[y]);

        match n {
            0x0 => self.v[x] = vy,
            0x1 => self.v[x] = vx | vy,
            0x2 => self.v[x] = vx & vy,
            0x3 => self.v[x] = vx ^ vy,
            0x4 => {
                let (result, carry) = vx.overflowing_add(vy);
                self.v[x] = result;
                self.v[VF] = carry as u8;
            }
            0x5 => {
                let (result, borrow) = vx.overflowing_sub(vy);
                self.v[x] = result;
                self.v[VF] = !borrow as u8;
            }
            0x6 => {
                self.v[x] = vx >> 1;
                self.v[VF] = vx & 0x01;
            }
            0x7 => {
                let (result, borrow) = vy.overflowing_sub(vx);
                self.v[x] = result;
                self.v[VF] = !borrow as u8;
            }
            0xE => {
                self.v[x] = vx << 1;
                self.v[VF] = vx >> 7;
            }
            _ => return None,
        }

        Some(())
    }

    /// DXYN: XOR an 8xN sprite from I at (VX, VY)
    ///
    /// The start position wraps; pixels past the right or bottom edge are
    /// clipped. VF is set when any lit pixel is erased.
    fn draw_sprite(
        &mut self,
        x: usize,
        y: usize,
        height: u8,
        pc: u16,
        memory: &Memory,
        bus: &mut Bus,
    ) -> Result<(), StepError> {
        let origin_x = self.v[x] as usize % DISPLAY_WIDTH;
        let origin_y = self.v[y] as usize % DISPLAY_HEIGHT;
        let mut collision = false;

        for row in 0..height as usize {
            let py = origin_y + row;
            if py >= DISPLAY_HEIGHT {
                break;
            }

            let bits = self.load(memory, self.i as usize + row, pc)?;
            for col in 0..8 {
                let px = origin_x + col;
                if px >= DISPLAY_WIDTH {
                    break;
                }
                if bits & (0x80 >> col) != 0 {
                    collision |= bus.toggle_pixel(px, py);
                }
            }
        }

        self.v[VF] = collision as u8;
        Ok(())
    }

    #[inline]
    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(2);
        }
    }

    fn load(&self, memory: &Memory, address: usize, pc: u16) -> Result<u8, StepError> {
        memory
            .read(address)
            .ok_or(StepError::AddressOutOfRange { address, pc })
    }

    fn store(
        &self,
        memory: &mut Memory,
        address: usize,
        value: u8,
        pc: u16,
    ) -> Result<(), StepError> {
        memory
            .write(address, value)
            .ok_or(StepError::AddressOutOfRange { address, pc })
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
