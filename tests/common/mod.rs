// Common test utilities for frame driver integration tests
//
// A scripted VM and a surface that records every fill, both writing to one
// shared call log so tests can check ordering across the two.

#![allow(dead_code)]

use rust8::display::{Paint, Rect, Surface, SurfaceError};
use rust8::image::ProgramImage;
use rust8::vm::{LoadError, StepError, VmHandle};
use std::cell::RefCell;
use std::rc::Rc;

/// One observed call, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(usize),
    Step,
    Fill(Rect, Paint),
    AdvanceTime(f64),
}

/// Call log shared by a `StubVm` and a `RecordingSurface`
pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Scripted VM
///
/// Lit cells come from a predicate. Load can be made to fail, and step can
/// be made to fail on a given (1-based) call.
pub struct StubVm {
    log: CallLog,
    lit: Box<dyn Fn(usize, usize) -> bool>,
    fail_load: bool,
    fail_step_on: Option<usize>,
    steps: usize,
}

impl StubVm {
    /// A VM with every cell dark
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: Rc::clone(log),
            lit: Box::new(|_, _| false),
            fail_load: false,
            fail_step_on: None,
            steps: 0,
        }
    }

    pub fn with_lit<F>(mut self, lit: F) -> Self
    where
        F: Fn(usize, usize) -> bool + 'static,
    {
        self.lit = Box::new(lit);
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn failing_step_on(mut self, step: usize) -> Self {
        self.fail_step_on = Some(step);
        self
    }
}

impl VmHandle for StubVm {
    fn load(&mut self, image: ProgramImage) -> Result<(), LoadError> {
        if self.fail_load {
            return Err(LoadError::ImageTooLarge {
                size: image.len(),
                capacity: 0,
            });
        }
        self.log.borrow_mut().push(Call::Load(image.len()));
        Ok(())
    }

    fn step(&mut self) -> Result<(), StepError> {
        self.steps += 1;
        self.log.borrow_mut().push(Call::Step);
        if self.fail_step_on == Some(self.steps) {
            return Err(StepError::UnknownOpcode {
                opcode: 0xFFFF,
                pc: 0x200,
            });
        }
        Ok(())
    }

    fn is_pixel_set(&self, x: usize, y: usize) -> bool {
        (self.lit)(x, y)
    }

    fn advance_time(&mut self, dt_seconds: f64) {
        self.log.borrow_mut().push(Call::AdvanceTime(dt_seconds));
    }
}

/// Surface that records fills instead of painting them
pub struct RecordingSurface {
    width: u32,
    height: u32,
    log: CallLog,
    fail_on_fill: Option<usize>,
    fills: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32, log: &CallLog) -> Self {
        Self {
            width,
            height,
            log: Rc::clone(log),
            fail_on_fill: None,
            fills: 0,
        }
    }

    /// Reject the given (1-based) fill with `OutOfBounds`
    pub fn failing_fill(mut self, fill: usize) -> Self {
        self.fail_on_fill = Some(fill);
        self
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) -> Result<(), SurfaceError> {
        self.fills += 1;
        if self.fail_on_fill == Some(self.fills) {
            return Err(SurfaceError::OutOfBounds {
                rect,
                surface_width: self.width,
                surface_height: self.height,
            });
        }
        self.check_bounds(rect)?;
        self.log.borrow_mut().push(Call::Fill(rect, paint.clone()));
        Ok(())
    }
}

/// Fills in the log, in order
pub fn fills(log: &CallLog) -> Vec<(Rect, Paint)> {
    log.borrow()
        .iter()
        .filter_map(|call| match call {
            Call::Fill(rect, paint) => Some((*rect, paint.clone())),
            _ => None,
        })
        .collect()
}

/// Number of `Step` calls in the log
pub fn steps(log: &CallLog) -> usize {
    log.borrow()
        .iter()
        .filter(|call| matches!(call, Call::Step))
        .count()
}

/// `dt` values passed to `advance_time`, in order
pub fn advances(log: &CallLog) -> Vec<f64> {
    log.borrow()
        .iter()
        .filter_map(|call| match call {
            Call::AdvanceTime(dt) => Some(*dt),
            _ => None,
        })
        .collect()
}
