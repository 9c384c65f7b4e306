//! Device seams between the robot logic and the V5 hardware.
//!
//! The binary implements these over vexide devices; [`crate::sim`] implements
//! them in memory for tests and the host dry run.
#![allow(async_fn_in_trait)]

use core::time::Duration;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpinDirection {
    Forward,
    Reverse,
}

impl SpinDirection {
    pub fn sign(self) -> f64 {
        match self {
            SpinDirection::Forward => 1.0,
            SpinDirection::Reverse => -1.0,
        }
    }
}

/// What a motor group does once it is told to stop or finishes a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum StoppingMode {
    #[default]
    Brake,
    Coast,
}

/// A set of motors that always move together.
pub trait MotorGroup {
    /// Velocity used by the next [`MotorGroup::spin_for`], in percent of max.
    fn set_velocity(&mut self, percent: f64);
    /// Starts a relative move of `rotations` motor turns and returns at once.
    fn spin_for(&mut self, direction: SpinDirection, rotations: f64);
    /// Completes once the last [`MotorGroup::spin_for`] has physically finished.
    async fn wait_for_target(&mut self);
    fn spin(&mut self, direction: SpinDirection, percent: f64);
    fn set_voltage(&mut self, volts: f64);
    fn stop(&mut self);
    fn set_stopping(&mut self, mode: StoppingMode);
}

/// A single-acting pneumatic piston.
pub trait Piston {
    fn open(&mut self);
    fn close(&mut self);
    fn is_open(&self) -> bool;

    fn toggle(&mut self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }
}

/// A momentary digital input such as a limit switch or bumper.
pub trait Switch {
    fn pressing(&self) -> bool;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Font {
    Mono15,
    Mono20,
    Mono30,
}

pub trait Screen {
    fn clear(&mut self);
    fn set_font(&mut self, font: Font);
    /// Prints `text` on the current row and moves to the next one.
    fn print(&mut self, text: &str);
}

pub trait Timer {
    async fn sleep(&mut self, duration: Duration);
}

/// One sample of the driver controller.
///
/// Axes are signed percent (-100..=100); buttons are current levels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DriverState {
    /// left stick vertical (axis 3)
    pub throttle: f64,
    /// right stick horizontal (axis 1)
    pub turn: f64,
    pub l1: bool,
    pub l2: bool,
    pub r1: bool,
    pub r2: bool,
    pub a: bool,
    pub b: bool,
    pub down: bool,
}

pub trait DriverController {
    fn state(&mut self) -> DriverState;
}
