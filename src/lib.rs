//! Robot core for the Breakthrough push-back robot.
//!
//! Everything here is hardware-agnostic: devices are reached through the
//! traits in [`hardware`], which the binary implements over vexide and
//! [`sim`] implements in memory.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod arbiter;
pub mod calibration;
pub mod chassis;
pub mod config;
pub mod driver_control;
pub mod error;
pub mod hardware;
pub mod kinematics;
pub mod plan;
pub mod routines;
pub mod selector;
pub mod sim;
