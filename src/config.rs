use core::{f64::consts::PI, time::Duration};

use crate::calibration::CalibrationTable;

/// External gearing between the drive motors and the wheels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GearRatio {
    pub driving: u32,
    pub driven: u32,
}

impl GearRatio {
    /// Motor turns per wheel turn (`wheel_turns * driving / driven`).
    pub fn reduction(&self) -> f64 {
        self.driving as f64 / self.driven as f64
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrivetrainConfig {
    pub gear_ratio: GearRatio,
    /// inches
    pub wheel_diameter: f64,
    /// inches, wheel center to wheel center
    pub track_width: f64,
}

impl DrivetrainConfig {
    pub fn wheel_circumference(&self) -> f64 {
        self.wheel_diameter * PI
    }

    /// Motor rotations needed for a wheel to roll `distance` inches.
    pub fn motor_turns(&self, distance: f64) -> f64 {
        distance / self.wheel_circumference() * self.gear_ratio.reduction()
    }
}

#[derive(Copy, Clone, Debug)]
pub struct SelectorConfig {
    pub tick: Duration,
    pub release_poll: Duration,
}

#[derive(Copy, Clone, Debug)]
pub struct TeleopConfig {
    pub tick: Duration,
    /// controller percent per drive volt
    pub volts_divisor: f64,
    pub intake_forward_percent: f64,
    pub intake_reverse_percent: f64,
    pub outtake_forward_percent: f64,
    pub outtake_reverse_percent: f64,
}

impl TeleopConfig {
    pub fn stick_to_volts(&self, percent: f64) -> f64 {
        percent / self.volts_divisor
    }
}

#[derive(Copy, Clone, Debug)]
pub struct RobotConfig {
    pub drivetrain: DrivetrainConfig,
    pub calibration: CalibrationTable,
    pub selector: SelectorConfig,
    pub teleop: TeleopConfig,
}

impl RobotConfig {
    pub fn breakthrough() -> Self {
        Self {
            drivetrain: DrivetrainConfig {
                gear_ratio: GearRatio {
                    driving: 48,
                    driven: 60,
                },
                wheel_diameter: 3.5,
                track_width: 12.5,
            },
            calibration: CalibrationTable::default(),
            selector: SelectorConfig {
                tick: Duration::from_millis(20),
                release_poll: Duration::from_millis(10),
            },
            teleop: TeleopConfig {
                tick: Duration::from_millis(20),
                volts_divisor: 8.3,
                intake_forward_percent: 80.0,
                intake_reverse_percent: 50.0,
                outtake_forward_percent: 100.0,
                outtake_reverse_percent: 100.0,
            },
        }
    }
}
