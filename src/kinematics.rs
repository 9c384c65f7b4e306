use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    calibration::CalibrationTable,
    chassis::Chassis,
    config::DrivetrainConfig,
    error::RobotError,
    hardware::{MotorGroup, Piston, SpinDirection},
};

/// A single open-loop drivetrain move.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MotionCommand {
    LinearDrive { inches: f64, speed: u8 },
    /// Arc of `degrees` about a point `offset` inches to the side of the
    /// drivetrain center; `offset == 0` is a point turn.
    ArcTurn { degrees: f64, speed: u8, offset: f64 },
}

impl MotionCommand {
    pub fn speed(&self) -> u8 {
        match *self {
            MotionCommand::LinearDrive { speed, .. } | MotionCommand::ArcTurn { speed, .. } => speed,
        }
    }
}

/// Per-side amounts, in whatever unit the producing call documents.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SideTargets {
    pub left: f64,
    pub right: f64,
}

impl SideTargets {
    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            left: f(self.left),
            right: f(self.right),
        }
    }
}

/// Converts distances and arcs into motor rotations for a differential drive.
#[derive(Copy, Clone, Debug)]
pub struct KinematicsEngine {
    drivetrain: DrivetrainConfig,
    calibration: CalibrationTable,
}

impl KinematicsEngine {
    pub fn new(drivetrain: DrivetrainConfig, calibration: CalibrationTable) -> Self {
        Self {
            drivetrain,
            calibration,
        }
    }

    pub fn drivetrain(&self) -> &DrivetrainConfig {
        &self.drivetrain
    }

    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    /// Motor turns for each side to drive `inches` straight at `speed` percent.
    pub fn straight(&self, inches: f64, speed: u8) -> Result<SideTargets, RobotError> {
        let distance = self.calibration.correct(inches, speed)?;
        let turns = self.drivetrain.motor_turns(distance);
        Ok(SideTargets {
            left: turns,
            right: turns,
        })
    }

    /// Inches each side travels along an arc of `degrees` about `offset`.
    pub fn arc_distances(&self, degrees: f64, offset: f64) -> SideTargets {
        let rads = degrees.to_radians();
        let half_track = self.drivetrain.track_width / 2.0;
        SideTargets {
            left: (offset + half_track) * rads,
            right: (offset - half_track) * rads,
        }
    }

    /// Motor turns for an arc of `degrees` about `offset`.
    ///
    /// Turns use raw wheel geometry only: the calibration table was measured
    /// on straight runs and is not applied here.
    pub fn arc(&self, degrees: f64, offset: f64) -> SideTargets {
        self.arc_distances(degrees, offset)
            .map(|d| self.drivetrain.motor_turns(d))
    }

    pub fn targets(&self, command: &MotionCommand) -> Result<SideTargets, RobotError> {
        match *command {
            MotionCommand::LinearDrive { inches, speed } => self.straight(inches, speed),
            MotionCommand::ArcTurn {
                degrees, offset, ..
            } => Ok(self.arc(degrees, offset)),
        }
    }
}

impl<M: MotorGroup, P: Piston> Chassis<M, P> {
    pub async fn drive(&mut self, inches: f64, speed: u8) -> Result<(), RobotError> {
        self.execute_motion(MotionCommand::LinearDrive { inches, speed })
            .await
    }

    pub async fn turn_about(&mut self, degrees: f64, speed: u8, offset: f64) -> Result<(), RobotError> {
        self.execute_motion(MotionCommand::ArcTurn {
            degrees,
            speed,
            offset,
        })
        .await
    }

    pub async fn execute_motion(&mut self, command: MotionCommand) -> Result<(), RobotError> {
        let targets = self.kinematics.targets(&command)?;
        debug!(
            "{:?}: left {:.4} turns, right {:.4} turns",
            command, targets.left, targets.right
        );
        self.move_sides(targets, command.speed()).await;
        Ok(())
    }

    // left is issued without waiting so both sides start on the same tick;
    // the call still returns only after both have finished
    async fn move_sides(&mut self, targets: SideTargets, speed: u8) {
        let percent = speed as f64;
        self.left_drive.set_velocity(percent);
        self.right_drive.set_velocity(percent);

        self.left_drive.spin_for(SpinDirection::Forward, targets.left);
        self.right_drive.spin_for(SpinDirection::Forward, targets.right);
        self.right_drive.wait_for_target().await;
        self.left_drive.wait_for_target().await;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        config::RobotConfig,
        sim::{self, MotorEvent},
    };

    fn engine() -> KinematicsEngine {
        let config = RobotConfig::breakthrough();
        KinematicsEngine::new(config.drivetrain, config.calibration)
    }

    #[test]
    fn straight_commands_equal_sides() {
        let engine = engine();
        for speed in [100, 75, 50, 25] {
            for inches in [-24.0, 2.0, 12.0, 32.0] {
                let t = engine.straight(inches, speed).unwrap();
                assert_eq!(t.left, t.right);
            }
        }
    }

    #[test]
    fn straight_converts_through_wheel_and_gears() {
        let t = engine().straight(32.0, 100).unwrap();
        let expected = 32.0 / (3.5 * core::f64::consts::PI) * 48.0 / 60.0;
        assert_relative_eq!(t.left, expected, epsilon = 1e-12);
    }

    #[test]
    fn straight_rejects_uncalibrated_speed() {
        assert_eq!(
            engine().straight(12.0, 60),
            Err(RobotError::UnknownCalibrationSpeed { speed: 60 })
        );
    }

    #[test]
    fn point_turn_is_symmetric() {
        let engine = engine();
        let d = engine.arc_distances(90.0, 0.0);
        assert_relative_eq!(d.left, 9.8175, epsilon = 1e-4);
        assert_relative_eq!(d.right, -9.8175, epsilon = 1e-4);

        let t = engine.arc(90.0, 0.0);
        assert_relative_eq!(t.left, 0.714, epsilon = 1e-3);
        assert_relative_eq!(t.left, -t.right, epsilon = 1e-12);

        let wheel_turns = d.left / (3.5 * core::f64::consts::PI);
        assert_relative_eq!(wheel_turns, 6.25 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(wheel_turns, 0.8926, epsilon = 1e-3);
    }

    #[test]
    fn half_track_offset_pivots_on_one_wheel() {
        let engine = engine();
        for degrees in [-90.0, 45.0, 126.87] {
            let d = engine.arc_distances(degrees, 12.5 / 2.0);
            assert_eq!(d.right, 0.0);
            assert!(d.left != 0.0);
        }
    }

    #[test]
    fn offset_sign_flips_curvature() {
        let engine = engine();
        let wide = engine.arc(-90.0, -12.0);
        let tight = engine.arc(-90.0, 12.0);
        assert!(wide.left > 0.0 && wide.right > 0.0);
        assert!(tight.left < 0.0 && tight.right < 0.0);
    }

    #[test]
    fn arc_ignores_speed_calibration() {
        // 60% has no calibration entry; arcs still resolve
        let command = MotionCommand::ArcTurn {
            degrees: 45.0,
            speed: 60,
            offset: 0.0,
        };
        assert!(engine().targets(&command).is_ok());
    }

    #[test]
    fn drive_issues_both_sides_before_waiting() {
        let (mut chassis, rig) = sim::chassis(RobotConfig::breakthrough());
        sim::block_on(chassis.drive(12.0, 75)).unwrap();

        let left = rig.left_drive.events();
        let right = rig.right_drive.events();
        assert_eq!(left[0], MotorEvent::Velocity(75.0));
        assert_eq!(right[0], MotorEvent::Velocity(75.0));
        let MotorEvent::SpinFor(_, l) = left[1] else {
            panic!("left side not commanded: {left:?}");
        };
        let MotorEvent::SpinFor(_, r) = right[1] else {
            panic!("right side not commanded: {right:?}");
        };
        assert_eq!(l, r);
        assert_eq!(left[2], MotorEvent::Waited);
        assert_eq!(right[2], MotorEvent::Waited);

        // right is awaited first, left is commanded before it
        let order = rig.journal();
        let left_issue = order.iter().position(|e| e == "left_drive:spin_for").unwrap();
        let right_wait = order.iter().position(|e| e == "right_drive:wait").unwrap();
        let left_wait = order.iter().position(|e| e == "left_drive:wait").unwrap();
        assert!(left_issue < right_wait);
        assert!(right_wait < left_wait);
    }

    #[test]
    fn failed_correction_moves_nothing() {
        let (mut chassis, rig) = sim::chassis(RobotConfig::breakthrough());
        let result = sim::block_on(chassis.drive(12.0, 33));
        assert_eq!(result, Err(RobotError::UnknownCalibrationSpeed { speed: 33 }));
        assert!(rig.left_drive.events().iter().all(|e| !matches!(e, MotorEvent::SpinFor(..))));
    }
}
