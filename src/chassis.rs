use log::info;

use crate::{
    config::{RobotConfig, TeleopConfig},
    hardware::{MotorGroup, Piston, StoppingMode},
    kinematics::KinematicsEngine,
    plan::{PistonTarget, RollerTarget},
};

/// Every actuator the robot drives, plus the geometry needed to move it.
pub struct Chassis<M: MotorGroup, P: Piston> {
    pub left_drive: M,
    pub right_drive: M,
    pub intake: M,
    pub outtake: M,
    pub lift: P,
    pub hopper: P,
    pub cannon: P,
    pub kinematics: KinematicsEngine,
    pub teleop: TeleopConfig,
}

pub struct ChassisArgs<M: MotorGroup, P: Piston> {
    pub left_drive: M,
    pub right_drive: M,
    pub intake: M,
    pub outtake: M,
    pub lift: P,
    pub hopper: P,
    pub cannon: P,
    pub config: RobotConfig,
}

impl<M: MotorGroup, P: Piston> Chassis<M, P> {
    pub fn new(args: ChassisArgs<M, P>) -> Self {
        let mut chassis = Self {
            left_drive: args.left_drive,
            right_drive: args.right_drive,
            intake: args.intake,
            outtake: args.outtake,
            lift: args.lift,
            hopper: args.hopper,
            cannon: args.cannon,
            kinematics: KinematicsEngine::new(args.config.drivetrain, args.config.calibration),
            teleop: args.config.teleop,
        };
        chassis.set_drive_stopping(StoppingMode::Brake);
        chassis.lift.close();
        chassis.hopper.close();
        chassis.cannon.close();
        info!("chassis ready: {:?}", chassis.kinematics.drivetrain());
        chassis
    }

    pub fn set_drive_stopping(&mut self, mode: StoppingMode) {
        self.left_drive.set_stopping(mode);
        self.right_drive.set_stopping(mode);
    }

    pub fn roller(&mut self, target: RollerTarget) -> &mut M {
        match target {
            RollerTarget::Intake => &mut self.intake,
            RollerTarget::Outtake => &mut self.outtake,
        }
    }

    pub fn piston(&mut self, target: PistonTarget) -> &mut P {
        match target {
            PistonTarget::Lift => &mut self.lift,
            PistonTarget::Hopper => &mut self.hopper,
            PistonTarget::Cannon => &mut self.cannon,
        }
    }
}
