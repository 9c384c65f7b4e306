use core::time::Duration;

use log::debug;

use crate::{
    chassis::Chassis,
    error::RobotError,
    hardware::{MotorGroup, Piston, SpinDirection, StoppingMode, Timer},
    kinematics::MotionCommand,
    selector::TeamColor,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RollerTarget {
    Intake,
    Outtake,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RollerCommand {
    Spin(SpinDirection, f64),
    Stop,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PistonTarget {
    Lift,
    Hopper,
    Cannon,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PistonAction {
    Open,
    Close,
    Toggle,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Action {
    Motion(MotionCommand),
    Roller(RollerTarget, RollerCommand),
    Piston(PistonTarget, PistonAction),
    DriveStopping(StoppingMode),
    Wait(u64),
}

/// One routine step, optionally limited to a single alliance color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Step {
    pub action: Action,
    pub only_for: Option<TeamColor>,
}

impl Step {
    pub fn applies_to(&self, color: TeamColor) -> bool {
        self.only_for.is_none_or(|c| c == color)
    }
}

impl<M: MotorGroup, P: Piston> Chassis<M, P> {
    /// Runs `plan` to completion; stops at the first failing step.
    pub async fn run_plan(
        &mut self,
        plan: &[Step],
        color: TeamColor,
        timer: &mut impl Timer,
    ) -> Result<(), RobotError> {
        for step in plan.iter().filter(|s| s.applies_to(color)) {
            debug!("step: {:?}", step.action);
            match step.action {
                Action::Motion(command) => {
                    self.execute_motion(command).await?;
                }
                Action::Roller(target, RollerCommand::Spin(direction, percent)) => {
                    self.roller(target).spin(direction, percent);
                }
                Action::Roller(target, RollerCommand::Stop) => {
                    self.roller(target).stop();
                }
                Action::Piston(target, PistonAction::Open) => {
                    self.piston(target).open();
                }
                Action::Piston(target, PistonAction::Close) => {
                    self.piston(target).close();
                }
                Action::Piston(target, PistonAction::Toggle) => {
                    self.piston(target).toggle();
                }
                Action::DriveStopping(mode) => {
                    self.set_drive_stopping(mode);
                }
                Action::Wait(ms) => {
                    timer.sleep(Duration::from_millis(ms)).await;
                }
            }
        }
        Ok(())
    }
}
