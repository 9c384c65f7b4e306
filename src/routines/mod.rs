//! Autonomous routines, authored as `.routine` files next to this module.
//!
//! `build.rs` parses each file, serializes it with postcard and embeds the
//! bytes; this module decodes them back into [`Step`]s on demand.
use alloc::{string::String, vec::Vec};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    calibration::CalibrationTable,
    error::RobotError,
    hardware::{SpinDirection, StoppingMode},
    kinematics::MotionCommand,
    plan::{Action, PistonAction, PistonTarget, RollerCommand, RollerTarget, Step},
    selector::{RoutineKind, Side, TeamColor},
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
enum IRColor {
    Red,
    Blue,
}
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
enum IRDirection {
    Forward,
    Reverse,
}
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
enum IRRoller {
    Intake,
    Outtake,
}
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
enum IRPiston {
    Lift,
    Hopper,
    Cannon,
}
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
enum IRPistonAction {
    Open,
    Close,
    Toggle,
}
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
enum IRStopping {
    Brake,
    Coast,
}
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
enum IRAction {
    Drive { inches: f64, speed: u8 },
    Turn { degrees: f64, speed: u8, offset: f64 },
    Spin(IRRoller, IRDirection, f64),
    Stop(IRRoller),
    Piston(IRPiston, IRPistonAction),
    Stopping(IRStopping),
    Wait(u64),
}
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
struct IRStep {
    action: IRAction,
    only_for: Option<IRColor>,
}
#[derive(Serialize, Deserialize, Debug, Clone)]
struct IRRoutine {
    name: String,
    steps: Vec<IRStep>,
}

include!(concat!(env!("OUT_DIR"), "/routines_index.rs"));

/// Handle to one routine of the library.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RoutineId {
    Skills,
    Match(Side, RoutineKind),
}

impl RoutineId {
    pub const ALL: [RoutineId; 7] = [
        RoutineId::Match(Side::Left, RoutineKind::Both),
        RoutineId::Match(Side::Left, RoutineKind::Long),
        RoutineId::Match(Side::Left, RoutineKind::Middle),
        RoutineId::Match(Side::Right, RoutineKind::Both),
        RoutineId::Match(Side::Right, RoutineKind::Long),
        RoutineId::Match(Side::Right, RoutineKind::Middle),
        RoutineId::Skills,
    ];

    /// File stem of the `.routine` source.
    pub fn name(self) -> &'static str {
        match self {
            RoutineId::Skills => "skills",
            RoutineId::Match(Side::Left, RoutineKind::Both) => "left_both",
            RoutineId::Match(Side::Left, RoutineKind::Long) => "left_long",
            RoutineId::Match(Side::Left, RoutineKind::Middle) => "left_middle",
            RoutineId::Match(Side::Right, RoutineKind::Both) => "right_both",
            RoutineId::Match(Side::Right, RoutineKind::Long) => "right_long",
            RoutineId::Match(Side::Right, RoutineKind::Middle) => "right_middle",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Routine {
    pub id: RoutineId,
    pub steps: Vec<Step>,
}

impl Routine {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fails if any straight drive asks for a speed the table cannot correct.
    pub fn validate(&self, calibration: &CalibrationTable) -> Result<(), RobotError> {
        for step in &self.steps {
            if let Action::Motion(MotionCommand::LinearDrive { speed, .. }) = step.action
                && calibration.entry(speed).is_none()
            {
                return Err(RobotError::UnknownCalibrationSpeed { speed });
            }
        }
        Ok(())
    }
}

fn map_direction(d: IRDirection) -> SpinDirection {
    match d {
        IRDirection::Forward => SpinDirection::Forward,
        IRDirection::Reverse => SpinDirection::Reverse,
    }
}
fn map_roller(r: IRRoller) -> RollerTarget {
    match r {
        IRRoller::Intake => RollerTarget::Intake,
        IRRoller::Outtake => RollerTarget::Outtake,
    }
}
fn map_piston(p: IRPiston) -> PistonTarget {
    match p {
        IRPiston::Lift => PistonTarget::Lift,
        IRPiston::Hopper => PistonTarget::Hopper,
        IRPiston::Cannon => PistonTarget::Cannon,
    }
}

fn map_action(a: IRAction) -> Action {
    match a {
        IRAction::Drive { inches, speed } => Action::Motion(MotionCommand::LinearDrive { inches, speed }),
        IRAction::Turn {
            degrees,
            speed,
            offset,
        } => Action::Motion(MotionCommand::ArcTurn {
            degrees,
            speed,
            offset,
        }),
        IRAction::Spin(r, d, percent) => Action::Roller(map_roller(r), RollerCommand::Spin(map_direction(d), percent)),
        IRAction::Stop(r) => Action::Roller(map_roller(r), RollerCommand::Stop),
        IRAction::Piston(p, IRPistonAction::Open) => Action::Piston(map_piston(p), PistonAction::Open),
        IRAction::Piston(p, IRPistonAction::Close) => Action::Piston(map_piston(p), PistonAction::Close),
        IRAction::Piston(p, IRPistonAction::Toggle) => Action::Piston(map_piston(p), PistonAction::Toggle),
        IRAction::Stopping(IRStopping::Brake) => Action::DriveStopping(StoppingMode::Brake),
        IRAction::Stopping(IRStopping::Coast) => Action::DriveStopping(StoppingMode::Coast),
        IRAction::Wait(ms) => Action::Wait(ms),
    }
}

fn map_step(s: IRStep) -> Step {
    Step {
        action: map_action(s.action),
        only_for: s.only_for.map(|c| match c {
            IRColor::Red => TeamColor::Red,
            IRColor::Blue => TeamColor::Blue,
        }),
    }
}

/// The set of routines the robot can run, keyed by file stem.
#[derive(Copy, Clone)]
pub struct RoutineLibrary {
    blobs: &'static [(&'static str, &'static [u8])],
}

impl RoutineLibrary {
    pub const fn new(blobs: &'static [(&'static str, &'static [u8])]) -> Self {
        Self { blobs }
    }

    /// Routines compiled into this binary.
    pub const fn embedded() -> Self {
        Self::new(ROUTINE_BLOBS)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.blobs.iter().map(|(name, _)| *name)
    }

    pub fn load(&self, id: RoutineId) -> Result<Routine, RobotError> {
        let name = id.name();
        let bytes = self
            .blobs
            .iter()
            .find_map(|(n, bytes)| (*n == name).then_some(*bytes))
            .ok_or(RobotError::UnresolvedRoutine { name })?;
        let ir = postcard::from_bytes::<IRRoutine>(bytes).map_err(|e| {
            warn!("routine `{name}` failed to decode: {e}");
            RobotError::CorruptRoutine { name }
        })?;
        Ok(Routine {
            id,
            steps: ir.steps.into_iter().map(map_step).collect(),
        })
    }

    /// Loads `id` and checks it against `calibration`, so a bad routine is
    /// caught before the match instead of halfway through it.
    pub fn resolve(&self, id: RoutineId, calibration: &CalibrationTable) -> Result<Routine, RobotError> {
        let routine = self.load(id)?;
        routine.validate(calibration)?;
        info!("resolved routine `{}` ({} steps)", id.name(), routine.steps.len());
        Ok(routine)
    }
}

impl Default for RoutineLibrary {
    fn default() -> Self {
        Self::embedded()
    }
}
