use log::{error, info};

use crate::{
    chassis::Chassis,
    driver_control::PistonToggles,
    error::RobotError,
    hardware::{DriverController, MotorGroup, Piston, Timer},
    routines::Routine,
    selector::{LockedSelection, TeamColor},
};

/// Hands the robot to either the locked autonomous routine or the driver.
///
/// The competition runtime decides which phase runs and never runs both at
/// once; nothing here arbitrates concurrent access.
pub struct ControlLoopArbiter<M: MotorGroup, P: Piston, C: DriverController, T: Timer> {
    chassis: Chassis<M, P>,
    controller: C,
    timer: T,
    autonomous: Result<Routine, RobotError>,
    team_color: TeamColor,
    toggles: PistonToggles,
}

impl<M: MotorGroup, P: Piston, C: DriverController, T: Timer> ControlLoopArbiter<M, P, C, T> {
    /// `autonomous` is the outcome of resolving `selection`; a failure is kept
    /// and reported when the autonomous phase starts.
    pub fn new(
        chassis: Chassis<M, P>,
        controller: C,
        timer: T,
        selection: LockedSelection,
        autonomous: Result<Routine, RobotError>,
    ) -> Self {
        Self {
            chassis,
            controller,
            timer,
            autonomous,
            team_color: selection.team_color,
            toggles: PistonToggles::default(),
        }
    }

    pub fn chassis(&self) -> &Chassis<M, P> {
        &self.chassis
    }

    pub fn team_color(&self) -> TeamColor {
        self.team_color
    }

    /// Runs the selected routine to completion. The match timer is enforced
    /// by the field, not here.
    pub async fn run_autonomous(&mut self) -> Result<(), RobotError> {
        let routine = match &self.autonomous {
            Ok(routine) => routine,
            Err(e) => {
                error!("autonomous skipped: {e}");
                return Err(*e);
            }
        };
        info!(
            "autonomous: running `{}` for {:?}",
            routine.id.name(),
            self.team_color
        );
        self.chassis
            .run_plan(&routine.steps, self.team_color, &mut self.timer)
            .await
    }

    /// Driver control. Never returns; the runtime drops it when the phase ends.
    pub async fn run_teleop(&mut self) {
        self.begin_teleop();
        loop {
            self.teleop_tick();
            self.timer.sleep(self.chassis.teleop.tick).await;
        }
    }

    /// Takes the first controller sample as the baseline for press detection.
    pub fn begin_teleop(&mut self) {
        info!("driver control started");
        let state = self.controller.state();
        self.toggles.prime(&state);
    }

    /// One pass of the driver loop.
    pub fn teleop_tick(&mut self) {
        let state = self.controller.state();
        self.chassis.tank_control(&state);
        self.chassis.roller_control(&state);
        for target in self.toggles.pressed(&state) {
            self.chassis.piston(target).toggle();
        }
    }
}
