use crate::{
    chassis::Chassis,
    hardware::{DriverState, MotorGroup, Piston, SpinDirection},
    plan::{PistonTarget, RollerTarget},
};

/// Turns a button level into press events.
#[derive(Copy, Clone, Debug, Default)]
pub struct ButtonEdge {
    previous: bool,
}

impl ButtonEdge {
    /// Adopts `level` without reporting a press, so a button already held
    /// when driver control starts does not fire.
    pub fn prime(&mut self, level: bool) {
        self.previous = level;
    }

    pub fn pressed(&mut self, level: bool) -> bool {
        let rising = level && !self.previous;
        self.previous = level;
        rising
    }
}

/// Press-to-toggle bindings for the pistons: B lift, A hopper, Down cannon.
#[derive(Copy, Clone, Debug, Default)]
pub struct PistonToggles {
    lift: ButtonEdge,
    hopper: ButtonEdge,
    cannon: ButtonEdge,
}

impl PistonToggles {
    pub fn prime(&mut self, state: &DriverState) {
        self.lift.prime(state.b);
        self.hopper.prime(state.a);
        self.cannon.prime(state.down);
    }

    /// Pistons whose button went down since the last call.
    pub fn pressed(&mut self, state: &DriverState) -> impl Iterator<Item = PistonTarget> {
        [
            (self.lift.pressed(state.b), PistonTarget::Lift),
            (self.hopper.pressed(state.a), PistonTarget::Hopper),
            (self.cannon.pressed(state.down), PistonTarget::Cannon),
        ]
        .into_iter()
        .filter_map(|(pressed, target)| pressed.then_some(target))
    }
}

impl<M: MotorGroup, P: Piston> Chassis<M, P> {
    /// Tank mixing: throttle plus turn on the left, throttle minus turn on
    /// the right, both scaled to volts by the same gain.
    pub fn tank_control(&mut self, state: &DriverState) {
        let left = self.teleop.stick_to_volts(state.throttle + state.turn);
        let right = self.teleop.stick_to_volts(state.throttle - state.turn);
        self.left_drive.set_voltage(left);
        self.right_drive.set_voltage(right);
    }

    /// Held buttons run the rollers; L1/L2 the intake, R1/R2 the outtake.
    pub fn roller_control(&mut self, state: &DriverState) {
        let teleop = self.teleop;
        self.hold_to_spin(
            RollerTarget::Intake,
            (state.l1, teleop.intake_forward_percent),
            (state.l2, teleop.intake_reverse_percent),
        );
        self.hold_to_spin(
            RollerTarget::Outtake,
            (state.r1, teleop.outtake_forward_percent),
            (state.r2, teleop.outtake_reverse_percent),
        );
    }

    fn hold_to_spin(&mut self, target: RollerTarget, forward: (bool, f64), reverse: (bool, f64)) {
        let roller = self.roller(target);
        if forward.0 {
            roller.spin(SpinDirection::Forward, forward.1);
        } else if reverse.0 {
            roller.spin(SpinDirection::Reverse, reverse.1);
        } else {
            roller.stop();
        }
    }
}
