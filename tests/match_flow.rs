use breakthrough::{
    arbiter::ControlLoopArbiter,
    config::RobotConfig,
    hardware::{DriverState, Piston},
    routines::{RoutineId, RoutineLibrary},
    selector::{AutonSelector, Mode, RoutineKind, SelectorSwitches, Side, TeamColor},
    sim::{self, MotorEvent, SimClock, SimController, SimScreen, SimSwitch},
};

struct MatchBench {
    clock: SimClock,
    screen: SimScreen,
    controller: SimController,
}

impl MatchBench {
    fn new() -> Self {
        Self {
            clock: SimClock::default(),
            screen: SimScreen::default(),
            controller: SimController::default(),
        }
    }

    fn switches(
        &self,
        color: &[(u64, u64)],
        side: &[(u64, u64)],
        kind: &[(u64, u64)],
        confirm_at: u64,
    ) -> SelectorSwitches<SimSwitch> {
        let script = |windows: &[(u64, u64)]| {
            windows
                .iter()
                .fold(SimSwitch::new(&self.clock), |s, &(from, to)| s.press(from, to))
        };
        SelectorSwitches {
            mode: SimSwitch::new(&self.clock),
            color: script(color),
            side: script(side),
            kind: script(kind),
            confirm: SimSwitch::new(&self.clock).press(confirm_at, u64::MAX),
        }
    }
}

#[test]
fn left_long_for_red_is_locked_and_run() {
    let field = MatchBench::new();
    let config = RobotConfig::breakthrough();
    let switches = field.switches(&[], &[], &[(100, 150)], 400);

    let mut clock = field.clock.clone();
    let mut screen = field.screen.clone();
    let selection = sim::block_on(
        AutonSelector::new(switches, config.selector).select(&mut screen, &mut clock),
    );

    assert_eq!(selection.code.mode, Mode::Match);
    assert_eq!(selection.code.kind, RoutineKind::Long);
    assert_eq!(selection.team_color, TeamColor::Red);
    assert_eq!(selection.routine, RoutineId::Match(Side::Left, RoutineKind::Long));
    assert_eq!(field.screen.last_frame(), ["Match | Left | Long", "AUTON LOCKED"]);

    let (chassis, rig) = sim::chassis(config);
    let routine = RoutineLibrary::embedded().resolve(selection.routine, &config.calibration);
    let mut arbiter = ControlLoopArbiter::new(
        chassis,
        field.controller.clone(),
        field.clock.clone(),
        selection,
        routine,
    );

    assert_eq!(sim::block_on(arbiter.run_autonomous()), Ok(()));
    assert!(rig.journal().is_empty());
}

#[test]
fn right_long_for_blue_scores_then_driver_takes_over() {
    let field = MatchBench::new();
    let config = RobotConfig::breakthrough();
    let switches = field.switches(&[(100, 150)], &[(300, 350)], &[(500, 550)], 800);

    let mut clock = field.clock.clone();
    let mut screen = field.screen.clone();
    let selection = sim::block_on(
        AutonSelector::new(switches, config.selector).select(&mut screen, &mut clock),
    );
    assert_eq!(selection.team_color, TeamColor::Blue);
    assert_eq!(selection.routine.name(), "right_long");

    let (chassis, rig) = sim::chassis(config);
    let routine = RoutineLibrary::embedded().resolve(selection.routine, &config.calibration);
    let mut arbiter = ControlLoopArbiter::new(
        chassis,
        field.controller.clone(),
        field.clock.clone(),
        selection,
        routine,
    );

    let before = field.clock.now();
    assert_eq!(sim::block_on(arbiter.run_autonomous()), Ok(()));
    assert_eq!(field.clock.now() - before, core::time::Duration::from_millis(1000));
    assert!(rig.cannon.is_open());
    assert!(rig.left_drive.events().contains(&MotorEvent::Waited));

    // the driver holds B through the phase change; it must not toggle the lift
    field.controller.set(DriverState {
        b: true,
        throttle: 100.0,
        ..Default::default()
    });
    let lift_before = rig.lift.actuations();
    arbiter.begin_teleop();
    arbiter.teleop_tick();
    assert_eq!(rig.lift.actuations(), lift_before);
    assert_eq!(rig.left_drive.last_event(), Some(MotorEvent::Voltage(100.0 / 8.3)));

    field.controller.set(DriverState::default());
    arbiter.teleop_tick();
    field.controller.set(DriverState {
        b: true,
        ..Default::default()
    });
    arbiter.teleop_tick();
    assert_eq!(rig.lift.actuations(), lift_before + 1);
    assert!(rig.lift.is_open());
}
