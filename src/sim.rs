//! In-memory devices for tests and the host dry run.
//!
//! Every simulated device is a cheap handle over shared state, so a test can
//! keep a clone while the original is moved into the robot.
use alloc::{format, rc::Rc, string::String, vec::Vec};
use core::{
    cell::{Cell, RefCell},
    future::Future,
    pin::pin,
    task::{Context, Poll, Waker},
    time::Duration,
};

use log::trace;

use crate::{
    chassis::{Chassis, ChassisArgs},
    config::RobotConfig,
    hardware::{
        DriverController, DriverState, Font, MotorGroup, Piston, Screen, SpinDirection,
        StoppingMode, Switch, Timer,
    },
};

/// Drives a future whose simulated devices never suspend.
pub fn block_on<F: Future>(fut: F) -> F::Output {
    let mut fut = pin!(fut);
    let mut cx = Context::from_waker(Waker::noop());
    match fut.as_mut().poll(&mut cx) {
        Poll::Ready(out) => out,
        Poll::Pending => panic!("simulated future suspended"),
    }
}

/// Order of device calls across every device sharing it.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    fn record(&self, device: &str, call: &str) {
        self.0.borrow_mut().push(format!("{device}:{call}"));
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MotorEvent {
    Velocity(f64),
    SpinFor(SpinDirection, f64),
    Waited,
    Spin(SpinDirection, f64),
    Voltage(f64),
    Stop,
    Stopping(StoppingMode),
}

#[derive(Clone)]
pub struct SimMotorGroup {
    name: &'static str,
    events: Rc<RefCell<Vec<MotorEvent>>>,
    stopping: Rc<Cell<StoppingMode>>,
    journal: Journal,
}

impl SimMotorGroup {
    pub fn new(name: &'static str, journal: Journal) -> Self {
        Self {
            name,
            events: Rc::default(),
            stopping: Rc::default(),
            journal,
        }
    }

    pub fn events(&self) -> Vec<MotorEvent> {
        self.events.borrow().clone()
    }

    pub fn last_event(&self) -> Option<MotorEvent> {
        self.events.borrow().last().copied()
    }

    pub fn stopping(&self) -> StoppingMode {
        self.stopping.get()
    }

    /// Sum of every relative move commanded so far.
    pub fn commanded_rotations(&self) -> f64 {
        self.events
            .borrow()
            .iter()
            .map(|e| match e {
                MotorEvent::SpinFor(dir, turns) => dir.sign() * turns,
                _ => 0.0,
            })
            .sum()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn push(&self, call: &str, event: MotorEvent) {
        trace!("{}: {:?}", self.name, event);
        self.journal.record(self.name, call);
        self.events.borrow_mut().push(event);
    }
}

impl MotorGroup for SimMotorGroup {
    fn set_velocity(&mut self, percent: f64) {
        self.push("velocity", MotorEvent::Velocity(percent));
    }

    fn spin_for(&mut self, direction: SpinDirection, rotations: f64) {
        self.push("spin_for", MotorEvent::SpinFor(direction, rotations));
    }

    async fn wait_for_target(&mut self) {
        self.push("wait", MotorEvent::Waited);
    }

    fn spin(&mut self, direction: SpinDirection, percent: f64) {
        self.push("spin", MotorEvent::Spin(direction, percent));
    }

    fn set_voltage(&mut self, volts: f64) {
        self.push("voltage", MotorEvent::Voltage(volts));
    }

    fn stop(&mut self) {
        self.push("stop", MotorEvent::Stop);
    }

    fn set_stopping(&mut self, mode: StoppingMode) {
        self.stopping.set(mode);
        self.push("stopping", MotorEvent::Stopping(mode));
    }
}

#[derive(Clone, Default)]
pub struct SimPiston {
    open: Rc<Cell<bool>>,
    actuations: Rc<Cell<usize>>,
}

impl SimPiston {
    /// How many times the piston changed state.
    pub fn actuations(&self) -> usize {
        self.actuations.get()
    }

    fn set(&self, open: bool) {
        if self.open.replace(open) != open {
            self.actuations.set(self.actuations.get() + 1);
        }
    }
}

impl Piston for SimPiston {
    fn open(&mut self) {
        self.set(true);
    }

    fn close(&mut self) {
        self.set(false);
    }

    fn is_open(&self) -> bool {
        self.open.get()
    }
}

/// Simulated time, advanced only by [`Timer::sleep`].
#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<Duration>>);

impl SimClock {
    pub fn now(&self) -> Duration {
        self.0.get()
    }
}

impl Timer for SimClock {
    async fn sleep(&mut self, duration: Duration) {
        self.0.set(self.0.get() + duration);
    }
}

/// A switch held down during fixed windows of simulated time.
#[derive(Clone)]
pub struct SimSwitch {
    clock: SimClock,
    windows: Vec<(Duration, Duration)>,
}

impl SimSwitch {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            clock: clock.clone(),
            windows: Vec::new(),
        }
    }

    /// Holds the switch from `from_ms` (inclusive) to `to_ms` (exclusive).
    pub fn press(mut self, from_ms: u64, to_ms: u64) -> Self {
        self.windows
            .push((Duration::from_millis(from_ms), Duration::from_millis(to_ms)));
        self
    }
}

impl Switch for SimSwitch {
    fn pressing(&self) -> bool {
        let now = self.clock.now();
        self.windows.iter().any(|&(from, to)| from <= now && now < to)
    }
}

/// Records what was printed, one frame per `clear`.
#[derive(Clone, Default)]
pub struct SimScreen {
    frames: Rc<RefCell<Vec<Vec<(Font, String)>>>>,
    font: Rc<Cell<Option<Font>>>,
}

impl SimScreen {
    pub fn frames(&self) -> Vec<Vec<(Font, String)>> {
        self.frames.borrow().clone()
    }

    pub fn last_frame(&self) -> Vec<String> {
        self.frames
            .borrow()
            .last()
            .map(|f| f.iter().map(|(_, text)| text.clone()).collect())
            .unwrap_or_default()
    }
}

impl Screen for SimScreen {
    fn clear(&mut self) {
        self.frames.borrow_mut().push(Vec::new());
    }

    fn set_font(&mut self, font: Font) {
        self.font.set(Some(font));
    }

    fn print(&mut self, text: &str) {
        let font = self.font.get().unwrap_or(Font::Mono20);
        let mut frames = self.frames.borrow_mut();
        if frames.is_empty() {
            frames.push(Vec::new());
        }
        if let Some(frame) = frames.last_mut() {
            frame.push((font, String::from(text)));
        }
    }
}

#[derive(Clone, Default)]
pub struct SimController(Rc<Cell<DriverState>>);

impl SimController {
    pub fn set(&self, state: DriverState) {
        self.0.set(state);
    }
}

impl DriverController for SimController {
    fn state(&mut self) -> DriverState {
        self.0.get()
    }
}

/// Handles onto every device of a simulated chassis.
#[derive(Clone)]
pub struct Rig {
    pub left_drive: SimMotorGroup,
    pub right_drive: SimMotorGroup,
    pub intake: SimMotorGroup,
    pub outtake: SimMotorGroup,
    pub lift: SimPiston,
    pub hopper: SimPiston,
    pub cannon: SimPiston,
    journal: Journal,
}

impl Rig {
    pub fn new() -> Self {
        let journal = Journal::default();
        Self {
            left_drive: SimMotorGroup::new("left_drive", journal.clone()),
            right_drive: SimMotorGroup::new("right_drive", journal.clone()),
            intake: SimMotorGroup::new("intake", journal.clone()),
            outtake: SimMotorGroup::new("outtake", journal.clone()),
            lift: SimPiston::default(),
            hopper: SimPiston::default(),
            cannon: SimPiston::default(),
            journal,
        }
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.0.borrow().clone()
    }

    /// Forgets recorded motor calls; piston and stopping state are kept.
    pub fn clear(&self) {
        for group in [&self.left_drive, &self.right_drive, &self.intake, &self.outtake] {
            group.clear();
        }
        self.journal.0.borrow_mut().clear();
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}

/// A chassis over simulated devices, with its setup calls already cleared.
pub fn chassis(config: RobotConfig) -> (Chassis<SimMotorGroup, SimPiston>, Rig) {
    let rig = Rig::new();
    let chassis = Chassis::new(ChassisArgs {
        left_drive: rig.left_drive.clone(),
        right_drive: rig.right_drive.clone(),
        intake: rig.intake.clone(),
        outtake: rig.outtake.clone(),
        lift: rig.lift.clone(),
        hopper: rig.hopper.clone(),
        cannon: rig.cannon.clone(),
        config,
    });
    rig.clear();
    (chassis, rig)
}
