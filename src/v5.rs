//! vexide implementations of the device traits, and the competition entry.
use alloc::vec::Vec;
use core::time::Duration;

use breakthrough::{
    arbiter::ControlLoopArbiter,
    chassis::{Chassis, ChassisArgs},
    config::RobotConfig,
    hardware::{
        DriverController, DriverState, Font, MotorGroup, Piston, Screen, SpinDirection,
        StoppingMode, Switch, Timer,
    },
    routines::RoutineLibrary,
    selector::{AutonSelector, SelectorSwitches},
};
use log::{error, info, warn};
use vexide::{
    devices::{position::Position, smart::expander::AdiExpander},
    display::{Display, Font as DisplayFont, FontFamily, FontSize, Rgb, Text},
    prelude::*,
};

/// Motor turns within this of the target count as arrived.
const TARGET_TOLERANCE: f64 = 0.01;
const SETTLE_POLL: Duration = Duration::from_millis(10);

fn max_rpm(gearset: Gearset) -> f64 {
    match gearset {
        Gearset::Red => 100.0,
        Gearset::Green => 200.0,
        Gearset::Blue => 600.0,
    }
}

pub struct V5MotorGroup {
    motors: Vec<Motor>,
    max_rpm: f64,
    velocity: f64,
    stopping: StoppingMode,
    targets: Vec<f64>,
}

impl V5MotorGroup {
    pub fn new(motors: Vec<Motor>, gearset: Gearset) -> Self {
        Self {
            motors,
            max_rpm: max_rpm(gearset),
            velocity: 50.0,
            stopping: StoppingMode::default(),
            targets: Vec::new(),
        }
    }

    fn rpm(&self, percent: f64) -> i32 {
        (percent / 100.0 * self.max_rpm) as i32
    }

    fn brake_mode(&self) -> BrakeMode {
        match self.stopping {
            StoppingMode::Brake => BrakeMode::Brake,
            StoppingMode::Coast => BrakeMode::Coast,
        }
    }

    fn settled(&self) -> bool {
        self.motors.iter().zip(&self.targets).all(|(motor, target)| {
            motor.position().is_ok_and(|p| {
                let err = p.as_revolutions() - target;
                err <= TARGET_TOLERANCE && -err <= TARGET_TOLERANCE
            })
        })
    }
}

impl MotorGroup for V5MotorGroup {
    fn set_velocity(&mut self, percent: f64) {
        self.velocity = percent;
    }

    fn spin_for(&mut self, direction: SpinDirection, rotations: f64) {
        let rpm = self.rpm(self.velocity);
        self.targets.clear();
        for motor in self.motors.iter_mut() {
            let start = motor.position().map(|p| p.as_revolutions()).unwrap_or_default();
            let target = start + direction.sign() * rotations;
            if let Err(e) = motor.set_position_target(Position::from_revolutions(target), rpm) {
                warn!("position target rejected: {e:?}");
            }
            self.targets.push(target);
        }
    }

    async fn wait_for_target(&mut self) {
        while !self.settled() {
            sleep(SETTLE_POLL).await;
        }
        self.stop();
    }

    fn spin(&mut self, direction: SpinDirection, percent: f64) {
        let rpm = self.rpm(direction.sign() * percent);
        for motor in self.motors.iter_mut() {
            let _ = motor.set_velocity(rpm);
        }
    }

    fn set_voltage(&mut self, volts: f64) {
        for motor in self.motors.iter_mut() {
            let _ = motor.set_voltage(volts);
        }
    }

    fn stop(&mut self) {
        let mode = self.brake_mode();
        for motor in self.motors.iter_mut() {
            let _ = motor.brake(mode);
        }
    }

    fn set_stopping(&mut self, mode: StoppingMode) {
        self.stopping = mode;
    }
}

pub struct V5Piston {
    port: AdiDigitalOut,
    open: bool,
}

impl V5Piston {
    pub fn new(port: AdiPort) -> Self {
        Self {
            port: AdiDigitalOut::new(port),
            open: false,
        }
    }
}

impl Piston for V5Piston {
    fn open(&mut self) {
        let _ = self.port.set_high();
        self.open = true;
    }

    fn close(&mut self) {
        let _ = self.port.set_low();
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

pub struct V5Switch(AdiDigitalIn);

impl Switch for V5Switch {
    fn pressing(&self) -> bool {
        self.0.is_high().unwrap_or(false)
    }
}

pub struct V5Screen {
    display: Display,
    font: Font,
    row: i16,
}

impl V5Screen {
    pub fn new(display: Display) -> Self {
        Self {
            display,
            font: Font::Mono20,
            row: 0,
        }
    }
}

impl Screen for V5Screen {
    fn clear(&mut self) {
        self.display.erase(Rgb::new(0, 0, 0));
        self.row = 0;
    }

    fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    fn print(&mut self, text: &str) {
        let (size, height) = match self.font {
            Font::Mono15 => (FontSize::SMALL, 20),
            Font::Mono20 => (FontSize::MEDIUM, 25),
            Font::Mono30 => (FontSize::LARGE, 40),
        };
        self.row += height;
        let text = Text::new(text, DisplayFont::new(size, FontFamily::Monospace), [4, self.row - height]);
        self.display.draw_text(&text, Rgb::new(255, 255, 255), None);
    }
}

pub struct V5Controller(Controller);

impl DriverController for V5Controller {
    fn state(&mut self) -> DriverState {
        let Ok(state) = self.0.state() else {
            return DriverState::default();
        };
        DriverState {
            throttle: state.left_stick.y() * 100.0,
            turn: state.right_stick.x() * 100.0,
            l1: state.button_l1.is_pressed(),
            l2: state.button_l2.is_pressed(),
            r1: state.button_r1.is_pressed(),
            r2: state.button_r2.is_pressed(),
            a: state.button_a.is_pressed(),
            b: state.button_b.is_pressed(),
            down: state.button_down.is_pressed(),
        }
    }
}

pub struct V5Timer;

impl Timer for V5Timer {
    async fn sleep(&mut self, duration: Duration) {
        sleep(duration).await;
    }
}

pub struct Robot {
    arbiter: ControlLoopArbiter<V5MotorGroup, V5Piston, V5Controller, V5Timer>,
}

impl Compete for Robot {
    async fn autonomous(&mut self) {
        if let Err(e) = self.arbiter.run_autonomous().await {
            error!("autonomous aborted: {e}");
        }
    }

    async fn driver(&mut self) {
        self.arbiter.run_teleop().await;
    }
}

fn drive_side(ports: [SmartPort; 3], direction: Direction) -> V5MotorGroup {
    let motors = ports
        .into_iter()
        .map(|port| Motor::new(port, Gearset::Red, direction))
        .collect();
    V5MotorGroup::new(motors, Gearset::Red)
}

fn roller(port: SmartPort) -> V5MotorGroup {
    V5MotorGroup::new(alloc::vec![Motor::new(port, Gearset::Green, Direction::Forward)], Gearset::Green)
}

/// Wires every device, runs the pre-match selector, then hands off to the
/// competition runtime.
pub async fn run(peripherals: Peripherals) {
    let config = RobotConfig::breakthrough();

    let expander = AdiExpander::new(peripherals.port_20);
    let switches = SelectorSwitches {
        mode: V5Switch(AdiDigitalIn::new(expander.adi_a)),
        color: V5Switch(AdiDigitalIn::new(expander.adi_b)),
        side: V5Switch(AdiDigitalIn::new(expander.adi_c)),
        kind: V5Switch(AdiDigitalIn::new(expander.adi_d)),
        confirm: V5Switch(AdiDigitalIn::new(expander.adi_e)),
    };

    let chassis = Chassis::new(ChassisArgs {
        left_drive: drive_side(
            [peripherals.port_11, peripherals.port_12, peripherals.port_13],
            Direction::Forward,
        ),
        right_drive: drive_side(
            [peripherals.port_14, peripherals.port_15, peripherals.port_16],
            Direction::Reverse,
        ),
        intake: roller(peripherals.port_7),
        outtake: roller(peripherals.port_8),
        lift: V5Piston::new(peripherals.adi_g),
        hopper: V5Piston::new(peripherals.adi_f),
        cannon: V5Piston::new(peripherals.adi_e),
        config,
    });

    let mut screen = V5Screen::new(peripherals.display);
    let mut timer = V5Timer;
    let selection = AutonSelector::new(switches, config.selector)
        .select(&mut screen, &mut timer)
        .await;
    let routine = RoutineLibrary::embedded().resolve(selection.routine, &config.calibration);
    if let Err(e) = &routine {
        error!("selected routine unusable: {e}");
    }

    info!("waiting for competition control");
    Robot {
        arbiter: ControlLoopArbiter::new(
            chassis,
            V5Controller(peripherals.primary_controller),
            timer,
            selection,
            routine,
        ),
    }
    .compete()
    .await;
}
