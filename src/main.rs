#![cfg_attr(target_os = "vexos", no_std, no_main)]

#[cfg(target_os = "vexos")]
extern crate alloc;

mod logger;
#[cfg(target_os = "vexos")]
mod v5;

use log::LevelFilter;

#[cfg(target_os = "vexos")]
#[vexide::main]
async fn main(peripherals: vexide::prelude::Peripherals) {
    let _ = logger::init(LevelFilter::Info);
    v5::run(peripherals).await;
}

/// Host build: plays every embedded routine against simulated hardware and
/// reports what each one would do.
#[cfg(not(target_os = "vexos"))]
fn main() {
    use breakthrough::{
        config::RobotConfig,
        routines::{RoutineId, RoutineLibrary},
        selector::TeamColor,
        sim::{self, SimClock},
    };
    use log::{error, info};

    let _ = logger::init(LevelFilter::Debug);
    let config = RobotConfig::breakthrough();
    let library = RoutineLibrary::embedded();
    let mut failures = 0;

    for id in RoutineId::ALL {
        let routine = match library.resolve(id, &config.calibration) {
            Ok(routine) => routine,
            Err(e) => {
                error!("{}: {e}", id.name());
                failures += 1;
                continue;
            }
        };
        for color in [TeamColor::Red, TeamColor::Blue] {
            let (mut chassis, rig) = sim::chassis(config);
            let mut clock = SimClock::default();
            match sim::block_on(chassis.run_plan(&routine.steps, color, &mut clock)) {
                Ok(()) => info!(
                    "{} ({:?}): {} device calls, {:?} waiting, left {:.3} / right {:.3} turns",
                    id.name(),
                    color,
                    rig.journal().len(),
                    clock.now(),
                    rig.left_drive.commanded_rotations(),
                    rig.right_drive.commanded_rotations(),
                ),
                Err(e) => {
                    error!("{} ({:?}): {e}", id.name(), color);
                    failures += 1;
                }
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}
