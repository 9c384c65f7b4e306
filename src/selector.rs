//! Pre-match autonomous selection from the switch bank on the ADI expander.
//!
//! Four cycle switches step through the options of their field; the confirm
//! switch locks the selection for the rest of the program.
use alloc::format;

use log::{debug, info};

use crate::{
    config::SelectorConfig,
    hardware::{Font, Screen, Switch, Timer},
    routines::RoutineId,
};

/// A closed list of options cycled by one switch.
pub trait SelectionOption: Copy + PartialEq + 'static {
    const OPTIONS: &'static [Self];

    fn label(self) -> &'static str;

    fn index(self) -> usize {
        Self::OPTIONS.iter().position(|o| *o == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::OPTIONS[(self.index() + 1) % Self::OPTIONS.len()]
    }
}

macro_rules! selection_option {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl SelectionOption for $name {
            const OPTIONS: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::OPTIONS[0]
            }
        }
    };
}

selection_option!(Mode {
    Match => "Match",
    Skills => "Skills",
});

selection_option!(
    /// Alliance color, handed to routines that need color-specific steps.
    TeamColor {
        Red => "Red",
        Blue => "Blue",
    }
);

selection_option!(
    /// Starting tile side.
    Side {
        Left => "Left",
        Right => "Right",
    }
);

selection_option!(
    /// Which goals the match routine goes for.
    RoutineKind {
        Both => "Both",
        Long => "Long",
        Middle => "Middle",
    }
);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    Mode,
    Color,
    Side,
    Kind,
}

impl Field {
    /// Order in which switches are checked; the first one pressed wins the tick.
    pub const PRIORITY: [Field; 4] = [Field::Mode, Field::Color, Field::Side, Field::Kind];
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionCode {
    pub mode: Mode,
    pub color: TeamColor,
    pub side: Side,
    pub kind: RoutineKind,
}

impl SelectionCode {
    pub fn advance(&mut self, field: Field) {
        match field {
            Field::Mode => self.mode = self.mode.next(),
            Field::Color => self.color = self.color.next(),
            Field::Side => self.side = self.side.next(),
            Field::Kind => self.kind = self.kind.next(),
        }
    }

    /// Skills mode runs the skills routine whatever side and kind say.
    pub fn routine(&self) -> RoutineId {
        match self.mode {
            Mode::Skills => RoutineId::Skills,
            Mode::Match => RoutineId::Match(self.side, self.kind),
        }
    }
}

/// The frozen result of selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LockedSelection {
    pub code: SelectionCode,
    pub team_color: TeamColor,
    pub routine: RoutineId,
}

impl LockedSelection {
    pub fn lock(code: SelectionCode) -> Self {
        Self {
            code,
            team_color: code.color,
            routine: code.routine(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectorState {
    Selecting(SelectionCode),
    Locked(LockedSelection),
}

pub struct SelectorSwitches<S: Switch> {
    pub mode: S,
    pub color: S,
    pub side: S,
    pub kind: S,
    pub confirm: S,
}

impl<S: Switch> SelectorSwitches<S> {
    fn cycle_switch(&self, field: Field) -> &S {
        match field {
            Field::Mode => &self.mode,
            Field::Color => &self.color,
            Field::Side => &self.side,
            Field::Kind => &self.kind,
        }
    }
}

pub struct AutonSelector<S: Switch> {
    switches: SelectorSwitches<S>,
    config: SelectorConfig,
    state: SelectorState,
}

impl<S: Switch> AutonSelector<S> {
    pub fn new(switches: SelectorSwitches<S>, config: SelectorConfig) -> Self {
        Self {
            switches,
            config,
            state: SelectorState::Selecting(SelectionCode::default()),
        }
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    fn pressed_field(&self) -> Option<Field> {
        Field::PRIORITY
            .into_iter()
            .find(|&field| self.switches.cycle_switch(field).pressing())
    }

    // one physical press advances exactly once
    async fn wait_release(&self, field: Field, timer: &mut impl Timer) {
        while self.switches.cycle_switch(field).pressing() {
            timer.sleep(self.config.release_poll).await;
        }
    }

    /// Polls the switches until confirm is pressed, then locks the selection.
    ///
    /// Once locked, further calls return the same selection immediately.
    pub async fn select(
        &mut self,
        screen: &mut impl Screen,
        timer: &mut impl Timer,
    ) -> LockedSelection {
        let mut code = match self.state {
            SelectorState::Locked(locked) => return locked,
            SelectorState::Selecting(code) => code,
        };
        let mut last_rendered = None;

        while !self.switches.confirm.pressing() {
            if let Some(field) = self.pressed_field() {
                code.advance(field);
                debug!("{:?} switch advanced selection to {:?}", field, code);
                self.wait_release(field, timer).await;
            }

            if last_rendered != Some(code) {
                render_selection(screen, &code);
                last_rendered = Some(code);
            }
            self.state = SelectorState::Selecting(code);

            timer.sleep(self.config.tick).await;
        }

        let locked = LockedSelection::lock(code);
        render_locked(screen, &locked);
        info!(
            "auton locked: {} / {} / {} / {} -> {}",
            code.mode.label(),
            code.color.label(),
            code.side.label(),
            code.kind.label(),
            locked.routine.name()
        );
        self.state = SelectorState::Locked(locked);
        locked
    }
}

pub fn render_selection(screen: &mut impl Screen, code: &SelectionCode) {
    screen.clear();
    screen.set_font(Font::Mono20);
    screen.print(&format!("AUTON MODE: {}", code.mode.label()));
    screen.set_font(Font::Mono15);
    screen.print(&format!("TEAM COLOR: {}", code.color.label()));
    screen.print(&format!("AUTON SIDE: {}", code.side.label()));
    screen.print(&format!("AUTON TYPE: {}", code.kind.label()));
}

fn render_locked(screen: &mut impl Screen, locked: &LockedSelection) {
    let code = locked.code;
    screen.clear();
    screen.set_font(Font::Mono30);
    screen.print(&format!(
        "{} | {} | {}",
        code.mode.label(),
        code.side.label(),
        code.kind.label()
    ));
    screen.print("AUTON LOCKED");
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec::Vec};

    use super::*;
    use crate::{
        config::RobotConfig,
        sim::{self, SimClock, SimScreen, SimSwitch},
    };

    struct Bench {
        clock: SimClock,
        mode: SimSwitch,
        color: SimSwitch,
        side: SimSwitch,
        kind: SimSwitch,
        confirm: SimSwitch,
    }

    impl Bench {
        fn new() -> Self {
            let clock = SimClock::default();
            Self {
                mode: SimSwitch::new(&clock),
                color: SimSwitch::new(&clock),
                side: SimSwitch::new(&clock),
                kind: SimSwitch::new(&clock),
                confirm: SimSwitch::new(&clock),
                clock,
            }
        }

        fn run(self) -> (LockedSelection, SimScreen, AutonSelector<SimSwitch>) {
            let mut clock = self.clock;
            let mut screen = SimScreen::default();
            let mut selector = AutonSelector::new(
                SelectorSwitches {
                    mode: self.mode,
                    color: self.color,
                    side: self.side,
                    kind: self.kind,
                    confirm: self.confirm,
                },
                RobotConfig::breakthrough().selector,
            );
            let locked = sim::block_on(selector.select(&mut screen, &mut clock));
            (locked, screen, selector)
        }
    }

    #[test]
    fn options_cycle_back_to_start() {
        fn full_cycle<T: SelectionOption + core::fmt::Debug>() {
            let start = T::OPTIONS[0];
            let mut value = start;
            for _ in 0..T::OPTIONS.len() {
                value = value.next();
            }
            assert_eq!(value, start);
        }
        full_cycle::<Mode>();
        full_cycle::<TeamColor>();
        full_cycle::<Side>();
        full_cycle::<RoutineKind>();
        assert_eq!(RoutineKind::Middle.next(), RoutineKind::Both);
    }

    #[test]
    fn resolves_every_match_pair_and_skills() {
        let mut seen = Vec::new();
        for &side in Side::OPTIONS {
            for &kind in RoutineKind::OPTIONS {
                let code = SelectionCode {
                    side,
                    kind,
                    ..Default::default()
                };
                assert_eq!(code.routine(), RoutineId::Match(side, kind));
                seen.push(code.routine().name());

                let skills = SelectionCode {
                    mode: Mode::Skills,
                    ..code
                };
                assert_eq!(skills.routine(), RoutineId::Skills);
            }
        }
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn confirm_alone_locks_defaults() {
        let mut bench = Bench::new();
        bench.confirm = bench.confirm.press(0, 10_000);
        let (locked, screen, selector) = bench.run();

        assert_eq!(locked.code, SelectionCode::default());
        assert_eq!(locked.team_color, TeamColor::Red);
        assert_eq!(locked.routine, RoutineId::Match(Side::Left, RoutineKind::Both));
        assert_eq!(selector.state(), SelectorState::Locked(locked));
        assert_eq!(screen.last_frame(), ["Match | Left | Both", "AUTON LOCKED"]);
    }

    #[test]
    fn one_advance_per_press_and_release() {
        let mut bench = Bench::new();
        bench.kind = bench.kind.press(100, 900);
        bench.confirm = bench.confirm.press(1_000, 10_000);
        let (locked, _, _) = bench.run();

        assert_eq!(locked.code.kind, RoutineKind::Long);
        assert_eq!(locked.routine, RoutineId::Match(Side::Left, RoutineKind::Long));
        assert_eq!(locked.routine.name(), "left_long");
        assert_eq!(locked.team_color, TeamColor::Red);
    }

    #[test]
    fn mode_presses_wrap_around() {
        let mut bench = Bench::new();
        bench.mode = bench.mode.press(100, 150).press(300, 350);
        bench.confirm = bench.confirm.press(1_000, 10_000);
        let (locked, _, _) = bench.run();
        assert_eq!(locked.code.mode, Mode::Match);
    }

    #[test]
    fn skills_overrides_side_and_kind() {
        let mut bench = Bench::new();
        bench.mode = bench.mode.press(100, 150);
        bench.side = bench.side.press(300, 350);
        bench.kind = bench.kind.press(500, 550).press(700, 750);
        bench.color = bench.color.press(900, 950);
        bench.confirm = bench.confirm.press(1_200, 10_000);
        let (locked, screen, _) = bench.run();

        assert_eq!(locked.code.side, Side::Right);
        assert_eq!(locked.code.kind, RoutineKind::Middle);
        assert_eq!(locked.routine, RoutineId::Skills);
        assert_eq!(locked.team_color, TeamColor::Blue);
        assert_eq!(screen.last_frame(), ["Skills | Right | Middle", "AUTON LOCKED"]);
    }

    #[test]
    fn simultaneous_presses_follow_priority() {
        let mut bench = Bench::new();
        bench.color = bench.color.press(100, 200);
        bench.side = bench.side.press(100, 200);
        bench.confirm = bench.confirm.press(1_000, 10_000);
        let (locked, _, _) = bench.run();

        assert_eq!(locked.code.color, TeamColor::Blue);
        assert_eq!(locked.code.side, Side::Left);
    }

    #[test]
    fn renders_only_on_change() {
        let mut bench = Bench::new();
        bench.color = bench.color.press(100, 150).press(400, 450);
        bench.confirm = bench.confirm.press(2_000, 10_000);
        let (_, screen, _) = bench.run();

        let frames = screen.frames();
        // initial, two changes, locked banner
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0][0], (Font::Mono20, String::from("AUTON MODE: Match")));
        assert_eq!(frames[0][1], (Font::Mono15, String::from("TEAM COLOR: Red")));
        assert_eq!(frames[1][1].1, "TEAM COLOR: Blue");
        assert_eq!(frames[2][1].1, "TEAM COLOR: Red");
        assert_eq!(frames[3][0].0, Font::Mono30);
    }

    #[test]
    fn locked_selector_does_not_poll_again() {
        let mut bench = Bench::new();
        bench.confirm = bench.confirm.press(0, 100);
        bench.mode = bench.mode.press(200, 300);
        let (first, _, mut selector) = bench.run();

        let mut clock = SimClock::default();
        let again = sim::block_on(selector.select(&mut SimScreen::default(), &mut clock));
        assert_eq!(again, first);
        assert_eq!(clock.now(), core::time::Duration::ZERO);
    }
}
