use crate::error::RobotError;

/// Linear correction measured for one drive speed tier.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CalibrationEntry {
    pub speed: u8,
    pub scale: f64,
    pub offset: f64,
}

impl CalibrationEntry {
    pub const fn identity(speed: u8) -> Self {
        Self {
            speed,
            scale: 1.0,
            offset: 0.0,
        }
    }
}

/// Straight-drive corrections, one entry per discrete speed tier.
///
/// Lookups are exact: corrections are measured per tier on the field and are
/// never interpolated between tiers.
#[derive(Copy, Clone, Debug)]
pub struct CalibrationTable {
    entries: &'static [CalibrationEntry],
}

// (scale, offset) per speed, fitted as measured = scale * requested + offset
pub const DRIVE_CORRECTIONS: &[CalibrationEntry] = &[
    CalibrationEntry::identity(100),
    CalibrationEntry::identity(75),
    CalibrationEntry::identity(50),
    CalibrationEntry::identity(25),
];

impl CalibrationTable {
    pub const fn new(entries: &'static [CalibrationEntry]) -> Self {
        Self { entries }
    }

    pub fn entry(&self, speed: u8) -> Option<&CalibrationEntry> {
        self.entries.iter().find(|e| e.speed == speed)
    }

    pub fn speeds(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.iter().map(|e| e.speed)
    }

    /// Distance to command so the robot actually covers `distance` at `speed`.
    pub fn correct(&self, distance: f64, speed: u8) -> Result<f64, RobotError> {
        let entry = self
            .entry(speed)
            .ok_or(RobotError::UnknownCalibrationSpeed { speed })?;
        Ok((distance - entry.offset) / entry.scale)
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::new(DRIVE_CORRECTIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn shipped_table_is_identity() {
        let table = CalibrationTable::default();
        for speed in [100, 75, 50, 25] {
            for d in [-24.0, 0.0, 6.0, 32.0, 50.9117] {
                assert_eq!(table.correct(d, speed), Ok(d));
            }
        }
    }

    #[test]
    fn unmapped_speed_is_rejected() {
        let table = CalibrationTable::default();
        for speed in [0, 1, 24, 26, 60, 99, 101, 255] {
            assert_eq!(
                table.correct(12.0, speed),
                Err(RobotError::UnknownCalibrationSpeed { speed })
            );
        }
    }

    #[test]
    fn correction_removes_offset_then_scale() {
        static MEASURED: &[CalibrationEntry] = &[CalibrationEntry {
            speed: 100,
            scale: 1.25,
            offset: 2.0,
        }];
        let table = CalibrationTable::new(MEASURED);
        assert_relative_eq!(table.correct(32.0, 100).unwrap(), 24.0);
        assert!(table.correct(32.0, 75).is_err());
    }

    #[test]
    fn speeds_lists_every_tier() {
        let table = CalibrationTable::default();
        let mut speeds: alloc::vec::Vec<u8> = table.speeds().collect();
        speeds.sort_unstable();
        assert_eq!(speeds, [25, 50, 75, 100]);
    }
}
