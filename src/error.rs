use thiserror::Error;

/// Fatal errors raised while resolving or running an autonomous routine.
///
/// None of these are recoverable at runtime: they mean the calibration
/// table or the routine library disagree with the code that uses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RobotError {
    #[error("no calibration entry for {speed}% drive speed")]
    UnknownCalibrationSpeed { speed: u8 },
    #[error("no routine named `{name}` is embedded in the library")]
    UnresolvedRoutine { name: &'static str },
    #[error("embedded routine `{name}` could not be decoded")]
    CorruptRoutine { name: &'static str },
}
