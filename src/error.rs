use thiserror::Error;

/// A problem with a [crate::SimulationConfig].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("cell size must be positive, got {0}")]
    CellSize(f64),

    #[error("world of {width}x{height} is smaller than one {cell_size} cell")]
    WorldTooSmall {
        width: f64,
        height: f64,
        cell_size: f64,
    },

    #[error("max attempts must be at least 1")]
    NoAttempts,

    #[error("occupancy must lie in [0, 1], got {0}")]
    Occupancy(f64),

    #[error("vehicle {name} must be positive, got {value}")]
    Vehicle { name: &'static str, value: f64 },

    #[error("start position ({x}, {y}) lies outside the world")]
    StartOutsideWorld { x: f64, y: f64 },
}
