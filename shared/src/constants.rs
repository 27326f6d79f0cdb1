pub const TARGET_VALUE: i64 = 67;

pub const DEFAULT_ROWS: usize = 6;
pub const DEFAULT_COLS: usize = 7;

pub const DEFAULT_OPERATOR_PROBABILITY: f64 = 0.67;
pub const DEFAULT_TILES_PER_TURN: usize = 2;

pub const DEFAULT_LOWER_BOUND: i64 = -1000;
pub const DEFAULT_UPPER_BOUND: i64 = 1000;
