/// Lower bound for the request timeout
pub const MIN_TIMEOUT_SECS: u64 = 1;

/// Upper bound for the request timeout. Invoice uploads are the slowest calls.
pub const MAX_TIMEOUT_SECS: u64 = 300;

pub const VALID_LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];
