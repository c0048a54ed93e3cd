//! Process exit codes. Scripts and CI jobs depend on these values.

pub const SUCCESS: i32 = 0;
pub const ITEMS_FAILED: i32 = 1; // At least one item scored below min_confidence
pub const CONFIG_ERROR: i32 = 2; // Unreadable/invalid config or input, or judge setup failed
