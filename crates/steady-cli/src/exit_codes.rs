//! Exit codes for `steady`.
//! These codes are part of the public contract; CI scripts branch on them.

pub const SUCCESS: i32 = 0;
pub const UNSETTLED: i32 = 1; // A target was exhausted or failed on its own
pub const CONFIG_ERROR: i32 = 2; // Bad config, or a batch-wide failure stopped the run
