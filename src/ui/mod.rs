//! Operator-facing output
//!
//! Step lines for the CI log, with `cliclack` styling when attached to a
//! terminal (e.g. running `buildcache list` by hand on the cache host).

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    key_value, remark, step_error_detail, step_info, step_ok_detail, step_warn, step_warn_hint,
};
pub use progress::TaskSpinner;
