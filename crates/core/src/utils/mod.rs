//! Small helpers used by callers of the request layer

pub mod throttle;
