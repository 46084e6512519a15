//! Progress reporting for fan-out and debate execution

pub mod reporter;
