//! Core library for `timetabler`
//! Model-building pipeline shared by the CLI and integration tests

pub mod core;
pub mod shared;

pub use self::core::*;
