//! Price computation: annual resolution and bitcoin conversion.
//!
//! Both stages are pure functions over loaded rows; callers own caching.

pub mod annual;
pub mod convert;

pub use annual::*;
pub use convert::*;
