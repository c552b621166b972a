#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod expr;
pub mod model;
pub mod scoring;
pub mod time;

pub use error::Error;
pub use time::{Clock, Countup};
