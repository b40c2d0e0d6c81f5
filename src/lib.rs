pub mod config;
pub mod detect;
pub mod error;
pub mod frame;
pub mod model;
pub mod pose;
pub mod render;
pub mod sched;
pub mod scope;
pub mod source;

pub use error::{Error, Result};
