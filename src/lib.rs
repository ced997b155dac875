pub mod clock;
pub mod config;
pub mod domain;
pub mod driver;
pub mod error;
pub mod event;
pub mod fake_source;
pub mod identity;
pub mod synth;

pub mod kafka;

pub use config::{Args, Config, Mode};
pub use driver::{Driver, RunSummary};
pub use error::{Error, Result};
