//! Infrastructure configuration modules.

pub mod betting;
pub mod logging;
pub mod settings;

pub use settings::Config;
