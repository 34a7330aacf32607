//! Request handlers.

pub mod health;
pub mod presets;
pub mod weather;

pub use health::*;
pub use presets::*;
pub use weather::*;
