pub mod demo;
pub mod statusline;
pub mod usage;

pub use demo::*;
pub use statusline::*;
pub use usage::*;
