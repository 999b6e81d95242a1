pub mod health;
pub mod parts;

pub use health::*;
pub use parts::*;
