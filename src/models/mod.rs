pub mod donation;
pub mod player;

pub use donation::*;
pub use player::*;
