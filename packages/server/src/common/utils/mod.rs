pub mod coords;
pub mod text;

pub use coords::*;
pub use text::*;
