pub mod taxonomy;
pub mod weights;

pub use taxonomy::Intent;
