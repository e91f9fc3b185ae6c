mod alerts;
mod clock;
mod repository;

pub use alerts::*;
pub use clock::*;
pub use repository::*;
