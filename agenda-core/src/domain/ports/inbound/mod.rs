mod agenda;

pub use agenda::*;
