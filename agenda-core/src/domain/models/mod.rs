mod appointment;
mod calendar;
mod client;
mod ids;
mod money;
mod reminder;
mod status;

pub use appointment::*;
pub use calendar::*;
pub use client::*;
pub use ids::*;
pub use money::*;
pub use reminder::*;
pub use status::*;
