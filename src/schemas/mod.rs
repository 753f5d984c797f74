pub mod gamification;
pub mod guest;
pub mod invite;

pub use gamification::*;
pub use guest::*;
pub use invite::*;
