pub mod gamification;
pub mod guest;
pub mod invite;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::gamification::{self, Entity as Gamification};
    pub use super::guest::{self, Entity as Guest};
    pub use super::invite::{self, Entity as Invite};
}
