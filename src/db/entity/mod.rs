use chrono::{ SubsecRound, Utc };
use sea_orm::entity::prelude::DateTimeUtc;

pub mod token;
pub mod user;

pub use token::Entity as Token;
pub use user::Entity as User;

/// Current time at the precision Postgres stores (microseconds), so values
/// compared in memory match what round-trips through the database.
pub(crate) fn now() -> DateTimeUtc {
    Utc::now().trunc_subsecs(6)
}
