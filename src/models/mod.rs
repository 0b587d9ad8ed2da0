pub mod contestant;
pub mod league;
pub mod pick;
pub mod profile;
pub mod schema;
pub mod user;
pub mod week;
