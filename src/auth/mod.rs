pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use middleware::{Actor, AuthenticatedUser};
