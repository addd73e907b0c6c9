pub mod assistant;
pub mod auth;
pub mod facilities;
pub mod health;
pub mod incidents;
pub mod processes;
pub mod users;
