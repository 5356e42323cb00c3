pub mod config;
pub mod domain;
pub mod outbound;

pub use domain::account;
pub use domain::authorization;
pub use outbound::repositories;
