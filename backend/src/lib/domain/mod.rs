pub mod account;
pub mod admin;
pub mod authorization;
pub mod project;
pub mod session;
