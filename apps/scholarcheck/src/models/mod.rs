pub mod admin;
pub mod scholarship;
pub mod user;
