pub mod api;
pub mod food;
pub mod purchase;
pub mod session;
pub mod user;
