pub mod admin;
pub mod directory;
pub mod health;
pub mod login;
pub mod register;
pub mod root;
pub mod session;
