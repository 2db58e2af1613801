//! Library surface behind the `relay-api` binary, split out so integration tests can drive
//! the actix-web service directly instead of only hitting it over a real socket.

pub mod dto;
pub mod handlers;
pub mod problems;
pub mod state;
pub mod validators;
