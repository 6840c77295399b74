pub mod admin;
pub mod auth;
pub mod calendar;
pub mod chat;
pub mod documents;
pub mod tickets;
