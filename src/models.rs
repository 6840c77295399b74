pub mod auth;
pub mod calendar;
pub mod chat;
pub mod documents;
pub mod lifecycle;
pub mod rbac;
pub mod tenancy;
pub mod tickets;
