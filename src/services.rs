pub mod auth;
pub mod calendar_service;
pub mod chat_service;
pub mod completion;
pub mod document_service;
pub mod lifecycle_service;
pub mod ticket_service;
