pub mod dto;
pub mod entity;
pub mod handler;
pub mod mailer;
pub mod service;
pub mod template;
pub mod worker;
