pub mod dto;
pub mod entity;
pub mod handler;
pub mod insight;
pub mod service;
