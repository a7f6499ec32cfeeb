pub mod analysis;
pub mod daftar;
pub mod document;
pub mod health;
pub mod notification;
pub mod offer;
pub mod pitch;
pub mod scout;
pub mod user;
