pub mod notification;
pub mod notification_delivery;
