pub mod cart_service;
pub mod order_service;
pub mod upload_service;
