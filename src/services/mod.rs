pub mod activity_service;
pub mod capacity;
pub mod cart_service;
pub mod error;
pub mod interaction_service;
pub mod registration_service;
pub mod schedule;
