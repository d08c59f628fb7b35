pub mod activity;
pub mod cart;
pub mod registration;
