// Services module - business logic layer

pub mod cart_manager;

pub use cart_manager::CartManager;
