pub mod cart;
pub mod errors;
pub mod order;
pub mod page;
pub mod ports;
