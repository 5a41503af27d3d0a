pub mod creative;
pub mod platform;
pub mod product;
pub mod record;
pub mod result;
