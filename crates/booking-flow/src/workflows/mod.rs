pub mod booking;
pub mod fleet;
