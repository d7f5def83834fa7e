pub mod battery;
pub mod record;
pub mod sample;
pub mod simulator;
pub mod summary;
