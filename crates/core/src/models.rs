pub mod appointment;
pub mod availability;
pub mod caller;
pub mod service;
pub mod time_range;
pub mod time_slot;
