pub mod shared;
pub mod vehicle_model;
