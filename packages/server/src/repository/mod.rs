pub mod lookup;
pub mod vehicle_model;
