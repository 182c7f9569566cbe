pub mod assets;
pub mod vehicle_model;
