pub mod about_content;
pub mod available_site;
pub mod brand;
pub mod category;
pub mod exterior_color;
pub mod exterior_color_image;
pub mod interior_color;
pub mod interior_color_image;
pub mod spec_content;
pub mod specification;
pub mod specification_list;
pub mod user;
pub mod variant;
pub mod vehicle_model;
pub mod vehicle_type;
