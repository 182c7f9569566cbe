mod common;
mod model_create;
mod model_delete;
mod model_read;
mod model_update;
