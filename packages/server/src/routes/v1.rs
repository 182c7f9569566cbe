use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/models", model_routes())
        .nest("/brands", brand_routes())
        .nest("/categories", category_routes())
}

fn model_routes() -> OpenApiRouter<AppState> {
    let reads = OpenApiRouter::new()
        .routes(routes!(handlers::vehicle_model::popular_models))
        .routes(routes!(handlers::vehicle_model::form_options));

    let forms = OpenApiRouter::new()
        .routes(routes!(
            handlers::vehicle_model::list_models,
            handlers::vehicle_model::publish_model
        ))
        .routes(routes!(
            handlers::vehicle_model::get_model,
            handlers::vehicle_model::update_model,
            handlers::vehicle_model::delete_model
        ))
        .layer(handlers::vehicle_model::model_form_body_limit());

    reads.merge(forms)
}

fn brand_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::vehicle_model::brand_models))
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::vehicle_model::category_models))
}
