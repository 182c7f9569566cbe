use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::entity::vehicle_model;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MODEL_CREATE, MODEL_DELETE, MODEL_EDIT};
use crate::ingest::Ingestor;
use crate::ingest::upload::receive_form;
use crate::models::vehicle_model::*;
use crate::repository::lookup::{self, LookupNames};
use crate::repository::vehicle_model::{self as repo, ModelFilter, ModelRecord};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Models",
    operation_id = "publishModel",
    summary = "Publish a new model",
    description = "Creates a model with its colors, variants, dealer sites, about blocks and specification tree from one multipart form. Uploaded images are stored first; the database work runs in a single transaction. Requires `model:create` permission.",
    request_body(content = ModelFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Model published", body = OutcomeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Unknown vehicle type, category or brand (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Model name already used for this brand (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn publish_model(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission(MODEL_CREATE)?;
    lookup::ensure_author(&state.db, auth_user.user_id, &auth_user.username).await?;

    let form = receive_form(
        multipart,
        state.store.as_ref(),
        state.config.storage.max_upload_size,
    )
    .await?;
    let id = Ingestor::from_state(&state)
        .publish(&form, auth_user.user_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OutcomeResponse::new(id, "Model published successfully!")),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Models",
    operation_id = "updateModel",
    summary = "Update a model",
    description = "Overwrites the model attributes and replaces every section whose submitted entries differ from the stored ones. Sections with no fields in the form are left unchanged. Images that are not re-uploaded are kept. Requires `model:edit` permission.",
    params(("id" = i32, Path, description = "Model ID")),
    request_body(content = ModelFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Model updated", body = OutcomeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Model or lookup not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Model name already used for this brand (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id, user_id = auth_user.user_id))]
pub async fn update_model(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<OutcomeResponse>, AppError> {
    auth_user.require_permission(MODEL_EDIT)?;
    lookup::ensure_author(&state.db, auth_user.user_id, &auth_user.username).await?;

    let form = receive_form(
        multipart,
        state.store.as_ref(),
        state.config.storage.max_upload_size,
    )
    .await?;
    Ingestor::from_state(&state)
        .update(id, &form, auth_user.user_id)
        .await?;

    Ok(Json(OutcomeResponse::new(id, "Model updated successfully!")))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Models",
    operation_id = "deleteModel",
    summary = "Delete a model",
    description = "Deletes the model, every row it owns and every image those rows referenced. Files are removed only after the transaction commits. Requires `model:delete` permission.",
    params(("id" = i32, Path, description = "Model ID")),
    responses(
        (status = 200, description = "Model deleted", body = OutcomeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Model not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_model(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OutcomeResponse>, AppError> {
    auth_user.require_permission(MODEL_DELETE)?;

    Ingestor::from_state(&state).delete(id).await?;

    Ok(Json(OutcomeResponse::new(id, "Model deleted successfully.")))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Models",
    operation_id = "getModel",
    summary = "Get a model with its full detail tree",
    params(("id" = i32, Path, description = "Model ID")),
    responses(
        (status = 200, description = "Model details", body = ModelDetailResponse),
        (status = 404, description = "Model not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ModelDetailResponse>, AppError> {
    let record = repo::get_model_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Model {id} not found")))?;
    let details = repo::get_model_details(&state.db, id).await?;

    Ok(Json(ModelDetailResponse::new(record, details)))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Models",
    operation_id = "listModels",
    summary = "List models",
    description = "Returns all models matching the optional filters, newest first, with the names of their vehicle type, category, brand and author.",
    params(ModelListQuery),
    responses(
        (status = 200, description = "Models", body = Vec<ModelSummary>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ModelListQuery>,
) -> Result<Json<Vec<ModelSummary>>, AppError> {
    let filter = ModelFilter {
        vehicle_type_id: query.vehicle_type_id,
        brand_id: query.brand_id,
        category_id: query.category_id,
        status: query.status,
    };
    let models = repo::list_models(&state.db, filter).await?;
    summaries(&state, models).await
}

#[utoipa::path(
    get,
    path = "/popular",
    tag = "Models",
    operation_id = "popularModels",
    summary = "Newest listed models",
    params(PopularQuery),
    responses(
        (status = 200, description = "Models", body = Vec<ModelSummary>),
    ),
)]
#[instrument(skip(state, query))]
pub async fn popular_models(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> Result<Json<Vec<ModelSummary>>, AppError> {
    let models = repo::popular_models(&state.db, query.limit()).await?;
    summaries(&state, models).await
}

#[utoipa::path(
    get,
    path = "/{id}/models",
    tag = "Models",
    operation_id = "brandModels",
    summary = "Listed models of a brand",
    description = "Electric models first, then by ascending starting price.",
    params(("id" = i32, Path, description = "Brand ID")),
    responses(
        (status = 200, description = "Models", body = Vec<ModelSummary>),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn brand_models(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ModelSummary>>, AppError> {
    let models = repo::models_by_brand(&state.db, id).await?;
    summaries(&state, models).await
}

#[utoipa::path(
    get,
    path = "/{id}/models",
    tag = "Models",
    operation_id = "categoryModels",
    summary = "All models of a category",
    description = "Electric models first, then by ascending starting price.",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Models", body = Vec<ModelSummary>),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn category_models(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ModelSummary>>, AppError> {
    let models = repo::models_by_category(&state.db, id).await?;
    summaries(&state, models).await
}

#[utoipa::path(
    get,
    path = "/form-options",
    tag = "Models",
    operation_id = "modelFormOptions",
    summary = "Choices for the model form",
    description = "Vehicle types, categories and brands, each ordered by name. Requires any `model:*` permission.",
    responses(
        (status = 200, description = "Form options", body = FormOptionsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn form_options(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<FormOptionsResponse>, AppError> {
    auth_user.require_any_permission(&[MODEL_CREATE, MODEL_EDIT, MODEL_DELETE])?;

    let options = lookup::form_options(&state.db).await?;
    Ok(Json(options.into()))
}

/// Body limit for the multipart model routes (128MB).
pub fn model_form_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(128 * 1024 * 1024)
}

async fn summaries(
    state: &AppState,
    models: Vec<vehicle_model::Model>,
) -> Result<Json<Vec<ModelSummary>>, AppError> {
    let names = LookupNames::load(&state.db, &models).await?;
    Ok(Json(
        models
            .into_iter()
            .map(|m| ModelRecord::with_names(m, &names).into())
            .collect(),
    ))
}
