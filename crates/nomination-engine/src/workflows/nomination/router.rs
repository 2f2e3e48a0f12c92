use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{BulkCostUpdate, NewNomination, NominationId, VendorId};
use super::fields::{FieldSet, FieldUpdate};
use super::repository::{NominationRepository, RepositoryError};
use super::service::{NominationService, NominationServiceError};

/// Router builder exposing nomination lifecycle, cost and field-mapping endpoints.
pub fn nomination_router<R>(service: Arc<NominationService<R>>) -> Router
where
    R: NominationRepository + 'static,
{
    Router::new()
        .route("/api/v1/nominations", post(create_handler::<R>))
        .route(
            "/api/v1/nominations/:nomination_id",
            get(get_handler::<R>).delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/nominations/:nomination_id/complete",
            post(complete_handler::<R>),
        )
        .route(
            "/api/v1/nominations/:nomination_id/baseline",
            patch(baseline_handler::<R>),
        )
        .route(
            "/api/v1/nominations/:nomination_id/vendors/:vendor_id",
            axum::routing::delete(remove_vendor_handler::<R>),
        )
        .route(
            "/api/v1/nominations/:nomination_id/vendors/:vendor_id/cost",
            put(cost_handler::<R>),
        )
        .route(
            "/api/v1/nominations/:nomination_id/vendors/:vendor_id/rating",
            patch(rating_handler::<R>),
        )
        .route(
            "/api/v1/nominations/:nomination_id/cost-data/bulk",
            post(bulk_handler::<R>),
        )
        .route(
            "/api/v1/nominations/:nomination_id/ranking",
            get(ranking_handler::<R>),
        )
        .route(
            "/api/v1/nominations/:nomination_id/capability",
            get(capability_handler::<R>),
        )
        .route("/api/v1/fields/:field_set/map", post(map_fields_handler))
        .route(
            "/api/v1/fields/:field_set/validate",
            post(validate_fields_handler),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<NominationService<R>>>,
    axum::Json(request): axum::Json<NewNomination>,
) -> Response
where
    R: NominationRepository + 'static,
{
    respond(StatusCode::CREATED, service.create(request))
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<NominationService<R>>>,
    Path(nomination_id): Path<String>,
) -> Response
where
    R: NominationRepository + 'static,
{
    respond(StatusCode::OK, service.get(&NominationId(nomination_id)))
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<NominationService<R>>>,
    Path(nomination_id): Path<String>,
) -> Response
where
    R: NominationRepository + 'static,
{
    match service.delete(&NominationId(nomination_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn complete_handler<R>(
    State(service): State<Arc<NominationService<R>>>,
    Path(nomination_id): Path<String>,
) -> Response
where
    R: NominationRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.complete(&NominationId(nomination_id)),
    )
}

pub(crate) async fn baseline_handler<R>(
    State(service): State<Arc<NominationService<R>>>,
    Path(nomination_id): Path<String>,
    axum::Json(patch): axum::Json<FieldUpdate>,
) -> Response
where
    R: NominationRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.update_baseline(&NominationId(nomination_id), &patch),
    )
}

pub(crate) async fn cost_handler<R>(
    State(service): State<Arc<NominationService<R>>>,
    Path((nomination_id, vendor_id)): Path<(String, String)>,
    axum::Json(update): axum::Json<FieldUpdate>,
) -> Response
where
    R: NominationRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.upsert_submission(
            &NominationId(nomination_id),
            &VendorId(vendor_id),
            &update,
        ),
    )
}

pub(crate) async fn remove_vendor_handler<R>(
    State(service): State<Arc<NominationService<R>>>,
    Path((nomination_id, vendor_id)): Path<(String, String)>,
) -> Response
where
    R: NominationRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.remove_submission(&NominationId(nomination_id), &VendorId(vendor_id)),
    )
}

pub(crate) async fn rating_handler<R>(
    State(service): State<Arc<NominationService<R>>>,
    Path((nomination_id, vendor_id)): Path<(String, String)>,
    axum::Json(update): axum::Json<FieldUpdate>,
) -> Response
where
    R: NominationRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.update_vendor_rating(
            &NominationId(nomination_id),
            &VendorId(vendor_id),
            &update,
        ),
    )
}

pub(crate) async fn bulk_handler<R>(
    State(service): State<Arc<NominationService<R>>>,
    Path(nomination_id): Path<String>,
    axum::Json(request): axum::Json<BulkCostUpdate>,
) -> Response
where
    R: NominationRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.bulk_update_cost_data(&NominationId(nomination_id), &request),
    )
}

pub(crate) async fn ranking_handler<R>(
    State(service): State<Arc<NominationService<R>>>,
    Path(nomination_id): Path<String>,
) -> Response
where
    R: NominationRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.ranked_results(&NominationId(nomination_id)),
    )
}

pub(crate) async fn capability_handler<R>(
    State(service): State<Arc<NominationService<R>>>,
    Path(nomination_id): Path<String>,
) -> Response
where
    R: NominationRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.capability_data(&NominationId(nomination_id)),
    )
}

pub(crate) async fn map_fields_handler(
    Path(field_set): Path<String>,
    axum::Json(update): axum::Json<FieldUpdate>,
) -> Response {
    match FieldSet::from_slug(&field_set) {
        Some(set) => {
            let mapped = set.registry().map(&update);
            (StatusCode::OK, axum::Json(mapped)).into_response()
        }
        None => unknown_field_set(&field_set),
    }
}

pub(crate) async fn validate_fields_handler(
    Path(field_set): Path<String>,
    axum::Json(update): axum::Json<FieldUpdate>,
) -> Response {
    match FieldSet::from_slug(&field_set) {
        Some(set) => {
            let report = set.registry().validate(&update);
            (StatusCode::OK, axum::Json(report)).into_response()
        }
        None => unknown_field_set(&field_set),
    }
}

fn unknown_field_set(slug: &str) -> Response {
    let payload = json!({
        "error": format!("unknown field set {slug}"),
    });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

fn respond<T: Serialize>(
    status: StatusCode,
    result: Result<T, NominationServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) fn status_for(error: &NominationServiceError) -> StatusCode {
    match error {
        NominationServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        NominationServiceError::Closed(_) => StatusCode::CONFLICT,
        NominationServiceError::UnknownVendor { .. }
        | NominationServiceError::ForeignNomination { .. }
        | NominationServiceError::DuplicateVendor(_)
        | NominationServiceError::MissingProjectReference
        | NominationServiceError::InvalidFields { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        NominationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        NominationServiceError::Repository(
            RepositoryError::Conflict | RepositoryError::StaleRevision { .. },
        ) => StatusCode::CONFLICT,
        NominationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn error_response(error: &NominationServiceError) -> Response {
    let payload = match error {
        NominationServiceError::InvalidFields { scope, defects } => json!({
            "error": error.to_string(),
            "scope": scope,
            "defects": defects,
        }),
        _ => json!({
            "error": error.to_string(),
        }),
    };
    (status_for(error), axum::Json(payload)).into_response()
}
