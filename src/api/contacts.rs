/// Contact CRUD endpoints
use crate::{
    auth::AuthUser,
    contacts::{ContactView, SortKey},
    context::AppContext,
    error::ApiResult,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

/// Build contact routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    sort_by: Option<String>,
}

/// Contact create/update request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// List contacts, ordered by the requested sort key
async fn list_contacts(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<ContactView>>> {
    let sort = SortKey::from_query(query.sort_by.as_deref());
    let contacts = ctx.contacts.list(user.id, sort).await?;

    Ok(Json(contacts))
}

/// Fetch a single contact
async fn get_contact(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<ContactView>> {
    let contact = ctx.contacts.get(user.id, id).await?;

    Ok(Json(contact))
}

/// Create a contact
async fn create_contact(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Json(req): Json<ContactRequest>,
) -> ApiResult<(StatusCode, Json<ContactView>)> {
    let contact = ctx
        .contacts
        .create(user.id, &req.first_name, &req.last_name, &req.phone_number)
        .await?;

    Ok((StatusCode::CREATED, Json(contact)))
}

/// Update a contact
async fn update_contact(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<StatusCode> {
    ctx.contacts
        .update(user.id, id, &req.first_name, &req.last_name, &req.phone_number)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a contact
async fn delete_contact(
    State(ctx): State<AppContext>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    ctx.contacts.delete(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
