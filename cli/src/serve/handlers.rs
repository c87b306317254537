use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc};
use tracing::info;

use records::{RecordSet, User};

use super::state::{AppState, ServeError};

/// Fields posted by the add and edit forms. Missing fields come through
/// empty so the store reports which one is required.
#[derive(Debug, Deserialize, Default)]
pub(crate) struct UserForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
}

impl From<UserForm> for User {
    fn from(form: UserForm) -> Self {
        User::new(form.username, form.id, form.name, form.description)
    }
}

pub(crate) async fn home_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match state.render_home(None).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => e.into_response(),
    }
}

pub(crate) async fn list_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<RecordSet>, ServeError> {
    Ok(Json(state.with_store(|store| store.list()).await?))
}

pub(crate) async fn user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<User>, ServeError> {
    Ok(Json(
        state.with_store(move |store| store.get(&username)).await?,
    ))
}

pub(crate) async fn add_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<UserForm>,
) -> Response {
    info!(username = %form.username, "add");

    let user: User = form.into();
    let outcome = state
        .with_store(move |store| store.create(user))
        .await
        .map(|user| format!("User {} added successfully", user.username));

    state.render_outcome(outcome).await
}

pub(crate) async fn edit_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(username): Path<String>,
    Form(form): Form<UserForm>,
) -> Response {
    info!(%username, "edit");

    let user: User = form.into();
    let outcome = state
        .with_store(move |store| store.update(&username, user))
        .await
        .map(|user| format!("User {} updated successfully", user.username));

    state.render_outcome(outcome).await
}

pub(crate) async fn delete_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(username): Path<String>,
) -> Response {
    info!(%username, "delete");

    let outcome = state
        .with_store(move |store| store.delete(&username))
        .await
        .map(|user| format!("User {} deleted", user.username));

    state.render_outcome(outcome).await
}

pub(crate) async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HashMap::<String, String>::new()))
}
