use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{error, info};

use records::{RecordStore, StoreError};

use crate::text::{Flash, Renderer};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Rendering failed")]
    Render(#[from] tera::Error),
    #[error("Store task failed")]
    Join(#[from] JoinError),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::Store(StoreError::Validation { .. }) => StatusCode::BAD_REQUEST,
            ServeError::Store(StoreError::Rename(..)) => StatusCode::BAD_REQUEST,
            ServeError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            ServeError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to show to whoever made the request. Server side failures
    /// are logged in full and summarized.
    pub fn user_message(&self) -> String {
        match self {
            ServeError::Store(e) if e.is_client_error() => e.to_string(),
            ServeError::Store(StoreError::Storage(_)) => {
                "Saving users failed, changes may not have been stored".to_owned()
            }
            _ => "Something went wrong".to_owned(),
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }

        let error_response = serde_json::json!({
            "status": "fail",
            "message": self.user_message(),
        });

        (status, Json(error_response)).into_response()
    }
}

pub struct AppState {
    pub store: Arc<RecordStore>,
    pub renderer: Renderer,
}

impl AppState {
    pub fn new(store: RecordStore) -> Result<Self, ServeError> {
        Ok(Self {
            store: Arc::new(store),
            renderer: Renderer::new()?,
        })
    }

    /// Runs blocking store work off the async runtime.
    pub async fn with_store<T, F>(&self, work: F) -> Result<T, ServeError>
    where
        F: FnOnce(&RecordStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();

        Ok(tokio::task::spawn_blocking(move || work(&store)).await??)
    }

    pub async fn render_home(&self, flash: Option<Flash>) -> Result<String, ServeError> {
        let users = self.with_store(|store| store.users()).await?;

        Ok(self.renderer.render_home(&users, flash.as_ref())?)
    }

    /// Re-renders the home page with the outcome of a form submission.
    pub async fn render_outcome(&self, outcome: Result<String, ServeError>) -> Response {
        let (status, flash) = match outcome {
            Ok(message) => {
                info!(%message, "done");
                (StatusCode::OK, Flash::success(message))
            }
            Err(e) => {
                let status = e.status();
                if status.is_server_error() {
                    error!(error = ?e, "request failed");
                } else {
                    info!(error = %e, "rejected");
                }
                (status, Flash::error(e.user_message()))
            }
        };

        match self.render_home(Some(flash)).await {
            Ok(html) => (status, axum::response::Html(html)).into_response(),
            Err(e) => e.into_response(),
        }
    }
}
