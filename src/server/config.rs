//! Site config routes

use axum::{extract::State, response::IntoResponse, Json};

use super::response::{no_store, ok, ok_with_message};
use super::AppState;
use crate::auth::AdminUser;
use crate::config::SiteConfig;
use crate::error::Result;

/// GET /api/config
pub(super) async fn get(State(state): State<AppState>) -> impl IntoResponse {
    (no_store(), ok(state.config.load()))
}

/// PUT /api/config
pub(super) async fn update(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(config): Json<SiteConfig>,
) -> Result<impl IntoResponse> {
    state.config.save(&config)?;
    // Feed titles and links come from the config
    state.feeds.cache().clear();
    Ok((no_store(), ok_with_message(config, "Config saved")))
}

/// POST /api/config/reset
pub(super) async fn reset(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let config = state.config.reset()?;
    state.feeds.cache().clear();
    Ok((no_store(), ok_with_message(config, "Config reset to defaults")))
}
