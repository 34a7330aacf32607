//! Preset registry handler.

use axum::extract::State;
use axum::Json;
use tracing::warn;

use bw_models::{fallback_presets, Preset};
use bw_storage::load_presets_or_fallback;

use crate::state::AppState;

/// List the pre-generated presets, or the built-in list if the registry
/// cannot be read.
pub async fn get_presets(State(state): State<AppState>) -> Json<Vec<Preset>> {
    let Some(store) = &state.store else {
        return Json(fallback_presets());
    };

    match tokio::time::timeout(
        state.config.request_timeout,
        load_presets_or_fallback(store.as_ref()),
    )
    .await
    {
        Ok(presets) => Json(presets),
        Err(_) => {
            warn!("Timed out reading presets (using fallback)");
            Json(fallback_presets())
        }
    }
}
