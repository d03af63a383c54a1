//! Adapter and token-list handlers

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use bridge_service::TokenListGenerationReport;
use bridge_types::TokenListEntry;
use tracing::{debug, info};

use crate::handlers::common::{api_error, ApiError};
use crate::models::{AdapterResponse, AdaptersResponse};
use crate::state::AppState;

/// GET /api/v1/adapters - Registered adapters and their capabilities
pub async fn get_adapters(State(state): State<AppState>) -> Json<AdaptersResponse> {
	let adapters: Vec<AdapterResponse> = state
		.aggregator_service
		.adapter_registry()
		.all()
		.iter()
		.map(|adapter| AdapterResponse {
			info: adapter.adapter_info().clone(),
			capabilities: adapter.capabilities(),
		})
		.collect();
	debug!("Listing {} adapters", adapters.len());

	Json(AdaptersResponse {
		total_adapters: adapters.len(),
		adapters,
		cached_token_lists: state.aggregator_service.token_cache().cached_adapter_ids(),
	})
}

/// GET /api/v1/adapters/{id}/tokens - Cached token list for one adapter
pub async fn get_adapter_tokens(
	State(state): State<AppState>,
	Path(adapter_id): Path<String>,
) -> Result<Json<TokenListEntry>, ApiError> {
	if !state
		.aggregator_service
		.adapter_registry()
		.contains(&adapter_id)
	{
		return Err(api_error(
			StatusCode::NOT_FOUND,
			"ADAPTER_NOT_FOUND",
			format!("Adapter {} not found", adapter_id),
		));
	}

	state
		.aggregator_service
		.token_cache()
		.entry(&adapter_id)
		.map(Json)
		.ok_or_else(|| {
			api_error(
				StatusCode::NOT_FOUND,
				"TOKEN_LIST_NOT_FOUND",
				format!("No token list cached for adapter {}", adapter_id),
			)
		})
}

/// POST /api/v1/token-lists/refresh - Regenerate every adapter's token list now
pub async fn post_refresh_token_lists(
	State(state): State<AppState>,
) -> Json<TokenListGenerationReport> {
	info!("Token list refresh requested");
	Json(state.aggregator_service.generate_token_lists().await)
}
