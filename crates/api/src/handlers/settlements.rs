use axum::{extract::State, http::StatusCode, response::Json};
use tracing::info;

use crate::handlers::common::{api_error, ApiError};
use crate::models::{SettlementAccepted, SettlementRequest};
use crate::state::AppState;

/// POST /api/v1/settlements - Report a confirmed source transaction
///
/// Answers 202 right away; the adapter's settlement step runs in the
/// background and its failures are only logged.
pub async fn post_settlements(
	State(state): State<AppState>,
	Json(body): Json<SettlementRequest>,
) -> Result<(StatusCode, Json<SettlementAccepted>), ApiError> {
	let source_tx_hash = body.source_tx_hash.trim().to_string();
	if source_tx_hash.is_empty() {
		return Err(api_error(
			StatusCode::BAD_REQUEST,
			"VALIDATION_ERROR",
			"sourceTxHash is required",
		));
	}

	let adapter_id = body.quote.adapter_id.clone();
	let Some(adapter) = state.aggregator_service.adapter_registry().get(&adapter_id) else {
		return Err(api_error(
			StatusCode::NOT_FOUND,
			"ADAPTER_NOT_FOUND",
			format!("Adapter {} not found", adapter_id),
		));
	};

	let settlement_required = adapter.settlement_hook().is_some();
	if settlement_required {
		info!("Scheduling settlement for {} via {}", source_tx_hash, adapter_id);
		// the handle is dropped; the outcome is logged by the notifier
		let _ = state
			.aggregator_service
			.notifier()
			.spawn_post_bridge(body.quote, source_tx_hash.clone());
	}

	Ok((
		StatusCode::ACCEPTED,
		Json(SettlementAccepted {
			adapter_id,
			source_tx_hash,
			settlement_required,
		}),
	))
}
