use axum::{extract::State, http::StatusCode, response::Json};
use bridge_service::{quote_warnings, AggregatorServiceError, QuoteRanker};
use tracing::info;

use crate::handlers::common::{api_error, ApiError};
use crate::models::{AggregationMetadata, QuotesRequest, QuotesResponse};
use crate::state::AppState;

/// POST /api/v1/quotes - Aggregate quotes, ranking them when market data is supplied
pub async fn post_quotes(
	State(state): State<AppState>,
	Json(body): Json<QuotesRequest>,
) -> Result<Json<QuotesResponse>, ApiError> {
	let request = body.request;
	info!(
		"Received quotes request {} {} -> {} {}",
		request.src_chain_id,
		request.input_token.symbol,
		request.dst_chain_id,
		request.output_token.symbol
	);

	let report = state
		.aggregator_service
		.get_quotes_with_report(&request, body.adapters.as_deref())
		.await
		.map_err(|e| match e {
			AggregatorServiceError::Validation(e) => api_error(
				StatusCode::BAD_REQUEST,
				"VALIDATION_ERROR",
				format!("Invalid request: {}", e),
			),
		})?;
	let (quotes, metadata) = AggregationMetadata::from_report(report);

	let (ranked_quotes, warnings) = match body.market {
		Some(market) => {
			let ranked =
				QuoteRanker::new(market).rank(quotes.clone(), request.output_token.decimals);
			let warnings = body
				.selected_adapter
				.as_deref()
				.and_then(|id| ranked.iter().find(|q| q.quote.adapter_id == id))
				.map(|selected| quote_warnings(selected, &ranked, body.input_amount_usd))
				.unwrap_or_default();
			(Some(ranked), warnings)
		},
		None => (None, Vec::new()),
	};

	info!(
		"Returning {} quotes (duration: {}ms, {} adapters considered)",
		quotes.len(),
		metadata.total_duration_ms,
		metadata.adapters_considered
	);
	Ok(Json(QuotesResponse {
		total_quotes: quotes.len(),
		quotes,
		ranked_quotes,
		warnings,
		metadata,
	}))
}
