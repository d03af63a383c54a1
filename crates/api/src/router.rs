use axum::{
	http::Request,
	routing::{get, post},
	Router,
};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	limit::RequestBodyLimitLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer},
	LatencyUnit,
};
use tracing::Level;

use crate::handlers::{
	get_adapter_tokens, get_adapters, health, post_quotes, post_refresh_token_lists,
	post_settlements,
};
use crate::state::AppState;

/// Largest request body accepted; a quote request is well under 4 KiB
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Versioned API routes, each also reachable with a trailing slash
fn api_v1() -> Router<AppState> {
	Router::new()
		.route("/adapters", get(get_adapters))
		.route("/adapters/", get(get_adapters))
		.route("/adapters/{id}/tokens", get(get_adapter_tokens))
		.route("/quotes", post(post_quotes))
		.route("/quotes/", post(post_quotes))
		.route("/settlements", post(post_settlements))
		.route("/settlements/", post(post_settlements))
		.route("/token-lists/refresh", post(post_refresh_token_lists))
}

pub fn create_router() -> Router<AppState> {
	let trace = TraceLayer::new_for_http()
		.make_span_with(|req: &Request<_>| {
			let request_id = req
				.headers()
				.get("x-request-id")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-");
			tracing::info_span!(
				"api_request",
				method = %req.method(),
				path = %req.uri().path(),
				request_id
			)
		})
		.on_response(
			DefaultOnResponse::new()
				.level(Level::INFO)
				.latency_unit(LatencyUnit::Millis),
		)
		.on_failure(DefaultOnFailure::new().level(Level::WARN));

	// outermost first: the request id must exist before the trace span reads it
	let middleware = ServiceBuilder::new()
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.layer(PropagateRequestIdLayer::x_request_id())
		.layer(trace)
		.layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
		.layer(CompressionLayer::new())
		.layer(CorsLayer::permissive());

	Router::new()
		.route("/health", get(health))
		.route("/health/", get(health))
		.nest("/api/v1", api_v1())
		.layer(middleware)
}
