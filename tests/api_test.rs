//! Tests for REST API endpoints

mod mocks;

use axum::{
	body::Body,
	http::{Request, StatusCode},
	Router,
};
use bridge_aggregator::serde_json::{self, Value};
use bridge_aggregator::{AdapterRegistry, AggregatorBuilder, Settings};
use mocks::{mock_token_list, ApiFixtures, TimingControlledAdapter};
use tower::ServiceExt;

const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

/// Router over a fixed set of mock adapters
async fn create_test_router(adapters: Vec<TimingControlledAdapter>) -> Router {
	let mut settings = Settings::default();
	settings.aggregation.timeout_ms = 500;
	settings.settlement.retry_delay_ms = 10;

	let mut builder = AggregatorBuilder::new()
		.with_settings(settings)
		.with_adapter_registry(AdapterRegistry::new());
	for adapter in adapters {
		builder = builder.with_adapter(adapter.shared());
	}
	let (router, _state) = builder.start().await.unwrap();
	router
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.oneshot(request).await.unwrap();
	let status = response.status();
	let body = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
	(status, json)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(body.to_string()))
		.unwrap()
}

fn get(uri: &str) -> Request<Body> {
	Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
	let app = create_test_router(vec![]).await;

	let response = app.oneshot(get("/health")).await.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let body = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_list_adapters_reports_capabilities() {
	let app = create_test_router(vec![
		TimingControlledAdapter::fast("across", "1"),
		TimingControlledAdapter::fast("relay", "1")
			.with_route_support(true)
			.with_settlement(0),
	])
	.await;

	let (status, body) = send(app, get("/api/v1/adapters")).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["totalAdapters"], 2);
	assert_eq!(body["cachedTokenLists"], Value::Array(vec![]));
	let relay = body["adapters"]
		.as_array()
		.unwrap()
		.iter()
		.find(|a| a["adapterId"] == "relay")
		.unwrap();
	assert_eq!(relay["capabilities"]["supportsRouteCheck"], true);
	assert_eq!(relay["capabilities"]["hasSettlementHook"], true);
	assert_eq!(relay["capabilities"]["hasGeneratedTokenList"], false);
}

#[tokio::test]
async fn test_post_quotes_returns_successful_quotes_only() {
	let app = create_test_router(vec![
		TimingControlledAdapter::fast("across", "990000"),
		TimingControlledAdapter::failing("bungee"),
		TimingControlledAdapter::fast("stargate", "980000").with_route_support(false),
	])
	.await;

	let (status, body) = send(app, post_json("/api/v1/quotes", &ApiFixtures::quotes_request())).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["totalQuotes"], 1);
	assert_eq!(body["quotes"][0]["adapterId"], "across");
	assert_eq!(body["quotes"][0]["estimatedAmount"], "990000");
	assert_eq!(body["metadata"]["adaptersConsidered"], 3);
	assert_eq!(body["metadata"]["failed"], 1);
	assert_eq!(body["metadata"]["routeUnsupported"], 1);
	assert!(body.get("rankedQuotes").is_none());
}

#[tokio::test]
async fn test_post_quotes_ranks_with_market_data() {
	let app = create_test_router(vec![
		TimingControlledAdapter::fast("across", "990000"),
		TimingControlledAdapter::fast("relay", "999000").with_gas("0"),
		TimingControlledAdapter::fast("lifi", "1000000"),
	])
	.await;

	let (status, body) = send(
		app,
		post_json(
			"/api/v1/quotes",
			&ApiFixtures::ranked_quotes_request(Some("relay")),
		),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	let order: Vec<&str> = body["rankedQuotes"]
		.as_array()
		.unwrap()
		.iter()
		.map(|q| q["adapterId"].as_str().unwrap())
		.collect();
	assert_eq!(order, vec!["lifi", "across", "relay"]);
	let warnings = body["warnings"].as_array().unwrap();
	assert!(warnings.iter().any(|w| w["type"] == "unknownGas"));
	assert!(warnings
		.iter()
		.any(|w| w["type"] == "suboptimalRoute" && w["bestAdapter"] == "lifi"));
}

#[tokio::test]
async fn test_post_quotes_invalid_request() {
	let app = create_test_router(vec![TimingControlledAdapter::fast("across", "1")]).await;

	let (status, body) = send(
		app,
		post_json("/api/v1/quotes", &ApiFixtures::invalid_quotes_request()),
	)
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_post_quotes_with_no_adapters_returns_empty_list() {
	let app = create_test_router(vec![]).await;

	let (status, body) = send(app, post_json("/api/v1/quotes", &ApiFixtures::quotes_request())).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["totalQuotes"], 0);
	assert_eq!(body["quotes"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_adapter_tokens_after_refresh() {
	let app = create_test_router(vec![
		TimingControlledAdapter::fast("stargate", "1").with_token_list(mock_token_list(&[USDC])),
	])
	.await;

	let (status, body) = send(app.clone(), get("/api/v1/adapters/stargate/tokens")).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "TOKEN_LIST_NOT_FOUND");

	let (status, body) = send(
		app.clone(),
		post_json("/api/v1/token-lists/refresh", &Value::Null),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["succeeded"], 1);

	let (status, body) = send(app.clone(), get("/api/v1/adapters/stargate/tokens")).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["adapterId"], "stargate");

	let (_, body) = send(app, get("/api/v1/adapters")).await;
	assert_eq!(body["cachedTokenLists"], serde_json::json!(["stargate"]));
}

#[tokio::test]
async fn test_adapter_tokens_unknown_adapter() {
	let app = create_test_router(vec![]).await;

	let (status, body) = send(app, get("/api/v1/adapters/nope/tokens")).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "ADAPTER_NOT_FOUND");
}

#[tokio::test]
async fn test_post_settlement_is_accepted() {
	let relay = TimingControlledAdapter::fast("relay", "1").with_settlement(0);
	let app = create_test_router(vec![relay.clone()]).await;

	let (status, body) = send(
		app,
		post_json(
			"/api/v1/settlements",
			&ApiFixtures::settlement_request("relay", "0xabc123"),
		),
	)
	.await;

	assert_eq!(status, StatusCode::ACCEPTED);
	assert_eq!(body["settlementRequired"], true);

	for _ in 0..100 {
		if relay.settlements.call_count() > 0 {
			break;
		}
		tokio::time::sleep(std::time::Duration::from_millis(5)).await;
	}
	assert_eq!(relay.settlements.call_count(), 1);
}

#[tokio::test]
async fn test_post_settlement_without_hook_is_not_required() {
	let app = create_test_router(vec![TimingControlledAdapter::fast("across", "1")]).await;

	let (status, body) = send(
		app,
		post_json(
			"/api/v1/settlements",
			&ApiFixtures::settlement_request("across", "0xabc123"),
		),
	)
	.await;

	assert_eq!(status, StatusCode::ACCEPTED);
	assert_eq!(body["settlementRequired"], false);
}

#[tokio::test]
async fn test_post_settlement_rejects_bad_input() {
	let app = create_test_router(vec![TimingControlledAdapter::fast("across", "1")]).await;

	let (status, _) = send(
		app.clone(),
		post_json(
			"/api/v1/settlements",
			&ApiFixtures::settlement_request("across", "  "),
		),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, body) = send(
		app,
		post_json(
			"/api/v1/settlements",
			&ApiFixtures::settlement_request("unknown", "0xabc123"),
		),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(body["error"], "ADAPTER_NOT_FOUND");
}
