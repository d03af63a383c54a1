//! Fan-out behavior of the aggregation engine with timing-controlled adapters

mod mocks;

use std::sync::Arc;
use std::time::Duration;

use bridge_aggregator::models::test_utils::sample_request;
use bridge_aggregator::service::OutcomeKind;
use bridge_aggregator::{AdapterRegistry, AggregatorService, U256};
use mocks::TimingControlledAdapter;

fn service_with(adapters: &[&TimingControlledAdapter], timeout_ms: u64) -> AggregatorService {
	let mut registry = AdapterRegistry::new();
	for adapter in adapters {
		registry.register((*adapter).clone().shared());
	}
	AggregatorService::new(Arc::new(registry), Duration::from_millis(timeout_ms))
}

#[tokio::test(start_paused = true)]
async fn test_hanging_adapter_is_bounded_by_timeout() {
	let a = TimingControlledAdapter::new("a", 200, "100");
	let b = TimingControlledAdapter::new("b", 50, "90");
	let c = TimingControlledAdapter::never("c");
	let service = service_with(&[&a, &b, &c], 1000);

	let started = tokio::time::Instant::now();
	let report = service
		.get_quotes_with_report(&sample_request(), None)
		.await
		.unwrap();
	let elapsed = started.elapsed();

	let mut amounts: Vec<(String, U256)> = report
		.quotes
		.iter()
		.map(|q| (q.adapter_id.clone(), q.estimated_amount.clone()))
		.collect();
	amounts.sort_by(|x, y| x.0.cmp(&y.0));
	assert_eq!(
		amounts,
		vec![
			("a".to_string(), U256::new("100")),
			("b".to_string(), U256::new("90")),
		]
	);
	assert_eq!(report.timed_out, 1);
	assert_eq!(report.outcome_for("c").unwrap().outcome, OutcomeKind::Timeout);
	assert!(elapsed >= Duration::from_millis(1000));
	assert!(elapsed < Duration::from_millis(1100));
}

#[tokio::test(start_paused = true)]
async fn test_total_time_is_not_sum_of_latencies() {
	let adapters: Vec<TimingControlledAdapter> = (0..5)
		.map(|i| TimingControlledAdapter::new(&format!("adapter-{}", i), 300, "1000"))
		.collect();
	let refs: Vec<&TimingControlledAdapter> = adapters.iter().collect();
	let service = service_with(&refs, 1000);

	let started = tokio::time::Instant::now();
	let quotes = service.get_quotes(&sample_request(), None).await.unwrap();

	assert_eq!(quotes.len(), 5);
	assert!(started.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn test_unsupported_route_skips_get_quote() {
	let d = TimingControlledAdapter::fast("d", "500").with_route_support(false);
	let e = TimingControlledAdapter::fast("e", "400").with_route_support(true);
	let service = service_with(&[&d, &e], 1000);

	let report = service
		.get_quotes_with_report(&sample_request(), None)
		.await
		.unwrap();

	assert_eq!(report.quotes.len(), 1);
	assert_eq!(report.quotes[0].adapter_id, "e");
	assert_eq!(report.route_unsupported, 1);
	assert_eq!(d.route_checks.call_count(), 1);
	assert_eq!(d.quotes.call_count(), 0);
	assert_eq!(e.quotes.call_count(), 1);
}

#[tokio::test]
async fn test_failing_adapter_is_isolated() {
	let x = TimingControlledAdapter::failing("x");
	let y = TimingControlledAdapter::fast("y", "100");
	let z = TimingControlledAdapter::fast("z", "200");
	let service = service_with(&[&x, &y, &z], 1000);

	let quotes = service.get_quotes(&sample_request(), None).await.unwrap();

	let mut ids: Vec<&str> = quotes.iter().map(|q| q.adapter_id.as_str()).collect();
	ids.sort();
	assert_eq!(ids, vec!["y", "z"]);
	assert_eq!(x.quotes.call_count(), 1);
}

#[tokio::test]
async fn test_adapter_subset_limits_fan_out() {
	let y = TimingControlledAdapter::fast("y", "100");
	let z = TimingControlledAdapter::fast("z", "200");
	let service = service_with(&[&y, &z], 1000);

	let subset = vec!["z".to_string(), "missing".to_string()];
	let quotes = service
		.get_quotes(&sample_request(), Some(subset.as_slice()))
		.await
		.unwrap();

	assert_eq!(quotes.len(), 1);
	assert_eq!(quotes[0].adapter_id, "z");
	assert_eq!(y.quotes.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_request_is_rejected_before_fan_out() {
	let y = TimingControlledAdapter::fast("y", "100");
	let service = service_with(&[&y], 1000);

	let mut request = sample_request();
	request.amount = U256::new("0");

	assert!(service.get_quotes(&request, None).await.is_err());
	assert_eq!(y.quotes.call_count(), 0);
}
