//! Periodic token-list generation
//!
//! Runs [`AggregatorService::generate_token_lists`] on a fixed interval so the
//! cache and its backing store stay warm without any quote request paying for
//! a fetch. Each run also evicts idle pooled HTTP clients.

use crate::aggregator::AggregatorService;
use bridge_adapters::ClientCache;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum JobError {
	#[error("Invalid job configuration: {0}")]
	InvalidConfig(String),

	#[error("Job task failed: {0}")]
	TaskFailed(String),
}

pub type JobResult<T = ()> = Result<T, JobError>;

/// Handle to the running refresh loop
#[derive(Debug)]
pub struct TokenListRefreshJob {
	handle: JoinHandle<()>,
	shutdown_sender: mpsc::Sender<()>,
	interval: Duration,
}

impl TokenListRefreshJob {
	/// Start refreshing every `interval_minutes`, with a first run right away
	pub fn start(service: Arc<AggregatorService>, interval_minutes: u64) -> JobResult<Self> {
		if interval_minutes == 0 {
			return Err(JobError::InvalidConfig(
				"refresh interval must be at least one minute".to_string(),
			));
		}
		Self::start_with_interval(service, Duration::from_secs(interval_minutes * 60))
	}

	pub fn start_with_interval(service: Arc<AggregatorService>, every: Duration) -> JobResult<Self> {
		if every.is_zero() {
			return Err(JobError::InvalidConfig(
				"refresh interval must be non-zero".to_string(),
			));
		}

		let (shutdown_sender, shutdown_receiver) = mpsc::channel::<()>(1);
		let handle = tokio::spawn(Self::run(service, every, shutdown_receiver));
		info!("Started token list refresh job (every {}s)", every.as_secs());

		Ok(Self {
			handle,
			shutdown_sender,
			interval: every,
		})
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	pub fn is_finished(&self) -> bool {
		self.handle.is_finished()
	}

	/// Stop the loop and wait for an in-progress run to finish
	pub async fn shutdown(self) -> JobResult<()> {
		// the loop may already be gone; the join below still reports how it ended
		let _ = self.shutdown_sender.send(()).await;
		self.handle
			.await
			.map_err(|e| JobError::TaskFailed(e.to_string()))?;
		info!("Token list refresh job stopped");
		Ok(())
	}

	async fn run(
		service: Arc<AggregatorService>,
		every: Duration,
		mut shutdown_receiver: mpsc::Receiver<()>,
	) {
		let mut ticker = interval(every);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

		loop {
			tokio::select! {
				_ = shutdown_receiver.recv() => break,
				_ = ticker.tick() => {
					let report = service.generate_token_lists().await;
					if report.failed > 0 {
						warn!(
							"Token list refresh: {} succeeded, {} failed",
							report.succeeded, report.failed
						);
					} else {
						debug!("Token list refresh: {} succeeded", report.succeeded);
					}
					let evicted = ClientCache::for_adapter().cleanup_expired();
					if evicted > 0 {
						debug!("Evicted {} idle HTTP clients", evicted);
					}
				},
			}
		}
	}
}
