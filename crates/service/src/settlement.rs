//! Post-bridge settlement notifications
//!
//! Some providers need an off-chain registration after the user's source
//! transaction is mined. The notifier runs that step with a timeout and a
//! bounded number of retries; a failure is reported as a warning and never
//! undoes the on-chain transfer.

use bridge_adapters::AdapterRegistry;
use bridge_types::{Quote, SettlementError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementConfig {
	/// Bound on a single post-bridge call
	pub timeout: Duration,
	pub max_attempts: u32,
	pub retry_delay: Duration,
}

impl Default for SettlementConfig {
	fn default() -> Self {
		Self {
			timeout: Duration::from_secs(10),
			max_attempts: 3,
			retry_delay: Duration::from_millis(500),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SettlementOutcome {
	Notified { attempts: u32 },
	/// The adapter has no settlement step
	Skipped,
	Failed { error: String, attempts: u32 },
}

impl SettlementOutcome {
	pub fn is_failed(&self) -> bool {
		matches!(self, SettlementOutcome::Failed { .. })
	}
}

/// Runs adapters' settlement hooks
#[derive(Debug, Clone)]
pub struct SettlementNotifier {
	adapter_registry: Arc<AdapterRegistry>,
	config: SettlementConfig,
}

impl SettlementNotifier {
	pub fn new(adapter_registry: Arc<AdapterRegistry>, config: SettlementConfig) -> Self {
		Self {
			adapter_registry,
			config,
		}
	}

	pub fn config(&self) -> SettlementConfig {
		self.config
	}

	/// Notify the quote's adapter that `source_tx_hash` confirmed
	///
	/// Never returns an error; failures are logged and carried in the outcome.
	pub async fn notify(&self, quote: &Quote, source_tx_hash: &str) -> SettlementOutcome {
		let Some(adapter) = self.adapter_registry.get(&quote.adapter_id) else {
			let error = SettlementError::UnknownAdapter {
				adapter_id: quote.adapter_id.clone(),
			};
			warn!("Settlement for {} not sent: {}", source_tx_hash, error);
			return SettlementOutcome::Failed {
				error: error.to_string(),
				attempts: 0,
			};
		};
		let Some(hook) = adapter.settlement_hook() else {
			debug!("Adapter {} has no settlement step", quote.adapter_id);
			return SettlementOutcome::Skipped;
		};

		let max_attempts = self.config.max_attempts.max(1);
		let mut last_error = None;
		for attempt in 1..=max_attempts {
			let result = match tokio::time::timeout(
				self.config.timeout,
				hook.post_bridge(quote, source_tx_hash),
			)
			.await
			{
				Ok(result) => result,
				Err(_) => Err(SettlementError::Timeout {
					timeout_ms: self.config.timeout.as_millis() as u64,
				}),
			};

			match result {
				Ok(()) => {
					info!(
						"Settlement for {} via {} delivered on attempt {}",
						source_tx_hash, quote.adapter_id, attempt
					);
					return SettlementOutcome::Notified { attempts: attempt };
				},
				Err(e) => {
					warn!(
						"Settlement attempt {}/{} for {} via {} failed: {}",
						attempt, max_attempts, source_tx_hash, quote.adapter_id, e
					);
					last_error = Some(e);
				},
			}

			if attempt < max_attempts {
				tokio::time::sleep(self.config.retry_delay).await;
			}
		}

		let error = last_error
			.map(|e| e.to_string())
			.unwrap_or_else(|| "settlement failed".to_string());
		warn!(
			"Giving up on settlement for {} via {}: {}",
			source_tx_hash, quote.adapter_id, error
		);
		SettlementOutcome::Failed {
			error,
			attempts: max_attempts,
		}
	}

	/// Fire-and-forget variant of [`notify`](Self::notify)
	pub fn spawn_post_bridge(
		&self,
		quote: Quote,
		source_tx_hash: String,
	) -> JoinHandle<SettlementOutcome> {
		let notifier = self.clone();
		tokio::spawn(async move { notifier.notify(&quote, &source_tx_hash).await })
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionState {
	Quoted,
	SourceTxSubmitted,
	SourceTxConfirmed,
	SettlementNotified,
	Skipped,
	Done,
}

impl fmt::Display for ExecutionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ExecutionState::Quoted => "quoted",
			ExecutionState::SourceTxSubmitted => "sourceTxSubmitted",
			ExecutionState::SourceTxConfirmed => "sourceTxConfirmed",
			ExecutionState::SettlementNotified => "settlementNotified",
			ExecutionState::Skipped => "skipped",
			ExecutionState::Done => "done",
		};
		f.write_str(name)
	}
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
	#[error("Cannot {action} while execution is {state}")]
	InvalidTransition {
		action: &'static str,
		state: ExecutionState,
	},
}

/// One user's bridge transfer, from chosen quote to settlement
///
/// `Quoted -> SourceTxSubmitted -> SourceTxConfirmed -> [SettlementNotified | Skipped] -> Done`
#[derive(Debug, Clone)]
pub struct BridgeExecution {
	quote: Quote,
	state: ExecutionState,
	source_tx_hash: Option<String>,
	settlement: Option<SettlementOutcome>,
	history: Vec<ExecutionState>,
}

impl BridgeExecution {
	pub fn new(quote: Quote) -> Self {
		Self {
			quote,
			state: ExecutionState::Quoted,
			source_tx_hash: None,
			settlement: None,
			history: vec![ExecutionState::Quoted],
		}
	}

	pub fn quote(&self) -> &Quote {
		&self.quote
	}

	pub fn state(&self) -> ExecutionState {
		self.state
	}

	pub fn source_tx_hash(&self) -> Option<&str> {
		self.source_tx_hash.as_deref()
	}

	/// Result of the settlement step, once it ran
	pub fn settlement(&self) -> Option<&SettlementOutcome> {
		self.settlement.as_ref()
	}

	/// Every state visited, in order
	pub fn history(&self) -> &[ExecutionState] {
		&self.history
	}

	pub fn submit_source_tx(&mut self, tx_hash: impl Into<String>) -> Result<(), ExecutionError> {
		self.expect_state("submit source transaction", ExecutionState::Quoted)?;
		self.source_tx_hash = Some(tx_hash.into());
		self.transition(ExecutionState::SourceTxSubmitted);
		Ok(())
	}

	pub fn confirm_source_tx(&mut self) -> Result<(), ExecutionError> {
		self.expect_state("confirm source transaction", ExecutionState::SourceTxSubmitted)?;
		self.transition(ExecutionState::SourceTxConfirmed);
		Ok(())
	}

	/// Run the settlement step and finish the execution
	///
	/// A failed notification still ends in `Done`; the failure stays visible
	/// through [`settlement`](Self::settlement).
	pub async fn settle(
		&mut self,
		notifier: &SettlementNotifier,
	) -> Result<&SettlementOutcome, ExecutionError> {
		self.expect_state("settle", ExecutionState::SourceTxConfirmed)?;
		let tx_hash = self.source_tx_hash.clone().unwrap_or_default();
		let outcome = notifier.notify(&self.quote, &tx_hash).await;

		match outcome {
			SettlementOutcome::Skipped => self.transition(ExecutionState::Skipped),
			_ => self.transition(ExecutionState::SettlementNotified),
		}
		self.transition(ExecutionState::Done);
		let outcome = &*self.settlement.insert(outcome);
		Ok(outcome)
	}

	fn expect_state(
		&self,
		action: &'static str,
		expected: ExecutionState,
	) -> Result<(), ExecutionError> {
		if self.state != expected {
			return Err(ExecutionError::InvalidTransition {
				action,
				state: self.state,
			});
		}
		Ok(())
	}

	fn transition(&mut self, next: ExecutionState) {
		debug!("Bridge execution via {}: {} -> {}", self.quote.adapter_id, self.state, next);
		self.state = next;
		self.history.push(next);
	}
}
