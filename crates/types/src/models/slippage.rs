//! Canonical slippage unit
//!
//! Requests carry slippage as a percentage. Internally it is held in basis
//! points and each adapter converts to the unit its provider expects:
//!
//! | conversion            | example for 0.5% |
//! |-----------------------|------------------|
//! | `as_bps()`            | `50`             |
//! | `as_percent_string()` | `"0.5"`          |
//! | `as_fraction_string()`| `"0.005"`        |

use alloy_primitives::U256 as RawU256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const BPS_PER_UNIT: u32 = 10_000;

/// Slippage tolerance in basis points (1 bps = 0.01%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlippageBps(u32);

impl SlippageBps {
	pub fn new(bps: u32) -> Self {
		Self(bps)
	}

	/// Convert a percentage such as `0.5` into basis points, rounding to the nearest bps
	pub fn from_percent(percent: f64) -> Self {
		if !percent.is_finite() || percent <= 0.0 {
			return Self(0);
		}
		Self((percent * 100.0).round() as u32)
	}

	pub fn as_bps(&self) -> u32 {
		self.0
	}

	/// Percentage, e.g. `"0.5"`
	pub fn as_percent_string(&self) -> String {
		Decimal::new(self.0 as i64, 2).normalize().to_string()
	}

	/// Fraction of one, e.g. `"0.005"`
	pub fn as_fraction_string(&self) -> String {
		Decimal::new(self.0 as i64, 4).normalize().to_string()
	}

	/// Minimum amount out after applying this tolerance, rounded down
	pub fn min_amount_out(&self, amount: RawU256) -> RawU256 {
		let kept = RawU256::from(BPS_PER_UNIT.saturating_sub(self.0));
		let bps = RawU256::from(BPS_PER_UNIT);
		match amount.checked_mul(kept) {
			Some(scaled) => scaled / bps,
			None => amount / bps * kept,
		}
	}
}
