//! Quote normalisation and ranking
//!
//! Raw quotes are priced in USD, net of gas, and put in a total order. Quotes
//! without a gas estimate always rank below quotes that have one.

use bridge_types::{Quote, RankedQuote, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const NATIVE_DECIMALS: u8 = 18;
const MAX_DECIMAL_SCALE: u32 = 28;
const MAX_DECIMAL_DIGITS: usize = 28;

/// Prices the ranker needs, supplied by an external oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
	#[serde(rename = "outputTokenPriceUSD")]
	pub output_token_price_usd: Decimal,
	#[serde(rename = "nativeTokenPriceUSD")]
	pub native_token_price_usd: Decimal,
	/// Source-chain gas price in wei
	pub gas_price_wei: U256,
}

/// Convert an integer amount in smallest units into whole tokens
///
/// Values too precise for `Decimal` lose their lowest digits; values too large
/// saturate at `Decimal::MAX`.
pub fn token_units(amount: &U256, decimals: u8) -> Decimal {
	let Ok(raw) = amount.to_raw() else {
		return Decimal::ZERO;
	};
	let mut digits = raw.to_string();
	let mut scale = decimals as u32;
	while scale > MAX_DECIMAL_SCALE || (digits.len() > MAX_DECIMAL_DIGITS && scale > 0) {
		digits.pop();
		scale -= 1;
		if digits.is_empty() {
			return Decimal::ZERO;
		}
	}
	match digits.parse::<i128>() {
		Ok(mantissa) => Decimal::try_from_i128_with_scale(mantissa, scale).unwrap_or(Decimal::MAX),
		Err(_) => Decimal::MAX,
	}
}

#[derive(Debug, Clone)]
pub struct QuoteRanker {
	market: MarketData,
}

impl QuoteRanker {
	pub fn new(market: MarketData) -> Self {
		Self { market }
	}

	/// Price every quote and return them best first
	pub fn rank(&self, quotes: Vec<Quote>, output_decimals: u8) -> Vec<RankedQuote> {
		let mut ranked: Vec<RankedQuote> = quotes
			.into_iter()
			.map(|quote| self.normalize(quote, output_decimals))
			.collect();
		Self::sort(&mut ranked);
		ranked
	}

	pub fn normalize(&self, quote: Quote, output_decimals: u8) -> RankedQuote {
		let estimated_amount_usd = token_units(&quote.estimated_amount, output_decimals)
			.saturating_mul(self.market.output_token_price_usd);
		let gas_fees_usd = self.gas_fees_usd(&quote.gas_estimate);
		RankedQuote {
			estimated_amount_after_fees_usd: estimated_amount_usd.saturating_sub(gas_fees_usd),
			estimated_amount_usd,
			gas_fees_usd,
			quote,
		}
	}

	/// Gas cost in USD; zero when the estimate is unknown
	fn gas_fees_usd(&self, gas_estimate: &U256) -> Decimal {
		if gas_estimate.is_zero() {
			return Decimal::ZERO;
		}
		let (Ok(gas), Ok(price)) = (gas_estimate.to_raw(), self.market.gas_price_wei.to_raw())
		else {
			return Decimal::ZERO;
		};
		let wei = U256::from(gas.saturating_mul(price));
		token_units(&wei, NATIVE_DECIMALS).saturating_mul(self.market.native_token_price_usd)
	}

	/// Stable in-place sort, best first
	pub fn sort(ranked: &mut [RankedQuote]) {
		ranked.sort_by(Self::compare);
	}

	/// Known gas before unknown gas, then higher after-fees value first
	pub fn compare(a: &RankedQuote, b: &RankedQuote) -> Ordering {
		b.quote
			.has_gas_estimate()
			.cmp(&a.quote.has_gas_estimate())
			.then_with(|| b.estimated_amount_after_fees_usd.cmp(&a.estimated_amount_after_fees_usd))
	}
}

/// Caveats to show next to the quote a user picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum QuoteWarning {
	/// A better-ranked route exists
	#[serde(rename_all = "camelCase")]
	SuboptimalRoute {
		best_adapter: String,
		loss_percent: Decimal,
	},
	/// Input value exceeds output value by more than 1%
	HighPriceImpact { percent: Decimal },
	UnknownGas,
}

/// Warnings for `selected` given the full ranked list
///
/// `input_amount_usd` is the USD value of the input amount, when a price for
/// the input token is known.
pub fn quote_warnings(
	selected: &RankedQuote,
	ranked: &[RankedQuote],
	input_amount_usd: Option<Decimal>,
) -> Vec<QuoteWarning> {
	let mut warnings = Vec::new();
	let selected_value = selected.estimated_amount_after_fees_usd;

	if let Some(best) = ranked.first() {
		let best_value = best.estimated_amount_after_fees_usd;
		if best.quote.adapter_id != selected.quote.adapter_id && !best_value.is_zero() {
			warnings.push(QuoteWarning::SuboptimalRoute {
				best_adapter: best.quote.adapter_id.clone(),
				loss_percent: saturating_div(best_value.saturating_sub(selected_value), best_value)
					.saturating_mul(Decimal::ONE_HUNDRED)
					.round_dp(2),
			});
		}
	}

	if let Some(input_usd) = input_amount_usd {
		if selected_value > Decimal::ZERO {
			let impact =
				saturating_div(input_usd.round_dp(2), selected_value).saturating_sub(Decimal::ONE);
			if impact > Decimal::new(1, 2) {
				warnings.push(QuoteWarning::HighPriceImpact {
					percent: impact.saturating_mul(Decimal::ONE_HUNDRED).round_dp(2),
				});
			}
		}
	}

	if !selected.quote.has_gas_estimate() {
		warnings.push(QuoteWarning::UnknownGas);
	}
	warnings
}

/// `a / b` clamped to the `Decimal` range; `b` must be non-zero
fn saturating_div(a: Decimal, b: Decimal) -> Decimal {
	a.checked_div(b).unwrap_or(if a.is_sign_negative() == b.is_sign_negative() {
		Decimal::MAX
	} else {
		Decimal::MIN
	})
}
