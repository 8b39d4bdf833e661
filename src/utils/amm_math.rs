//! AMM Math Utilities
//!
//! Implements constant-product (x * y = k) swap pricing over floating-point
//! reserves. Every peer runs the same math against its own reserve view.

use serde::{Deserialize, Serialize};

/// Default pool fee (0.3%)
pub const DEFAULT_FEE: f64 = 0.003;

/// Result of pricing a swap against a pair of reserves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapQuote {
    /// Input after the fee is withheld
    pub amount_in_effective: f64,
    /// Amount of output tokens
    pub amount_out: f64,
    /// reserve_out / reserve_in before the swap
    pub price_before: f64,
    /// reserve_out / reserve_in after the swap
    pub price_after: f64,
    /// Relative price move caused by the swap
    pub price_impact: f64,
}

/// What a swap did to the pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SwapOutcome {
    /// Regular constant-product swap
    Quoted(SwapQuote),
    /// The input reserve was empty: the whole input seeds it and nothing is paid out
    SeededReserve { amount_in: f64 },
}

impl SwapOutcome {
    /// Amount credited to the trader
    pub fn amount_out(&self) -> f64 {
        match self {
            SwapOutcome::Quoted(quote) => quote.amount_out,
            SwapOutcome::SeededReserve { .. } => 0.0,
        }
    }
}

/// Convert a fee in basis points to a fraction (30 => 0.003)
pub fn fee_from_bps(fee_bps: u16) -> f64 {
    fee_bps as f64 / 10_000.0
}

/// Price a swap using the constant product formula
///
/// Formula: amount_out = (amount_in_after_fee * reserve_out) / (reserve_in + amount_in_after_fee)
///
/// Returns `None` when `reserve_in` is zero: the formula is undefined there and
/// callers must take the seeding path of [`swap_outcome`] instead.
pub fn quote_swap(reserve_in: f64, reserve_out: f64, amount_in: f64, fee: f64) -> Option<SwapQuote> {
    if reserve_in == 0.0 {
        return None;
    }

    let amount_in_effective = amount_in * (1.0 - fee);
    let amount_out = amount_in_effective * reserve_out / (reserve_in + amount_in_effective);

    let price_before = reserve_out / reserve_in;
    let price_after = (reserve_out - amount_out) / (reserve_in + amount_in_effective);
    let price_impact = if price_before > 0.0 {
        (price_before - price_after) / price_before
    } else {
        0.0
    };

    Some(SwapQuote {
        amount_in_effective,
        amount_out,
        price_before,
        price_after,
        price_impact,
    })
}

/// Decide how a swap moves the reserves, including the empty-input-reserve case
pub fn swap_outcome(reserve_in: f64, reserve_out: f64, amount_in: f64, fee: f64) -> SwapOutcome {
    match quote_swap(reserve_in, reserve_out, amount_in, fee) {
        Some(quote) => SwapOutcome::Quoted(quote),
        None => SwapOutcome::SeededReserve { amount_in },
    }
}

/// Reserves after applying an outcome, as (reserve_in, reserve_out)
///
/// The full pre-fee input lands in the input reserve, so the retained fee
/// grows k instead of leaving the pool.
pub fn reserves_after(reserve_in: f64, reserve_out: f64, amount_in: f64, outcome: &SwapOutcome) -> (f64, f64) {
    match outcome {
        SwapOutcome::Quoted(quote) => (reserve_in + amount_in, reserve_out - quote.amount_out),
        SwapOutcome::SeededReserve { .. } => (reserve_in + amount_in, reserve_out),
    }
}

/// Largest input searched by [`max_input_for_slippage`], as a share of `reserve_in`
pub const MAX_INPUT_FRACTION: f64 = 0.5;

const SLIPPAGE_SEARCH_STEPS: usize = 15;

/// Largest input whose price impact stays within `tolerance`
///
/// Bisects over `[0, MAX_INPUT_FRACTION * reserve_in]`, so the answer may sit
/// slightly below the true bound but never above it. Zero when either reserve
/// is empty or the tolerance is not positive.
pub fn max_input_for_slippage(reserve_in: f64, reserve_out: f64, tolerance: f64, fee: f64) -> f64 {
    if !(reserve_in > 0.0 && reserve_out > 0.0 && tolerance > 0.0) {
        return 0.0;
    }

    let (mut lo, mut hi) = (0.0, reserve_in * MAX_INPUT_FRACTION);
    for _ in 0..SLIPPAGE_SEARCH_STEPS {
        let mid = (lo + hi) / 2.0;
        match quote_swap(reserve_in, reserve_out, mid, fee) {
            Some(quote) if quote.price_impact <= tolerance => lo = mid,
            _ => hi = mid,
        }
    }
    lo
}

/// Estimated gain, in input-token units, from buying ahead of a victim
///
/// The front-runner's output is valued at the price the victim's swap leaves
/// behind, minus its value at the price before either swap. `None` when the
/// pool cannot quote either swap.
pub fn front_run_profit(reserve_in: f64, reserve_out: f64, victim_amount_in: f64, frontrun_amount_in: f64, fee: f64) -> Option<f64> {
    let ours = quote_swap(reserve_in, reserve_out, frontrun_amount_in, fee)?;
    let (in_after, out_after) = reserves_after(reserve_in, reserve_out, frontrun_amount_in, &SwapOutcome::Quoted(ours));
    let victim = quote_swap(in_after, out_after, victim_amount_in, fee)?;
    if ours.price_before <= 0.0 || victim.price_after <= 0.0 {
        return None;
    }

    // Prices are output per input; invert to value output in input units.
    Some(ours.amount_out * (1.0 / victim.price_after - 1.0 / ours.price_before))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_calculation() {
        let quote = quote_swap(1000.0, 1000.0, 100.0, DEFAULT_FEE).unwrap();

        assert!((quote.amount_out - 90.66).abs() < 1e-2);
        // (1 - 909.339 / 1099.7)
        assert!((quote.price_impact - 0.1731).abs() < 1e-3);
        assert!((quote.amount_out / 1000.0 - 0.0906).abs() < 1e-3);
        assert!((quote.amount_in_effective - 99.7).abs() < 1e-9);
        assert_eq!(quote.price_before, 1.0);
    }

    #[test]
    fn test_k_does_not_decrease() {
        let (rin, rout) = (1000.0, 1000.0);
        let outcome = swap_outcome(rin, rout, 100.0, DEFAULT_FEE);
        let (new_in, new_out) = reserves_after(rin, rout, 100.0, &outcome);

        assert!(new_in * new_out > rin * rout);
    }

    #[test]
    fn test_k_preserved_without_fee() {
        let outcome = swap_outcome(1000.0, 1000.0, 100.0, 0.0);
        let (new_in, new_out) = reserves_after(1000.0, 1000.0, 100.0, &outcome);

        assert!((new_in * new_out - 1_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_input_reserve_seeds() {
        assert!(quote_swap(0.0, 500.0, 10.0, DEFAULT_FEE).is_none());

        let outcome = swap_outcome(0.0, 500.0, 10.0, DEFAULT_FEE);
        assert_eq!(outcome, SwapOutcome::SeededReserve { amount_in: 10.0 });
        assert_eq!(outcome.amount_out(), 0.0);
        assert_eq!(reserves_after(0.0, 500.0, 10.0, &outcome), (10.0, 500.0));
    }

    #[test]
    fn test_fee_from_bps() {
        assert!((fee_from_bps(30) - 0.003).abs() < 1e-12);
        assert_eq!(fee_from_bps(0), 0.0);
    }

    #[test]
    fn test_max_input_respects_tolerance() {
        let amount = max_input_for_slippage(1000.0, 1000.0, 0.05, DEFAULT_FEE);
        let impact = |x: f64| quote_swap(1000.0, 1000.0, x, DEFAULT_FEE).unwrap().price_impact;

        assert!(amount > 0.0);
        assert!(impact(amount) <= 0.05);
        // Bisection step over a 500 range is below 0.02
        assert!(impact(amount + 0.05) > 0.05);
    }

    #[test]
    fn test_max_input_bounds() {
        assert_eq!(max_input_for_slippage(0.0, 1000.0, 0.05, DEFAULT_FEE), 0.0);
        assert_eq!(max_input_for_slippage(1000.0, 0.0, 0.05, DEFAULT_FEE), 0.0);
        assert_eq!(max_input_for_slippage(1000.0, 1000.0, 0.0, DEFAULT_FEE), 0.0);
        assert_eq!(max_input_for_slippage(1000.0, 1000.0, f64::NAN, DEFAULT_FEE), 0.0);
        // Anything goes: capped at half the input reserve
        let capped = max_input_for_slippage(1000.0, 1000.0, 1.0, DEFAULT_FEE);
        assert!(capped <= 500.0 && capped > 499.0);
    }

    #[test]
    fn test_front_run_profit_grows_with_victim() {
        let small = front_run_profit(1000.0, 1000.0, 30.0, 10.0, DEFAULT_FEE).unwrap();
        let large = front_run_profit(1000.0, 1000.0, 300.0, 10.0, DEFAULT_FEE).unwrap();

        assert!(small > 0.0);
        assert!(large > small);
        assert!(front_run_profit(0.0, 1000.0, 30.0, 10.0, DEFAULT_FEE).is_none());
        assert!(front_run_profit(1000.0, 0.0, 30.0, 10.0, DEFAULT_FEE).is_none());
    }
}
