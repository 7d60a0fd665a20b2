//! Resale valuation.
//!
//! The league realizes only half of any price gain when a player is sold,
//! quantized to 0.1 steps; losses are realized in full. All arithmetic is
//! exact integer tenths.

/// Selling price in tenths for a player bought at `buy_tenths` whose
/// current price is `now_tenths`.
///
/// Each full 20 tenths of gain adds 5 tenths to the sale; a price at or
/// below the purchase price sells at the current price.
pub fn sell_price_tenths(buy_tenths: i64, now_tenths: i64) -> i64 {
    if now_tenths <= buy_tenths {
        return now_tenths;
    }
    let profit = now_tenths - buy_tenths;
    let realized = (profit / 20) * 5;
    buy_tenths + realized
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
