//! Market-order execution against a portfolio.
//!
//! The engine is a pure state transition: given a decision already made, it
//! fills at the supplied price, deducts the fee, mutates the portfolio, and
//! emits an immutable [`Trade`]. Cooldown gating and pending-signal
//! scheduling live in the backtest driver, not here.

use super::error::MocktraderError;
use super::portfolio::{Portfolio, Side, Trade};

/// True iff at least `cooldown_bars` whole bars have elapsed since the last
/// fill. Both timestamps carry bar-index semantics.
pub fn can_execute(now_ts: i64, last_trade_ts: i64, cooldown_bars: u32) -> bool {
    now_ts - last_trade_ts >= cooldown_bars as i64
}

/// Fill a market order and update the portfolio.
///
/// Buy: spends `min(order_cash, cash)` at `price`, fee on the traded value.
/// Sell: liquidates the entire position, fee on the proceeds.
pub fn execute_market(
    pf: &mut Portfolio,
    side: Side,
    price: f64,
    now_ts: i64,
    fee_rate: f64,
    order_cash: f64,
    rule_name: &str,
) -> Result<Trade, MocktraderError> {
    if price <= 0.0 || !price.is_finite() {
        return Err(MocktraderError::InvalidOrder {
            reason: format!("execution price must be positive, got {price}"),
        });
    }

    let (qty, fee) = match side {
        Side::Buy => {
            let cash_to_use = order_cash.min(pf.cash);
            let qty = cash_to_use / price;
            let fee = price * qty * fee_rate;
            pf.cash = pf.cash - cash_to_use - fee;
            pf.asset_qty += qty;
            (qty, fee)
        }
        Side::Sell => {
            let qty = pf.asset_qty;
            let cash_gain = price * qty;
            let fee = cash_gain * fee_rate;
            pf.cash = pf.cash + cash_gain - fee;
            pf.asset_qty = 0.0;
            (qty, fee)
        }
    };

    pf.last_price = price;
    pf.last_trade_ts = now_ts;

    Ok(Trade {
        ts: now_ts,
        side,
        price,
        qty,
        fee,
        rule_name: rule_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn can_execute_same_bar_with_cooldown() {
        assert!(!can_execute(5, 5, 1));
        assert!(!can_execute(5, 5, 3));
    }

    #[test]
    fn can_execute_same_bar_zero_cooldown() {
        assert!(can_execute(5, 5, 0));
    }

    #[test]
    fn can_execute_boundary() {
        assert!(can_execute(7, 5, 2));
        assert!(!can_execute(6, 5, 2));
    }

    #[test]
    fn buy_full_cash_no_fee() {
        let mut pf = Portfolio::new(1_000_000.0);
        let trade =
            execute_market(&mut pf, Side::Buy, 100.0, 3, 0.0, 1_000_000.0, "test").unwrap();

        assert_relative_eq!(trade.qty, 10_000.0);
        assert_relative_eq!(pf.asset_qty, 10_000.0);
        assert_relative_eq!(pf.cash, 0.0);
        assert_relative_eq!(trade.fee, 0.0);
        assert_eq!(pf.last_trade_ts, 3);
        assert_relative_eq!(pf.last_price, 100.0);
    }

    #[test]
    fn buy_caps_at_available_cash() {
        let mut pf = Portfolio::new(500.0);
        let trade = execute_market(&mut pf, Side::Buy, 50.0, 0, 0.0, 10_000.0, "test").unwrap();

        assert_relative_eq!(trade.qty, 10.0);
        assert_relative_eq!(pf.cash, 0.0);
    }

    #[test]
    fn buy_deducts_cash_plus_fee() {
        let mut pf = Portfolio::new(10_000.0);
        let trade =
            execute_market(&mut pf, Side::Buy, 100.0, 1, 0.001, 5_000.0, "test").unwrap();

        let expected_qty = 5_000.0 / 100.0;
        let expected_fee = 100.0 * expected_qty * 0.001;
        assert_relative_eq!(trade.qty, expected_qty);
        assert_relative_eq!(trade.fee, expected_fee);
        assert_relative_eq!(pf.cash, 10_000.0 - 5_000.0 - expected_fee);
        assert_relative_eq!(pf.asset_qty, expected_qty);
    }

    #[test]
    fn buy_strictly_moves_cash_and_asset() {
        let mut pf = Portfolio::new(10_000.0);
        let cash_before = pf.cash;
        let qty_before = pf.asset_qty;
        execute_market(&mut pf, Side::Buy, 42.0, 1, 0.0005, 3_000.0, "test").unwrap();
        assert!(pf.cash < cash_before);
        assert!(pf.asset_qty > qty_before);
    }

    #[test]
    fn sell_liquidates_entire_position() {
        let mut pf = Portfolio::new(0.0);
        pf.asset_qty = 25.0;
        let trade = execute_market(&mut pf, Side::Sell, 200.0, 9, 0.001, 0.0, "test").unwrap();

        assert_relative_eq!(trade.qty, 25.0);
        assert_relative_eq!(pf.asset_qty, 0.0);
        let gross = 25.0 * 200.0;
        let fee = gross * 0.001;
        assert_relative_eq!(trade.fee, fee);
        assert_relative_eq!(pf.cash, gross - fee);
    }

    #[test]
    fn sell_with_no_position_is_a_noop_fill() {
        // The driver gates this out; the engine itself just fills zero qty.
        let mut pf = Portfolio::new(1_000.0);
        let trade = execute_market(&mut pf, Side::Sell, 100.0, 2, 0.001, 0.0, "test").unwrap();
        assert_relative_eq!(trade.qty, 0.0);
        assert_relative_eq!(pf.cash, 1_000.0);
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let mut pf = Portfolio::new(1_000.0);
        let before = pf.clone();

        let err = execute_market(&mut pf, Side::Buy, 0.0, 0, 0.0, 500.0, "test").unwrap_err();
        assert!(matches!(err, MocktraderError::InvalidOrder { .. }));
        assert_eq!(pf, before);

        let err =
            execute_market(&mut pf, Side::Sell, -10.0, 0, 0.0, 0.0, "test").unwrap_err();
        assert!(matches!(err, MocktraderError::InvalidOrder { .. }));
        assert_eq!(pf, before);
    }

    #[test]
    fn trade_carries_rule_name() {
        let mut pf = Portfolio::new(1_000.0);
        let trade = execute_market(
            &mut pf,
            Side::Buy,
            10.0,
            0,
            0.0,
            500.0,
            "SMA Crossover (5/20)",
        )
        .unwrap();
        assert_eq!(trade.rule_name, "SMA Crossover (5/20)");
    }

    proptest! {
        #[test]
        fn buy_then_sell_round_trip_conserves_cash_without_fees(
            cash in 1_000.0f64..1_000_000.0,
            price in 1.0f64..5_000.0,
            ratio in 0.01f64..1.0,
        ) {
            let mut pf = Portfolio::new(cash);
            execute_market(&mut pf, Side::Buy, price, 0, 0.0, cash * ratio, "p").unwrap();
            execute_market(&mut pf, Side::Sell, price, 1, 0.0, 0.0, "p").unwrap();
            prop_assert!((pf.cash - cash).abs() < 1e-6 * cash.max(1.0));
            prop_assert!(pf.asset_qty.abs() < 1e-12);
        }

        #[test]
        fn sell_always_zeroes_position(
            qty in 0.0f64..10_000.0,
            price in 1.0f64..5_000.0,
            fee_rate in 0.0f64..0.01,
        ) {
            let mut pf = Portfolio::new(0.0);
            pf.asset_qty = qty;
            execute_market(&mut pf, Side::Sell, price, 0, fee_rate, 0.0, "p").unwrap();
            prop_assert_eq!(pf.asset_qty, 0.0);
            prop_assert!(pf.cash >= 0.0);
        }
    }
}
