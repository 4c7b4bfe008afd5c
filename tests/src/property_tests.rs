//! Properties of order sizing and balance arithmetic

use proptest::prelude::*;
use v4v_core::Fixed;
use v4v_exchanges::swap::{MIN_BTC_NOTIONAL, balance_delta, normalize_quantity};
use v4v_exchanges::BalanceSnapshot;

fn amount() -> impl Strategy<Value = Fixed> {
    (1u32..=2_000_000_000, 0u32..=8).prop_map(|(mantissa, scale)| Fixed::from_scaled(mantissa, scale))
}

fn step() -> impl Strategy<Value = Fixed> {
    (1u32..=100, 0u32..=8).prop_map(|(mantissa, scale)| Fixed::from_scaled(mantissa, scale))
}

fn price() -> impl Strategy<Value = Fixed> {
    (1u32..=100_000, 4u32..=10).prop_map(|(mantissa, scale)| Fixed::from_scaled(mantissa, scale))
}

proptest! {
    #[test]
    fn round_up_is_smallest_step_multiple(quantity in amount(), step in step()) {
        let rounded = quantity.round_up_to_step(step).unwrap();

        prop_assert!(rounded >= quantity);
        prop_assert!(rounded - quantity < step);

        let steps = rounded.checked_div(step).unwrap();
        prop_assert_eq!(steps, steps.floor());
    }

    #[test]
    fn round_up_is_idempotent(quantity in amount(), step in step()) {
        let once = quantity.round_up_to_step(step).unwrap();
        let twice = once.round_up_to_step(step).unwrap();

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sats_truncate_below_one_satoshi(mantissa in 0u32..=2_000_000_000, extra in 0u32..=2) {
        // mantissa * 10^-(8 + extra) BTC
        let btc = Fixed::from_scaled(mantissa, 8 + extra);
        let expected = Fixed::from_i64(i64::from(mantissa / 10u32.pow(extra)));

        prop_assert_eq!(btc.to_sats().unwrap(), expected);
    }

    #[test]
    fn minimum_order_meets_btc_notional(requested in amount(), price in price(), step in step()) {
        let quantity = normalize_quantity(requested, price, step, true).unwrap();

        prop_assert!(quantity >= requested);
        prop_assert!(quantity * price >= MIN_BTC_NOTIONAL);
    }

    #[test]
    fn delta_is_after_minus_before(
        hive_before in amount(),
        hive_after in amount(),
        usdt_before in amount(),
    ) {
        let before: BalanceSnapshot = [("HIVE", hive_before), ("USDT", usdt_before)].into_iter().collect();
        let after: BalanceSnapshot = [("HIVE", hive_after)].into_iter().collect();

        let delta = balance_delta(&before, &after, "HIVE", "USDT").unwrap();

        prop_assert_eq!(delta.get("HIVE"), hive_after - hive_before);
        prop_assert_eq!(delta.get("USDT"), -usdt_before);
        prop_assert!(!delta.contains("SATS/HIVE"));
    }
}
