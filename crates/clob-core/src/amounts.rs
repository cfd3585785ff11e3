//! Conversion of human prices and sizes into on-chain order amounts.
//!
//! All arithmetic is done in `rust_decimal` and only converted to the
//! 6-decimal integer representation at the very end.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::{OrderType, PriceLevel, Side};
use crate::{Error, Result};

/// Collateral and outcome tokens both use 6 decimals.
pub const TOKEN_DECIMALS: u32 = 6;

/// Minimum price increment of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TickSize {
    Tenth,
    Hundredth,
    Thousandth,
    TenThousandth,
}

/// Decimal places allowed for price, size and the derived amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundConfig {
    pub price: u32,
    pub size: u32,
    pub amount: u32,
}

impl TickSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            TickSize::Tenth => "0.1",
            TickSize::Hundredth => "0.01",
            TickSize::Thousandth => "0.001",
            TickSize::TenThousandth => "0.0001",
        }
    }

    pub fn as_decimal(&self) -> Decimal {
        match self {
            TickSize::Tenth => Decimal::new(1, 1),
            TickSize::Hundredth => Decimal::new(1, 2),
            TickSize::Thousandth => Decimal::new(1, 3),
            TickSize::TenThousandth => Decimal::new(1, 4),
        }
    }

    pub fn round_config(&self) -> RoundConfig {
        match self {
            TickSize::Tenth => RoundConfig { price: 1, size: 2, amount: 3 },
            TickSize::Hundredth => RoundConfig { price: 2, size: 2, amount: 4 },
            TickSize::Thousandth => RoundConfig { price: 3, size: 2, amount: 5 },
            TickSize::TenThousandth => RoundConfig { price: 4, size: 2, amount: 6 },
        }
    }
}

impl fmt::Display for TickSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TickSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "0.1" => Ok(TickSize::Tenth),
            "0.01" => Ok(TickSize::Hundredth),
            "0.001" => Ok(TickSize::Thousandth),
            "0.0001" => Ok(TickSize::TenThousandth),
            other => Err(Error::InvalidTickSize(other.to_string())),
        }
    }
}

impl TryFrom<String> for TickSize {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TickSize> for String {
    fn from(value: TickSize) -> Self {
        value.as_str().to_string()
    }
}

/// `true` when `price` lies in `[tick, 1 - tick]`.
pub fn price_valid(price: Decimal, tick_size: TickSize) -> bool {
    let tick = tick_size.as_decimal();
    price >= tick && price <= Decimal::ONE - tick
}

/// `true` when `tick_size` is finer than `min_tick_size`.
pub fn is_tick_size_smaller(tick_size: TickSize, min_tick_size: TickSize) -> bool {
    tick_size.as_decimal() < min_tick_size.as_decimal()
}

pub fn round_down(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::ToNegativeInfinity)
}

pub fn round_up(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::ToPositiveInfinity)
}

/// Round half away from zero.
pub fn round_normal(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Significant fractional digits, ignoring trailing zeros.
pub fn decimal_places(value: Decimal) -> u32 {
    value.normalize().scale()
}

/// Scale to 6-decimal base units and round to the nearest integer.
pub fn to_token_decimals(value: Decimal) -> Result<u64> {
    let scaled = value
        .checked_mul(Decimal::from(10u64.pow(TOKEN_DECIMALS)))
        .ok_or_else(|| Error::NumericOverflow(format!("{value} in base units")))?;
    round_normal(scaled, 0)
        .to_u64()
        .ok_or_else(|| Error::NumericOverflow(format!("{value} does not fit in u64 base units")))
}

/// Bring a derived amount within `config.amount` decimals.
///
/// Rounds up at `amount + 4` first so values a hair below a boundary snap to
/// it, then truncates whatever precision is still left over.
pub(crate) fn clamp_amount(value: Decimal, config: &RoundConfig) -> Decimal {
    if decimal_places(value) <= config.amount {
        return value;
    }
    let value = round_up(value, config.amount + 4);
    if decimal_places(value) > config.amount {
        round_down(value, config.amount)
    } else {
        value
    }
}

/// Integer maker and taker amounts for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAmounts {
    pub side: Side,
    pub maker_amount: u64,
    pub taker_amount: u64,
}

impl OrderAmounts {
    fn from_decimals(side: Side, maker: Decimal, taker: Decimal) -> Result<Self> {
        Ok(Self {
            side,
            maker_amount: to_token_decimals(maker)?,
            taker_amount: to_token_decimals(taker)?,
        })
    }
}

fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| Error::NumericOverflow(format!("{a} * {b}")))
}

/// Amounts for a limit order of `size` outcome tokens at `price`.
///
/// BUY gives collateral (maker) for tokens (taker); SELL the reverse.
pub fn get_order_amounts(
    side: Side,
    size: Decimal,
    price: Decimal,
    config: &RoundConfig,
) -> Result<OrderAmounts> {
    let price = round_normal(price, config.price);

    match side {
        Side::Buy => {
            let taker = round_down(size, config.size);
            let maker = clamp_amount(checked_mul(taker, price)?, config);
            OrderAmounts::from_decimals(side, maker, taker)
        }
        Side::Sell => {
            let maker = round_down(size, config.size);
            let taker = clamp_amount(checked_mul(maker, price)?, config);
            OrderAmounts::from_decimals(side, maker, taker)
        }
    }
}

/// Amounts for a market order.
///
/// For BUY `amount` is collateral to spend; for SELL it is tokens to sell.
pub fn get_market_order_amounts(
    side: Side,
    amount: Decimal,
    price: Decimal,
    config: &RoundConfig,
) -> Result<OrderAmounts> {
    let price = round_normal(price, config.price);
    let maker = round_down(amount, config.size);

    let taker = match side {
        Side::Buy => maker
            .checked_div(price)
            .ok_or_else(|| Error::invalid_value("price", format!("cannot divide by {price}")))?,
        Side::Sell => checked_mul(maker, price)?,
    };

    OrderAmounts::from_decimals(side, maker, clamp_amount(taker, config))
}

/// Clearing price for a market BUY spending `amount_to_match` collateral.
///
/// `asks` must be ordered best (lowest) first.
pub fn calculate_buy_market_price(
    asks: &[PriceLevel],
    amount_to_match: Decimal,
    order_type: OrderType,
) -> Result<Decimal> {
    walk_levels(asks, amount_to_match, order_type, |level| {
        checked_mul(level.price, level.size)
    })
}

/// Clearing price for a market SELL of `amount_to_match` tokens.
///
/// `bids` must be ordered best (highest) first.
pub fn calculate_sell_market_price(
    bids: &[PriceLevel],
    amount_to_match: Decimal,
    order_type: OrderType,
) -> Result<Decimal> {
    walk_levels(bids, amount_to_match, order_type, |level| Ok(level.size))
}

/// Dispatch on side to the matching book walk.
pub fn calculate_market_price(
    side: Side,
    levels: &[PriceLevel],
    amount_to_match: Decimal,
    order_type: OrderType,
) -> Result<Decimal> {
    match side {
        Side::Buy => calculate_buy_market_price(levels, amount_to_match, order_type),
        Side::Sell => calculate_sell_market_price(levels, amount_to_match, order_type),
    }
}

fn walk_levels<F>(
    levels: &[PriceLevel],
    amount_to_match: Decimal,
    order_type: OrderType,
    contribution: F,
) -> Result<Decimal>
where
    F: Fn(&PriceLevel) -> Result<Decimal>,
{
    let last = levels.last().ok_or(Error::NoMatch)?;

    let mut sum = Decimal::ZERO;
    for level in levels {
        let filled = contribution(level)?;
        sum = sum
            .checked_add(filled)
            .ok_or_else(|| Error::NumericOverflow(format!("book depth {sum} + {filled}")))?;
        if sum >= amount_to_match {
            return Ok(level.price);
        }
    }

    if order_type == OrderType::Fok {
        return Err(Error::NoMatch);
    }
    // Partial fill allowed: accept the worst price on the book
    Ok(last.price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn asks() -> Vec<PriceLevel> {
        vec![
            PriceLevel::new(dec("0.50"), dec("100")),
            PriceLevel::new(dec("0.51"), dec("200")),
            PriceLevel::new(dec("0.52"), dec("300")),
        ]
    }

    #[test]
    fn test_tick_size_table() {
        let expected = [
            ("0.1", (1, 2, 3)),
            ("0.01", (2, 2, 4)),
            ("0.001", (3, 2, 5)),
            ("0.0001", (4, 2, 6)),
        ];
        for (tick, (price, size, amount)) in expected {
            let config = tick.parse::<TickSize>().unwrap().round_config();
            assert_eq!(config, RoundConfig { price, size, amount }, "tick {tick}");
        }
    }

    #[test]
    fn test_unknown_tick_size_is_an_error() {
        assert!(matches!(
            "0.05".parse::<TickSize>(),
            Err(Error::InvalidTickSize(_))
        ));
        assert!(serde_json::from_str::<TickSize>("\"0.2\"").is_err());
        assert_eq!(
            serde_json::from_str::<TickSize>("\"0.001\"").unwrap(),
            TickSize::Thousandth
        );
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round_down(dec("1.239"), 2), dec("1.23"));
        assert_eq!(round_up(dec("1.231"), 2), dec("1.24"));
        assert_eq!(round_normal(dec("1.235"), 2), dec("1.24"));
        assert_eq!(round_normal(dec("1.234"), 2), dec("1.23"));
        assert_eq!(decimal_places(dec("1.2300")), 2);
        assert_eq!(decimal_places(dec("5")), 0);
    }

    #[test]
    fn test_to_token_decimals() {
        assert_eq!(to_token_decimals(dec("0.5")).unwrap(), 500_000);
        assert_eq!(to_token_decimals(dec("0.0000005")).unwrap(), 1);
        assert!(matches!(
            to_token_decimals(dec("-1")),
            Err(Error::NumericOverflow(_))
        ));
    }

    #[test]
    fn test_limit_buy_amounts() {
        let config = TickSize::Hundredth.round_config();
        let amounts = get_order_amounts(Side::Buy, dec("100"), dec("0.50"), &config).unwrap();
        assert_eq!(amounts.side, Side::Buy);
        assert_eq!(amounts.maker_amount, 50_000_000);
        assert_eq!(amounts.taker_amount, 100_000_000);
    }

    #[test]
    fn test_limit_sell_amounts() {
        let config = TickSize::Hundredth.round_config();
        let amounts = get_order_amounts(Side::Sell, dec("100"), dec("0.50"), &config).unwrap();
        assert_eq!(amounts.maker_amount, 100_000_000);
        assert_eq!(amounts.taker_amount, 50_000_000);
    }

    #[test]
    fn test_limit_size_rounded_down_and_price_rounded() {
        let config = TickSize::Hundredth.round_config();
        // size 21.049 -> 21.04, price 0.575 -> 0.58, maker 12.2032
        let amounts = get_order_amounts(Side::Buy, dec("21.049"), dec("0.575"), &config).unwrap();
        assert_eq!(amounts.taker_amount, 21_040_000);
        assert_eq!(amounts.maker_amount, 12_203_200);
    }

    #[test]
    fn test_market_buy_clamps_division() {
        let config = TickSize::Hundredth.round_config();
        // 10 / 0.56 = 17.857142857..., clamped to 17.8571
        let amounts = get_market_order_amounts(Side::Buy, dec("10"), dec("0.56"), &config).unwrap();
        assert_eq!(amounts.maker_amount, 10_000_000);
        assert_eq!(amounts.taker_amount, 17_857_100);

        let config = TickSize::Tenth.round_config();
        let amounts = get_market_order_amounts(Side::Buy, dec("100"), dec("0.3"), &config).unwrap();
        assert_eq!(amounts.taker_amount, 333_333_000);
    }

    #[test]
    fn test_market_sell_amounts() {
        let config = TickSize::Hundredth.round_config();
        let amounts =
            get_market_order_amounts(Side::Sell, dec("50.129"), dec("0.40"), &config).unwrap();
        assert_eq!(amounts.maker_amount, 50_120_000);
        assert_eq!(amounts.taker_amount, 20_048_000);
    }

    #[test]
    fn test_market_buy_zero_price_rejected() {
        let config = TickSize::Hundredth.round_config();
        assert!(get_market_order_amounts(Side::Buy, dec("10"), dec("0.001"), &config).is_err());
    }

    #[test]
    fn test_clamp_rounds_up_before_truncating() {
        let config = TickSize::Hundredth.round_config();
        assert_eq!(clamp_amount(dec("12.9999999999"), &config), dec("13"));
        assert_eq!(clamp_amount(dec("12.12345678"), &config), dec("12.1234"));
        assert_eq!(clamp_amount(dec("12.1234"), &config), dec("12.1234"));
    }

    #[test]
    fn test_buy_market_price() {
        let asks = asks();
        assert_eq!(
            calculate_buy_market_price(&asks, dec("50"), OrderType::Fok).unwrap(),
            dec("0.50")
        );
        assert_eq!(
            calculate_buy_market_price(&asks, dec("100"), OrderType::Fok).unwrap(),
            dec("0.51")
        );
    }

    #[test]
    fn test_buy_market_price_exhausted_book() {
        let asks = asks();
        // Total notional is 50 + 102 + 156 = 308
        assert!(matches!(
            calculate_buy_market_price(&asks, dec("1000"), OrderType::Fok),
            Err(Error::NoMatch)
        ));
        assert_eq!(
            calculate_buy_market_price(&asks, dec("1000"), OrderType::Fak).unwrap(),
            dec("0.52")
        );
    }

    #[test]
    fn test_sell_market_price_accumulates_size() {
        let bids = vec![
            PriceLevel::new(dec("0.49"), dec("100")),
            PriceLevel::new(dec("0.48"), dec("200")),
        ];
        assert_eq!(
            calculate_sell_market_price(&bids, dec("100"), OrderType::Fok).unwrap(),
            dec("0.49")
        );
        assert_eq!(
            calculate_sell_market_price(&bids, dec("150"), OrderType::Fok).unwrap(),
            dec("0.48")
        );
        assert!(matches!(
            calculate_sell_market_price(&bids, dec("301"), OrderType::Fok),
            Err(Error::NoMatch)
        ));
    }

    #[test]
    fn test_book_depth_overflow_is_an_error() {
        let bids = vec![
            PriceLevel::new(dec("0.5"), Decimal::MAX - Decimal::ONE),
            PriceLevel::new(dec("0.4"), Decimal::MAX),
        ];
        assert!(matches!(
            calculate_sell_market_price(&bids, Decimal::MAX, OrderType::Fak),
            Err(Error::NumericOverflow(_))
        ));
    }

    #[test]
    fn test_empty_book_never_matches() {
        for order_type in [OrderType::Fok, OrderType::Fak, OrderType::Gtc] {
            assert!(matches!(
                calculate_market_price(Side::Buy, &[], dec("0"), order_type),
                Err(Error::NoMatch)
            ));
            assert!(matches!(
                calculate_market_price(Side::Sell, &[], dec("1"), order_type),
                Err(Error::NoMatch)
            ));
        }
    }

    #[test]
    fn test_price_valid() {
        assert!(price_valid(dec("0.01"), TickSize::Hundredth));
        assert!(price_valid(dec("0.99"), TickSize::Hundredth));
        assert!(!price_valid(dec("0.995"), TickSize::Hundredth));
        assert!(!price_valid(dec("0.001"), TickSize::Hundredth));
        assert!(price_valid(dec("0.001"), TickSize::Thousandth));
    }

    #[test]
    fn test_is_tick_size_smaller() {
        assert!(is_tick_size_smaller(TickSize::Thousandth, TickSize::Hundredth));
        assert!(!is_tick_size_smaller(TickSize::Tenth, TickSize::Hundredth));
        assert!(!is_tick_size_smaller(TickSize::Hundredth, TickSize::Hundredth));
    }
}
