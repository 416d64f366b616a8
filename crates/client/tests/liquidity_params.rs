//! # Liquidity Parameter Tests
//!
//! Builds mint, increase and decrease parameters the way the add and remove
//! liquidity pages do, and checks ranges, token ordering and minimums.

use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use vswap_client::math::{
    cmp_fractions, position_amounts, tick_to_sqrt_price_x96, FeeAmount, MathError, Q192, U256,
    Q96,
};
use vswap_client::*;

fn dec(s: &str) -> rust_decimal::Decimal {
    rust_decimal::Decimal::from_str(s).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
}

fn alpha() -> Token {
    Token::new("0x1111111111111111111111111111111111111111", "ALPHA", 18)
}

fn beta() -> Token {
    Token::new("0x2222222222222222222222222222222222222222", "BETA", 18)
}

fn mint_request(token_a: Token, token_b: Token) -> MintRequest {
    MintRequest {
        token_a,
        token_b,
        fee: FeeAmount::Medium,
        amount_a: dec("1"),
        amount_b: dec("1"),
        price_lower: PriceBound::Finite(dec("0.9")),
        price_upper: PriceBound::Finite(dec("1.1")),
        pool_sqrt_price_x96: Some(Q96),
        recipient: "0x3333333333333333333333333333333333333333".to_string(),
    }
}

fn position(liquidity: u128) -> Position {
    Position {
        token_id: U256::from(7u32),
        token0: alpha(),
        token1: beta(),
        fee: FeeAmount::Medium,
        tick_lower: -600,
        tick_upper: 600,
        liquidity,
    }
}

// ============================================================================
// Mint
// ============================================================================

#[test]
fn test_mint_in_pool_order() {
    let settings = TradeSettings::default();
    let params = mint_request(alpha(), beta()).build(&settings, now()).unwrap();

    assert_eq!(params.token0, alpha().address);
    assert_eq!(params.token1, beta().address);
    // floor(log_1.0001(0.9)) = -1054 -> -1080, floor(log_1.0001(1.1)) = 953 -> 960
    assert_eq!((params.tick_lower, params.tick_upper), (-1080, 960));
    assert_eq!(params.amount0_desired, U256::from(10u128.pow(18)));
    assert_eq!(params.amount1_desired, U256::from(10u128.pow(18)));
    assert!(params.amount0_min <= params.amount0_desired);
    assert!(params.amount1_min <= params.amount1_desired);
    assert!(params.amount0_min > U256::ZERO);
    assert!(params.amount1_min > U256::ZERO);
    assert_eq!(params.deadline, now().timestamp() + 30 * 60);
    assert_eq!(params.initial_sqrt_price_x96, None);
}

#[test]
fn test_mint_reversed_tokens_inverts_range() {
    let settings = TradeSettings::default();
    let mut request = mint_request(beta(), alpha());
    request.amount_a = dec("2");

    let params = request.build(&settings, now()).unwrap();

    assert_eq!(params.token0, alpha().address);
    assert_eq!(params.token1, beta().address);
    // Range becomes [1/1.1, 1/0.9] in ALPHA-per-BETA terms
    assert_eq!((params.tick_lower, params.tick_upper), (-960, 1080));
    assert_eq!(params.amount0_desired, U256::from(10u128.pow(18)));
    assert_eq!(params.amount1_desired, U256::from(2 * 10u128.pow(18)));
}

#[test]
fn test_mint_full_range() {
    let settings = TradeSettings::default();
    let mut request = mint_request(alpha(), beta());
    request.price_lower = PriceBound::Zero;
    request.price_upper = PriceBound::Infinite;

    let params = request.build(&settings, now()).unwrap();
    assert_eq!(params.tick_lower, FeeAmount::Medium.min_usable_tick());
    assert_eq!(params.tick_upper, FeeAmount::Medium.max_usable_tick());

    // Reversed tokens swap the ends back to the same full range
    let mut request = mint_request(beta(), alpha());
    request.price_lower = PriceBound::Zero;
    request.price_upper = PriceBound::Infinite;
    let params = request.build(&settings, now()).unwrap();
    assert_eq!(params.tick_lower, FeeAmount::Medium.min_usable_tick());
    assert_eq!(params.tick_upper, FeeAmount::Medium.max_usable_tick());
}

#[test]
fn test_mint_new_pool_seeds_price_from_amounts() {
    let settings = TradeSettings::default();
    let mut request = mint_request(alpha(), beta());
    request.pool_sqrt_price_x96 = None;
    request.amount_b = dec("4");
    request.price_lower = PriceBound::Finite(dec("2"));
    request.price_upper = PriceBound::Finite(dec("8"));

    let params = request.build(&settings, now()).unwrap();
    // sqrt(4) in Q64.96
    assert_eq!(params.initial_sqrt_price_x96, Some(Q96 * U256::from(2u8)));

    request.amount_a = dec("0");
    assert!(matches!(
        request.build(&settings, now()),
        Err(ClientError::InvalidParameters(_))
    ));
}

#[test]
fn test_mint_new_pool_price_is_exact_floor() {
    let settings = TradeSettings::default();
    let mut request = mint_request(alpha(), beta());
    request.pool_sqrt_price_x96 = None;
    request.amount_a = dec("3000000000000");
    request.amount_b = dec("1000000000000");
    request.price_lower = PriceBound::Zero;
    request.price_upper = PriceBound::Infinite;

    let params = request.build(&settings, now()).unwrap();
    let sqrt = params.initial_sqrt_price_x96.unwrap();
    let (amount1, amount0) = (params.amount1_desired, params.amount0_desired);

    // floor(sqrt(1/3) * 2^96)
    assert!(cmp_fractions(sqrt * sqrt, Q192, amount1, amount0).is_le());
    let next = sqrt + U256::ONE;
    assert!(cmp_fractions(next * next, Q192, amount1, amount0).is_gt());
}

#[test]
fn test_mint_rejects_bad_input() {
    let settings = TradeSettings::default();

    let same = mint_request(alpha(), alpha());
    assert!(matches!(
        same.build(&settings, now()),
        Err(ClientError::InvalidParameters(_))
    ));

    let mut inverted = mint_request(alpha(), beta());
    inverted.price_lower = PriceBound::Finite(dec("1.1"));
    inverted.price_upper = PriceBound::Finite(dec("0.9"));
    assert!(matches!(
        inverted.build(&settings, now()),
        Err(ClientError::Math(MathError::InvalidRange(_)))
    ));

    // Both ends snap onto the same tick
    let mut collapsed = mint_request(alpha(), beta());
    collapsed.price_lower = PriceBound::Finite(dec("1.0001"));
    collapsed.price_upper = PriceBound::Finite(dec("1.0002"));
    assert!(matches!(
        collapsed.build(&settings, now()),
        Err(ClientError::Math(MathError::InvalidRange(_)))
    ));

    let mut nothing = mint_request(alpha(), beta());
    nothing.amount_a = dec("0");
    nothing.amount_b = dec("0");
    assert!(matches!(
        nothing.build(&settings, now()),
        Err(ClientError::InvalidParameters(_))
    ));
}

#[test]
fn test_mint_params_json() {
    let settings = TradeSettings::default();
    let params = mint_request(alpha(), beta()).build(&settings, now()).unwrap();

    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(json["fee"], 3000);
    assert_eq!(json["amount0_desired"], "1000000000000000000");
    assert_eq!(json["initial_sqrt_price_x96"], serde_json::Value::Null);

    let back: MintParams = serde_json::from_value(json).unwrap();
    assert_eq!(back, params);
}

// ============================================================================
// Increase and decrease
// ============================================================================

#[test]
fn test_increase_minimums_below_desired() {
    let settings = TradeSettings::default();
    let request = IncreaseRequest {
        position: position(10u128.pow(18)),
        amount0: dec("0.5"),
        amount1: dec("0.5"),
        pool_sqrt_price_x96: Q96,
    };

    let params = request.build(&settings, now()).unwrap();
    assert_eq!(params.token_id, U256::from(7u32));
    assert_eq!(params.amount0_desired, U256::from(5 * 10u128.pow(17)));
    assert!(params.amount0_min <= params.amount0_desired);
    assert!(params.amount1_min <= params.amount1_desired);
}

#[test]
fn test_decrease_half() {
    let settings = TradeSettings::default();
    let request = DecreaseRequest {
        position: position(10u128.pow(18)),
        percent: 50,
        pool_sqrt_price_x96: Q96,
    };

    let params = request.build(&settings, now()).unwrap();
    assert_eq!(params.liquidity, 5 * 10u128.pow(17));

    let held = request.position.clone();
    let (held0, held1) = Position {
        liquidity: params.liquidity,
        ..held
    }
    .amounts(Q96)
    .unwrap();
    assert!(params.amount0_min <= held0);
    assert!(params.amount1_min <= held1);
    assert!(params.amount0_min > U256::ZERO);
}

#[test]
fn test_position_amounts_and_range() {
    let position = position(10u128.pow(18));
    assert!(position.in_range(Q96).unwrap());

    let above = tick_to_sqrt_price_x96(1200).unwrap();
    assert!(!position.in_range(above).unwrap());
    let (amount0, amount1) = position.amounts(above).unwrap();
    assert_eq!(amount0, U256::ZERO);
    assert!(amount1 > U256::ZERO);

    let (human0, human1) = position.decimal_amounts(Q96).unwrap();
    // About 3% of L on each side of a symmetric range at tick 0
    assert!(human0 > dec("0.02") && human0 < dec("0.04"));
    assert!(human1 > dec("0.02") && human1 < dec("0.04"));
}

proptest! {
    #[test]
    fn prop_decrease_minimums_within_burned_amounts(
        percent in 1u8..=100,
        tick in -1200i32..1200,
        liquidity in 1_000_000u128..1_000_000_000_000_000_000_000u128,
        bps in 0u16..2000,
    ) {
        let mut settings = TradeSettings::default();
        settings.set_slippage(vswap_client::math::SlippageTolerance::from_bps(bps)).unwrap();

        let sqrt_price = tick_to_sqrt_price_x96(tick).unwrap();
        let request = DecreaseRequest {
            position: position(liquidity),
            percent,
            pool_sqrt_price_x96: sqrt_price,
        };
        let params = request.build(&settings, now()).unwrap();
        prop_assert!(params.liquidity <= liquidity);

        let (held0, held1) = position_amounts(
            sqrt_price,
            tick_to_sqrt_price_x96(-600).unwrap(),
            tick_to_sqrt_price_x96(600).unwrap(),
            params.liquidity,
        ).unwrap();
        prop_assert!(params.amount0_min <= held0);
        prop_assert!(params.amount1_min <= held1);
    }
}
