use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn display_drops_trailing_zeros() {
    assert_eq!(d("3.560").to_string(), "3.56");
    assert_eq!(d("3.0").to_string(), "3");
    assert_eq!(d("-0.0").to_string(), "0");
    assert_eq!(d("0.05").to_string(), "0.05");
    assert_eq!(d("-12.5").to_string(), "-12.5");
}

#[test]
fn parse_exponent_forms() {
    assert_eq!(d("15e-1"), d("1.5"));
    assert_eq!(d("1.5E3").to_string(), "1500");
    assert_eq!(d(".5").to_string(), "0.5");
    assert_eq!(d("+7").to_string(), "7");
    assert!("".parse::<Decimal>().is_err());
    assert!(".".parse::<Decimal>().is_err());
    assert!("1x".parse::<Decimal>().is_err());
    assert!("1e".parse::<Decimal>().is_err());
}

#[test]
fn equality_ignores_scale() {
    assert_eq!(d("1.50"), d("1.5"));
    assert_eq!(Decimal::new(150, 2), &Decimal::from(1i64) + &d("0.5"));
    let mut set = std::collections::HashSet::new();
    set.insert(d("2.000"));
    assert!(set.contains(&d("2")));
}

#[test]
fn ordering_across_scales() {
    assert!(d("1.05") < d("1.5"));
    assert!(d("-2") < d("-1.999"));
    assert_eq!(d("10").cmp(&d("10.000")), Ordering::Equal);
}

#[test]
fn division_rounds_half_away_from_zero() {
    let two_thirds = d("2")
        .checked_div_round(&d("3"), DIVISION_PRECISION)
        .unwrap();
    assert_eq!(two_thirds.to_string(), "0.6666666666666666666666666667");
    let neg = d("-2").checked_div_round(&d("3"), 2).unwrap();
    assert_eq!(neg.to_string(), "-0.67");
    assert_eq!(d("1").checked_div_round(&d("8"), 2).unwrap().to_string(), "0.13");
    assert_eq!(d("7.5").checked_div_round(&d("2.5"), 28).unwrap().to_string(), "3");
    assert!(d("1").checked_div_round(&Decimal::zero(), 28).is_none());
}

#[test]
fn remainder_keeps_dividend_sign() {
    assert_eq!(d("7.2").checked_rem(&d("3.7")).unwrap().to_string(), "3.5");
    assert_eq!(d("7").checked_rem(&d("3.7")).unwrap().to_string(), "3.3");
    assert_eq!(d("-7").checked_rem(&d("3")).unwrap().to_string(), "-1");
    assert!(d("7").checked_rem(&d("0.0")).is_none());
}

#[test]
fn integer_views() {
    assert_eq!(d("5.0").to_i64(), Some(5));
    assert_eq!(d("5.3").to_i64(), None);
    assert_eq!(d("5.3").int_part(), Some(5));
    assert_eq!(d("-5.9").int_part(), Some(-5));
    assert_eq!(d("9223372036854775808").to_i64(), None);
    assert!(d("12.000").is_integer());
}

#[test]
fn from_float_uses_shortest_representation() {
    assert_eq!(Decimal::from_f64(0.1).unwrap().to_string(), "0.1");
    assert_eq!(Decimal::from_f32(0.1).unwrap().to_string(), "0.1");
    assert_eq!(Decimal::from_f64(1e21).unwrap().to_string(), "1000000000000000000000");
    assert_eq!(Decimal::from_f64(-2.5).unwrap().to_string(), "-2.5");
    assert!(Decimal::from_f64(f64::NAN).is_none());
    assert!(Decimal::from_f32(f32::INFINITY).is_none());
}

#[test]
fn float_widths_round_once() {
    assert_eq!(Decimal::from_f32(0.3).unwrap().to_string(), "0.3");
    assert_eq!(
        Decimal::from_f64(f64::from(0.3_f32)).unwrap().to_string(),
        "0.30000001192092896"
    );
    assert_eq!(Decimal::from_f64(1e-7).unwrap().to_string(), "0.0000001");
}

proptest! {
    #[test]
    fn i128_arithmetic_is_exact(a in any::<i64>(), b in any::<i64>()) {
        let (x, y) = (Decimal::from(a), Decimal::from(b));
        prop_assert_eq!((&x + &y).to_string(), (i128::from(a) + i128::from(b)).to_string());
        prop_assert_eq!((&x - &y).to_string(), (i128::from(a) - i128::from(b)).to_string());
        prop_assert_eq!((&x * &y).to_string(), (i128::from(a) * i128::from(b)).to_string());
    }

    #[test]
    fn display_parses_back(m in any::<i64>(), scale in 0u32..30) {
        let x = Decimal::new(m, scale);
        prop_assert_eq!(d(&x.to_string()), x);
    }
}
