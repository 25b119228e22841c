use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

use super::Rule;

/// Fixed-point column shape, as in `NUMERIC(precision, scale)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalSpec {
    pub precision: u32,
    pub scale: u32,
}

impl DecimalSpec {
    pub const fn new(precision: u32, scale: u32) -> Self {
        Self { precision, scale }
    }

    /// Digits allowed before the decimal point
    pub fn integer_digits(&self) -> u32 {
        self.precision - self.scale
    }

    /// Parse a JSON string or number through its decimal text, then normalize.
    pub fn from_json(&self, value: &Value) -> Result<Decimal, Rule> {
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => {
                return Err(Rule::WrongType {
                    expected: "a decimal number or numeric string",
                })
            }
        };

        let parsed = Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| Rule::InvalidFormat {
                expected: "a decimal number",
            })?;

        self.normalize(parsed)
    }

    /// Round half away from zero to `scale`, pad to exactly `scale` fractional
    /// digits, and reject values whose integer part does not fit.
    pub fn normalize(&self, value: Decimal) -> Result<Decimal, Rule> {
        let mut rounded =
            value.round_dp_with_strategy(self.scale, RoundingStrategy::MidpointAwayFromZero);

        let limit = Decimal::from_i128_with_scale(10i128.pow(self.integer_digits()), 0);
        if rounded.abs() >= limit {
            return Err(Rule::OutOfRange {
                detail: format!(
                    "at most {} integer digits and {} decimal places",
                    self.integer_digits(),
                    self.scale
                ),
            });
        }

        rounded.rescale(self.scale);
        Ok(rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const AREA: DecimalSpec = DecimalSpec::new(14, 4);
    const PRICE: DecimalSpec = DecimalSpec::new(10, 2);

    #[test]
    fn numbers_do_not_pick_up_float_drift() {
        let d = PRICE.from_json(&json!(0.1)).unwrap();
        assert_eq!(d.to_string(), "0.10");

        let d = AREA.from_json(&json!(12.3456)).unwrap();
        assert_eq!(d.to_string(), "12.3456");
    }

    #[test]
    fn strings_are_accepted_and_padded() {
        let d = PRICE.from_json(&json!(" 1500 ")).unwrap();
        assert_eq!(d.to_string(), "1500.00");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(PRICE.from_json(&json!("2.345")).unwrap().to_string(), "2.35");
        assert_eq!(PRICE.from_json(&json!("-2.345")).unwrap().to_string(), "-2.35");
        assert_eq!(AREA.from_json(&json!("1.00005")).unwrap().to_string(), "1.0001");
    }

    #[test]
    fn integer_overflow_is_out_of_range() {
        assert!(AREA.from_json(&json!("9999999999.9999")).is_ok());
        assert!(matches!(
            AREA.from_json(&json!("10000000000")),
            Err(Rule::OutOfRange { .. })
        ));
        // rounding can push a value over the limit
        assert!(matches!(
            PRICE.from_json(&json!("99999999.999")),
            Err(Rule::OutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert!(matches!(PRICE.from_json(&json!("abc")), Err(Rule::InvalidFormat { .. })));
        assert!(matches!(PRICE.from_json(&json!(true)), Err(Rule::WrongType { .. })));
    }

    #[test]
    fn scientific_notation_is_parsed() {
        assert_eq!(AREA.from_json(&json!("1.5e3")).unwrap().to_string(), "1500.0000");
    }
}
