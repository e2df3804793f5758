//! Unit price helpers.
//!
//! Prices are snapshotted onto line items at add-time as plain `f64`
//! amounts in the store currency's standard unit (dollars, not cents).
//! Totals are accumulated with ordinary IEEE-754 double arithmetic, so
//! `0.1 + 0.2` style drift at the cent level is observable and expected.

use thiserror::Error;

/// Errors that can occur when parsing a price from user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a number.
    #[error("price is not a number: {0}")]
    NotANumber(String),
    /// The input is negative, infinite, or NaN.
    #[error("price must be a finite, non-negative amount: {0}")]
    OutOfRange(String),
}

/// Format an amount for display (e.g., `$19.99`).
#[must_use]
pub fn format_price(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${amount:.2}")
    }
}

/// Parse a price from user input, accepting an optional leading `$`.
///
/// # Errors
///
/// Returns `PriceError::NotANumber` if the input does not parse as a float,
/// or `PriceError::OutOfRange` if it is negative or not finite.
pub fn parse_price(input: &str) -> Result<f64, PriceError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);

    let amount = digits
        .parse::<f64>()
        .map_err(|_| PriceError::NotANumber(input.to_owned()))?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(PriceError::OutOfRange(input.to_owned()));
    }

    Ok(amount)
}

/// Serde adapter for `f64` amounts that round-trips non-finite values.
///
/// JSON has no NaN or infinity and `serde_json` writes them as `null`,
/// which does not read back as `f64`. Finite amounts are written as plain
/// numbers; NaN and the infinities are written as the strings `"NaN"`,
/// `"inf"` and `"-inf"`. A `null` amount reads back as NaN.
///
/// Use with `#[serde(with = "amount_serde")]`, or
/// `#[serde(with = "amount_serde::option")]` for `Option<f64>`.
pub mod amount_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
        Null(()),
    }

    impl Repr {
        fn into_amount<E: serde::de::Error>(self) -> Result<f64, E> {
            match self {
                Self::Number(amount) => Ok(amount),
                Self::Text(text) => text
                    .parse()
                    .map_err(|_| E::custom(format!("invalid amount: {text:?}"))),
                Self::Null(()) => Ok(f64::NAN),
            }
        }
    }

    struct Amount(f64);

    impl Serialize for Amount {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serialize(&self.0, serializer)
        }
    }

    /// # Errors
    ///
    /// Returns the serializer's error.
    #[allow(clippy::trivially_copy_pass_by_ref)] // Signature fixed by `#[serde(with)]`
    pub fn serialize<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if amount.is_finite() {
            serializer.serialize_f64(*amount)
        } else {
            serializer.serialize_str(&amount.to_string())
        }
    }

    /// # Errors
    ///
    /// Fails on anything other than a number, `null`, or a numeric string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Repr::deserialize(deserializer)?.into_amount()
    }

    /// The same encoding for optional amounts. `null` reads as `None`.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        use super::{Amount, Repr};

        /// # Errors
        ///
        /// Returns the serializer's error.
        #[allow(clippy::ref_option)] // Signature fixed by `#[serde(with)]`
        pub fn serialize<S: Serializer>(
            amount: &Option<f64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            amount.map(Amount).serialize(serializer)
        }

        /// # Errors
        ///
        /// Fails under the same rules as [`super::deserialize`].
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<f64>, D::Error> {
            Option::<Repr>::deserialize(deserializer)?
                .map(Repr::into_amount)
                .transpose()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Priced {
        #[serde(with = "amount_serde")]
        price: f64,
        #[serde(default, with = "amount_serde::option")]
        sale_price: Option<f64>,
    }

    #[test]
    fn test_format_price_two_decimals() {
        assert_eq!(format_price(36.0), "$36.00");
        assert_eq!(format_price(19.989), "$19.99");
        assert_eq!(format_price(0.0), "$0.00");
    }

    #[test]
    fn test_format_price_negative() {
        assert_eq!(format_price(-2.5), "-$2.50");
    }

    #[test]
    fn test_parse_price_accepts_dollar_sign() {
        assert!((parse_price("$12.50").unwrap() - 12.5).abs() < f64::EPSILON);
        assert!((parse_price(" 8 ").unwrap() - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert!(matches!(
            parse_price("twelve"),
            Err(PriceError::NotANumber(_))
        ));
        assert!(matches!(parse_price("-1"), Err(PriceError::OutOfRange(_))));
        assert!(matches!(parse_price("inf"), Err(PriceError::OutOfRange(_))));
    }

    #[test]
    fn test_amount_serde_writes_finite_as_number() {
        let json = serde_json::to_string(&Priced {
            price: 12.5,
            sale_price: Some(10.0),
        })
        .unwrap();
        assert_eq!(json, r#"{"price":12.5,"sale_price":10.0}"#);
    }

    #[test]
    fn test_amount_serde_keeps_non_finite() {
        let json = serde_json::to_string(&Priced {
            price: f64::NAN,
            sale_price: Some(f64::NEG_INFINITY),
        })
        .unwrap();
        assert_eq!(json, r#"{"price":"NaN","sale_price":"-inf"}"#);

        let parsed: Priced = serde_json::from_str(&json).unwrap();
        assert!(parsed.price.is_nan());
        assert_eq!(parsed.sale_price, Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_amount_serde_reads_legacy_null() {
        let parsed: Priced = serde_json::from_str(r#"{"price":null,"sale_price":null}"#).unwrap();
        assert!(parsed.price.is_nan());
        assert_eq!(parsed.sale_price, None);

        let parsed: Priced = serde_json::from_str(r#"{"price":7}"#).unwrap();
        assert!((parsed.price - 7.0).abs() < f64::EPSILON);
        assert_eq!(parsed.sale_price, None);
    }

    #[test]
    fn test_amount_serde_rejects_garbage_text() {
        assert!(serde_json::from_str::<Priced>(r#"{"price":"cheap"}"#).is_err());
    }
}
