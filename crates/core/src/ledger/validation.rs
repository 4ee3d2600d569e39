//! Input validation for ledger operations.
//!
//! Every check here runs before any remote call.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::error::ValidationError;

/// Parses amount text as typed into a form.
///
/// Accepts a decimal point or a single decimal comma (`"12,50"`), and
/// surrounding whitespace. Sign is preserved; positivity is checked by the
/// operation that uses the amount.
///
/// # Errors
///
/// Returns `ValidationError::InvalidAmount` for empty or non-numeric text.
pub fn parse_amount(input: &str) -> Result<Decimal, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidAmount(input.to_string()));
    }

    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replacen(',', ".", 1)
    } else {
        trimmed.to_string()
    };

    Decimal::from_str(&normalized).map_err(|_| ValidationError::InvalidAmount(input.to_string()))
}

/// Validates and trims a counterparty name.
///
/// # Errors
///
/// Returns `ValidationError::EmptyCounterparty` for empty or blank names.
pub fn validate_counterparty(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyCounterparty);
    }
    Ok(trimmed.to_string())
}

/// Validates that a principal is strictly positive.
///
/// # Errors
///
/// Returns `ValidationError::NonPositivePrincipal` otherwise.
pub fn validate_principal(principal: Decimal) -> Result<Decimal, ValidationError> {
    if principal <= Decimal::ZERO {
        return Err(ValidationError::NonPositivePrincipal(principal));
    }
    Ok(principal)
}

/// Validates that a payment is strictly positive.
///
/// # Errors
///
/// Returns `ValidationError::NonPositivePayment` otherwise.
pub fn validate_payment(amount: Decimal) -> Result<Decimal, ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositivePayment(amount));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("100", dec!(100))]
    #[case("12.50", dec!(12.50))]
    #[case("12,50", dec!(12.50))]
    #[case("  7 ", dec!(7))]
    #[case("-3", dec!(-3))]
    #[case("0", dec!(0))]
    fn test_parse_amount_ok(#[case] input: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("abc")]
    #[case("12,50,1")]
    #[case("1.000,50")]
    #[case("12€")]
    fn test_parse_amount_rejects(#[case] input: &str) {
        assert_eq!(
            parse_amount(input),
            Err(ValidationError::InvalidAmount(input.to_string()))
        );
    }

    #[test]
    fn test_validate_counterparty() {
        assert_eq!(validate_counterparty("  Anna ").unwrap(), "Anna");
        assert_eq!(
            validate_counterparty(""),
            Err(ValidationError::EmptyCounterparty)
        );
        assert_eq!(
            validate_counterparty(" \t"),
            Err(ValidationError::EmptyCounterparty)
        );
    }

    #[test]
    fn test_validate_amounts() {
        assert_eq!(validate_principal(dec!(0.01)).unwrap(), dec!(0.01));
        assert_eq!(
            validate_principal(dec!(0)),
            Err(ValidationError::NonPositivePrincipal(dec!(0)))
        );
        assert_eq!(
            validate_principal(dec!(-1)),
            Err(ValidationError::NonPositivePrincipal(dec!(-1)))
        );
        assert_eq!(validate_payment(dec!(5)).unwrap(), dec!(5));
        assert_eq!(
            validate_payment(dec!(0)),
            Err(ValidationError::NonPositivePayment(dec!(0)))
        );
    }
}
