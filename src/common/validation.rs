// src/common/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::common::error::AppError;

// Validações customizadas usadas nos payloads (validator `custom`).

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("exclusiveMin".into(), &0.0);
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// Aritmética de valores vindos do payload: estouro vira erro de validação, nunca panic.

pub fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, AppError> {
    a.checked_mul(b)
        .ok_or_else(|| AppError::validation(format!("Valor fora do limite suportado: {} x {}", a, b)))
}

pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, AppError> {
    a.checked_add(b)
        .ok_or_else(|| AppError::validation(format!("Valor fora do limite suportado: {} + {}", a, b)))
}

pub fn checked_sum<I>(values: I) -> Result<Decimal, AppError>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, checked_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_negative_but_not_positive() {
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_not_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_positive(&Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn overflow_is_a_validation_error() {
        assert!(matches!(checked_mul(Decimal::MAX, Decimal::TWO), Err(AppError::ValidationFailed(_))));
        assert!(matches!(checked_add(Decimal::MAX, Decimal::ONE), Err(AppError::ValidationFailed(_))));
        assert!(matches!(
            checked_sum([Decimal::MAX, Decimal::ONE]),
            Err(AppError::ValidationFailed(_))
        ));
        assert_eq!(checked_sum([Decimal::ONE, Decimal::TWO]).unwrap(), Decimal::new(3, 0));
    }
}
