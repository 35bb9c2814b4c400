//! Validation utilities

use bigdecimal::BigDecimal;

use crate::types::*;

/// Validate that an amount is zero or positive
pub fn validate_non_negative(field: &str, amount: &BigDecimal) -> EngineResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(EngineError::validation(field, "cannot be negative"))
    } else {
        Ok(())
    }
}

/// Validate a percentage lies in [0, 100]
pub fn validate_percentage(field: &str, value: &BigDecimal) -> EngineResult<()> {
    if *value < BigDecimal::from(0) || *value > BigDecimal::from(100) {
        return Err(EngineError::validation(
            field,
            format!("must be between 0 and 100, got {}", value),
        ));
    }
    Ok(())
}

/// Validate a master record name
pub fn validate_name(field: &str, name: &str) -> EngineResult<()> {
    if name.trim().is_empty() {
        return Err(EngineError::validation(field, "cannot be empty"));
    }

    if name.len() > 100 {
        return Err(EngineError::validation(
            field,
            "cannot exceed 100 characters",
        ));
    }

    Ok(())
}

/// Validate an operator supplied voucher number
pub fn validate_voucher_no(voucher_no: &str) -> EngineResult<()> {
    if voucher_no.trim().is_empty() {
        return Err(EngineError::validation("voucher_no", "cannot be empty"));
    }

    if voucher_no.len() > 50 {
        return Err(EngineError::validation(
            "voucher_no",
            "cannot exceed 50 characters",
        ));
    }

    // alphanumeric, dashes, slashes and underscores
    if !voucher_no
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '/')
    {
        return Err(EngineError::validation(
            "voucher_no",
            "can only contain alphanumeric characters, dashes, slashes and underscores",
        ));
    }

    Ok(())
}

/// Validate a narration
pub fn validate_narration(narration: &str) -> EngineResult<()> {
    if narration.len() > 500 {
        return Err(EngineError::validation(
            "narration",
            "cannot exceed 500 characters",
        ));
    }
    Ok(())
}
