//! Modifier validation.

use crate::error::{CoreError, CoreResult};
use crate::field::FieldType;
use crate::operator::Operator;

/// Checks that `operator` may target a field of `field_type`.
///
/// Succeeds iff the operator is in the type's declared valid set. Callers
/// run this before encoding any value, so the error always names the field
/// type rather than the value.
///
/// # Errors
///
/// Returns [`CoreError::InvalidModifier`] naming the type and operator.
pub fn validate_modifier(field_type: &dyn FieldType, operator: Operator) -> CoreResult<()> {
    if field_type.valid_operators().contains(operator) {
        Ok(())
    } else {
        Err(CoreError::invalid_modifier(field_type.type_name(), operator))
    }
}
