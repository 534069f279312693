use crate::errors::NeopathError;

pub(crate) fn validate_variable_name(name: &str) -> Result<(), NeopathError> {
    if name.trim().is_empty() {
        return Err(NeopathError::InvalidIdentifier {
            name: name.to_string(),
            reason: "Name cannot be empty or just blank space".to_string(),
        });
    }

    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(NeopathError::InvalidIdentifier {
            name: name.to_string(),
            reason: "Name can only have alphanumeric characters and underscores".to_string(),
        });
    }

    Ok(())
}
