use crate::server::response::ApiError;

const MAX_USERNAME_LEN: usize = 64;
const MAX_NAME_LEN: usize = 100;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Trims and validates a brand or model name; returns the trimmed form.
pub fn validate_name(name: &str, entity: &str) -> Result<String, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request(format!(
            "{entity} name cannot be empty"
        )));
    }
    if trimmed.len() > MAX_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "{entity} name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_username(username: &str) -> Result<String, ApiError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request("Username cannot be empty"));
    }
    if trimmed.len() > MAX_USERNAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Username cannot exceed {MAX_USERNAME_LEN} characters"
        )));
    }
    if trimmed.contains(char::is_whitespace) {
        return Err(ApiError::bad_request("Username cannot contain whitespace"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("  Cisco  ", "Brand").unwrap(), "Cisco");
    }

    #[test]
    fn test_validate_name_rejects_blank() {
        assert!(validate_name("   ", "Brand").is_err());
        assert!(validate_name("", "Model").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username(" alice ").unwrap(), "alice");
        assert!(validate_username("two words").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }
}
