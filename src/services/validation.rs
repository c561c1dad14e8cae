//! Field constraints shared by the user and contract services.
//!
//! Lengths are counted in characters, not bytes.

pub const USERNAME_LEN: (usize, usize) = (3, 50);
pub const PASSWORD_MIN_LEN: usize = 6;
pub const NAME_LEN: (usize, usize) = (2, 100);
pub const ADDRESS_MIN_LEN: usize = 5;
pub const INN_LEN: (usize, usize) = (10, 12);

fn check_len(field: &str, value: &str, min: usize, max: Option<usize>) -> Result<(), String> {
    let len = value.chars().count();
    if len < min {
        return Err(format!("{field} must be at least {min} characters"));
    }
    if let Some(max) = max
        && len > max
    {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}

pub fn username(value: &str) -> Result<(), String> {
    check_len("username", value, USERNAME_LEN.0, Some(USERNAME_LEN.1))
}

pub fn password(value: &str) -> Result<(), String> {
    check_len("password", value, PASSWORD_MIN_LEN, None)
}

pub fn company_name(value: &str) -> Result<(), String> {
    check_len("company_name", value, NAME_LEN.0, Some(NAME_LEN.1))
}

pub fn director(value: &str) -> Result<(), String> {
    check_len("director", value, NAME_LEN.0, Some(NAME_LEN.1))
}

pub fn address(value: &str) -> Result<(), String> {
    check_len("address", value, ADDRESS_MIN_LEN, None)
}

/// Tax id: 10 to 12 ASCII digits.
pub fn inn(value: &str) -> Result<(), String> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err("inn must contain digits only".to_string());
    }
    check_len("inn", value, INN_LEN.0, Some(INN_LEN.1))
}
