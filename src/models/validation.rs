use anyhow::{Result, anyhow};

/// Strips separators (spaces, dashes, parentheses, dots) from a phone
/// number, keeping digits and a leading `+`.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut normalized = String::with_capacity(trimmed.len());

    for (index, character) in trimmed.chars().enumerate() {
        if character.is_ascii_digit() {
            normalized.push(character);
        } else if character == '+' && index == 0 {
            normalized.push(character);
        }
    }

    normalized
}

pub fn validate_destination(phone: &str) -> Result<()> {
    if phone.is_empty() {
        return Err(anyhow!("Destination phone cannot be empty"));
    }

    let digits = phone.chars().filter(char::is_ascii_digit).count();

    if digits < 7 {
        return Err(anyhow!("Destination phone too short (minimum 7 digits)"));
    }

    if digits > 15 {
        return Err(anyhow!("Destination phone too long (maximum 15 digits)"));
    }

    Ok(())
}
