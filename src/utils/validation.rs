use crate::utils::error::{ProxyError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Dotted identifier, e.g. `Acme.Proxy.IBase`.
pub fn validate_type_name(field_name: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Type name cannot be empty".to_string(),
        });
    }

    for segment in name.split('.') {
        let mut chars = segment.chars();
        let valid_start = chars
            .next()
            .map(|c| c.is_alphabetic() || c == '_')
            .unwrap_or(false);

        if !valid_start || !chars.all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ProxyError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: name.to_string(),
                reason: format!("Invalid identifier segment: '{}'", segment),
            });
        }
    }

    Ok(())
}

pub fn validate_type_names(field_name: &str, names: &[String]) -> Result<()> {
    for name in names {
        validate_type_name(field_name, name)?;
    }
    Ok(())
}

pub fn validate_unique_names(field_name: &str, names: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ProxyError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: name.clone(),
                reason: "Duplicate entry".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ProxyError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
