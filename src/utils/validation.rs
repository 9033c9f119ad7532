use crate::domain::model::is_valid_party_id;
use crate::utils::error::{OcpiError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(OcpiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(OcpiError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(OcpiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(OcpiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| OcpiError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OcpiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_party_id(field_name: &str, value: &str) -> Result<()> {
    if !is_valid_party_id(value) {
        return Err(OcpiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected country code plus party id, e.g. NLABC".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("endpoints.url", "https://example.com/ocpi/2.2/sessions").is_ok());
        assert!(validate_url("endpoints.url", "http://example.com").is_ok());
        assert!(validate_url("endpoints.url", "").is_err());
        assert!(validate_url("endpoints.url", "invalid-url").is_err());
        assert!(validate_url("endpoints.url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("limit", 5, 1).is_ok());
        assert!(validate_positive_number("limit", 0, 1).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("token".to_string());
        let absent: Option<String> = None;
        assert_eq!(validate_required_field("token", &present).unwrap(), "token");
        assert!(matches!(
            validate_required_field("token", &absent),
            Err(OcpiError::MissingConfigError { field }) if field == "token"
        ));
    }

    #[test]
    fn test_validate_party_id() {
        assert!(validate_party_id("party_id", "NLABC").is_ok());
        assert!(validate_party_id("party_id", "DE1A2").is_ok());
        assert!(validate_party_id("party_id", "nlabc").is_err());
        assert!(validate_party_id("party_id", "NLAB").is_err());
        assert!(validate_non_empty_string("token", "  ").is_err());
    }
}
