pub mod post_service;
pub mod tag_service;
pub mod user_service;

use crate::domain::error::DomainError;

/// Trimmed value, or `None` when nothing but whitespace was submitted.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

pub(crate) fn required(value: &str, notice: &str) -> Result<String, DomainError> {
    non_blank(Some(value)).ok_or_else(|| DomainError::invalid(notice))
}

pub(crate) fn within_limit(value: &str, max: usize, field: &str) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::invalid(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_counts_as_blank() {
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" Ribbot ")), Some("Ribbot".to_string()));
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        assert!(within_limit(&"é".repeat(30), 30, "Name").is_ok());
        let err = within_limit(&"a".repeat(31), 30, "Name").unwrap_err();
        assert_eq!(err.notice(), Some("Name must be at most 30 characters"));
    }
}
