//! Validation utilities for the ice cream directory

use std::borrow::Cow;

use validator::ValidationError;

use crate::models::{MAX_RATING, MIN_RATING};

// ============================================================================
// Contact Validations
// ============================================================================

/// Validate email shape: one `@`, no whitespace, and a dot inside the domain
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.chars().any(char::is_whitespace) {
        return Err("Email must not contain whitespace");
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err("Email must contain exactly one @");
    };
    if local.is_empty() {
        return Err("Email is missing the part before @");
    }
    let has_inner_dot = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_inner_dot {
        return Err("Email domain is invalid");
    }
    Ok(())
}

/// `validator` hook for email fields
pub fn email_shape(email: &str) -> Result<(), ValidationError> {
    validate_email(email).map_err(|msg| {
        let mut err = ValidationError::new("email");
        err.message = Some(Cow::Borrowed(msg));
        err
    })
}

// ============================================================================
// Content Validations
// ============================================================================

/// Validate page slug (lowercase letters, digits and single dashes)
pub fn validate_slug(slug: &str) -> Result<(), &'static str> {
    if slug.is_empty() || slug.len() > 100 {
        return Err("Slug must be 1-100 characters");
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Slug may only contain lowercase letters, digits and dashes");
    }
    if slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err("Slug dashes must separate words");
    }
    Ok(())
}

/// Validate a rating already lies within 1..=5
pub fn validate_rating(rating: i32) -> Result<(), &'static str> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err("Rating must be between 1 and 5");
    }
    Ok(())
}
