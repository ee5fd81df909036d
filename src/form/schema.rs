//! Validation schemas for the card form
//!
//! Both variants check every link field and the free-text blocks. The only
//! difference is the title, which `Extended` requires. Empty optional fields
//! are skipped, never reported.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::Field;
use crate::card::SocialCardData;

/// Which schema the form validates against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormVariant {
    #[default]
    Basic,
    Extended,
}

impl FormVariant {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "extended" => Self::Extended,
            _ => Self::Basic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Extended => "extended",
        }
    }
}

/// A single inline validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// One schema for both variants. `title` is `None` for `Basic`, so only the
/// extended form requires it.
#[derive(Debug, Validate)]
struct CardSchema {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    name: String,
    #[validate(length(min = 1, message = "Title is required"))]
    title: Option<String>,
    #[validate(email(message = "Please enter a valid email address"))]
    email: String,
    #[validate(url(message = "Please enter a valid URL"))]
    website: Option<String>,
    #[validate(url(message = "Please enter a valid URL"))]
    portfolio: Option<String>,
    #[validate(url(message = "Please enter a valid URL"))]
    linkedin: Option<String>,
    #[validate(url(message = "Please enter a valid URL"))]
    github: Option<String>,
    #[validate(url(message = "Please enter a valid URL"))]
    twitter: Option<String>,
    #[validate(length(min = 10, message = "Must be at least 10 characters"))]
    about: Option<String>,
    #[validate(length(min = 10, message = "Must be at least 10 characters"))]
    interests: Option<String>,
}

/// Empty means "not provided"
fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl CardSchema {
    fn new(variant: FormVariant, data: &SocialCardData) -> Self {
        let title = match variant {
            FormVariant::Basic => None,
            FormVariant::Extended => Some(data.title.trim().to_string()),
        };

        Self {
            name: data.name.clone(),
            title,
            email: data.email.clone(),
            website: optional(&data.website),
            portfolio: optional(&data.portfolio),
            linkedin: optional(&data.linkedin),
            github: optional(&data.github),
            twitter: optional(&data.twitter),
            about: optional(&data.about),
            interests: optional(&data.interests),
        }
    }
}

/// Validate a whole card against the variant's schema.
/// Errors are returned in form field order, one per field.
pub fn validate(variant: FormVariant, data: &SocialCardData) -> Result<(), Vec<FieldError>> {
    match CardSchema::new(variant, data).validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(collect(&errors)),
    }
}

fn collect(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(name, errs)| {
            let field = Field::from_str(name.as_ref()).ok()?;
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid value".to_string());
            Some(FieldError { field, message })
        })
        .collect();

    out.sort_by_key(|e| e.field.position());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> SocialCardData {
        SocialCardData {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_valid_card() {
        assert_eq!(validate(FormVariant::Basic, &jane()), Ok(()));
    }

    #[test]
    fn test_invalid_email_reported_on_email_field() {
        let card = SocialCardData {
            email: "not-an-email".to_string(),
            ..jane()
        };
        let errors = validate(FormVariant::Basic, &card).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, Field::Email);
        assert_eq!(errors[0].message, "Please enter a valid email address");
    }

    #[test]
    fn test_empty_email_is_required() {
        let card = SocialCardData {
            email: String::new(),
            ..jane()
        };
        let errors = validate(FormVariant::Basic, &card).unwrap_err();
        assert_eq!(errors[0].field, Field::Email);
    }

    #[test]
    fn test_short_name_rejected() {
        let card = SocialCardData {
            name: "J".to_string(),
            ..jane()
        };
        let errors = validate(FormVariant::Basic, &card).unwrap_err();
        assert_eq!(errors[0].field, Field::Name);
        assert_eq!(errors[0].message, "Name must be at least 2 characters");
    }

    #[test]
    fn test_urls_empty_or_well_formed() {
        let ok = SocialCardData {
            linkedin: "https://linkedin.com/in/jane".to_string(),
            github: String::new(),
            ..jane()
        };
        assert_eq!(validate(FormVariant::Basic, &ok), Ok(()));

        let bad = SocialCardData {
            github: "github dot com".to_string(),
            portfolio: "nope".to_string(),
            ..jane()
        };
        let errors = validate(FormVariant::Basic, &bad).unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::Github, Field::Portfolio]);
        assert!(errors.iter().all(|e| e.message == "Please enter a valid URL"));
    }

    #[test]
    fn test_basic_checks_every_link_and_text_block() {
        let card = SocialCardData {
            website: "nope".to_string(),
            twitter: "not a url".to_string(),
            about: "short".to_string(),
            interests: "tiny".to_string(),
            ..jane()
        };
        let errors = validate(FormVariant::Basic, &card).unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![Field::Twitter, Field::Website, Field::About, Field::Interests]
        );
    }

    #[test]
    fn test_basic_does_not_require_title() {
        let card = SocialCardData {
            title: String::new(),
            about: "Builds reliable systems.".to_string(),
            ..jane()
        };
        assert_eq!(validate(FormVariant::Basic, &card), Ok(()));
    }

    #[test]
    fn test_extended_requires_title_and_long_text() {
        let card = SocialCardData {
            about: "short".to_string(),
            twitter: "bad".to_string(),
            ..jane()
        };
        let errors = validate(FormVariant::Extended, &card).unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::Title, Field::Twitter, Field::About]);

        let card = SocialCardData {
            title: "Engineer".to_string(),
            about: "Builds reliable systems.".to_string(),
            interests: String::new(),
            ..jane()
        };
        assert_eq!(validate(FormVariant::Extended, &card), Ok(()));
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!(FormVariant::from_str("Extended"), FormVariant::Extended);
        assert_eq!(FormVariant::from_str("whatever"), FormVariant::Basic);
    }
}
