//! Card form state
//!
//! The form owns the values being typed and the photo currently held.
//! Every change produces a full `SocialCardData` (values merged with the
//! photo) and hands it to the update sink right away. Validation only gates
//! `submit()`; invalid intermediate states still reach the preview.

pub mod photo;
mod schema;

pub use schema::{validate, FieldError, FormVariant};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::card::{Gradient, SocialCardData};
use crate::notify::Notifications;

/// Callback invoked synchronously with the merged card on every change
pub type UpdateSink = Box<dyn FnMut(&SocialCardData) + Send>;

// ─────────────────────────────────────────────────────────────────────────────
// Fields
// ─────────────────────────────────────────────────────────────────────────────

/// An editable card field, in form display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Title,
    Phone,
    Email,
    Linkedin,
    Github,
    Twitter,
    Website,
    Portfolio,
    About,
    Interests,
    TechSkills,
    PublishedWorks,
    LatestWorkLinks,
    Gradient,
}

impl Field {
    pub const ALL: [Field; 15] = [
        Field::Name,
        Field::Title,
        Field::Phone,
        Field::Email,
        Field::Linkedin,
        Field::Github,
        Field::Twitter,
        Field::Website,
        Field::Portfolio,
        Field::About,
        Field::Interests,
        Field::TechSkills,
        Field::PublishedWorks,
        Field::LatestWorkLinks,
        Field::Gradient,
    ];

    /// Wire name (camelCase, as in the JSON card)
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Title => "title",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::Linkedin => "linkedin",
            Field::Github => "github",
            Field::Twitter => "twitter",
            Field::Website => "website",
            Field::Portfolio => "portfolio",
            Field::About => "about",
            Field::Interests => "interests",
            Field::TechSkills => "techSkills",
            Field::PublishedWorks => "publishedWorks",
            Field::LatestWorkLinks => "latestWorkLinks",
            Field::Gradient => "gradient",
        }
    }

    pub(crate) fn position(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(usize::MAX)
    }

    /// Current value of this field on a card
    pub fn get<'a>(&self, data: &'a SocialCardData) -> &'a str {
        match self {
            Field::Name => &data.name,
            Field::Title => &data.title,
            Field::Phone => &data.phone,
            Field::Email => &data.email,
            Field::Linkedin => &data.linkedin,
            Field::Github => &data.github,
            Field::Twitter => &data.twitter,
            Field::Website => &data.website,
            Field::Portfolio => &data.portfolio,
            Field::About => &data.about,
            Field::Interests => &data.interests,
            Field::TechSkills => &data.tech_skills,
            Field::PublishedWorks => &data.published_works,
            Field::LatestWorkLinks => &data.latest_work_links,
            Field::Gradient => data.gradient.as_ref().map_or("", Gradient::as_str),
        }
    }

    /// Write a value into the card exactly as typed
    fn set(&self, data: &mut SocialCardData, value: String) {
        let slot = match self {
            Field::Name => &mut data.name,
            Field::Title => &mut data.title,
            Field::Phone => &mut data.phone,
            Field::Email => &mut data.email,
            Field::Linkedin => &mut data.linkedin,
            Field::Github => &mut data.github,
            Field::Twitter => &mut data.twitter,
            Field::Website => &mut data.website,
            Field::Portfolio => &mut data.portfolio,
            Field::About => &mut data.about,
            Field::Interests => &mut data.interests,
            Field::TechSkills => &mut data.tech_skills,
            Field::PublishedWorks => &mut data.published_works,
            Field::LatestWorkLinks => &mut data.latest_work_links,
            Field::Gradient => {
                data.gradient = Gradient::parse(&value);
                return;
            }
        };
        *slot = value;
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field: {}", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for Field {
    type Err = UnknownField;

    /// Accepts camelCase wire names and snake_case struct names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| *c != '_').collect();
        Field::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Form
// ─────────────────────────────────────────────────────────────────────────────

/// Result of an explicit submit
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted(SocialCardData),
    Invalid(Vec<FieldError>),
    PhotoMissing,
}

pub struct CardForm {
    variant: FormVariant,
    values: SocialCardData,
    photo_url: String,
    errors: Vec<FieldError>,
    /// Set after the first submit; later changes re-validate
    submitted: bool,
    notifications: Notifications,
    on_update: UpdateSink,
}

impl CardForm {
    pub fn new(
        variant: FormVariant,
        initial: SocialCardData,
        notifications: Notifications,
        on_update: UpdateSink,
    ) -> Self {
        let mut values = initial;
        let photo_url = std::mem::take(&mut values.photo_url);

        Self {
            variant,
            values,
            photo_url,
            errors: Vec::new(),
            submitted: false,
            notifications,
            on_update,
        }
    }

    pub fn variant(&self) -> FormVariant {
        self.variant
    }

    /// Current values merged with the held photo
    pub fn snapshot(&self) -> SocialCardData {
        SocialCardData {
            photo_url: self.photo_url.clone(),
            ..self.values.clone()
        }
    }

    /// Apply one field change and propagate the merged card
    pub fn change(&mut self, field: Field, value: impl Into<String>) -> SocialCardData {
        field.set(&mut self.values, value.into());
        let data = self.snapshot();

        if self.submitted {
            self.errors = validate(self.variant, &data).err().unwrap_or_default();
        }

        (self.on_update)(&data);
        data
    }

    /// Hold a photo (already encoded as a data URI) and propagate
    pub fn attach_photo(&mut self, data_uri: String) -> SocialCardData {
        self.photo_url = data_uri;
        let data = self.snapshot();
        (self.on_update)(&data);
        data
    }

    pub fn has_photo(&self) -> bool {
        !self.photo_url.is_empty()
    }

    /// Validate everything; require a photo before accepting
    pub fn submit(&mut self) -> SubmitOutcome {
        self.submitted = true;
        let data = self.snapshot();

        if let Err(errors) = validate(self.variant, &data) {
            tracing::debug!(count = errors.len(), "Form submit blocked by validation");
            self.errors = errors.clone();
            return SubmitOutcome::Invalid(errors);
        }
        self.errors.clear();

        if !self.has_photo() {
            self.notifications
                .error("Photo required", "Please upload a profile photo");
            return SubmitOutcome::PhotoMissing;
        }

        (self.on_update)(&data);
        self.notifications
            .success("Card updated", "Your social card has been updated");
        SubmitOutcome::Accepted(data)
    }

    /// Inline validation messages from the last submit
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}
