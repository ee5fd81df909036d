//! Card data model
//!
//! A social card is a flat record of text fields plus a gradient choice.
//! Empty strings mean "not provided"; the editor replaces the whole value on
//! every keystroke, so nothing here trims or normalizes input.

mod style;

pub use style::{GradientStyle, Rgb};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Gradient
// ─────────────────────────────────────────────────────────────────────────────

/// Preset background treatment for a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gradient {
    Blue,
    Purple,
    Teal,
    Orange,
    Green,
    Dark,
    Light,
}

impl Gradient {
    pub const ALL: [Gradient; 7] = [
        Gradient::Blue,
        Gradient::Purple,
        Gradient::Teal,
        Gradient::Orange,
        Gradient::Green,
        Gradient::Dark,
        Gradient::Light,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gradient::Blue => "blue",
            Gradient::Purple => "purple",
            Gradient::Teal => "teal",
            Gradient::Orange => "orange",
            Gradient::Green => "green",
            Gradient::Dark => "dark",
            Gradient::Light => "light",
        }
    }

    /// Parse a stored or submitted gradient name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Gradient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown gradient names deserialize to `None` instead of rejecting the record
fn lenient_gradient<'de, D>(deserializer: D) -> Result<Option<Gradient>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Gradient::parse))
}

// ─────────────────────────────────────────────────────────────────────────────
// Template
// ─────────────────────────────────────────────────────────────────────────────

/// Layout variant applied to card data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    Classic,
    Modern,
    Academic,
    #[default]
    Default,
}

impl TemplateId {
    pub const ALL: [TemplateId; 4] = [
        TemplateId::Classic,
        TemplateId::Modern,
        TemplateId::Academic,
        TemplateId::Default,
    ];

    /// Parse a template id from a query string or stored row.
    /// Unknown ids (the gallery lists more designs than there are layouts)
    /// render with the default layout.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "classic" => TemplateId::Classic,
            "modern" => TemplateId::Modern,
            "academic" => TemplateId::Academic,
            _ => TemplateId::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Academic => "academic",
            TemplateId::Default => "default",
        }
    }

    /// Human-readable label for tabs and listings
    pub fn label(&self) -> &'static str {
        match self {
            TemplateId::Classic => "Classic",
            TemplateId::Modern => "Modern",
            TemplateId::Academic => "Academic",
            TemplateId::Default => "Default",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Card data
// ─────────────────────────────────────────────────────────────────────────────

/// A single social card as edited in the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialCardData {
    pub name: String,
    pub title: String,
    pub website: String,
    pub portfolio: String,
    pub email: String,
    pub linkedin: String,
    pub github: String,
    pub twitter: String,
    pub about: String,
    pub interests: String,
    pub tech_skills: String,
    pub published_works: String,
    pub latest_work_links: String,
    pub phone: String,
    /// Data URI produced by photo intake
    pub photo_url: String,
    #[serde(deserialize_with = "lenient_gradient")]
    pub gradient: Option<Gradient>,
}

impl Default for SocialCardData {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: String::new(),
            website: String::new(),
            portfolio: String::new(),
            email: String::new(),
            linkedin: String::new(),
            github: String::new(),
            twitter: String::new(),
            about: String::new(),
            interests: String::new(),
            tech_skills: String::new(),
            published_works: String::new(),
            latest_work_links: String::new(),
            phone: String::new(),
            photo_url: String::new(),
            gradient: Some(Gradient::Dark),
        }
    }
}

impl SocialCardData {
    /// First character of the name, uppercased, for the avatar placeholder
    pub fn initial(&self) -> Option<char> {
        self.name
            .trim_start()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
    }

    pub fn has_photo(&self) -> bool {
        !self.photo_url.is_empty()
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Prefill email from the signed-in user, keeping anything already typed
    pub fn with_email(mut self, email: &str) -> Self {
        if self.email.is_empty() {
            self.email = email.to_string();
        }
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Persisted records
// ─────────────────────────────────────────────────────────────────────────────

/// Insert request for the record store
#[derive(Debug, Clone)]
pub struct NewCard {
    /// Client-generated id (share links); the store generates one when absent
    pub id: Option<String>,
    pub user_id: String,
    pub template: TemplateId,
    pub data: SocialCardData,
}

/// A card as stored, with identity and ownership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    pub user_id: String,
    pub template_id: TemplateId,
    pub created_at: DateTime<Utc>,
    pub data: SocialCardData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_card_is_dark_and_empty() {
        let card = SocialCardData::default();
        assert_eq!(card.gradient, Some(Gradient::Dark));
        assert!(card.name.is_empty());
        assert!(!card.has_photo());
        assert_eq!(card.initial(), None);
    }

    #[test]
    fn test_initial_uppercases_first_char() {
        let card = SocialCardData {
            name: "jane doe".to_string(),
            ..Default::default()
        };
        assert_eq!(card.initial(), Some('J'));
    }

    #[test]
    fn test_unknown_gradient_deserializes_to_none() {
        let card: SocialCardData =
            serde_json::from_str(r#"{"name":"Jane","gradient":"rainbow"}"#).unwrap();
        assert_eq!(card.name, "Jane");
        assert_eq!(card.gradient, None);

        let card: SocialCardData = serde_json::from_str(r#"{"gradient":"Teal"}"#).unwrap();
        assert_eq!(card.gradient, Some(Gradient::Teal));
    }

    #[test]
    fn test_camel_case_wire_names() {
        let card = SocialCardData {
            tech_skills: "Rust".to_string(),
            photo_url: "data:image/png;base64,AAAA".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["techSkills"], "Rust");
        assert_eq!(json["photoUrl"], "data:image/png;base64,AAAA");
        assert_eq!(json["gradient"], "dark");
    }

    #[test]
    fn test_template_parse_falls_back_to_default() {
        assert_eq!(TemplateId::parse("Modern"), TemplateId::Modern);
        assert_eq!(TemplateId::parse("academic"), TemplateId::Academic);
        assert_eq!(TemplateId::parse("creative"), TemplateId::Default);
        assert_eq!(TemplateId::parse(""), TemplateId::Default);
    }

    #[test]
    fn test_with_email_keeps_typed_value() {
        let typed = SocialCardData {
            email: "me@work.com".to_string(),
            ..Default::default()
        };
        assert_eq!(typed.with_email("demo@example.com").email, "me@work.com");
        assert_eq!(
            SocialCardData::default()
                .with_email("demo@example.com")
                .email,
            "demo@example.com"
        );
    }
}
