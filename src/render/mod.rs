//! Card preview
//!
//! `render` maps card data plus a template to a `CardView`, a small visual
//! tree that both the HTML preview and the bitmap exporter consume. It is
//! pure and total: every empty field simply drops its block.
//!
//! ```text
//! SocialCardData ──┐
//!                  ├──→ render() ──→ CardView ──┬──→ to_html()   (preview, /share)
//! TemplateId ──────┘                            └──→ rasterize() (export)
//! ```

mod html;

pub use html::to_html;
pub(crate) use html::escape;

use std::sync::LazyLock;

use regex::Regex;

use crate::card::{Gradient, GradientStyle, Rgb, SocialCardData, TemplateId};

/// Heading shown when the name is empty
pub const NAME_PLACEHOLDER: &str = "Your Name";

/// Glyph for an avatar with neither photo nor name
pub const AVATAR_PLACEHOLDER: char = '?';

static URL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>()]+").ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Center,
    Left,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    /// Data URI of the uploaded photo
    Photo(String),
    Initials(char),
    Placeholder,
}

impl Avatar {
    fn for_card(data: &SocialCardData) -> Self {
        if data.has_photo() {
            Avatar::Photo(data.photo_url.clone())
        } else if let Some(c) = data.initial() {
            Avatar::Initials(c)
        } else {
            Avatar::Placeholder
        }
    }

    /// Character drawn when there is no photo
    pub fn glyph(&self) -> Option<char> {
        match self {
            Avatar::Photo(_) => None,
            Avatar::Initials(c) => Some(*c),
            Avatar::Placeholder => Some(AVATAR_PLACEHOLDER),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Email,
    Phone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactLine {
    pub kind: ContactKind,
    pub value: String,
}

impl ContactLine {
    /// `mailto:` / `tel:` target
    pub fn href(&self) -> String {
        match self.kind {
            ContactKind::Email => format!("mailto:{}", self.value),
            ContactKind::Phone => format!("tel:{}", self.value.replace(' ', "")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Linkedin,
    Github,
    Twitter,
    Website,
    Portfolio,
}

impl LinkKind {
    pub fn label(&self) -> &'static str {
        match self {
            LinkKind::Linkedin => "LinkedIn",
            LinkKind::Github => "GitHub",
            LinkKind::Twitter => "Twitter",
            LinkKind::Website => "Website",
            LinkKind::Portfolio => "Portfolio",
        }
    }

    /// Brand color for the link badge
    pub fn color(&self) -> Rgb {
        match self {
            LinkKind::Linkedin => Rgb::hex(0x0a66c2),
            LinkKind::Github => Rgb::hex(0x111827),
            LinkKind::Twitter => Rgb::hex(0x1d9bf0),
            LinkKind::Website => Rgb::hex(0x4b5563),
            LinkKind::Portfolio => Rgb::hex(0x7c3aed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialLink {
    pub kind: LinkKind,
    pub url: String,
}

/// One line of a multi-line links field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkItem {
    pub text: String,
    /// First URL found in the line, if any
    pub url: Option<String>,
}

impl LinkItem {
    fn parse(line: &str) -> Self {
        let url = URL_PATTERN
            .as_ref()
            .and_then(|re| re.find(line))
            .map(|m| m.as_str().trim_end_matches(['.', ',', ';']).to_string());
        Self {
            text: line.to_string(),
            url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Contact(Vec<ContactLine>),
    Links(Vec<SocialLink>),
    Text { heading: &'static str, body: String },
    LinkList { heading: &'static str, items: Vec<LinkItem> },
}

/// Decoration around the card body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Plain,
    /// Narrow band across the top in the accent color
    AccentBar(Rgb),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub template: TemplateId,
    pub style: GradientStyle,
    pub frame: Frame,
    pub alignment: Alignment,
    pub avatar: Avatar,
    pub name: String,
    pub title: Option<String>,
    /// Title drawn at heading weight instead of muted
    pub emphasize_title: bool,
    pub sections: Vec<Section>,
}

impl CardView {
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layouts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Block {
    Contact,
    Links,
    About(&'static str),
    Interests(&'static str),
    TechSkills(&'static str),
    PublishedWorks(&'static str),
    LatestWork(&'static str),
}

struct Layout {
    alignment: Alignment,
    emphasize_title: bool,
    academic_palette: bool,
    blocks: &'static [Block],
}

const CLASSIC: Layout = Layout {
    alignment: Alignment::Center,
    emphasize_title: false,
    academic_palette: false,
    blocks: &[Block::Contact, Block::Links, Block::About("About")],
};

const MODERN: Layout = Layout {
    alignment: Alignment::Left,
    emphasize_title: false,
    academic_palette: false,
    blocks: &[
        Block::Links,
        Block::Contact,
        Block::About("About Me"),
        Block::TechSkills("Stack"),
    ],
};

const ACADEMIC: Layout = Layout {
    alignment: Alignment::Left,
    emphasize_title: true,
    academic_palette: true,
    blocks: &[
        Block::Contact,
        Block::About("Biography"),
        Block::PublishedWorks("Publications"),
        Block::LatestWork("Recent Work"),
        Block::TechSkills("Methods & Skills"),
        Block::Interests("Research Interests"),
        Block::Links,
    ],
};

const DEFAULT: Layout = Layout {
    alignment: Alignment::Center,
    emphasize_title: false,
    academic_palette: false,
    blocks: &[
        Block::Contact,
        Block::Links,
        Block::About("About"),
        Block::Interests("Interests"),
        Block::TechSkills("Tech Skills"),
        Block::PublishedWorks("Published Works"),
        Block::LatestWork("Latest Work"),
    ],
};

fn layout(template: TemplateId) -> &'static Layout {
    match template {
        TemplateId::Classic => &CLASSIC,
        TemplateId::Modern => &MODERN,
        TemplateId::Academic => &ACADEMIC,
        TemplateId::Default => &DEFAULT,
    }
}

fn text(heading: &'static str, body: &str) -> Option<Section> {
    if body.trim().is_empty() {
        return None;
    }
    Some(Section::Text {
        heading,
        body: body.to_string(),
    })
}

fn link_list(heading: &'static str, raw: &str) -> Option<Section> {
    let items: Vec<LinkItem> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(LinkItem::parse)
        .collect();
    if items.is_empty() {
        return None;
    }
    Some(Section::LinkList { heading, items })
}

fn contact(data: &SocialCardData) -> Option<Section> {
    let lines: Vec<ContactLine> = [
        (ContactKind::Email, &data.email),
        (ContactKind::Phone, &data.phone),
    ]
    .into_iter()
    .filter(|(_, v)| !v.is_empty())
    .map(|(kind, v)| ContactLine {
        kind,
        value: v.clone(),
    })
    .collect();

    (!lines.is_empty()).then_some(Section::Contact(lines))
}

fn links(data: &SocialCardData) -> Option<Section> {
    let links: Vec<SocialLink> = [
        (LinkKind::Linkedin, &data.linkedin),
        (LinkKind::Github, &data.github),
        (LinkKind::Twitter, &data.twitter),
        (LinkKind::Website, &data.website),
        (LinkKind::Portfolio, &data.portfolio),
    ]
    .into_iter()
    .filter(|(_, v)| !v.is_empty())
    .map(|(kind, v)| SocialLink {
        kind,
        url: v.clone(),
    })
    .collect();

    (!links.is_empty()).then_some(Section::Links(links))
}

fn build(block: Block, data: &SocialCardData) -> Option<Section> {
    match block {
        Block::Contact => contact(data),
        Block::Links => links(data),
        Block::About(h) => text(h, &data.about),
        Block::Interests(h) => text(h, &data.interests),
        Block::TechSkills(h) => text(h, &data.tech_skills),
        Block::PublishedWorks(h) => link_list(h, &data.published_works),
        Block::LatestWork(h) => link_list(h, &data.latest_work_links),
    }
}

/// Build the visual tree for a card in the given template
pub fn render(data: &SocialCardData, template: TemplateId) -> CardView {
    let layout = layout(template);
    let card_style = GradientStyle::for_gradient(data.gradient);

    // Academic cards sit on a light body and keep the gradient as an accent
    let (style, frame) = if layout.academic_palette {
        (
            GradientStyle::for_gradient(Some(Gradient::Light)),
            Frame::AccentBar(card_style.to),
        )
    } else {
        (card_style, Frame::Plain)
    };

    let name = if data.has_name() {
        data.name.clone()
    } else {
        NAME_PLACEHOLDER.to_string()
    };
    let title = (!data.title.trim().is_empty()).then(|| data.title.clone());

    CardView {
        template,
        style,
        frame,
        alignment: layout.alignment,
        avatar: Avatar::for_card(data),
        name,
        title,
        emphasize_title: layout.emphasize_title,
        sections: layout
            .blocks
            .iter()
            .filter_map(|b| build(*b, data))
            .collect(),
    }
}
