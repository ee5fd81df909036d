// Server-rendered pages
//
// Plain HTML with a small inline script. The script posts each input to
// /api/editor/field and swaps in /api/preview; the server owns all state.

use std::fmt::Write;

use crate::card::{CardRecord, Gradient, SocialCardData, TemplateId};
use crate::form::{Field, FormVariant};
use crate::render::{escape, render, to_html};

const BASIC_FIELDS: &[Field] = &[
    Field::Name,
    Field::Phone,
    Field::Email,
    Field::Linkedin,
    Field::Github,
    Field::Portfolio,
];

const EXTENDED_FIELDS: &[Field] = &[
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
];

fn fields_for(variant: FormVariant) -> &'static [Field] {
    match variant {
        FormVariant::Basic => BASIC_FIELDS,
        FormVariant::Extended => EXTENDED_FIELDS,
    }
}

fn label(field: Field) -> &'static str {
    match field {
        Field::Name => "Full Name",
        Field::Title => "Title",
        Field::Phone => "Phone",
        Field::Email => "Email",
        Field::Linkedin => "LinkedIn",
        Field::Github => "GitHub",
        Field::Twitter => "Twitter",
        Field::Website => "Website",
        Field::Portfolio => "Portfolio",
        Field::About => "About",
        Field::Interests => "Interests",
        Field::TechSkills => "Tech Skills",
        Field::PublishedWorks => "Published Works (one per line)",
        Field::LatestWorkLinks => "Latest Work Links (one per line)",
        Field::Gradient => "Background",
    }
}

fn multiline(field: Field) -> bool {
    matches!(
        field,
        Field::About
            | Field::Interests
            | Field::TechSkills
            | Field::PublishedWorks
            | Field::LatestWorkLinks
    )
}

const SCRIPT: &str = r#"
async function refreshPreview() {
  const r = await fetch('/api/preview');
  document.getElementById('preview').innerHTML = await r.text();
}
document.querySelectorAll('[data-field]').forEach((el) => {
  el.addEventListener('input', async () => {
    await fetch('/api/editor/field', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ field: el.dataset.field, value: el.value }),
    });
    refreshPreview();
  });
});
document.getElementById('photo').addEventListener('change', async (e) => {
  const file = e.target.files[0];
  if (!file) return;
  await fetch('/api/editor/photo', {
    method: 'POST',
    headers: { 'Content-Type': file.type || 'application/octet-stream' },
    body: file,
  });
  refreshPreview();
});
"#;

fn shell(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title></head>\
         <body style=\"font-family:system-ui,sans-serif;margin:2rem;background:#f9fafb\">{}</body></html>",
        escape(title),
        body
    )
}

/// The editor: form on the left, live preview on the right
pub fn editor_page(template: TemplateId, variant: FormVariant, card: &SocialCardData) -> String {
    let mut body = String::new();

    let _ = write!(
        body,
        "<h1>Create your card</h1><p>Template: <strong>{}</strong></p>",
        escape(template.label())
    );
    body.push_str("<div style=\"display:flex;gap:2rem;align-items:flex-start\">");
    body.push_str("<form id=\"card-form\" style=\"display:grid;gap:.75rem;width:22rem\">");

    for &field in fields_for(variant) {
        let name = field.as_str();
        let value = escape(field.get(card));
        let _ = write!(
            body,
            "<label>{}<br>",
            escape(label(field))
        );
        if multiline(field) {
            let _ = write!(
                body,
                "<textarea name=\"{name}\" data-field=\"{name}\" rows=\"3\" style=\"width:100%\">{value}</textarea>"
            );
        } else {
            let _ = write!(
                body,
                "<input name=\"{name}\" data-field=\"{name}\" value=\"{value}\" style=\"width:100%\">"
            );
        }
        body.push_str("</label>");
    }

    let _ = write!(body, "<label>{}<br><select data-field=\"gradient\">", label(Field::Gradient));
    for gradient in Gradient::ALL {
        let selected = if card.gradient == Some(gradient) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            body,
            "<option value=\"{0}\"{1}>{0}</option>",
            gradient.as_str(),
            selected
        );
    }
    body.push_str("</select></label>");
    body.push_str("<label>Photo<br><input id=\"photo\" type=\"file\" accept=\"image/*\"></label>");
    body.push_str("</form>");

    let _ = write!(
        body,
        "<div id=\"preview\">{}</div></div>",
        to_html(&render(card, template))
    );
    let _ = write!(body, "<script>{}</script>", SCRIPT);

    shell("NexCard - Create", &body)
}

/// Public view of a stored card
pub fn share_page(record: &CardRecord) -> String {
    let view = render(&record.data, record.template_id);
    let title = if record.data.has_name() {
        record.data.name.trim().to_string()
    } else {
        "Social Card".to_string()
    };
    shell(&title, &to_html(&view))
}

/// The signed-in user's saved cards
pub fn saved_cards_page(records: &[CardRecord]) -> String {
    let mut body = String::from("<h1>Saved cards</h1>");

    if records.is_empty() {
        body.push_str("<p>No saved cards yet. <a href=\"/create\">Create one</a>.</p>");
        return shell("NexCard - Saved cards", &body);
    }

    body.push_str("<ul>");
    for record in records {
        let _ = write!(
            body,
            "<li><a href=\"/share/{}\">{}</a> <small>{} &middot; {}</small></li>",
            escape(&record.id),
            escape(&record.data.name),
            escape(record.template_id.label()),
            record.created_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    body.push_str("</ul>");

    shell("NexCard - Saved cards", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_page_escapes_values() {
        let card = SocialCardData {
            name: "<b>Jane</b>".into(),
            ..Default::default()
        };
        let html = editor_page(TemplateId::Classic, FormVariant::Basic, &card);
        assert!(html.contains("value=\"&lt;b&gt;Jane&lt;/b&gt;\""));
        assert!(!html.contains("<b>Jane</b>"));
        assert!(html.contains("<option value=\"dark\" selected>"));
    }

    #[test]
    fn test_variant_controls_fields() {
        let card = SocialCardData::default();
        let basic = editor_page(TemplateId::Classic, FormVariant::Basic, &card);
        let extended = editor_page(TemplateId::Classic, FormVariant::Extended, &card);
        assert!(!basic.contains("data-field=\"title\""));
        assert!(extended.contains("data-field=\"title\""));
        assert!(extended.contains("<textarea name=\"about\""));
    }
}
