// HTML serialization of a CardView
//
// Produces a self-contained fragment with inline styles. Every piece of user
// text and every attribute value goes through `escape`.

use std::fmt::Write;

use super::{Alignment, Avatar, CardView, Frame, LinkItem, Section};

pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Only http(s), mailto and tel targets become links
fn safe_href(url: &str) -> Option<String> {
    let lower = url.trim().to_ascii_lowercase();
    ["http://", "https://", "mailto:", "tel:"]
        .iter()
        .any(|p| lower.starts_with(p))
        .then(|| escape(url.trim()))
}

fn anchor(out: &mut String, href: &str, text: &str, style: &str) {
    match safe_href(href) {
        Some(href) => {
            let _ = write!(
                out,
                r#"<a href="{}" target="_blank" rel="noopener noreferrer" style="{}">{}</a>"#,
                href,
                style,
                escape(text)
            );
        }
        None => {
            let _ = write!(out, r#"<span style="{}">{}</span>"#, style, escape(text));
        }
    }
}

fn link_item(out: &mut String, item: &LinkItem, color: &str) {
    out.push_str("<li>");
    match &item.url {
        Some(url) => anchor(out, url, &item.text, &format!("color:{}", color)),
        None => out.push_str(&escape(&item.text)),
    }
    out.push_str("</li>");
}

/// Render the view as an HTML fragment
pub fn to_html(view: &CardView) -> String {
    let style = &view.style;
    let align = match view.alignment {
        Alignment::Center => "center",
        Alignment::Left => "left",
    };
    let text = style.text.to_string();
    let muted = style.muted.to_string();

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<div class="social-card template-{}" style="background:{};color:{};text-align:{};border-radius:16px;overflow:hidden;max-width:480px;font-family:system-ui,sans-serif">"#,
        view.template,
        style.css_background(),
        text,
        align
    );

    if let Frame::AccentBar(color) = view.frame {
        let _ = write!(out, r#"<div style="height:8px;background:{}"></div>"#, color);
    }
    out.push_str(r#"<div style="padding:32px">"#);

    // Avatar
    let _ = write!(
        out,
        r#"<div class="avatar" style="width:128px;height:128px;border-radius:50%;overflow:hidden;border:4px solid #ffffff;{}">"#,
        if view.alignment == Alignment::Center {
            "margin:0 auto 16px"
        } else {
            "margin:0 0 16px"
        }
    );
    match &view.avatar {
        Avatar::Photo(src) => {
            let _ = write!(
                out,
                r#"<img src="{}" alt="{}" style="width:100%;height:100%;object-fit:cover">"#,
                escape(src),
                escape(&view.name)
            );
        }
        other => {
            let glyph = other.glyph().unwrap_or(super::AVATAR_PLACEHOLDER);
            let _ = write!(
                out,
                r#"<div style="width:100%;height:100%;background:#e5e7eb;color:#9ca3af;display:flex;align-items:center;justify-content:center;font-size:48px;font-weight:700">{}</div>"#,
                escape(&glyph.to_string())
            );
        }
    }
    out.push_str("</div>");

    let _ = write!(
        out,
        r#"<h2 style="margin:0 0 8px;font-size:24px">{}</h2>"#,
        escape(&view.name)
    );
    if let Some(title) = &view.title {
        let (color, weight) = if view.emphasize_title {
            (text.as_str(), 600)
        } else {
            (muted.as_str(), 400)
        };
        let _ = write!(
            out,
            r#"<p class="title" style="margin:0 0 16px;color:{};font-weight:{}">{}</p>"#,
            color,
            weight,
            escape(title)
        );
    }

    for section in &view.sections {
        match section {
            Section::Contact(lines) => {
                out.push_str(r#"<div class="contact" style="margin:0 0 16px">"#);
                for line in lines {
                    out.push_str("<div>");
                    anchor(&mut out, &line.href(), &line.value, &format!("color:{}", text));
                    out.push_str("</div>");
                }
                out.push_str("</div>");
            }
            Section::Links(links) => {
                out.push_str(r#"<div class="links" style="margin:0 0 16px">"#);
                for link in links {
                    let badge = format!(
                        "display:inline-block;margin:0 4px 4px 0;padding:4px 10px;border-radius:9999px;background:{};color:#ffffff;text-decoration:none",
                        link.kind.color()
                    );
                    anchor(&mut out, &link.url, link.kind.label(), &badge);
                }
                out.push_str("</div>");
            }
            Section::Text { heading, body } => {
                let _ = write!(
                    out,
                    r#"<section style="margin:0 0 16px"><h3 style="margin:0 0 4px;font-size:14px;color:{}">{}</h3><p style="margin:0;white-space:pre-line">{}</p></section>"#,
                    muted,
                    escape(heading),
                    escape(body)
                );
            }
            Section::LinkList { heading, items } => {
                let _ = write!(
                    out,
                    r#"<section style="margin:0 0 16px"><h3 style="margin:0 0 4px;font-size:14px;color:{}">{}</h3><ul style="margin:0;padding-left:18px">"#,
                    muted,
                    escape(heading)
                );
                for item in items {
                    link_item(&mut out, item, &text);
                }
                out.push_str("</ul></section>");
            }
        }
    }

    out.push_str("</div></div>");
    out
}
