//! Card rasterizer
//!
//! Paints a `CardView` onto an RGBA canvas. Layout is computed at scale 1
//! in card units and every coordinate is multiplied by `scale` when painting,
//! so a scale-2 export is the same card at twice the pixel density.
//!
//! Pixels outside the rounded card body stay fully transparent.

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::font::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH, LINE_HEIGHT};
use super::ExportError;
use crate::card::Rgb;
use crate::form::photo::decode_data_uri;
use crate::render::{Alignment, Avatar, CardView, Frame, Section};

/// Card width in card units
pub const CARD_WIDTH: u32 = 480;

const PADDING: u32 = 32;
const CORNER_RADIUS: u32 = 16;
const ACCENT_BAR: u32 = 8;
const AVATAR_SIZE: u32 = 128;
const AVATAR_BORDER: u32 = 4;
const AVATAR_GAP: u32 = 16;
const SECTION_GAP: u32 = 12;

const NAME_SIZE: u32 = 3;
const BODY_SIZE: u32 = 2;

/// Largest accepted scale factor
pub const MAX_SCALE: u32 = 4;

/// Text lines painted on one card; anything past this is cut with "..."
const MAX_TEXT_LINES: usize = 40;
const ELLIPSIS: &str = "...";

const AVATAR_BG: Rgb = Rgb::hex(0xe5e7eb);
const AVATAR_GLYPH: Rgb = Rgb::hex(0x9ca3af);
const WHITE: Rgb = Rgb::hex(0xffffff);

/// One laid-out line of text, in card units
struct TextLine {
    text: String,
    size: u32,
    color: Rgb,
    gap_before: u32,
}

fn rgba(c: Rgb) -> Rgba<u8> {
    Rgba([c.0, c.1, c.2, 255])
}

/// Wrap `text` so no line exceeds `max_cells` display cells.
/// Words longer than a line are split by character.
pub(crate) fn wrap(text: &str, max_cells: usize) -> Vec<String> {
    let max_cells = max_cells.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0usize;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            let sep = usize::from(!current.is_empty());

            if current_width + sep + word_width <= max_cells {
                if sep == 1 {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += sep + word_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }

            if word_width <= max_cells {
                current.push_str(word);
                current_width = word_width;
                continue;
            }

            for c in word.chars() {
                let w = c.width().unwrap_or(0);
                if current_width + w > max_cells && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(c);
                current_width += w;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

fn cells_for(width_units: u32, size: u32) -> usize {
    (width_units / (ADVANCE * size)) as usize
}

fn layout_lines(view: &CardView, content_width: u32) -> Vec<TextLine> {
    let style = &view.style;
    let mut lines = Vec::new();

    let push_wrapped = |lines: &mut Vec<TextLine>, text: &str, size: u32, color: Rgb, gap: u32| {
        for (i, line) in wrap(text, cells_for(content_width, size)).into_iter().enumerate() {
            lines.push(TextLine {
                text: line,
                size,
                color,
                gap_before: if i == 0 { gap } else { 0 },
            });
        }
    };

    push_wrapped(&mut lines, &view.name, NAME_SIZE, style.text, 0);
    if let Some(title) = &view.title {
        let color = if view.emphasize_title {
            style.text
        } else {
            style.muted
        };
        push_wrapped(&mut lines, title, BODY_SIZE, color, 4);
    }

    for section in &view.sections {
        match section {
            Section::Contact(contacts) => {
                for (i, c) in contacts.iter().enumerate() {
                    let gap = if i == 0 { SECTION_GAP } else { 0 };
                    push_wrapped(&mut lines, &c.value, BODY_SIZE, style.text, gap);
                }
            }
            Section::Links(links) => {
                let labels: Vec<&str> = links.iter().map(|l| l.kind.label()).collect();
                push_wrapped(&mut lines, &labels.join(" | "), BODY_SIZE, style.text, SECTION_GAP);
            }
            Section::Text { heading, body } => {
                push_wrapped(&mut lines, heading, BODY_SIZE, style.muted, SECTION_GAP);
                push_wrapped(&mut lines, body, BODY_SIZE, style.text, 2);
            }
            Section::LinkList { heading, items } => {
                push_wrapped(&mut lines, heading, BODY_SIZE, style.muted, SECTION_GAP);
                for (i, item) in items.iter().enumerate() {
                    let gap = if i == 0 { 2 } else { 0 };
                    push_wrapped(&mut lines, &format!("- {}", item.text), BODY_SIZE, style.text, gap);
                }
            }
        }
    }

    truncate_lines(&mut lines, content_width);
    lines
}

/// Keep the canvas bounded whatever the text length
fn truncate_lines(lines: &mut Vec<TextLine>, content_width: u32) {
    if lines.len() <= MAX_TEXT_LINES {
        return;
    }
    lines.truncate(MAX_TEXT_LINES);

    if let Some(last) = lines.last_mut() {
        let max_cells = cells_for(content_width, last.size);
        while last.text.width() + ELLIPSIS.len() > max_cells && last.text.pop().is_some() {}
        last.text.push_str(ELLIPSIS);
    }
}

fn header_height(view: &CardView) -> u32 {
    match view.frame {
        Frame::AccentBar(_) => ACCENT_BAR,
        Frame::Plain => 0,
    }
}

/// Card height in card units for a view
pub fn card_height(view: &CardView) -> u32 {
    let text: u32 = layout_lines(view, CARD_WIDTH - 2 * PADDING)
        .iter()
        .map(|l| l.gap_before + LINE_HEIGHT * l.size)
        .sum();
    header_height(view) + PADDING + AVATAR_SIZE + AVATAR_GAP + text + PADDING
}

/// Inside test for a rounded rectangle covering the whole canvas
fn in_rounded_rect(x: u32, y: u32, w: u32, h: u32, r: u32) -> bool {
    let (x, y, w, h, r) = (x as i64, y as i64, w as i64, h as i64, r as i64);
    let cx = if x < r {
        r
    } else if x >= w - r {
        w - r - 1
    } else {
        return true;
    };
    let cy = if y < r {
        r
    } else if y >= h - r {
        h - r - 1
    } else {
        return true;
    };
    let (dx, dy) = (x - cx, y - cy);
    dx * dx + dy * dy <= r * r
}

fn fill_circle(canvas: &mut RgbaImage, cx: i64, cy: i64, radius: i64, color: Rgb) {
    let px = rgba(color);
    for y in (cy - radius).max(0)..(cy + radius).min(canvas.height() as i64) {
        for x in (cx - radius).max(0)..(cx + radius).min(canvas.width() as i64) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= radius * radius {
                canvas.put_pixel(x as u32, y as u32, px);
            }
        }
    }
}

fn draw_text(canvas: &mut RgbaImage, x: u32, y: u32, text: &str, px: u32, color: Rgb) {
    let color = rgba(color);
    let mut pen_x = x;

    for c in text.chars() {
        let cells = match c.width() {
            Some(0) | None => continue,
            Some(w) => w as u32,
        };
        let glyph = font::glyph(c);

        for col in 0..GLYPH_WIDTH {
            for row in 0..GLYPH_HEIGHT {
                if !font::is_set(glyph, col, row) {
                    continue;
                }
                for oy in 0..px {
                    for ox in 0..px {
                        let gx = pen_x + col * px + ox;
                        let gy = y + row * px + oy;
                        if gx < canvas.width() && gy < canvas.height() {
                            canvas.put_pixel(gx, gy, color);
                        }
                    }
                }
            }
        }
        pen_x += ADVANCE * px * cells;
    }
}

fn text_width(text: &str, size: u32) -> u32 {
    // Trailing advance includes one blank font column
    (text.width() as u32 * ADVANCE).saturating_sub(1) * size
}

fn draw_avatar(
    canvas: &mut RgbaImage,
    avatar: &Avatar,
    cx: i64,
    cy: i64,
    scale: u32,
) -> Result<(), ExportError> {
    let outer = (AVATAR_SIZE * scale / 2) as i64;
    let inner = outer - (AVATAR_BORDER * scale) as i64;
    fill_circle(canvas, cx, cy, outer, WHITE);

    match avatar {
        Avatar::Photo(uri) => {
            let (_, bytes) = decode_data_uri(uri).ok_or(ExportError::Photo)?;
            let photo = image::load_from_memory(&bytes).map_err(|_| ExportError::Photo)?;
            let side = (inner * 2) as u32;
            let photo = photo.resize_to_fill(side, side, FilterType::Triangle).to_rgba8();

            let (left, top) = (cx - inner, cy - inner);
            for (px, py, pixel) in photo.enumerate_pixels() {
                let (x, y) = (left + px as i64, top + py as i64);
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy > inner * inner {
                    continue;
                }
                if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
                    // Photos with alpha sit on the avatar background
                    let a = pixel[3] as f32 / 255.0;
                    let blended = Rgb(pixel[0], pixel[1], pixel[2]).lerp(AVATAR_BG, 1.0 - a);
                    canvas.put_pixel(x as u32, y as u32, rgba(blended));
                }
            }
        }
        other => {
            fill_circle(canvas, cx, cy, inner, AVATAR_BG);
            if let Some(c) = other.glyph() {
                let px = 8 * scale;
                let label = c.to_string();
                let w = text_width(&label, 8) * scale;
                let h = GLYPH_HEIGHT * px;
                let x = (cx - w as i64 / 2).max(0) as u32;
                let y = (cy - h as i64 / 2).max(0) as u32;
                draw_text(canvas, x, y, &label, px, AVATAR_GLYPH);
            }
        }
    }
    Ok(())
}

/// Paint the card at `scale` pixels per card unit
pub fn rasterize(view: &CardView, scale: u32) -> Result<RgbaImage, ExportError> {
    if scale == 0 || scale > MAX_SCALE {
        return Err(ExportError::Scale(scale));
    }

    let content_width = CARD_WIDTH - 2 * PADDING;
    let lines = layout_lines(view, content_width);
    let height = card_height(view);
    let (w, h) = (CARD_WIDTH * scale, height * scale);
    let radius = CORNER_RADIUS * scale;

    let mut canvas = RgbaImage::new(w, h);

    // Body: 135deg gradient from top-left to bottom-right
    let span = (w + h).max(1) as f32;
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        if in_rounded_rect(x, y, w, h, radius) {
            *pixel = rgba(view.style.sample((x + y) as f32 / span));
        }
    }

    if let Frame::AccentBar(color) = view.frame {
        let px = rgba(color);
        for y in 0..(ACCENT_BAR * scale).min(h) {
            for x in 0..w {
                if in_rounded_rect(x, y, w, h, radius) {
                    canvas.put_pixel(x, y, px);
                }
            }
        }
    }

    let top = header_height(view) + PADDING;
    let avatar_cx = match view.alignment {
        Alignment::Center => CARD_WIDTH / 2,
        Alignment::Left => PADDING + AVATAR_SIZE / 2,
    };
    draw_avatar(
        &mut canvas,
        &view.avatar,
        (avatar_cx * scale) as i64,
        ((top + AVATAR_SIZE / 2) * scale) as i64,
        scale,
    )?;

    let mut y = top + AVATAR_SIZE + AVATAR_GAP;
    for line in &lines {
        y += line.gap_before;
        let x = match view.alignment {
            Alignment::Center => {
                PADDING + content_width.saturating_sub(text_width(&line.text, line.size)) / 2
            }
            Alignment::Left => PADDING,
        };
        draw_text(
            &mut canvas,
            x * scale,
            y * scale,
            &line.text,
            line.size * scale,
            line.color,
        );
        y += LINE_HEIGHT * line.size;
    }

    Ok(canvas)
}
