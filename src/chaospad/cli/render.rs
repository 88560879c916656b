use chaospad::model::{format_timestamp, Pad};
use chaospad::state::Pagination;
use chaospad::timefmt::relative_time_at;
use chrono::{DateTime, Utc};
use colored::Colorize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const NAME_WIDTH: usize = 24;
const TIME_WIDTH: usize = 14;
const PREVIEW_CHARS: usize = 80;

pub fn render_pad_table(
    items: &[Pad],
    pagination: &Pagination,
    search: &str,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    if items.is_empty() {
        out.push_str("No pads found.\n");
    }

    let id_width = items.iter().map(|p| p.id.width()).max().unwrap_or(0);
    let fixed = NAME_WIDTH + 1 + 1 + TIME_WIDTH + 2 + id_width;
    let preview_width = LINE_WIDTH.saturating_sub(fixed);

    for pad in items {
        let name = pad_to_width(&truncate_to_width(&pad.name, NAME_WIDTH), NAME_WIDTH);
        let preview = pad_to_width(
            &truncate_to_width(&content_preview(pad), preview_width),
            preview_width,
        );
        let time = format!(
            "{:>width$}",
            relative_time_at(&pad.updated_at, now),
            width = TIME_WIDTH
        );
        out.push_str(&format!(
            "{} {} {}  {}\n",
            name.bold(),
            preview,
            time.dimmed(),
            pad.id.yellow()
        ));
    }

    let mut footer = format!(
        "Page {} of {} · {} pads",
        pagination.page,
        pagination.page_count(),
        pagination.total_count
    );
    if !search.is_empty() {
        footer.push_str(&format!(" matching \"{}\"", search));
    }
    out.push_str(&format!("{}\n", footer.dimmed()));
    out
}

pub fn render_full_pad(pad: &Pad, now: DateTime<Utc>) -> String {
    let mut out = format!("{} {}\n", pad.id.yellow(), pad.name.bold());
    out.push_str(&format!(
        "{}\n",
        format!(
            "updated {} ({})",
            relative_time_at(&pad.updated_at, now),
            format_timestamp(&pad.updated_at)
        )
        .dimmed()
    ));
    out.push_str("--------------------------------\n");
    if let Some(content) = &pad.content {
        out.push_str(content);
        if !content.ends_with('\n') {
            out.push('\n');
        }
    }
    if !pad.extra.is_empty() {
        out.push_str("--------------------------------\n");
        for (key, value) in &pad.extra {
            out.push_str(&format!("{}: {}\n", key.dimmed(), value));
        }
    }
    out
}

fn content_preview(pad: &Pad) -> String {
    pad.content
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}
