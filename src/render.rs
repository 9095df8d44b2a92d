use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use crate::birthday::BirthdayEntry;

const NO_BIRTHDAYS: &str = "No upcoming birthdays";

const STYLE: &str = r#"    * {
      margin: 0;
      padding: 0;
      box-sizing: border-box;
    }

    body {
      font-family: 'Quicksand', sans-serif;
      background: transparent;
      color: #fff;
      padding: 10px 14px;
      min-height: 100vh;
    }

    h1 {
      font-size: 24px;
      font-weight: 700;
      margin-bottom: 8px;
      padding-bottom: 6px;
      border-bottom: 2px solid #fff;
      letter-spacing: 0.5px;
    }

    .birthday-list {
      display: flex;
      flex-direction: column;
      gap: 6px;
      margin-top: 8px;
    }

    .birthday-item {
      display: flex;
      justify-content: space-between;
      font-size: 18px;
      font-weight: 500;
    }

    .name {
      flex: 1;
      white-space: nowrap;
      overflow: hidden;
      text-overflow: ellipsis;
      margin-right: 12px;
    }

    .date {
      opacity: 0.85;
      white-space: nowrap;
    }

    .none {
      font-size: 16px;
      opacity: 0.7;
    }"#;

/// Escape text for use inside HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_items(entries: &[BirthdayEntry]) -> String {
    if entries.is_empty() {
        return format!("      <div class=\"none\">{}</div>", NO_BIRTHDAYS);
    }

    entries
        .iter()
        .map(|b| {
            format!(
                "      <div class=\"birthday-item\"><span class=\"name\">{}</span><span class=\"date\">{}</span></div>",
                escape_html(&b.name),
                escape_html(&b.date)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the full birthdays page
pub fn render_page(entries: &[BirthdayEntry], title: &str) -> String {
    let title = escape_html(title);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <link href="https://fonts.googleapis.com/css2?family=Quicksand:wght@500;700&display=swap" rel="stylesheet">
  <style>
{style}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <div class="birthday-list">
{items}
  </div>
</body>
</html>"#,
        title = title,
        style = STYLE,
        items = render_items(entries),
    )
}

/// Overwrite `path` with the rendered page
pub fn write_page<P: AsRef<Path>>(html: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, html)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Generated {}", path.display());
    Ok(())
}
