//! Static HTML export of the committed design.
//!
//! Produces a self-contained document: a fixed-width certificate box, the
//! background image (if any), and every element absolutely positioned with
//! the same inline CSS the live editor uses. Export only ever sees committed
//! elements, never gesture previews.
//!
//! Text values may carry `#{name}` markers. The saved template keeps them;
//! callers rendering a concrete certificate pass substitutions.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::collections::HashMap;

use crate::consts::EXPORT_CANVAS_WIDTH_PX;
use crate::doc::{Element, ElementBody};
use crate::render::ElementView;

const FONT_IMPORT: &str = "https://fonts.googleapis.com/css2?family=Great+Vibes&family=Dancing+Script&family=Pacifico&family=Playfair+Display&family=Roboto&family=Lora&family=Cinzel&family=Merriweather&family=Satisfy&display=swap";

/// Escape text for use in HTML content and double-quoted attributes.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Distinct `#{name}` markers in `value`, in order of first appearance.
#[must_use]
pub fn placeholders(value: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = value;
    while let Some(start) = rest.find("#{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
        rest = &after[end + 1..];
    }
    names
}

/// Replace `#{name}` markers with values from `vars`. Unknown markers are
/// left as written.
#[must_use]
pub fn fill_placeholders(value: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("#{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match vars.get(name) {
            Some(v) => out.push_str(v),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

fn element_html(element: &Element, vars: &HashMap<String, String>) -> String {
    let style = escape_html(&ElementView::committed(element).style());
    match &element.body {
        ElementBody::Photo { src } => format!(
            r#"<div class="element" style="{style} z-index: 10;"><img src="{}" class="photo" style="width:100%;height:100%;object-fit:cover;border-radius:0;"/></div>"#,
            escape_html(src)
        ),
        ElementBody::Text(text) => {
            let value = fill_placeholders(&text.value, vars);
            format!(r#"<div class="element" style="{style}">{}</div>"#, escape_html(&value))
        }
    }
}

/// Render `elements` over `background` as a standalone HTML document.
#[must_use]
pub fn certificate_html(elements: &[Element], background: Option<&str>, vars: &HashMap<String, String>) -> String {
    let body = elements
        .iter()
        .map(|el| element_html(el, vars))
        .collect::<Vec<_>>()
        .join("\n      ");
    let background = background
        .map(|src| {
            format!(
                r#"<img src="{}" class="template" style="position:absolute;inset:0;width:100%;height:100%;object-fit:cover;"/>"#,
                escape_html(src)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Certificate</title>
<style>
  @import url('{FONT_IMPORT}');
  body {{ margin: 0; padding: 24px; background: #f3f4f6; font-family: sans-serif; }}
  .certificate-wrapper {{ display:flex; align-items:center; justify-content:center; }}
  .certificate {{ position: relative; width: {EXPORT_CANVAS_WIDTH_PX}px; max-width: 100%; aspect-ratio: 10 / 7; background: white; overflow: hidden; }}
  .certificate img.template {{ position: absolute; inset: 0; width: 100%; height: 100%; object-fit: cover; }}
  .certificate .element {{ position: absolute; white-space: pre-wrap; }}
  .certificate .photo {{ width:100%;height:100%;display:block; }}
</style>
</head>
<body>
  <div class="certificate-wrapper">
    <div class="certificate">
      {background}
      {body}
    </div>
  </div>
</body>
</html>
"#
    )
}
