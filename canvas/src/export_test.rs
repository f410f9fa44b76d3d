use super::*;
use crate::doc::TextStyle;
use crate::geom::Point;

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

fn text(value: &str) -> Element {
    Element::text_with(Point::new(10.0, 20.0), TextStyle { value: value.into(), ..TextStyle::default() })
}

// =============================================================
// escape_html
// =============================================================

#[test]
fn escape_html_replaces_markup() {
    assert_eq!(escape_html(r#"<b>"Tom" & Jerry</b>"#), "&lt;b&gt;&quot;Tom&quot; &amp; Jerry&lt;/b&gt;");
}

#[test]
fn escape_html_leaves_plain_text() {
    assert_eq!(escape_html("Certificate of Merit"), "Certificate of Merit");
}

// =============================================================
// placeholders
// =============================================================

#[test]
fn placeholders_lists_distinct_names_in_order() {
    assert_eq!(placeholders("#{name} finished #{course} on #{date}, #{name}!"), ["name", "course", "date"]);
}

#[test]
fn placeholders_ignores_unterminated_and_empty() {
    assert!(placeholders("#{} and #{open").is_empty());
    assert!(placeholders("no markers # { here }").is_empty());
}

#[test]
fn fill_replaces_known_markers() {
    let filled = fill_placeholders("Awarded to #{name} for #{course}", &vars(&[("name", "Ada"), ("course", "Rust")]));
    assert_eq!(filled, "Awarded to Ada for Rust");
}

#[test]
fn fill_keeps_unknown_markers() {
    let filled = fill_placeholders("#{name} on #{date}", &vars(&[("name", "Ada")]));
    assert_eq!(filled, "Ada on #{date}");
}

#[test]
fn fill_keeps_unterminated_tail() {
    let filled = fill_placeholders("Hi #{name", &vars(&[("name", "Ada")]));
    assert_eq!(filled, "Hi #{name");
}

// =============================================================
// certificate_html
// =============================================================

#[test]
fn html_contains_every_element_in_order() {
    let elements = vec![
        Element::photo("http://x/uploads/face.jpg", Point::new(880.0, 530.0)),
        text("Hello"),
    ];
    let html = certificate_html(&elements, None, &HashMap::new());
    let photo_at = html.find("face.jpg").unwrap();
    let text_at = html.find(">Hello</div>").unwrap();
    assert!(photo_at < text_at);
    assert!(html.contains("left:880px; top:530px; width:120px; height:120px;"));
    assert!(html.contains("z-index: 10;"));
}

#[test]
fn html_includes_background_when_set() {
    let html = certificate_html(&[], Some("http://x/uploads/bg.png"), &HashMap::new());
    assert!(html.contains(r#"<img src="http://x/uploads/bg.png" class="template""#));
}

#[test]
fn html_without_background_has_no_template_img() {
    let html = certificate_html(&[], None, &HashMap::new());
    assert!(!html.contains(r#"class="template""#));
    assert!(html.starts_with("<!doctype html>"));
    assert!(html.contains("aspect-ratio: 10 / 7"));
    assert!(html.contains("width: 1000px"));
}

#[test]
fn html_escapes_text_values() {
    let html = certificate_html(&[text("<script>alert(1)</script>")], None, &HashMap::new());
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn html_escapes_quoted_style_values() {
    let style = TextStyle {
        font_family: r#""Times New Roman", serif"#.into(),
        color: r#"red" onmouseover="x"#.into(),
        ..TextStyle::default()
    };
    let html = certificate_html(&[Element::text_with(Point::new(0.0, 0.0), style)], None, &HashMap::new());
    assert!(html.contains("font-family: &quot;Times New Roman&quot;, serif;"));
    assert!(html.contains("color:red&quot; onmouseover=&quot;x;"));
    assert!(!html.contains(r#"" onmouseover=""#));
}

#[test]
fn html_keeps_markers_without_vars() {
    let html = certificate_html(&[text("#{name}")], None, &HashMap::new());
    assert!(html.contains(">#{name}</div>"));
}

#[test]
fn html_fills_markers_with_vars() {
    let html = certificate_html(&[text("#{name}")], None, &vars(&[("name", "Grace")]));
    assert!(html.contains(">Grace</div>"));
}
