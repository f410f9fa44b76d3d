use super::*;
use crate::doc::Element;

fn store_with(elements: Vec<Element>) -> ElementStore {
    let mut store = ElementStore::new();
    store.replace_all(elements);
    store
}

// =============================================================
// hit_test
// =============================================================

#[test]
fn empty_store_has_no_hit() {
    let store = ElementStore::new();
    assert!(hit_test(Point::new(10.0, 10.0), &store).is_none());
}

#[test]
fn hit_inside_photo_box() {
    let photo = Element::photo("p", Point::new(100.0, 100.0));
    let id = photo.id;
    let store = store_with(vec![photo]);
    let hit = hit_test(Point::new(150.0, 160.0), &store).unwrap();
    assert_eq!(hit, Hit { element_id: id, index: 0 });
}

#[test]
fn miss_outside_box() {
    let store = store_with(vec![Element::photo("p", Point::new(100.0, 100.0))]);
    assert!(hit_test(Point::new(99.0, 150.0), &store).is_none());
    assert!(hit_test(Point::new(150.0, 221.0), &store).is_none());
}

#[test]
fn edges_count_as_inside() {
    let store = store_with(vec![Element::photo("p", Point::new(100.0, 100.0))]);
    assert!(hit_test(Point::new(100.0, 100.0), &store).is_some());
    assert!(hit_test(Point::new(220.0, 220.0), &store).is_some());
}

#[test]
fn topmost_element_wins() {
    let bottom = Element::photo("a", Point::new(0.0, 0.0));
    let top = Element::photo("b", Point::new(50.0, 50.0));
    let top_id = top.id;
    let store = store_with(vec![bottom, top]);
    let hit = hit_test(Point::new(60.0, 60.0), &store).unwrap();
    assert_eq!(hit.element_id, top_id);
    assert_eq!(hit.index, 1);
}

#[test]
fn rotation_is_ignored() {
    let mut photo = Element::photo("p", Point::new(100.0, 100.0));
    photo.rotate = 45.0;
    let store = store_with(vec![photo]);
    // Corner of the unrotated box, outside the rotated shape.
    assert!(hit_test(Point::new(101.0, 101.0), &store).is_some());
}

#[test]
fn text_uses_estimated_box() {
    let text = Element::text(Point::new(120.0, 80.0));
    let store = store_with(vec![text]);
    // "New Text" at 24px: 8 glyphs * 14.4 wide, 28.8 tall.
    assert!(hit_test(Point::new(200.0, 100.0), &store).is_some());
    assert!(hit_test(Point::new(240.0, 100.0), &store).is_none());
}
