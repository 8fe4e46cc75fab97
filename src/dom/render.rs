//! Draws the visible part of the element tree as an indented outline.
//!
//! Every printed line starts with the element id in brackets, which is what
//! terminal commands such as `click 12` address. Elements without text or
//! image source are structural and only contribute their children.

use crate::dom::{ElementId, RenderTarget, HIDDEN};
use crate::foundation::utils::truncate_label;

/// Class of the favourite control; rendered as a star instead of its text.
pub const FAVOURITE_CONTROL: &str = "fav-icon";
/// Class set on the favourite control while the photo is favourited.
pub const FAVOURITED: &str = "fav";
/// Text of the favourite control.
pub const FAVOURITE_MARK: &str = "★";

pub fn render_text(target: &RenderTarget, max_label_width: usize) -> String {
    let mut out = String::new();
    for child in target.children(target.root()) {
        render_element(target, child, 0, max_label_width, &mut out);
    }
    out
}

fn render_element(
    target: &RenderTarget,
    id: ElementId,
    depth: usize,
    max_label_width: usize,
    out: &mut String,
) {
    let Some(element) = target.element(id) else {
        return;
    };
    if element.has_class(HIDDEN) {
        return;
    }

    let line = if element.has_class(FAVOURITE_CONTROL) {
        let star = if element.has_class(FAVOURITED) {
            "★ favourite"
        } else {
            "☆ add to favourites"
        };
        Some(star.to_string())
    } else if let Some(src) = &element.src {
        Some(format!("<{} {}>", element.tag, src))
    } else {
        element
            .text
            .as_deref()
            .map(|text| truncate_label(text, max_label_width))
    };

    let child_depth = match line {
        Some(line) => {
            out.push_str(&format!("{}[{}] {}\n", "  ".repeat(depth), id, line));
            depth + 1
        }
        None => depth,
    };

    for child in element.children {
        render_element(target, child, child_depth, max_label_width, out);
    }
}
