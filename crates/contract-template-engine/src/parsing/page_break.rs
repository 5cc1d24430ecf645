use crate::nodes::PageBreak;
use crate::parsing::markup::{Tag, find_elements_by};

fn is_page_break(tag: &Tag, class: &str) -> bool {
    tag.name == "div"
        && tag
            .attr("class")
            .is_some_and(|list| list.split_ascii_whitespace().eq([class]))
}

/// Rewrites every page break marker to `<div class="page-break"></div>`.
///
/// A marker is an empty `div` whose class list is exactly `class`, written
/// self-closing or as an open/close pair, with whatever other attributes the
/// host added. Divs with content are left alone.
pub fn normalize_page_breaks(html: &str, class: &str) -> String {
    let breaks: Vec<_> = find_elements_by(html, |tag| is_page_break(tag, class))
        .into_iter()
        .filter(|el| el.inner.slice(html).trim().is_empty())
        .collect();
    if breaks.is_empty() {
        return html.to_string();
    }

    let canonical = PageBreak::to_markup(class);
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for el in &breaks {
        out.push_str(&html[last..el.outer.start]);
        out.push_str(&canonical);
        last = el.outer.end;
    }
    out.push_str(&html[last..]);
    out
}
