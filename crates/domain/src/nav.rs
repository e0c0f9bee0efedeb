use crate::gallery::{escape_html, title_case};
use crate::DomainError;

pub const NAV_MARKER: &str = "<!-- case-study-nav -->";
const NAV_OPEN: &str = r#"<nav class="case-study-nav">"#;
const NAV_CLOSE: &str = "</nav>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbors {
    pub previous: Option<String>,
    pub next: Option<String>,
}

/// Previous/next slugs for a page. The ends of the list do not wrap.
pub fn neighbors(order: &[String], slug: &str) -> Option<Neighbors> {
    let index = order.iter().position(|entry| entry == slug)?;
    Some(Neighbors {
        previous: index.checked_sub(1).map(|prev| order[prev].clone()),
        next: order.get(index + 1).cloned(),
    })
}

pub fn render_navigation(neighbors: &Neighbors) -> String {
    let mut block = String::from(NAV_OPEN);
    if let Some(previous) = &neighbors.previous {
        block.push_str(&format!(
            r#"<a class="prev" href="{href}.html">&larr; {label}</a>"#,
            href = escape_html(previous),
            label = escape_html(&title_case(previous)),
        ));
    }
    if let Some(next) = &neighbors.next {
        block.push_str(&format!(
            r#"<a class="next" href="{href}.html">{label} &rarr;</a>"#,
            href = escape_html(next),
            label = escape_html(&title_case(next)),
        ));
    }
    block.push_str(NAV_CLOSE);
    block
}

/// Replaces an existing navigation block, else the marker comment, else
/// inserts before `</body>`. Running it twice gives the same page.
pub fn inject_navigation(html: &str, neighbors: &Neighbors) -> Result<String, DomainError> {
    let block = render_navigation(neighbors);

    if let Some(start) = html.find(NAV_OPEN) {
        if let Some(close) = html[start..].find(NAV_CLOSE) {
            let end = start + close + NAV_CLOSE.len();
            return Ok(format!("{}{}{}", &html[..start], block, &html[end..]));
        }
    }

    if let Some(start) = html.find(NAV_MARKER) {
        let end = start + NAV_MARKER.len();
        return Ok(format!("{}{}{}", &html[..start], block, &html[end..]));
    }

    if let Some(start) = html.rfind("</body>") {
        return Ok(format!("{}{}\n{}", &html[..start], block, &html[start..]));
    }

    Err(DomainError::NoInsertionPoint)
}
