pub mod listing;
pub mod price;
pub mod product;
pub mod review;

pub use listing::*;
pub use price::*;
pub use product::*;
pub use review::*;

use html_escape::decode_html_entities;
use scraper::ElementRef;

/// Clean and normalize text: decode HTML entities, collapse whitespace
/// (including non-breaking spaces) and drop parentheses.
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(['(', ')'], "")
        .trim()
        .to_string()
}

/// Element text with every text node trimmed and concatenated without a
/// separator.
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Element text run through [`clean_text`].
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn clean_text_collapses_whitespace_and_parentheses() {
        assert_eq!(clean_text("  (128)\n"), "128");
        assert_eq!(clean_text("Eau\u{a0}de   Parfum &amp; Co"), "Eau de Parfum & Co");
    }

    #[test]
    fn stripped_text_joins_trimmed_fragments() {
        let html = Html::parse_fragment("<div> Max <span> M. </span>\n</div>");
        let selector = Selector::parse("div").unwrap();
        let div = html.select(&selector).next().unwrap();
        assert_eq!(stripped_text(div), "MaxM.");
    }
}
