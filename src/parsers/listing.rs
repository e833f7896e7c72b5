use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

static PRODUCT_TILE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a.mu-product-tile.mu-product-list__item")
        .expect("Invalid product tile selector")
});

static NEXT_PAGE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("button.mu-pagination__navigation--next")
        .expect("Invalid pagination selector")
});

/// Product links and pagination state of one rendered listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub product_links: Vec<String>,
    pub has_next: bool,
}

pub fn parse_listing_page(html: &str, base_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    let product_links = document
        .select(&PRODUCT_TILE)
        .filter_map(|tile| tile.value().attr("href"))
        .filter_map(|href| base_url.join(href).ok())
        .map(|url| url.to_string())
        .collect();

    let has_next = document
        .select(&NEXT_PAGE)
        .next()
        .map_or(false, |button| {
            !button.value().attr("class").unwrap_or_default().contains("disabled")
        });

    ListingPage {
        product_links,
        has_next,
    }
}

/// URL of listing page `page` (1-based); the first page has no query.
pub fn listing_page_url(base_url: &Url, page: u32) -> Url {
    let mut url = base_url.clone();
    if page > 1 {
        url.query_pairs_mut().append_pair("p", &page.to_string());
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://shop.example/duefte/").unwrap()
    }

    #[test]
    fn collects_tiles_and_resolves_relative_links() {
        let html = r#"
            <a class="mu-product-tile mu-product-list__item" href="/p/one/">1</a>
            <a class="mu-product-tile" href="/p/ignored/">x</a>
            <a class="mu-product-tile mu-product-list__item" href="https://shop.example/p/two/">2</a>
            <a class="mu-product-tile mu-product-list__item">no href</a>
            <button class="mu-pagination__navigation--next">next</button>
        "#;
        let page = parse_listing_page(html, &base());
        assert_eq!(
            page.product_links,
            vec!["https://shop.example/p/one/", "https://shop.example/p/two/"]
        );
        assert!(page.has_next);
    }

    #[test]
    fn disabled_or_missing_next_button_ends_pagination() {
        let disabled = r#"<button class="mu-pagination__navigation--next mu-button--disabled"></button>"#;
        assert!(!parse_listing_page(disabled, &base()).has_next);
        assert!(!parse_listing_page("<p>empty</p>", &base()).has_next);
    }

    #[test]
    fn page_urls_use_the_p_parameter() {
        assert_eq!(listing_page_url(&base(), 1).as_str(), "https://shop.example/duefte/");
        assert_eq!(listing_page_url(&base(), 3).as_str(), "https://shop.example/duefte/?p=3");
    }
}
