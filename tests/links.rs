use pretty_assertions::assert_eq;

use review_crawler::scrapers::LinkCollector;

mod common;
use common::{context, listing_html, product_url, FakeDriver, FakePage};

#[tokio::test]
async fn follows_pagination_until_next_is_disabled() {
    let ctx = context();
    let mut driver = FakeDriver::new(vec![
        FakePage::new(listing_html(1, 2, true)),
        FakePage::new(listing_html(2, 2, true)),
        FakePage::new(listing_html(3, 1, false)),
    ])
    .route("https://shop.example/duefte/?p=2", 1)
    .route("https://shop.example/duefte/?p=3", 2);

    let links = LinkCollector::new(&ctx).collect(&mut driver).await.unwrap();

    assert_eq!(
        links,
        vec![
            product_url(1, 0),
            product_url(1, 1),
            product_url(2, 0),
            product_url(2, 1),
            product_url(3, 0),
        ]
    );
    assert_eq!(
        driver.gotos(),
        vec![
            "https://shop.example/duefte/?p=2".to_string(),
            "https://shop.example/duefte/?p=3".to_string(),
        ]
    );
    assert_eq!(driver.contents(), 3);
}

#[tokio::test]
async fn single_page_listing_never_navigates() {
    let ctx = context();
    let mut driver = FakeDriver::new(vec![FakePage::new(listing_html(1, 3, false))]);

    let links = LinkCollector::new(&ctx).collect(&mut driver).await.unwrap();

    assert_eq!(links.len(), 3);
    assert!(driver.gotos().is_empty());
}

#[tokio::test]
async fn listing_without_pagination_control_is_one_page() {
    let ctx = context();
    let html = r#"<a class="mu-product-tile mu-product-list__item" href="/p/x/">x</a>"#;
    let mut driver = FakeDriver::new(vec![FakePage::new(html)]);

    let links = LinkCollector::new(&ctx).collect(&mut driver).await.unwrap();

    assert_eq!(links, vec!["https://shop.example/p/x/".to_string()]);
}
