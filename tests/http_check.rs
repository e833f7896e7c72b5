use tokio_test::assert_ok;
use wiremock::matchers::{header_exists, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use review_crawler::config::Config;
use review_crawler::error::CrawlError;
use review_crawler::utils::http::{check_url_connection, create_client};

async fn server_answering(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn reachable_listing_passes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let client = create_client(&Config::default()).unwrap();

    assert_ok!(check_url_connection(&client, &server.uri()).await);
}

#[tokio::test]
async fn client_error_status_is_fatal() {
    let server = server_answering(404).await;
    let client = create_client(&Config::default()).unwrap();

    let result = check_url_connection(&client, &server.uri()).await;

    assert!(matches!(result, Err(CrawlError::ClientStatus { status: 404, .. })));
}

#[tokio::test]
async fn server_error_status_is_fatal() {
    let server = server_answering(500).await;
    let client = create_client(&Config::default()).unwrap();

    let result = check_url_connection(&client, &server.uri()).await;

    assert!(matches!(result, Err(CrawlError::ServerStatus { status: 500, .. })));
}

#[tokio::test]
async fn unreachable_host_is_fatal() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);
    let client = create_client(&Config::default()).unwrap();

    let result = check_url_connection(&client, &uri).await;

    assert!(matches!(result, Err(CrawlError::Connection { .. })));
}
