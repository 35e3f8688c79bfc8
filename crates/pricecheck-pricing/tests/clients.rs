//! Integration tests for the quote and reference clients using wiremock HTTP mocks.

use pricecheck_core::RawPrice;
use pricecheck_pricing::{PricingError, QuoteClient, ReferenceClient};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/en/quoter/ajax/priceservice/";

fn quote_client(server: &MockServer) -> QuoteClient {
    QuoteClient::new(
        &format!("{}{ENDPOINT}", server.uri()),
        5,
        "pricecheck-test",
        0,
        0,
    )
    .expect("client construction should not fail")
}

fn reference_client(server: &MockServer) -> ReferenceClient {
    ReferenceClient::new(&server.uri(), "1", 5, "pricecheck-test", 0, 0)
        .expect("client construction should not fail")
}

// ---------------------------------------------------------------------------
// QuoteClient
// ---------------------------------------------------------------------------

#[tokio::test]
async fn quote_posts_multipart_sku_and_variant_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_string_contains("name=\"sku\""))
        .and(body_string_contains("ABC123"))
        .and(body_string_contains("name=\"variant_code\""))
        .and(body_string_contains("AW_TAPICERIA_ASP.AWSERIE_ASIE=4"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "price": 410.0, "currency": "EUR" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let quote = quote_client(&server)
        .fetch_quote("ABC123", "AW_TAPICERIA_ASP.AWSERIE_ASIE=4")
        .await
        .expect("quote should parse");

    assert_eq!(quote.sku, "ABC123");
    assert_eq!(quote.variant_code, "AW_TAPICERIA_ASP.AWSERIE_ASIE=4");
    assert_eq!(quote.price, RawPrice::Number(410.0));
    assert_eq!(quote.currency.as_deref(), Some("EUR"));
}

#[tokio::test]
async fn quote_accepts_text_price() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "price": "1.234,56€" })),
        )
        .mount(&server)
        .await;

    let quote = quote_client(&server)
        .fetch_quote("ABC123", "")
        .await
        .expect("quote should parse");

    assert_eq!(quote.price, RawPrice::Text("1.234,56€".to_string()));
    assert!(quote.currency.is_none());
}

#[tokio::test]
async fn quote_without_price_is_missing_price() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "error": "no variant" })),
        )
        .mount(&server)
        .await;

    let err = quote_client(&server)
        .fetch_quote("ABC123", "X.Y=1")
        .await
        .unwrap_err();
    assert!(matches!(err, PricingError::MissingPrice { .. }), "{err:?}");
}

#[tokio::test]
async fn quote_server_error_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = quote_client(&server)
        .fetch_quote("ABC123", "X.Y=1")
        .await
        .unwrap_err();
    assert!(
        matches!(err, PricingError::UnexpectedStatus { status: 500, .. }),
        "{err:?}"
    );
}

#[tokio::test]
async fn quote_malformed_json_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = quote_client(&server)
        .fetch_quote("ABC123", "X.Y=1")
        .await
        .unwrap_err();
    assert!(matches!(err, PricingError::Deserialize { .. }), "{err:?}");
}

#[tokio::test]
async fn quote_retries_server_errors_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "price": 5 })))
        .mount(&server)
        .await;

    let client = QuoteClient::new(
        &format!("{}{ENDPOINT}", server.uri()),
        5,
        "pricecheck-test",
        1,
        0,
    )
    .unwrap();
    let quote = client.fetch_quote("ABC123", "X.Y=1").await.unwrap();
    assert_eq!(quote.price, RawPrice::Number(5.0));
}

// ---------------------------------------------------------------------------
// ReferenceClient
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reference_picks_row_with_series_column() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/precio/ABC123"))
        .and(query_param("serie", "4"))
        .and(query_param("tarifa", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "modelo": "ABC123", "2": "300,00€" },
            { "modelo": "ABC123", "4": "410,00€" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let reference = reference_client(&server)
        .fetch_reference("ABC123", "4")
        .await
        .expect("reference should parse");

    assert_eq!(reference.sku, "ABC123");
    assert_eq!(reference.serie_key, "4");
    assert_eq!(reference.price, RawPrice::Text("410,00€".to_string()));
}

#[tokio::test]
async fn reference_falls_back_to_precio_column() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/precio/M100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "modelo": "M100", "precio": 812.5 }
        ])))
        .mount(&server)
        .await;

    let reference = reference_client(&server)
        .fetch_reference("M100", "35")
        .await
        .unwrap();
    assert_eq!(reference.price, RawPrice::Number(812.5));
}

#[tokio::test]
async fn reference_empty_array_is_missing_price() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let err = reference_client(&server)
        .fetch_reference("ABC123", "4")
        .await
        .unwrap_err();
    assert!(matches!(err, PricingError::MissingPrice { .. }), "{err:?}");
}

#[tokio::test]
async fn reference_404_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = reference_client(&server)
        .fetch_reference("NOPE", "4")
        .await
        .unwrap_err();
    assert!(matches!(err, PricingError::NotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn reference_object_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "error": "Error al obtener los datos" })),
        )
        .mount(&server)
        .await;

    let err = reference_client(&server)
        .fetch_reference("ABC123", "4")
        .await
        .unwrap_err();
    assert!(matches!(err, PricingError::Deserialize { .. }), "{err:?}");
}

#[tokio::test]
async fn reference_429_is_rate_limited_with_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let err = reference_client(&server)
        .fetch_reference("ABC123", "4")
        .await
        .unwrap_err();
    assert!(
        matches!(err, PricingError::RateLimited { retry_after_secs: 7, .. }),
        "{err:?}"
    );
}
