use crate::{create_test_engine, mount_html};
use serde_json::json;
use sumi_scribe::{DegradationTier, FieldSchema, FieldValue};
use wiremock::MockServer;

const LISTING: &str = r#"
<html>
<head><title>Product Listing</title></head>
<body>
    <header><h1>Site Header</h1></header>
    <main>
        <h1>Spring Catalogue</h1>
        <ul>
            <li class="item"><a href="/p/1" data-sku="A1">Kettle</a></li>
            <li class="item"><a href="/p/2">Teapot</a></li>
            <li class="item"><a href="/p/3" data-sku="C3">Mug</a></li>
        </ul>
    </main>
</body>
</html>
"#;

#[tokio::test]
async fn test_extract_title_from_main() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/catalogue", LISTING).await;

    let schema = FieldSchema::from_json(json!({
        "fields": [{"name": "title", "selector": "h1", "type": "text", "multiple": false}]
    }))
    .unwrap();

    let engine = create_test_engine(None);
    let url = format!("{}/catalogue", mock_server.uri());
    let envelope = engine.extract_structured(&url, Some(&schema), "main").await;

    assert!(envelope.success);
    assert_eq!(envelope.tier, DegradationTier::Primary);
    assert_eq!(
        serde_json::to_value(&envelope.payload.data).unwrap(),
        json!({"title": "Spring Catalogue"})
    );
}

#[tokio::test]
async fn test_extract_multiple_and_attribute_fields() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/catalogue", LISTING).await;

    let schema = FieldSchema::from_json(json!({
        "name": "Products",
        "baseSelector": "main",
        "fields": [
            {"name": "names", "selector": "li.item a", "type": "text", "multiple": true},
            {"name": "skus", "selector": "li.item a", "type": "attribute", "attribute": "data-sku", "multiple": true},
            {"name": "first_link", "selector": "li.item a", "type": "attribute", "attribute": "href"},
            {"name": "price", "selector": ".price", "type": "text"}
        ]
    }))
    .unwrap();

    let engine = create_test_engine(None);
    let url = format!("{}/catalogue", mock_server.uri());
    let envelope = engine.extract_structured(&url, Some(&schema), "").await;

    let data = &envelope.payload.data;
    assert_eq!(
        data["names"],
        FieldValue::Multiple(vec![
            "Kettle".to_string(),
            "Teapot".to_string(),
            "Mug".to_string()
        ])
    );
    assert_eq!(
        data["skus"],
        FieldValue::Multiple(vec!["A1".to_string(), "C3".to_string()])
    );
    assert_eq!(data["first_link"].as_single(), Some("/p/1"));
    assert_eq!(data["price"].as_single(), Some(""));
    assert_eq!(envelope.payload.selector, "");
}

#[tokio::test]
async fn test_extract_default_record() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/catalogue", LISTING).await;

    let engine = create_test_engine(None);
    let url = format!("{}/catalogue", mock_server.uri());
    let envelope = engine.extract_structured(&url, None, "main").await;

    let data = &envelope.payload.data;
    assert_eq!(data["title"].as_single(), Some("Spring Catalogue"));
    assert!(data["content"].as_single().unwrap().contains("Teapot"));
    assert!(!data["content"].as_single().unwrap().contains("Site Header"));
    assert_eq!(
        data["links"].as_multiple().unwrap()[0],
        format!("{}/p/1", mock_server.uri())
    );
}

#[tokio::test]
async fn test_extract_malformed_scope_is_placeholder() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/catalogue", LISTING).await;

    let schema = FieldSchema::from_json(json!({
        "fields": [{"name": "title", "selector": "h1"}]
    }))
    .unwrap();

    let engine = create_test_engine(None);
    let url = format!("{}/catalogue", mock_server.uri());
    let envelope = engine
        .extract_structured(&url, Some(&schema), "main[")
        .await;

    assert!(envelope.success);
    assert_eq!(envelope.tier, DegradationTier::Placeholder);
    assert!(envelope.error_details.is_some());
    assert!(envelope.payload.data.contains_key("title"));
}
