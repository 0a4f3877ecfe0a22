mod common;

use axum::http::{StatusCode, header};
use serde_json::json;

use common::{json_body, new_ctx};

#[tokio::test]
async fn latest_products_returns_every_product_newest_first() {
    let ctx = new_ctx().await;
    let winter = ctx.seed_category("Winter", "winter").await;
    let summer = ctx.seed_category("Summer", "summer").await;
    ctx.seed_product(winter, "Jacket", "jacket", "Warm", "2025-01-01T00:00:00.000Z")
        .await;
    ctx.seed_product(summer, "Shorts", "shorts", "Light", "2025-03-01T00:00:00.000Z")
        .await;
    ctx.seed_product(winter, "Scarf", "scarf", "Wool", "2025-02-01T00:00:00.000Z")
        .await;

    let resp = ctx.get("/products").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let slugs: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["shorts", "scarf", "jacket"]);

    let shorts = &body[0];
    assert_eq!(shorts["price"], "19.99");
    assert_eq!(shorts["category"], summer);
    assert_eq!(shorts["absolute_url"], "/summer/shorts/");
    assert_eq!(shorts["image"], "/media/uploads/p.jpg");
    assert!(shorts["thumbnail"].is_null());
}

#[tokio::test]
async fn latest_products_is_empty_list_on_empty_store() {
    let ctx = new_ctx().await;
    let resp = ctx.get("/products").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!([]));
}

#[tokio::test]
async fn top_categories_caps_at_eight_ordered_by_name() {
    let ctx = new_ctx().await;
    for name in ["Kappa", "Alpha", "Juliet", "Bravo", "India", "Charlie", "Hotel", "Delta", "Golf", "Echo"] {
        ctx.seed_category(name, &name.to_lowercase()).await;
    }

    let body = json_body(ctx.get("/categories").await).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Alpha", "Bravo", "Charlie", "Delta", "Echo", "Golf", "Hotel", "India"]
    );
    assert_eq!(body[0]["absolute_url"], "/alpha/");
}

#[tokio::test]
async fn product_detail_matches_both_slugs() {
    let ctx = new_ctx().await;
    let winter = ctx.seed_category("Winter", "winter").await;
    let summer = ctx.seed_category("Summer", "summer").await;
    ctx.seed_product(winter, "Winter Hat", "hat", "", "2025-01-01T00:00:00.000Z")
        .await;
    let summer_hat = ctx
        .seed_product(summer, "Sun Hat", "hat", "", "2025-01-02T00:00:00.000Z")
        .await;

    let resp = ctx.get("/products/summer/hat").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["id"], summer_hat);
    assert_eq!(body["name"], "Sun Hat");
}

#[tokio::test]
async fn product_detail_duplicate_slugs_resolve_to_lowest_id() {
    let ctx = new_ctx().await;
    let cat = ctx.seed_category("Winter", "winter").await;
    let first = ctx
        .seed_product(cat, "First", "dup", "", "2025-01-01T00:00:00.000Z")
        .await;
    ctx.seed_product(cat, "Second", "dup", "", "2025-01-02T00:00:00.000Z")
        .await;

    let body = json_body(ctx.get("/products/winter/dup").await).await;
    assert_eq!(body["id"], first);
}

#[tokio::test]
async fn product_detail_not_found_echoes_slugs() {
    let ctx = new_ctx().await;
    let cat = ctx.seed_category("Winter", "winter").await;
    ctx.seed_product(cat, "Jacket", "jacket", "", "2025-01-01T00:00:00.000Z")
        .await;

    // 商品存在，但分类 slug 不匹配
    let resp = ctx.get("/products/summer/jacket").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    let body = json_body(resp).await;
    assert_eq!(body["code"], "PRODUCT_NOT_FOUND");
    assert_eq!(body["category_slug"], "summer");
    assert_eq!(body["product_slug"], "jacket");
}

#[tokio::test]
async fn category_detail_found_and_not_found() {
    let ctx = new_ctx().await;
    let id = ctx.seed_category("Winter", "winter").await;

    let body = json_body(ctx.get("/categories/winter").await).await;
    assert_eq!(body["id"], id);
    assert_eq!(body["slug"], "winter");
    assert!(body["thumbnail"].is_null());

    let resp = ctx.get("/categories/autumn").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = json_body(resp).await;
    assert_eq!(body["code"], "CATEGORY_NOT_FOUND");
    assert_eq!(body["category_slug"], "autumn");
    assert!(body.get("product_slug").is_none());
}

#[tokio::test]
async fn search_matches_name_or_description_case_insensitively() {
    let ctx = new_ctx().await;
    let cat = ctx.seed_category("Clothes", "clothes").await;
    ctx.seed_product(cat, "Rain JACKET", "rain-jacket", "Waterproof", "2025-01-01T00:00:00.000Z")
        .await;
    ctx.seed_product(cat, "Boots", "boots", "Pairs well with a jacket", "2025-01-02T00:00:00.000Z")
        .await;
    ctx.seed_product(cat, "Socks", "socks", "Cotton", "2025-01-03T00:00:00.000Z")
        .await;

    let resp = ctx.post_json("/search", &json!({"query": "Jacket"}), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let mut slugs: Vec<&str> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    slugs.sort_unstable();
    assert_eq!(slugs, vec!["boots", "rain-jacket"]);
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
    let ctx = new_ctx().await;
    let cat = ctx.seed_category("Clothes", "clothes").await;
    ctx.seed_product(cat, "ДУЛААН хүрэм", "khurem", "", "2025-01-01T00:00:00.000Z")
        .await;

    let body = json_body(ctx.post_json("/search", &json!({"query": "дулаан"}), None).await).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_or_missing_query_returns_empty_products() {
    let ctx = new_ctx().await;
    let cat = ctx.seed_category("Clothes", "clothes").await;
    ctx.seed_product(cat, "Jacket", "jacket", "", "2025-01-01T00:00:00.000Z")
        .await;

    for body in [json!({"query": ""}), json!({}), json!({"query": null})] {
        let resp = ctx.post_json("/search", &body, None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, json!({"products": []}));
    }

    // 无请求体、无 Content-Type
    let resp = ctx
        .send(
            axum::http::Request::builder()
                .method("POST")
                .uri(format!("{}/search", common::PREFIX))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({"products": []}));
}

#[tokio::test]
async fn search_with_malformed_body_is_bad_request() {
    let ctx = new_ctx().await;
    let resp = ctx
        .send(
            axum::http::Request::builder()
                .method("POST")
                .uri(format!("{}/search", common::PREFIX))
                .header(header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["code"], "BAD_REQUEST");
}
