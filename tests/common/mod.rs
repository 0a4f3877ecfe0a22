#![allow(dead_code)]

use std::path::PathBuf;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use serde_json::Value;
use tower::ServiceExt;

use catalog_backend::{
    build_app,
    config::{AppConfig, AuthConfig},
    features::{
        auth::bearer::issue_access_token,
        catalog::{
            CatalogStorage,
            models::{NewCategory, NewProduct},
            storage::now_rfc3339,
        },
    },
    media::MediaStore,
    state::AppState,
};

pub const PREFIX: &str = "/api/v1";
/// 1x1 PNG
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub struct TestCtx {
    pub app: Router,
    pub state: AppState,
    pub media_root: PathBuf,
}

impl Drop for TestCtx {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-test-secret".to_string(),
        ..AuthConfig::default()
    }
}

pub async fn new_ctx() -> TestCtx {
    new_ctx_with_config(AppConfig::default()).await
}

/// 以给定配置（CORS、前缀等）构建完整应用
pub async fn new_ctx_with_config(config: AppConfig) -> TestCtx {
    let storage = CatalogStorage::connect_in_memory()
        .await
        .expect("in-memory sqlite");
    storage.init_schema().await.expect("init_schema");
    build_ctx(storage, config)
}

fn build_ctx(storage: CatalogStorage, config: AppConfig) -> TestCtx {
    let media_root =
        std::env::temp_dir().join(format!("catalog-media-{}", uuid::Uuid::new_v4().simple()));
    std::fs::create_dir_all(&media_root).expect("create media root");

    let state = AppState::new(
        storage,
        MediaStore::new(&media_root, &config.media.url_prefix),
        test_auth_config(),
    );
    TestCtx {
        app: build_app(state.clone(), &config),
        state,
        media_root,
    }
}

pub fn bearer(subject: &str) -> String {
    let token = issue_access_token(&test_auth_config(), subject, Some(300)).expect("issue token");
    format!("Bearer {token}")
}

impl TestCtx {
    pub async fn seed_category(&self, name: &str, slug: &str) -> i64 {
        self.state
            .storage
            .insert_category(
                &NewCategory {
                    name: name.to_string(),
                    slug: slug.to_string(),
                    thumbnail: String::new(),
                },
                &now_rfc3339(),
            )
            .await
            .expect("insert category")
    }

    pub async fn seed_product(
        &self,
        category_id: i64,
        name: &str,
        slug: &str,
        description: &str,
        created_at: &str,
    ) -> i64 {
        self.state
            .storage
            .insert_product(
                &NewProduct {
                    category_id,
                    name: name.to_string(),
                    slug: slug.to_string(),
                    description: description.to_string(),
                    price_cents: 1999,
                    image: "uploads/p.jpg".to_string(),
                    thumbnail: String::new(),
                },
                created_at,
            )
            .await
            .expect("insert product")
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.state.storage.pool)
            .await
            .expect("count")
    }

    /// 媒体目录下所有文件（递归）
    pub fn media_files(&self) -> Vec<PathBuf> {
        fn walk(dir: &std::path::Path, out: &mut Vec<PathBuf>) {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, out);
                } else {
                    out.push(path);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.media_root, &mut out);
        out
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(req).await.expect("oneshot")
    }

    pub async fn get(&self, path: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .uri(format!("{PREFIX}{path}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, path: &str, body: &Value, auth: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(format!("{PREFIX}{path}"))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

pub async fn json_body(resp: Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
