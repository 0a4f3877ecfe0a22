use std::{path::Path, str::FromStr, time::Duration};

use sqlx::{
    ConnectOptions, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};

use crate::error::AppError;
use crate::features::reviews::models::{NewReview, ReviewRow};

use super::models::{CategoryRow, NewCategory, NewProduct, ProductRow};

const PRODUCT_SELECT: &str = "SELECT p.id, p.category_id, c.slug AS category_slug, p.name, p.slug, p.description, p.price_cents, p.image, p.thumbnail, p.created_at
     FROM products p JOIN categories c ON c.id = p.category_id";

const CATEGORY_SELECT: &str = "SELECT id, name, slug, thumbnail, created_at FROM categories";

/// 商品目录存储（分类 / 商品 / 评论）
#[derive(Clone)]
pub struct CatalogStorage {
    pub pool: SqlitePool,
}

impl CatalogStorage {
    pub async fn connect_sqlite(path: &str, wal: bool) -> Result<Self, AppError> {
        if let Some(dir) = Path::new(path).parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| AppError::Internal(format!("create db dir: {e}")))?;
        }

        let journal = if wal {
            SqliteJournalMode::Wal
        } else {
            SqliteJournalMode::Delete
        };
        let opt = SqliteConnectOptions::new()
            .filename(Path::new(path))
            .create_if_missing(true)
            .journal_mode(journal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .disable_statement_logging();
        let pool = SqlitePool::connect_with(opt)
            .await
            .map_err(|e| AppError::Internal(format!("sqlite connect: {e}")))?;
        Ok(Self { pool })
    }

    /// 单连接内存库（连接不回收，否则库随连接消失）
    pub async fn connect_in_memory() -> Result<Self, AppError> {
        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::Internal(format!("sqlite options: {e}")))?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(opt)
            .await
            .map_err(|e| AppError::Internal(format!("sqlite connect: {e}")))?;
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<(), AppError> {
        // slug 不设唯一约束：同名 slug 并发创建会产生两条记录，详情查询取 id 最小者
        let ddl = r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            thumbnail TEXT,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_categories_slug ON categories(slug);
        CREATE INDEX IF NOT EXISTS idx_categories_name ON categories(name, id);

        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            slug TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            price_cents INTEGER NOT NULL,
            image TEXT NOT NULL DEFAULT '',
            thumbnail TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_products_category_slug ON products(category_id, slug);
        CREATE INDEX IF NOT EXISTS idx_products_created ON products(created_at DESC, id DESC);

        CREATE TABLE IF NOT EXISTS product_reviews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            user_sub TEXT NOT NULL,
            rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_reviews_product ON product_reviews(product_id, id);
        "#;
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("init schema: {e}")))?;
        Ok(())
    }

    // ---------------------------------------------------------------- 查询

    /// 全部商品，最新在前
    pub async fn list_latest_products(&self) -> Result<Vec<ProductRow>, AppError> {
        let sql = format!("{PRODUCT_SELECT} ORDER BY p.created_at DESC, p.id DESC");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// 按名称排序的前 `limit` 个分类（同名按 id）
    pub async fn top_categories(&self, limit: i64) -> Result<Vec<CategoryRow>, AppError> {
        let sql = format!("{CATEGORY_SELECT} ORDER BY name ASC, id ASC LIMIT ?");
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn product_by_slugs(
        &self,
        category_slug: &str,
        product_slug: &str,
    ) -> Result<Option<ProductRow>, AppError> {
        let sql = format!("{PRODUCT_SELECT} WHERE c.slug = ? AND p.slug = ? ORDER BY p.id ASC LIMIT 1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(category_slug)
            .bind(product_slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn category_by_slug(&self, category_slug: &str) -> Result<Option<CategoryRow>, AppError> {
        let sql = format!("{CATEGORY_SELECT} WHERE slug = ? ORDER BY id ASC LIMIT 1");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(category_slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn category_exists(&self, id: i64) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// 名称或描述包含 `query` 的商品（大小写不敏感）。
    ///
    /// SQLite 的 LIKE/lower() 只折叠 ASCII，这里取全表后在内存中按 Unicode 折叠过滤。
    /// 每次搜索都会扫描整张 products 表；商品量级增长后需换成 FTS5 索引（见 DESIGN.md 搜索一节）。
    pub async fn search_products(&self, query: &str) -> Result<Vec<ProductRow>, AppError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        let sql = format!("{PRODUCT_SELECT} ORDER BY p.id ASC");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().filter(|p| p.matches_query(&needle)).collect())
    }

    pub async fn reviews_for(
        &self,
        category_slug: &str,
        product_slug: &str,
    ) -> Result<Vec<ReviewRow>, AppError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT r.id, r.product_id, r.user_sub, r.rating, r.content, r.created_at
             FROM product_reviews r
             JOIN products p ON p.id = r.product_id
             JOIN categories c ON c.id = p.category_id
             WHERE c.slug = ? AND p.slug = ?
             ORDER BY r.id ASC",
        )
        .bind(category_slug)
        .bind(product_slug)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ---------------------------------------------------------------- 写入

    pub async fn insert_review(
        &self,
        product_id: i64,
        user_sub: &str,
        review: &NewReview,
        now_rfc3339: &str,
    ) -> Result<ReviewRow, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "INSERT INTO product_reviews(product_id, user_sub, rating, content, created_at)
             VALUES(?,?,?,?,?)
             RETURNING id, product_id, user_sub, rating, content, created_at",
        )
        .bind(product_id)
        .bind(user_sub)
        .bind(review.rating)
        .bind(&review.content)
        .bind(now_rfc3339)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_product(
        &self,
        product: &NewProduct,
        now_rfc3339: &str,
    ) -> Result<i64, sqlx::Error> {
        let res = sqlx::query(
            "INSERT INTO products(category_id, name, slug, description, price_cents, image, thumbnail, created_at)
             VALUES(?,?,?,?,?,?,?,?)",
        )
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.image)
        .bind(&product.thumbnail)
        .bind(now_rfc3339)
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn insert_category(
        &self,
        category: &NewCategory,
        now_rfc3339: &str,
    ) -> Result<i64, sqlx::Error> {
        let res = sqlx::query(
            "INSERT INTO categories(name, slug, thumbnail, created_at) VALUES(?,?,?,?)",
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.thumbnail)
        .bind(now_rfc3339)
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }
}

/// 统一的时间戳格式（毫秒精度，UTC，字典序即时间序）
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
