use serde::Serialize;

use crate::media::MediaStore;

/// 分类表行
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub thumbnail: Option<String>,
    pub created_at: String,
}

/// 商品表行（附带所属分类的 slug）
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub category_id: i64,
    pub category_slug: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price_cents: i64,
    pub image: String,
    pub thumbnail: String,
    pub created_at: String,
}

impl ProductRow {
    /// 名称或描述包含查询串（大小写不敏感，按 Unicode 小写折叠）
    pub fn matches_query(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
    }
}

/// 待插入的分类
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub thumbnail: String,
}

/// 待插入的商品
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price_cents: i64,
    pub image: String,
    pub thumbnail: String,
}

/// 以两位小数的十进制字符串表示价格（分 → "12.50"）
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[schema(example = json!({
  "id": 3,
  "name": "Winter Jacket",
  "slug": "winter-jacket",
  "description": "Warm and waterproof.",
  "price": "129.90",
  "image": "/media/uploads/jacket.jpg",
  "thumbnail": "/media/products/thumbnail_0f8c2b5e4f7a4c21a5d0c2e0d1e6b7a9.png",
  "category": 1,
  "absolute_url": "/winter/winter-jacket/",
  "created_at": "2025-01-10T08:00:00.000Z"
}))]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// 价格（两位小数字符串）
    pub price: String,
    /// 主图 URL
    pub image: Option<String>,
    /// 缩略图 URL
    pub thumbnail: Option<String>,
    /// 所属分类 ID
    pub category: i64,
    pub absolute_url: String,
    pub created_at: String,
}

impl ProductResponse {
    pub fn from_row(row: ProductRow, media: &MediaStore) -> Self {
        Self {
            id: row.id,
            absolute_url: format!("/{}/{}/", row.category_slug, row.slug),
            image: media.url_for(&row.image),
            thumbnail: media.url_for(&row.thumbnail),
            price: format_price(row.price_cents),
            name: row.name,
            slug: row.slug,
            description: row.description,
            category: row.category_id,
            created_at: row.created_at,
        }
    }

    pub fn from_rows(rows: Vec<ProductRow>, media: &MediaStore) -> Vec<Self> {
        rows.into_iter().map(|r| Self::from_row(r, media)).collect()
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[schema(example = json!({
  "id": 1,
  "name": "Winter",
  "slug": "winter",
  "thumbnail": "/media/categories/category_5b1f0a7e2c9d4e3f8a6b1c2d3e4f5a6b.png",
  "absolute_url": "/winter/"
}))]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub thumbnail: Option<String>,
    pub absolute_url: String,
}

impl CategoryResponse {
    pub fn from_row(row: CategoryRow, media: &MediaStore) -> Self {
        Self {
            id: row.id,
            absolute_url: format!("/{}/", row.slug),
            thumbnail: row.thumbnail.as_deref().and_then(|t| media.url_for(t)),
            name: row.name,
            slug: row.slug,
        }
    }
}

/// 搜索请求体；`query` 缺省或为 null 时视为空串
#[derive(Debug, Default, serde::Deserialize, utoipa::ToSchema)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

impl SearchRequest {
    /// 解析原始请求体；空请求体等同于 `{}`
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }

    pub fn query(&self) -> &str {
        self.query.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SearchResponse {
    pub products: Vec<ProductResponse>,
}

#[cfg(test)]
mod tests {
    use super::{ProductRow, SearchRequest, format_price};

    fn row(name: &str, description: &str) -> ProductRow {
        ProductRow {
            id: 1,
            category_id: 1,
            category_slug: "c".into(),
            name: name.into(),
            slug: "p".into(),
            description: description.into(),
            price_cents: 0,
            image: String::new(),
            thumbnail: String::new(),
            created_at: String::new(),
        }
    }

    #[test]
    fn format_price_pads_fraction() {
        assert_eq!(format_price(0), "0.00");
        assert_eq!(format_price(5), "0.05");
        assert_eq!(format_price(12950), "129.50");
    }

    #[test]
    fn matches_query_checks_name_or_description_case_insensitively() {
        let p = row("Winter Jacket", "Warm and WATERPROOF");
        assert!(p.matches_query("jacket"));
        assert!(p.matches_query("waterproof"));
        assert!(!p.matches_query("boots"));

        let cyrillic = row("Хүрэм", "Өвлийн ДУЛААН хүрэм");
        assert!(cyrillic.matches_query("дулаан"));
    }

    #[test]
    fn search_request_treats_absent_null_and_empty_body_alike() {
        let bodies: [&[u8]; 4] = [b"", b"  ", b"{}", br#"{"query": null}"#];
        for body in bodies {
            let req = SearchRequest::from_body(body).expect("parse");
            assert_eq!(req.query(), "");
        }
        let req = SearchRequest::from_body(br#"{"query": "hat"}"#).unwrap();
        assert_eq!(req.query(), "hat");
        assert!(SearchRequest::from_body(b"{broken").is_err());
        assert!(SearchRequest::from_body(br#"{"query": 5}"#).is_err());
    }
}
