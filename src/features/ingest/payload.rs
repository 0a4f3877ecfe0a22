use serde_json::{Map, Value};

use crate::error::IngestError;

/// 商品创建请求体（仅用于 OpenAPI 文档）
#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
#[schema(example = json!({
  "name": "Winter Jacket",
  "slug": "winter-jacket",
  "description": "Warm and waterproof.",
  "price": "129.90",
  "image": "uploads/jacket.jpg",
  "thumbnail": "data:image/png;base64,iVBORw0KGgo=",
  "category_id": 1
}))]
pub struct ProductIngestRequest {
    pub name: String,
    pub slug: String,
    pub description: String,
    /// 数字或十进制字符串，最多两位小数，不可为负
    #[schema(value_type = String)]
    pub price: Value,
    /// 已存在的图片引用，可为空串
    pub image: String,
    /// `<meta>,<base64>` 形式的 data-URI
    pub thumbnail: String,
    pub category_id: i64,
}

/// 分类创建请求体（仅用于 OpenAPI 文档）
#[derive(Debug, serde::Deserialize, utoipa::ToSchema)]
#[schema(example = json!({
  "name": "Winter",
  "slug": "winter",
  "thumbnail": "data:image/png;base64,iVBORw0KGgo="
}))]
pub struct CategoryIngestRequest {
    pub name: String,
    pub slug: String,
    pub thumbnail: String,
}

/// 通过字段校验的商品载荷（缩略图尚未解码）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPayload {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price_cents: i64,
    pub image: String,
    pub thumbnail: String,
    pub category_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPayload {
    pub name: String,
    pub slug: String,
    pub thumbnail: String,
}

impl ProductPayload {
    pub fn parse(payload: &Value) -> Result<Self, IngestError> {
        let obj = as_object(payload)?;
        Ok(Self {
            name: non_empty_str(obj, "name")?,
            slug: non_empty_str(obj, "slug")?,
            description: required_str(obj, "description")?,
            price_cents: parse_price(required(obj, "price")?)?,
            image: required_str(obj, "image")?.trim().to_string(),
            thumbnail: non_empty_str(obj, "thumbnail")?,
            category_id: parse_id(required(obj, "category_id")?, "category_id")?,
        })
    }
}

impl CategoryPayload {
    pub fn parse(payload: &Value) -> Result<Self, IngestError> {
        let obj = as_object(payload)?;
        Ok(Self {
            name: non_empty_str(obj, "name")?,
            slug: non_empty_str(obj, "slug")?,
            thumbnail: non_empty_str(obj, "thumbnail")?,
        })
    }
}

/// 请求体中出现的字段名（用于日志，不记录字段值）
pub fn field_names(payload: &Value) -> Vec<&str> {
    payload
        .as_object()
        .map(|obj| obj.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, IngestError> {
    payload
        .as_object()
        .ok_or_else(|| IngestError::Body("expected a JSON object".into()))
}

fn required<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, IngestError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(IngestError::MissingField(field)),
        Some(v) => Ok(v),
    }
}

fn required_str(obj: &Map<String, Value>, field: &'static str) -> Result<String, IngestError> {
    match required(obj, field)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(IngestError::InvalidField {
            field,
            reason: format!("expected a string, got {}", json_type(other)),
        }),
    }
}

fn non_empty_str(obj: &Map<String, Value>, field: &'static str) -> Result<String, IngestError> {
    let s = required_str(obj, field)?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(IngestError::InvalidField {
            field,
            reason: "must not be empty".into(),
        });
    }
    Ok(trimmed.to_string())
}

fn parse_id(value: &Value, field: &'static str) -> Result<i64, IngestError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.filter(|id| *id > 0).ok_or_else(|| IngestError::InvalidField {
        field,
        reason: "expected a positive integer".into(),
    })
}

/// 价格 → 分。接受数字或十进制字符串，最多两位小数，不可为负。
pub fn parse_price(value: &Value) -> Result<i64, IngestError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(IngestError::InvalidField {
                field: "price",
                reason: format!("expected a number or decimal string, got {}", json_type(other)),
            });
        }
    };
    decimal_to_cents(&text).map_err(|reason| IngestError::InvalidField {
        field: "price",
        reason: reason.into(),
    })
}

fn decimal_to_cents(text: &str) -> Result<i64, &'static str> {
    if text.starts_with('-') {
        return Err("must not be negative");
    }
    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err("not a valid decimal number");
    }
    if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err("at most two decimal places are allowed");
    }
    let whole: i64 = whole.parse().map_err(|_| "value is too large")?;
    let frac_cents = match frac.len() {
        0 => 0,
        1 => i64::from(frac.as_bytes()[0] - b'0') * 10,
        _ => frac.parse::<i64>().map_err(|_| "not a valid decimal number")?,
    };
    whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac_cents))
        .ok_or("value is too large")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryPayload, ProductPayload, field_names, parse_price};
    use crate::error::IngestError;
    use serde_json::json;

    fn product_json() -> serde_json::Value {
        json!({
            "name": "Jacket",
            "slug": "jacket",
            "description": "",
            "price": "12.5",
            "image": "",
            "thumbnail": "data:,aGk=",
            "category_id": 3
        })
    }

    #[test]
    fn price_accepts_numbers_and_strings() {
        assert_eq!(parse_price(&json!(12)).unwrap(), 1200);
        assert_eq!(parse_price(&json!(12.5)).unwrap(), 1250);
        assert_eq!(parse_price(&json!("0.05")).unwrap(), 5);
        assert_eq!(parse_price(&json!(" 129.90 ")).unwrap(), 12990);
        assert_eq!(parse_price(&json!("7.")).unwrap(), 700);
    }

    #[test]
    fn price_rejects_bad_values() {
        for bad in [json!("-1"), json!("1.234"), json!("abc"), json!(".5"), json!(true), json!("")] {
            assert!(
                matches!(parse_price(&bad), Err(IngestError::InvalidField { field: "price", .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn product_payload_parses_and_allows_empty_description_and_image() {
        let p = ProductPayload::parse(&product_json()).unwrap();
        assert_eq!(p.price_cents, 1250);
        assert_eq!(p.category_id, 3);
        assert_eq!(p.description, "");
        assert_eq!(p.image, "");
    }

    #[test]
    fn category_id_may_be_numeric_string() {
        let mut v = product_json();
        v["category_id"] = json!("7");
        assert_eq!(ProductPayload::parse(&v).unwrap().category_id, 7);

        v["category_id"] = json!("seven");
        assert!(matches!(
            ProductPayload::parse(&v),
            Err(IngestError::InvalidField { field: "category_id", .. })
        ));
    }

    #[test]
    fn missing_and_mistyped_fields_are_named() {
        let mut v = product_json();
        v.as_object_mut().unwrap().remove("slug");
        assert!(matches!(
            ProductPayload::parse(&v),
            Err(IngestError::MissingField("slug"))
        ));

        assert!(matches!(
            CategoryPayload::parse(&json!({"name": 1, "slug": "s", "thumbnail": "x,y"})),
            Err(IngestError::InvalidField { field: "name", .. })
        ));
        assert!(matches!(
            CategoryPayload::parse(&json!({"name": "  ", "slug": "s", "thumbnail": "x,y"})),
            Err(IngestError::InvalidField { field: "name", .. })
        ));
        assert!(matches!(
            CategoryPayload::parse(&json!("not an object")),
            Err(IngestError::Body(_))
        ));
    }

    #[test]
    fn field_names_lists_keys_only() {
        let v = json!({"name": "x", "thumbnail": "data:,aGk="});
        let mut names = field_names(&v);
        names.sort_unstable();
        assert_eq!(names, vec!["name", "thumbnail"]);
        assert!(field_names(&json!([1])).is_empty());
    }
}
