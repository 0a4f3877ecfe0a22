use base64::Engine;

use crate::error::IngestError;

/// 解码 `<meta>,<base64>` 形式的 data-URI，只取第一个逗号之后的部分。
///
/// 前缀不做校验（`data:image/png;base64` 与任意前缀等价）；数据段中的空白会被忽略。
pub fn decode_data_uri(raw: &str) -> Result<Vec<u8>, IngestError> {
    let (_, data) = raw.split_once(',').ok_or(IngestError::MalformedDataUri)?;
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(IngestError::Decode("image data is empty".into()));
    }
    let bytes = base64::prelude::BASE64_STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| IngestError::Decode(e.to_string()))?;
    if bytes.is_empty() {
        return Err(IngestError::Decode("image data is empty".into()));
    }
    Ok(bytes)
}
