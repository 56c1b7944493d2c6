use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// 需要相似度檢查的檔案類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Pdf,
    Image,
    Video,
}

impl AssetKind {
    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Pdf => "PDF",
            AssetKind::Image => "Image",
            AssetKind::Video => "Video",
        }
    }

    /// multipart 表單中檔案欄位名稱
    pub fn form_field(&self) -> &'static str {
        match self {
            AssetKind::Pdf => "pdf",
            AssetKind::Image => "image",
            AssetKind::Video => "video",
        }
    }

    pub fn check_path(&self) -> &'static str {
        match self {
            AssetKind::Pdf => "/check_similarity",
            AssetKind::Image => "/check_image_similarity",
            AssetKind::Video => "/check_video_similarity",
        }
    }

    pub fn train_path(&self) -> &'static str {
        match self {
            AssetKind::Pdf => "/upload_and_train",
            AssetKind::Image => "/upload_and_train_image",
            AssetKind::Video => "/upload_and_train_video",
        }
    }

    pub fn default_content_type(&self) -> &'static str {
        match self {
            AssetKind::Pdf => "application/pdf",
            AssetKind::Image => "image/jpeg",
            AssetKind::Video => "video/mp4",
        }
    }
}

/// 使用者上傳的檔案，整個請求期間保存在記憶體
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 相似度服務回傳的單筆比對結果，未知欄位保留在 `extra`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub similarity: f64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SimilarMatch {
    /// 顯示用名稱
    pub fn label(&self) -> String {
        if let Some(name) = self.filename.as_ref().or(self.title.as_ref()) {
            return name.clone();
        }
        ["patent_id", "book_id"]
            .iter()
            .find_map(|key| self.extra.get(*key))
            .map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// 各相似度服務的回應格式只差在陣列的 key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    #[serde(
        default,
        alias = "similar_pdfs",
        alias = "similar_books",
        alias = "similar_images",
        alias = "similar_videos",
        alias = "similar_patents"
    )]
    pub matches: Vec<SimilarMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SimilarityReport {
    pub fn top_score(&self) -> f64 {
        self.matches
            .iter()
            .map(|m| m.similarity)
            .fold(0.0, f64::max)
    }
}

/// 圖片、影片的描述資料；同時是 chain gateway `/ipfs/register*` 的請求本體
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published_source: Option<String>,
    #[serde(default)]
    pub date_of_creation: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

impl AssetMetadata {
    /// 必填欄位：filename、title、creator、wallet_address
    pub fn missing_required(&self) -> bool {
        [
            &self.filename,
            &self.title,
            &self.creator,
            &self.wallet_address,
        ]
        .iter()
        .any(|field| field.as_deref().map(str::trim).unwrap_or("").is_empty())
    }

    /// 轉成相似度服務的 multipart 文字欄位
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        let pairs: [(&'static str, &Option<String>); 7] = [
            ("title", &self.title),
            ("category", &self.category),
            ("creator", &self.creator),
            ("description", &self.description),
            ("published_source", &self.published_source),
            ("date_of_creation", &self.date_of_creation),
            ("wallet_address", &self.wallet_address),
        ];
        for (name, value) in pairs {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                fields.push((name, value.to_string()));
            }
        }
        fields
    }
}

/// `/ipfs/upload` 回應
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPin {
    pub hash: String,
}

/// `/ipfs/registerImage`、`/ipfs/registerVideo` 回應
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinReceipt {
    #[serde(default)]
    pub message: String,
    pub ipfs_hash: String,
    #[serde(default)]
    pub ipfs_url: String,
    #[serde(default)]
    pub gateway_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub ipfs_hash: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub token_id: String,
}

/// 錢包擁有的代幣
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub token_id: String,
    pub ipfs_hash: String,
    pub owner: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub token_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub success: bool,
    pub tx_hash: String,
}

/// `PropertyTransferred` 事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub from: String,
    pub to: String,
    pub token_id: String,
    pub timestamp: String,
    pub tx_hash: String,
}

/// 合約 `getPropertyDetails` 的結果
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDetails {
    pub ipfs_hash: String,
    pub owner: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatentQuery {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub claims: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatentTrainRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub patent_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub claims: String,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accepts_every_service_key() {
        let pdf: SimilarityReport = serde_json::from_str(
            r#"{"similar_pdfs":[{"filename":"a.pdf","similarity":0.42}]}"#,
        )
        .unwrap();
        assert_eq!(pdf.matches.len(), 1);

        let books: SimilarityReport = serde_json::from_str(
            r#"{"similar_books":[{"book_id":7,"title":"Moby Dick","author":"Melville","similarity":0.8,"year":"1851"}]}"#,
        )
        .unwrap();
        assert_eq!(books.matches[0].label(), "Moby Dick");
        assert_eq!(books.matches[0].extra["year"], "1851");

        let patents: SimilarityReport = serde_json::from_str(
            r#"{"similar_patents":[{"patent_id":"US-1","similarity":0.3}]}"#,
        )
        .unwrap();
        assert_eq!(patents.matches[0].label(), "US-1");
    }

    #[test]
    fn test_empty_report_scores_zero() {
        let report: SimilarityReport = serde_json::from_str(
            r#"{"similar_images":[],"message":"No embeddings available."}"#,
        )
        .unwrap();
        assert_eq!(report.top_score(), 0.0);
        assert_eq!(report.message.as_deref(), Some("No embeddings available."));
    }

    #[test]
    fn test_top_score_uses_best_match() {
        let report: SimilarityReport = serde_json::from_str(
            r#"{"similar_videos":[{"filename":"a.mp4","similarity":0.3},{"filename":"b.mp4","similarity":0.7}]}"#,
        )
        .unwrap();
        assert_eq!(report.top_score(), 0.7);
    }

    #[test]
    fn test_metadata_required_fields() {
        let mut metadata = AssetMetadata {
            filename: Some("cat.jpg".to_string()),
            title: Some("Cat".to_string()),
            creator: Some("Ann".to_string()),
            wallet_address: Some("0x87dc98819FAe36Ec910852D901f3eb4EBE8b024a".to_string()),
            ..Default::default()
        };
        assert!(!metadata.missing_required());

        metadata.title = Some("   ".to_string());
        assert!(metadata.missing_required());
    }

    #[test]
    fn test_metadata_form_fields_skip_empty_optionals() {
        let metadata = AssetMetadata {
            title: Some("Cat".to_string()),
            category: Some("Photo".to_string()),
            creator: Some("Ann".to_string()),
            description: Some(String::new()),
            wallet_address: Some("0xabc".to_string()),
            ..Default::default()
        };
        let names: Vec<&str> = metadata.form_fields().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["title", "category", "creator", "wallet_address"]);
    }

    #[test]
    fn test_transfer_request_accepts_numeric_token_id() {
        let request: TransferRequest =
            serde_json::from_str(r#"{"from":"0x1","to":"0x2","tokenId":5}"#).unwrap();
        assert_eq!(request.token_id.as_deref(), Some("5"));
    }

    #[test]
    fn test_patent_query_uses_abstract_key() {
        let query = PatentQuery {
            title: "Widget".to_string(),
            abstract_text: "A widget".to_string(),
            claims: "1. A widget.".to_string(),
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["abstract"], "A widget");
    }
}
