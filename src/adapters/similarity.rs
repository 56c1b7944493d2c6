use crate::adapters::http::{build_client, file_part, join_url, UpstreamReply};
use crate::config::SimilarityConfig;
use crate::domain::model::{
    AssetKind, PatentQuery, PatentTrainRequest, SimilarityReport, Upload,
};
use crate::utils::error::Result;
use reqwest::{multipart, Client};
use std::time::Duration;

/// PDF、圖片、影片、專利四個相似度服務的客戶端
#[derive(Debug, Clone)]
pub struct SimilarityClient {
    client: Client,
    video_client: Client,
    config: SimilarityConfig,
}

impl SimilarityClient {
    pub fn new(config: SimilarityConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(config.timeout_seconds))?,
            // 影片抽幀很慢
            video_client: build_client(Duration::from_secs(config.video_timeout_seconds))?,
            config,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    fn endpoint(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Pdf => &self.config.pdf_endpoint,
            AssetKind::Image => &self.config.image_endpoint,
            AssetKind::Video => &self.config.video_endpoint,
        }
    }

    fn client_for(&self, kind: AssetKind) -> &Client {
        match kind {
            AssetKind::Video => &self.video_client,
            _ => &self.client,
        }
    }

    fn service_name(kind: AssetKind) -> String {
        format!("{}-similarity", kind.form_field())
    }

    async fn post_upload(
        &self,
        kind: AssetKind,
        path: &str,
        upload: &Upload,
        fields: &[(&'static str, String)],
    ) -> Result<UpstreamReply> {
        let url = join_url(self.endpoint(kind), path);
        let mut form = multipart::Form::new();
        for (name, value) in fields {
            form = form.text(*name, value.clone());
        }
        form = form.part(kind.form_field(), file_part(upload, kind.default_content_type())?);

        tracing::debug!(
            "📤 POST {} ({} bytes, {} fields)",
            url,
            upload.bytes.len(),
            fields.len()
        );
        let response = self.client_for(kind).post(&url).multipart(form).send().await?;
        let reply = UpstreamReply::read(response).await?;
        tracing::debug!("📥 {} answered {}", url, reply.status);
        Ok(reply)
    }

    /// 只帶檔案的相似度檢查，回傳上游原文
    pub async fn relay_check(&self, kind: AssetKind, upload: &Upload) -> Result<UpstreamReply> {
        self.post_upload(kind, kind.check_path(), upload, &[]).await
    }

    /// 只帶檔案的訓練，回傳上游原文
    pub async fn relay_train(&self, kind: AssetKind, upload: &Upload) -> Result<UpstreamReply> {
        self.post_upload(kind, kind.train_path(), upload, &[]).await
    }

    pub async fn check(
        &self,
        kind: AssetKind,
        upload: &Upload,
        fields: &[(&'static str, String)],
    ) -> Result<SimilarityReport> {
        let reply = self
            .post_upload(kind, kind.check_path(), upload, fields)
            .await?
            .into_success(&Self::service_name(kind))?;
        let report: SimilarityReport = reply.json()?;
        tracing::info!(
            "🔍 {} similarity check for {}: {} matches, top {:.3}",
            kind.label(),
            upload.file_name,
            report.matches.len(),
            report.top_score()
        );
        Ok(report)
    }

    /// 加入訓練集；回傳上游訊息原文
    pub async fn train(
        &self,
        kind: AssetKind,
        upload: &Upload,
        fields: &[(&'static str, String)],
    ) -> Result<String> {
        let reply = self
            .post_upload(kind, kind.train_path(), upload, fields)
            .await?
            .into_success(&Self::service_name(kind))?;
        tracing::info!("🧠 {} trained with {}", kind.label(), upload.file_name);
        Ok(reply.body)
    }

    pub async fn relay_patent_check(&self, query: &PatentQuery) -> Result<UpstreamReply> {
        let url = join_url(&self.config.patent_endpoint, "/check_patent_similarity");
        let response = self.client.post(&url).json(query).send().await?;
        UpstreamReply::read(response).await
    }

    pub async fn relay_patent_train(&self, request: &PatentTrainRequest) -> Result<UpstreamReply> {
        let url = join_url(&self.config.patent_endpoint, "/train_patent");
        let response = self.client.post(&url).json(request).send().await?;
        UpstreamReply::read(response).await
    }

    pub async fn check_patent(&self, query: &PatentQuery) -> Result<SimilarityReport> {
        self.relay_patent_check(query)
            .await?
            .into_success("patent-similarity")?
            .json()
    }

    /// 圖片服務中所有已訓練圖片的描述資料 (原文 JSON)
    pub async fn image_catalog(&self) -> Result<serde_json::Value> {
        let url = join_url(&self.config.image_endpoint, "/get_all_metadata");
        let response = self.client.get(&url).send().await?;
        UpstreamReply::read(response)
            .await?
            .into_success("image-similarity")?
            .json()
    }
}
