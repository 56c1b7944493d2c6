use crate::adapters::http::{build_client, join_url, UpstreamReply};
use crate::config::RelatedPatentConfig;
use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

/// 相關專利搜尋服務，回應原文轉給瀏覽器
#[derive(Debug, Clone)]
pub struct RelatedPatentClient {
    client: Client,
    config: RelatedPatentConfig,
}

impl RelatedPatentClient {
    pub fn new(config: RelatedPatentConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(60))?,
            config,
        })
    }

    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
        threshold: Option<f64>,
    ) -> Result<serde_json::Value> {
        let url = join_url(&self.config.endpoint, "/search");
        let top_k = top_k.unwrap_or(self.config.top_k).to_string();
        let threshold = threshold
            .unwrap_or(self.config.distance_threshold)
            .to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("top_k", top_k.as_str()),
                ("threshold", threshold.as_str()),
            ])
            .send()
            .await?;
        UpstreamReply::read(response)
            .await?
            .into_success("related-patent")?
            .json()
    }

    pub async fn recently_registered(&self, limit: usize) -> Result<serde_json::Value> {
        let url = join_url(&self.config.endpoint, "/registered");
        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit.to_string())])
            .send()
            .await?;
        UpstreamReply::read(response)
            .await?
            .into_success("related-patent")?
            .json()
    }
}
