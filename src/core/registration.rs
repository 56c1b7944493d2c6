use crate::adapters::{ChainApiClient, SimilarityClient};
use crate::core::screening::Screening;
use crate::domain::model::{AssetKind, AssetMetadata, Upload};
use crate::utils::error::Result;
use serde::Serialize;

/// 文件登記結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRegistration {
    pub token_id: String,
    pub ipfs_hash: String,
}

/// 圖片、影片描述資料登記結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetRegistration {
    pub token_id: String,
    pub ipfs_hash: String,
    pub gateway_url: String,
}

#[derive(Debug, Clone)]
pub struct ImageIntake {
    pub screening: Screening,
    pub train_message: String,
}

#[derive(Debug, Clone)]
pub struct VideoIntake {
    pub screening: Screening,
    pub trained: bool,
}

/// Web 端各種登記流程：相似度檢查 → IPFS → 合約
#[derive(Debug, Clone)]
pub struct RegistrationDesk {
    similarity: SimilarityClient,
    chain: ChainApiClient,
}

impl RegistrationDesk {
    pub fn new(similarity: SimilarityClient, chain: ChainApiClient) -> Self {
        Self { similarity, chain }
    }

    pub fn threshold(&self) -> f64 {
        self.similarity.threshold()
    }

    pub fn similarity(&self) -> &SimilarityClient {
        &self.similarity
    }

    pub fn chain(&self) -> &ChainApiClient {
        &self.chain
    }

    pub async fn screen_document(&self, upload: &Upload) -> Result<Screening> {
        let report = self.similarity.check(AssetKind::Pdf, upload, &[]).await?;
        Ok(Screening::new(report, self.threshold()))
    }

    /// 檢查、拒絕過於相似者，再上傳並登記
    pub async fn register_document(
        &self,
        upload: &Upload,
        title: &str,
        author: &str,
        wallet_address: &str,
    ) -> Result<DocumentRegistration> {
        let screening = self.screen_document(upload).await?;
        screening.require_clear(AssetKind::Pdf.label())?;
        self.pin_and_register_document(upload, title, author, wallet_address)
            .await
    }

    /// 已檢查過的文件直接上傳並登記
    pub async fn pin_and_register_document(
        &self,
        upload: &Upload,
        title: &str,
        author: &str,
        wallet_address: &str,
    ) -> Result<DocumentRegistration> {
        let ipfs_hash = self.chain.upload_document(upload, title, author).await?;
        let token_id = self
            .chain
            .register_token(&ipfs_hash, wallet_address, Some("PDF"))
            .await?;
        Ok(DocumentRegistration {
            token_id,
            ipfs_hash,
        })
    }

    /// 圖片一律加入訓練集，分數留給登記步驟判斷
    pub async fn intake_image(&self, upload: &Upload, metadata: &AssetMetadata) -> Result<ImageIntake> {
        let fields = metadata.form_fields();
        let report = self.similarity.check(AssetKind::Image, upload, &fields).await?;
        let train_message = self.similarity.train(AssetKind::Image, upload, &fields).await?;
        Ok(ImageIntake {
            screening: Screening::new(report, self.threshold()),
            train_message,
        })
    }

    /// 影片只在低於門檻時加入訓練集
    pub async fn intake_video(&self, upload: &Upload, metadata: &AssetMetadata) -> Result<VideoIntake> {
        let report = self.similarity.check(AssetKind::Video, upload, &[]).await?;
        let screening = Screening::new(report, self.threshold());

        let trained = if screening.is_clear() {
            self.similarity
                .train(AssetKind::Video, upload, &metadata.form_fields())
                .await?;
            true
        } else {
            tracing::info!(
                "⏭️ Video {} not trained (similarity {:.3})",
                upload.file_name,
                screening.top_score
            );
            false
        };

        Ok(VideoIntake { screening, trained })
    }

    /// 描述資料上 IPFS 後以其 CID 登記
    pub async fn register_asset(&self, kind: AssetKind, metadata: &AssetMetadata) -> Result<AssetRegistration> {
        let receipt = self.chain.register_metadata(kind, metadata).await?;
        let wallet_address = metadata.wallet_address.as_deref().unwrap_or_default();
        let token_id = self
            .chain
            .register_token(&receipt.ipfs_hash, wallet_address, None)
            .await?;
        Ok(AssetRegistration {
            token_id,
            ipfs_hash: receipt.ipfs_hash,
            gateway_url: receipt.gateway_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChainGatewayConfig, SimilarityConfig};
    use crate::utils::error::RegistryError;
    use httpmock::prelude::*;

    fn desk(similarity: &MockServer, chain: &MockServer) -> RegistrationDesk {
        RegistrationDesk::new(
            SimilarityClient::new(SimilarityConfig {
                pdf_endpoint: similarity.base_url(),
                image_endpoint: similarity.base_url(),
                video_endpoint: similarity.base_url(),
                ..SimilarityConfig::default()
            })
            .unwrap(),
            ChainApiClient::new(&ChainGatewayConfig {
                endpoint: chain.base_url(),
                ..ChainGatewayConfig::default()
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_similar_document_is_rejected_before_upload() {
        let similarity = MockServer::start();
        let chain = MockServer::start();
        similarity.mock(|when, then| {
            when.method(POST).path("/check_similarity");
            then.status(200).json_body(serde_json::json!({
                "similar_books": [{"book_id": 1, "title": "Twin", "similarity": 0.6}]
            }));
        });
        let upload_mock = chain.mock(|when, then| {
            when.method(POST).path("/ipfs/upload");
            then.status(200).json_body(serde_json::json!({"hash": "QmX"}));
        });

        let err = desk(&similarity, &chain)
            .register_document(&Upload::new("a.pdf", b"%PDF".to_vec()), "T", "A", "0xabc")
            .await
            .unwrap_err();

        assert!(matches!(err, RegistryError::SimilarityRejected { .. }));
        assert_eq!(upload_mock.hits(), 0);
    }

    #[tokio::test]
    async fn test_clear_document_is_pinned_and_registered() {
        let similarity = MockServer::start();
        let chain = MockServer::start();
        similarity.mock(|when, then| {
            when.method(POST).path("/check_similarity");
            then.status(200)
                .json_body(serde_json::json!({"similar_pdfs": [{"filename": "b.pdf", "similarity": 0.2}]}));
        });
        chain.mock(|when, then| {
            when.method(POST).path("/ipfs/upload");
            then.status(200).json_body(serde_json::json!({"hash": "QmDoc"}));
        });
        chain.mock(|when, then| {
            when.method(POST)
                .path("/blockchain/register")
                .body_contains("\"propertyType\":\"PDF\"");
            then.status(200).json_body(serde_json::json!({"tokenId": "9"}));
        });

        let registration = desk(&similarity, &chain)
            .register_document(&Upload::new("a.pdf", b"%PDF".to_vec()), "T", "A", "0xabc")
            .await
            .unwrap();

        assert_eq!(
            registration,
            DocumentRegistration {
                token_id: "9".to_string(),
                ipfs_hash: "QmDoc".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_similar_video_is_not_trained() {
        let similarity = MockServer::start();
        let chain = MockServer::start();
        similarity.mock(|when, then| {
            when.method(POST).path("/check_video_similarity");
            then.status(200)
                .json_body(serde_json::json!({"similar_videos": [{"filename": "v.mp4", "similarity": 0.91}]}));
        });
        let train = similarity.mock(|when, then| {
            when.method(POST).path("/upload_and_train_video");
            then.status(200).json_body(serde_json::json!({"message": "ok"}));
        });

        let intake = desk(&similarity, &chain)
            .intake_video(&Upload::new("clip.mp4", b"....".to_vec()), &AssetMetadata::default())
            .await
            .unwrap();

        assert!(!intake.trained);
        assert_eq!(train.hits(), 0);
    }
}
