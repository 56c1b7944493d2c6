use crate::adapters::{ChainApiClient, MoralisClient, RelatedPatentClient, SimilarityClient};
use crate::config::{AppConfig, WebConfig};
use crate::core::RegistrationDesk;
use crate::utils::error::{RegistryError, Result};
use crate::web::error::WebError;
use crate::web::session::{Session, SessionStore};
use crate::web::views::Views;
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use uuid::Uuid;

/// 所有頁面處理共用的狀態
pub struct WebState {
    pub config: WebConfig,
    pub desk: RegistrationDesk,
    pub moralis: MoralisClient,
    pub related: RelatedPatentClient,
    pub sessions: SessionStore,
    pub views: Views,
}

pub type SharedState = Arc<WebState>;

/// 已識別錢包的訪客與其 session 快照
pub struct Visitor {
    pub jar: CookieJar,
    /// 備用錢包訪客在第一次寫入前沒有 session
    pub id: Option<Uuid>,
    pub session: Session,
    pub wallet: String,
}

impl WebState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let desk = RegistrationDesk::new(
            SimilarityClient::new(config.similarity.clone())?,
            ChainApiClient::new(&config.chain_gateway)?,
        );
        let views = Views::new().map_err(|e| RegistryError::ConfigError {
            message: format!("Failed to load page templates: {}", e),
        })?;

        Ok(Self {
            config: config.web.clone(),
            desk,
            moralis: MoralisClient::new(config.moralis.clone())?,
            related: RelatedPatentClient::new(config.related_patent.clone())?,
            sessions: SessionStore::new(config.web.session_days),
            views,
        })
    }

    /// 目前登入的錢包；未登入時使用設定中的備用錢包，兩者皆無則導向登入頁
    pub async fn visitor(&self, jar: CookieJar) -> std::result::Result<Visitor, WebError> {
        if let Some((id, session)) = self.sessions.load(&jar).await {
            let wallet = session
                .wallet_address
                .clone()
                .or_else(|| self.config.fallback_wallet.clone())
                .ok_or(WebError::LoginRequired)?;
            return Ok(Visitor {
                jar,
                id: Some(id),
                session,
                wallet,
            });
        }

        let wallet = self
            .config
            .fallback_wallet
            .clone()
            .ok_or(WebError::LoginRequired)?;
        tracing::debug!("Anonymous visitor uses fallback wallet {}", wallet);
        Ok(Visitor {
            jar,
            id: None,
            session: Session::new(None, self.sessions.lifetime()),
            wallet,
        })
    }

    /// 寫入 session 欄位；備用錢包訪客此時才建立 session 並發 cookie
    pub async fn remember<F>(&self, visitor: &mut Visitor, apply: F)
    where
        F: FnOnce(&mut Session),
    {
        match visitor.id {
            Some(id) => {
                if self.sessions.update(id, apply).await.is_none() {
                    tracing::debug!("Session {} ended before it could be updated", id);
                }
            }
            None => {
                let (id, _) = self.sessions.start_with(None, apply).await;
                visitor.jar = visitor.jar.clone().add(self.sessions.cookie(id));
                visitor.id = Some(id);
            }
        }
    }

    /// 在寫鎖內取出並清空某個欄位
    pub async fn take<F, R>(&self, visitor: &Visitor, take: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> Option<R>,
    {
        let id = visitor.id?;
        self.sessions.update(id, take).await.flatten()
    }
}
