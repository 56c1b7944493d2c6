use crate::config::MAX_SESSION_DAYS;
use crate::core::Screening;
use crate::domain::model::{AssetMetadata, SimilarMatch, Upload};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "ipreg_session";

/// 已檢查的文件在 session 中最多保留的時間
pub const PENDING_DOCUMENT_MINUTES: i64 = 30;

/// 相似度檢查後等待登記的文件
#[derive(Debug, Clone)]
pub struct PendingDocument {
    pub upload: Upload,
    pub title: String,
    pub author: String,
    pub language: String,
    pub top_score: f64,
    pub checked_at: DateTime<Utc>,
}

impl PendingDocument {
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.checked_at >= Duration::minutes(PENDING_DOCUMENT_MINUTES)
    }
}

/// 已檢查並訓練、等待登記的圖片或影片
#[derive(Debug, Clone, Serialize)]
pub struct PendingAsset {
    pub metadata: AssetMetadata,
    pub matches: Vec<SimilarMatch>,
    pub top_score: f64,
    pub cleared: bool,
    pub note: Option<String>,
}

impl PendingAsset {
    pub fn new(metadata: AssetMetadata, screening: Screening, note: Option<String>) -> Self {
        Self {
            metadata,
            cleared: screening.is_clear(),
            top_score: screening.top_score,
            matches: screening.report.matches,
            note,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub wallet_address: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub pending_document: Option<PendingDocument>,
    pub pending_image: Option<PendingAsset>,
    pub pending_video: Option<PendingAsset>,
    /// 下一個頁面顯示一次的訊息
    pub flash: Option<String>,
}

impl Session {
    pub fn new(wallet_address: Option<String>, lifetime: Duration) -> Self {
        Self {
            wallet_address,
            expires_at: Utc::now() + lifetime,
            pending_document: None,
            pending_image: None,
            pending_video: None,
            flash: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// 過舊的待登記文件連同檔案內容一起丟掉
    fn prune(&mut self, now: DateTime<Utc>) {
        if self
            .pending_document
            .as_ref()
            .is_some_and(|document| document.is_stale(now))
        {
            self.pending_document = None;
        }
    }
}

/// 記憶體內的 cookie session
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new(days: i64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            lifetime: Duration::days(days.clamp(0, MAX_SESSION_DAYS)),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn session_id(jar: &CookieJar) -> Option<Uuid> {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    }

    /// 回傳 session 快照；過期的順便移除
    pub async fn load(&self, jar: &CookieJar) -> Option<(Uuid, Session)> {
        let id = Self::session_id(jar)?;
        let session = self.sessions.read().await.get(&id).cloned()?;
        if session.is_expired() {
            self.sessions.write().await.remove(&id);
            return None;
        }
        Some((id, session))
    }

    pub async fn start(&self, wallet_address: Option<String>) -> (Uuid, Session) {
        self.start_with(wallet_address, |_| {}).await
    }

    /// 建立新 session 並在寫鎖內先套用修改
    pub async fn start_with<F>(&self, wallet_address: Option<String>, apply: F) -> (Uuid, Session)
    where
        F: FnOnce(&mut Session),
    {
        let id = Uuid::new_v4();
        let mut session = Session::new(wallet_address, self.lifetime);
        apply(&mut session);

        let mut sessions = self.sessions.write().await;
        Self::purge(&mut sessions);
        sessions.insert(id, session.clone());
        (id, session)
    }

    /// 在寫鎖內修改單一 session；已結束或過期時回傳 None
    pub async fn update<F, R>(&self, id: Uuid, apply: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.sessions.write().await;
        Self::purge(&mut sessions);
        sessions.get_mut(&id).map(apply)
    }

    pub async fn end(&self, id: Uuid) {
        self.sessions.write().await.remove(&id);
    }

    /// 移除過期 session，並釋放過舊的待登記文件
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        Self::purge(&mut sessions);
        before - sessions.len()
    }

    fn purge(sessions: &mut HashMap<Uuid, Session>) {
        let now = Utc::now();
        sessions.retain(|_, session| {
            session.prune(now);
            now < session.expires_at
        });
    }

    /// 定期清理；回傳的 handle 結束時可 abort
    pub fn spawn_reaper(&self, every: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let removed = store.purge_expired().await;
                if removed > 0 {
                    tracing::debug!("🧹 Removed {} expired sessions", removed);
                }
            }
        })
    }

    pub fn cookie(&self, id: Uuid) -> Cookie<'static> {
        let raw = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            id,
            self.lifetime.num_seconds()
        );
        Cookie::parse(raw).unwrap_or_else(|_| Cookie::new(SESSION_COOKIE, id.to_string()))
    }

    pub fn removal_cookie() -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE).path("/").build()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_through_cookie() {
        let store = SessionStore::new(7);
        let (id, _) = store.start(Some("0xabc".to_string())).await;
        let jar = CookieJar::new().add(store.cookie(id));

        let (loaded_id, session) = store.load(&jar).await.unwrap();
        assert_eq!(loaded_id, id);
        assert_eq!(session.wallet_address.as_deref(), Some("0xabc"));
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let store = SessionStore::new(0);
        let (id, _) = store.start(None).await;
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, id.to_string()));

        assert!(store.load(&jar).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_update_after_end_is_ignored() {
        let store = SessionStore::new(7);
        let (id, _) = store.start(Some("0xabc".to_string())).await;
        store.end(id).await;

        let applied = store
            .update(id, |session| session.flash = Some("late".to_string()))
            .await;
        assert!(applied.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_updates_touch_only_their_fields() {
        let store = SessionStore::new(7);
        let (id, snapshot) = store.start(None).await;

        store
            .update(id, |session| session.flash = Some("first tab".to_string()))
            .await;
        // 另一個請求拿的是舊快照，但只寫自己的欄位
        assert!(snapshot.flash.is_none());
        store
            .update(id, |session| session.pending_image = None)
            .await;

        let jar = CookieJar::new().add(store.cookie(id));
        let (_, session) = store.load(&jar).await.unwrap();
        assert_eq!(session.flash.as_deref(), Some("first tab"));
    }

    #[tokio::test]
    async fn test_stale_pending_document_is_released() {
        let store = SessionStore::new(7);
        let checked_at = Utc::now() - Duration::minutes(PENDING_DOCUMENT_MINUTES + 1);
        let (id, _) = store
            .start_with(None, |session| {
                session.pending_document = Some(PendingDocument {
                    upload: Upload::new("old.pdf", b"%PDF".to_vec()),
                    title: "Old".to_string(),
                    author: "Ada".to_string(),
                    language: "en".to_string(),
                    top_score: 0.1,
                    checked_at,
                });
            })
            .await;

        assert_eq!(store.purge_expired().await, 0);
        let kept = store
            .update(id, |session| session.pending_document.is_some())
            .await;
        assert_eq!(kept, Some(false));
    }

    #[test]
    fn test_lifetime_is_clamped() {
        assert_eq!(
            SessionStore::new(i64::MAX).lifetime(),
            Duration::days(MAX_SESSION_DAYS)
        );
        assert_eq!(SessionStore::new(-3).lifetime(), Duration::zero());
    }

    #[test]
    fn test_cookie_attributes() {
        let store = SessionStore::new(7);
        let cookie = store.cookie(Uuid::nil());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age().map(|d| d.whole_seconds()),
            Some(7 * 24 * 3600)
        );
    }
}
