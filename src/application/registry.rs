use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::application::session::Session;

pub type SessionId = u64;

#[derive(Debug)]
struct SessionEntry {
    session: Arc<Mutex<Session>>,
    last_access: Instant,
}

/// セッションIDごとに独立した `Session` を保持する
///
/// 各セッションは個別のロックで守られるので、同じセッションへの操作は
/// 1つずつ実行される。`idle_timeout` を設定すると、その間アクセスの
/// 無かったセッションは `evict_idle` で破棄される。
#[derive(Debug, Default)]
pub struct SessionRegistry {
    next_id: AtomicU64,
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    idle_timeout: Option<Duration>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout: Some(idle_timeout),
            ..Self::default()
        }
    }

    /// 新しい空のセッションを作成する
    pub async fn create(&self) -> SessionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let entry = SessionEntry {
            session: Arc::new(Mutex::new(Session::new())),
            last_access: Instant::now(),
        };
        self.sessions.write().await.insert(id, entry);
        info!(session_id = id, "session created");
        id
    }

    /// セッションを取得し、最終アクセス時刻を更新する
    pub async fn get(&self, id: SessionId) -> Option<Arc<Mutex<Session>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_access = Instant::now();
        Some(entry.session.clone())
    }

    /// セッションを破棄する。存在しなければ `false`
    pub async fn remove(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = id, "session closed");
        }
        removed
    }

    /// 一定時間アクセスの無いセッションを破棄し、破棄した数を返す
    pub async fn evict_idle(&self) -> usize {
        let Some(idle_timeout) = self.idle_timeout else {
            return 0;
        };

        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = now.duration_since(entry.last_access) < idle_timeout;
            if !keep {
                info!(session_id = *id, "idle session evicted");
            }
            keep
        });
        before - sessions.len()
    }

    /// `period` ごとに `evict_idle` を実行するタスクを起動する
    pub fn spawn_eviction(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle().await;
                debug!(evicted, "idle session sweep");
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn sessions_are_isolated() {
        let registry = SessionRegistry::new();
        let first = registry.create().await;
        let second = registry.create().await;
        assert_ne!(first, second);
        assert_eq!(registry.len().await, 2);

        {
            let session = registry.get(first).await.unwrap();
            let mut session = session.lock().await;
            session
                .load_file("a.csv", Bytes::from_static(b"x\n1\n2\n"))
                .unwrap();
        }

        let other = registry.get(second).await.unwrap();
        assert!(other.lock().await.loaded().is_none());
    }

    #[tokio::test]
    async fn removed_sessions_are_gone() {
        let registry = SessionRegistry::new();
        let id = registry.create().await;
        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert!(registry.get(id).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_are_evicted() {
        let registry = SessionRegistry::with_idle_timeout(Duration::from_secs(60));
        let idle = registry.create().await;
        let active = registry.create().await;

        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(registry.get(active).await.is_some());
        assert_eq!(registry.evict_idle().await, 0);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(registry.evict_idle().await, 1);
        assert!(registry.get(idle).await.is_none());
        assert!(registry.get(active).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn without_timeout_sessions_stay() {
        let registry = SessionRegistry::new();
        let id = registry.create().await;
        tokio::time::advance(Duration::from_secs(24 * 60 * 60)).await;
        assert_eq!(registry.evict_idle().await, 0);
        assert!(registry.get(id).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn background_sweep_removes_idle_sessions() {
        let registry = Arc::new(SessionRegistry::with_idle_timeout(Duration::from_secs(10)));
        registry.create().await;
        let sweeper = registry.spawn_eviction(Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert!(registry.is_empty().await);
        sweeper.abort();
    }
}
