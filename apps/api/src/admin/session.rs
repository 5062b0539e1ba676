use std::collections::HashMap;
use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "intake_sid";

/// One-shot messages shown on the next rendered page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flashes {
    pub error: Vec<String>,
    pub success: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Error,
    Success,
}

#[derive(Debug, Clone)]
struct SessionData {
    is_admin: bool,
    flashes: Flashes,
    expires_at: DateTime<Utc>,
}

/// In-process session table keyed by the id carried in the `intake_sid` cookie.
/// Sessions slide forward on every access and vanish once `ttl` passes unused.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionData>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn is_admin(&self, jar: &CookieJar) -> bool {
        let Some(id) = session_id(jar) else {
            return false;
        };
        let mut sessions = self.sessions.write().await;
        match self.live_session(&mut sessions, id) {
            Some(data) => data.is_admin,
            None => false,
        }
    }

    pub async fn push_flash(&self, jar: CookieJar, kind: FlashKind, message: impl Into<String>) -> CookieJar {
        let mut sessions = self.sessions.write().await;
        let (jar, id) = self.ensure(&mut sessions, jar);
        if let Some(data) = sessions.get_mut(&id) {
            match kind {
                FlashKind::Error => data.flashes.error.push(message.into()),
                FlashKind::Success => data.flashes.success.push(message.into()),
            }
        }
        jar
    }

    /// Returns and clears pending flash messages.
    pub async fn take_flashes(&self, jar: &CookieJar) -> Flashes {
        let Some(id) = session_id(jar) else {
            return Flashes::default();
        };
        let mut sessions = self.sessions.write().await;
        match self.live_session(&mut sessions, id) {
            Some(data) => std::mem::take(&mut data.flashes),
            None => Flashes::default(),
        }
    }

    /// Marks the caller as admin under a freshly issued session id.
    pub async fn login(&self, jar: CookieJar) -> CookieJar {
        let mut sessions = self.sessions.write().await;
        let flashes = session_id(&jar)
            .and_then(|old| sessions.remove(&old))
            .map(|data| data.flashes)
            .unwrap_or_default();

        let id = Uuid::new_v4();
        sessions.insert(
            id,
            SessionData {
                is_admin: true,
                flashes,
                expires_at: Utc::now() + self.ttl,
            },
        );
        jar.add(session_cookie(id))
    }

    /// Drops the caller's session and clears the cookie.
    pub async fn destroy(&self, jar: CookieJar) -> CookieJar {
        if let Some(id) = session_id(&jar) {
            self.sessions.write().await.remove(&id);
        }
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }

    fn live_session<'a>(
        &self,
        sessions: &'a mut HashMap<Uuid, SessionData>,
        id: Uuid,
    ) -> Option<&'a mut SessionData> {
        let now = Utc::now();
        if sessions.get(&id).is_some_and(|data| data.expires_at <= now) {
            sessions.remove(&id);
            return None;
        }
        let data = sessions.get_mut(&id)?;
        data.expires_at = now + self.ttl;
        Some(data)
    }

    fn ensure(&self, sessions: &mut HashMap<Uuid, SessionData>, jar: CookieJar) -> (CookieJar, Uuid) {
        if let Some(id) = session_id(&jar) {
            if self.live_session(sessions, id).is_some() {
                return (jar, id);
            }
        }

        let now = Utc::now();
        sessions.retain(|_, data| data.expires_at > now);

        let id = Uuid::new_v4();
        sessions.insert(
            id,
            SessionData {
                is_admin: false,
                flashes: Flashes::default(),
                expires_at: now + self.ttl,
            },
        );
        (jar.add(session_cookie(id)), id)
    }
}

fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

fn session_cookie(id: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
