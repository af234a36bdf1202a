/// 회원가입, 로그인, 세션 관리
/// 요청마다 세션 쿠키로 사용자를 식별하고, 식별된 사용자 id를 각 연산에 명시적으로 넘긴다.
// region:    --- Imports
use crate::auction::model::{DeletedRecords, User};
use crate::config::SESSION_TTL;
use crate::error::{Error, Result};
use crate::handlers::AppState;
use crate::store::EntityStore;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

// endregion: --- Imports

/// 세션 쿠키 이름
pub const SESSION_COOKIE: &str = "session";

// region:    --- Password

/// Argon2id PHC 문자열로 해시
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| Error::Password(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Password(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

/// 해시 계산은 블로킹 스레드에서 수행
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Password(e.to_string()))
}

// endregion: --- Password

// region:    --- Session Store

struct SessionEntry {
    user_id: i64,
    expires_at: Instant,
}

/// 세션 토큰 → 사용자 id. 발급 후 `ttl`이 지나면 만료된다.
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// 새 세션 발급. 만료된 세션은 이때 정리한다.
    pub async fn open(&self, user_id: i64) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        if sessions.len() < before {
            debug!(
                "{:<12} --> 만료 세션 정리: {}건",
                "Session",
                before - sessions.len()
            );
        }
        sessions.insert(
            token.clone(),
            SessionEntry {
                user_id,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    pub async fn resolve(&self, token: &str) -> Option<i64> {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .get(token)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.user_id)
    }

    pub async fn close(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// 사용자의 모든 세션 종료
    pub async fn close_all_for(&self, user_id: i64) {
        self.sessions
            .write()
            .await
            .retain(|_, entry| entry.user_id != user_id);
    }
}

/// 세션 쿠키
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .build()
}

/// 세션 쿠키 삭제용 쿠키 (Max-Age=0)
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = session_cookie(String::new());
    cookie.make_removal();
    cookie
}

/// 요청 쿠키에서 세션 토큰 추출
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

// endregion: --- Session Store

// region:    --- Forms

/// 회원가입 폼
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub confirmation: String,
}

/// 로그인 폼
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// endregion: --- Forms

// region:    --- Operations

/// 회원가입 후 세션 발급
pub async fn register(
    store: &dyn EntityStore,
    sessions: &SessionStore,
    form: RegisterForm,
) -> Result<(User, String)> {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Err(Error::Validation(
            "아이디와 비밀번호를 입력해 주세요.".to_string(),
        ));
    }
    if form.password != form.confirmation {
        return Err(Error::Validation("비밀번호가 일치하지 않습니다.".to_string()));
    }

    let password = form.password;
    let password_hash = run_blocking(move || hash_password(&password)).await??;
    let user = store
        .create_user(username, form.email.trim(), &password_hash)
        .await?;
    info!("{:<12} --> 회원가입: {} (id={})", "Session", user.username, user.id);
    let token = sessions.open(user.id).await;
    Ok((user, token))
}

/// 로그인 후 세션 발급
pub async fn login(
    store: &dyn EntityStore,
    sessions: &SessionStore,
    form: LoginForm,
) -> Result<(User, String)> {
    let user = match store.find_user_by_username(form.username.trim()).await? {
        Some(user) => {
            let password = form.password;
            let stored = user.password_hash.clone();
            let verified = run_blocking(move || verify_password(&password, &stored)).await?;
            verified.then_some(user)
        }
        None => None,
    };

    match user {
        Some(user) => {
            info!("{:<12} --> 로그인: {}", "Session", user.username);
            let token = sessions.open(user.id).await;
            Ok((user, token))
        }
        None => {
            warn!("{:<12} --> 로그인 실패: {}", "Session", form.username);
            Err(Error::InvalidCredentials)
        }
    }
}

/// 계정 삭제. 소유 레코드를 모두 지우고 세션도 종료한다.
pub async fn delete_account(
    store: &dyn EntityStore,
    sessions: &SessionStore,
    user_id: i64,
) -> Result<DeletedRecords> {
    let deleted = store.delete_user(user_id).await?;
    sessions.close_all_for(user_id).await;
    info!(
        "{:<12} --> 계정 삭제: id={}, {:?}",
        "Session", user_id, deleted
    );
    Ok(deleted)
}

// endregion: --- Operations

// region:    --- Extractors

/// 로그인한 사용자 (없으면 401)
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// 로그인 여부와 관계없는 사용자
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<User>> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(token) = session_token(&jar) else {
        return Ok(None);
    };
    match state.sessions.resolve(&token).await {
        Some(user_id) => state.store.get_user(user_id).await,
        None => Ok(None),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        resolve_user(parts, state)
            .await?
            .map(CurrentUser)
            .ok_or(Error::Unauthenticated)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        Ok(MaybeUser(resolve_user(parts, state).await?))
    }
}

// endregion: --- Extractors

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::http::header::COOKIE;
    use axum::http::{HeaderMap, HeaderValue};

    fn register_form(username: &str, password: &str, confirmation: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: password.to_string(),
            confirmation: confirmation.to_string(),
        }
    }

    fn jar_with(cookie: &'static str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(cookie));
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn password_hash_round_trip() {
        let stored = hash_password("hunter2").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
        assert_ne!(stored, hash_password("hunter2").unwrap());
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }

    #[test]
    fn reads_session_cookie_among_others() {
        let jar = jar_with("theme=dark; session=abc123; lang=ko");
        assert_eq!(session_token(&jar).as_deref(), Some("abc123"));

        assert_eq!(session_token(&jar_with("session=")), None);
        assert_eq!(session_token(&CookieJar::new()), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let issued = session_cookie("abc123".to_string()).to_string();
        assert!(issued.starts_with("session=abc123"));
        assert!(issued.contains("HttpOnly"));
        assert!(issued.contains("SameSite=Lax"));
        assert!(issued.contains("Path=/"));

        let expired = expired_session_cookie().to_string();
        assert!(expired.starts_with("session=;"));
        assert!(expired.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn expired_sessions_resolve_to_nobody_and_are_pruned() {
        let sessions = SessionStore::with_ttl(Duration::ZERO);
        let first = sessions.open(1).await;
        assert_eq!(sessions.resolve(&first).await, None);

        let second = sessions.open(2).await;
        let live = sessions.sessions.read().await;
        assert_eq!(live.len(), 1);
        assert!(live.contains_key(&second));
    }

    #[tokio::test]
    async fn sessions_live_until_ttl() {
        let sessions = SessionStore::with_ttl(Duration::from_secs(60));
        let token = sessions.open(7).await;
        assert_eq!(sessions.resolve(&token).await, Some(7));
        sessions.close_all_for(7).await;
        assert_eq!(sessions.resolve(&token).await, None);
    }

    #[tokio::test]
    async fn register_then_login() {
        let store = MemoryStore::new();
        let sessions = SessionStore::new();

        let (user, token) = register(&store, &sessions, register_form("kim", "pw", "pw"))
            .await
            .unwrap();
        assert_eq!(sessions.resolve(&token).await, Some(user.id));

        let err = register(&store, &sessions, register_form("kim", "pw", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Integrity(_)));

        let err = register(&store, &sessions, register_form("lee", "pw", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let login_form = |password: &str| LoginForm {
            username: "kim".to_string(),
            password: password.to_string(),
        };
        assert!(matches!(
            login(&store, &sessions, login_form("wrong")).await,
            Err(Error::InvalidCredentials)
        ));
        let (logged_in, second) = login(&store, &sessions, login_form("pw")).await.unwrap();
        assert_eq!(logged_in.id, user.id);

        sessions.close(&token).await;
        assert_eq!(sessions.resolve(&token).await, None);
        assert_eq!(sessions.resolve(&second).await, Some(user.id));
    }

    #[tokio::test]
    async fn delete_account_closes_sessions() {
        let store = MemoryStore::new();
        let sessions = SessionStore::new();
        let (user, token) = register(&store, &sessions, register_form("park", "pw", "pw"))
            .await
            .unwrap();

        delete_account(&store, &sessions, user.id).await.unwrap();
        assert_eq!(sessions.resolve(&token).await, None);
        assert!(store.find_user_by_username("park").await.unwrap().is_none());
    }
}
