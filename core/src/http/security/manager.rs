//! The security manager: one explicitly constructed object that ties the
//! filter chain, realm, credentials matcher and session manager together.
//!
//! Build it once at startup, wrap it in an `Arc`, and hand clones to the
//! middleware and to handlers (`web::Data::from(arc)`). Dropping the last
//! clone at shutdown releases the store connection.
//!
//! # Example
//! ```rust,ignore
//! let manager = Arc::new(
//!     SecurityManager::builder()
//!         .filter_chain(chain)
//!         .realm(MemoryRealm::new().with_account(account))
//!         .credentials_matcher(HashedCredentialsMatcher::default())
//!         .session_manager(SessionManager::new(Arc::new(MemorySessionStore::new())))
//!         .build()?,
//! );
//!
//! App::new()
//!     .app_data(web::Data::from(manager.clone()))
//!     .wrap(SecurityTransform::new(manager.clone()))
//! ```
//!
//! # Shiro Equivalent
//! `DefaultWebSecurityManager`, minus `SecurityUtils.setSecurityManager`

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::header;
use actix_web::HttpResponse;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::http::error::{AuthError, ConfigError, SecurityError};
use crate::http::security::config::{AccessInterceptor, Decision, Denial};
use crate::http::security::crypto::{CredentialsMatcher, HashedCredentialsMatcher};
use crate::http::security::realm::Realm;
use crate::http::security::session::{
    Session, SessionCookie, SessionLookup, SessionManager, SessionStore,
};
use crate::http::security::settings::SecuritySettings;
use crate::http::security::subject::Subject;

/// How denials are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedirectMode {
    /// `302 Found` with a `Location` header.
    #[default]
    Found,
    /// `401` or `403` with a `Location` header, for API clients that
    /// should not follow redirects.
    Status,
}

/// What to do when the session store fails or times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreFailurePolicy {
    /// Treat the caller as anonymous. Anonymous paths keep working.
    #[default]
    FailClosed,
    /// Answer `503 Service Unavailable`.
    Reject,
}

/// Process-scoped security context.
pub struct SecurityManager {
    interceptor: Box<dyn AccessInterceptor>,
    realm: Arc<dyn Realm>,
    credentials_matcher: Arc<dyn CredentialsMatcher>,
    sessions: SessionManager,
    session_cookie: SessionCookie,
    redirect_mode: RedirectMode,
    store_failure_policy: StoreFailurePolicy,
}

impl SecurityManager {
    pub fn builder() -> SecurityManagerBuilder {
        SecurityManagerBuilder::default()
    }

    /// Builds the whole graph from settings.
    ///
    /// The realm and store are supplied by the host because they depend on
    /// its data sources; see [`SecuritySettings::session_store`].
    pub fn from_settings(
        settings: &SecuritySettings,
        realm: Arc<dyn Realm>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ConfigError> {
        let sessions = SessionManager::new(store)
            .timeout(Duration::from_secs(settings.session.timeout_secs))
            .lookup_timeout(Duration::from_millis(settings.session.lookup_timeout_ms));

        SecurityManager::builder()
            .filter_chain(settings.build_filter_chain()?)
            .realm_arc(realm)
            .credentials_matcher(settings.build_credentials_matcher()?)
            .session_manager(sessions)
            .session_cookie(settings.build_session_cookie())
            .redirect_mode(settings.redirect_mode)
            .store_failure_policy(settings.store_failure_policy)
            .build()
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn session_cookie(&self) -> &SessionCookie {
        &self.session_cookie
    }

    pub fn redirect_mode(&self) -> RedirectMode {
        self.redirect_mode
    }

    pub fn store_failure_policy(&self) -> StoreFailurePolicy {
        self.store_failure_policy
    }

    /// Verifies credentials and opens a session.
    ///
    /// Unknown users and wrong passwords both yield
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let account = self
            .realm
            .find_account(username)
            .await
            .map_err(|err| {
                warn!("login for {} failed: {}", username, err);
                AuthError::RealmUnavailable
            })?
            .ok_or_else(|| {
                warn!("login for unknown account {} in realm {}", username, self.realm.name());
                AuthError::InvalidCredentials
            })?;

        if account.is_locked() {
            warn!("login for locked account {}", username);
            return Err(AuthError::AccountLocked);
        }

        if !self.credentials_matcher.matches(password, &account) {
            warn!("login for {} rejected: invalid credentials", username);
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.sessions.create(account.to_user()).await.map_err(|err| {
            warn!("could not open session for {}: {}", username, err);
            AuthError::SessionUnavailable
        })?;
        info!("{} logged in", username);
        Ok(session)
    }

    /// Ends a session.
    pub async fn logout(&self, session_id: &str) -> Result<(), AuthError> {
        self.sessions.destroy(session_id).await.map_err(|err| {
            warn!("could not destroy session: {}", err);
            AuthError::SessionUnavailable
        })?;
        info!("session logged out");
        Ok(())
    }

    /// Maps a session id (usually from the cookie) to a [`Subject`].
    ///
    /// Active sessions are touched so their idle timeout restarts. Missing
    /// and expired sessions become [`Subject::Anonymous`]. Store failures
    /// follow the [`StoreFailurePolicy`].
    pub async fn resolve_subject(&self, session_id: Option<&str>) -> Result<Subject, SecurityError> {
        let Some(id) = session_id else {
            return Ok(Subject::Anonymous);
        };

        match self.sessions.resolve(id).await {
            SessionLookup::Active(mut session) => {
                if let Err(err) = self.sessions.touch(&mut session).await {
                    warn!(
                        "could not refresh session for {}: {}",
                        session.user().get_username(),
                        err
                    );
                }
                Ok(Subject::Authenticated(session))
            }
            SessionLookup::Missing => {
                debug!("no session for presented id");
                Ok(Subject::Anonymous)
            }
            SessionLookup::Expired => {
                debug!("presented session has expired");
                Ok(Subject::Anonymous)
            }
            SessionLookup::Unavailable(err) => match self.store_failure_policy {
                StoreFailurePolicy::FailClosed => {
                    warn!("session lookup failed, treating request as anonymous: {}", err);
                    Ok(Subject::Anonymous)
                }
                StoreFailurePolicy::Reject => {
                    warn!("session lookup failed, rejecting request: {}", err);
                    Err(SecurityError::SessionStoreUnavailable {
                        reason: err.to_string(),
                    })
                }
            },
        }
    }

    /// Asks the filter chain about `path`.
    pub fn authorize(&self, path: &str, subject: &Subject) -> Decision {
        self.interceptor.authorize(path, subject)
    }

    /// Renders a redirect decision according to the [`RedirectMode`].
    pub fn redirect_response(&self, location: &str, denial: Denial) -> HttpResponse {
        let mut builder = match self.redirect_mode {
            RedirectMode::Found => HttpResponse::Found(),
            RedirectMode::Status => HttpResponse::build(denial.status()),
        };
        builder
            .append_header((header::LOCATION, location.to_string()))
            .finish()
    }
}

/// Builder for [`SecurityManager`].
///
/// The filter chain, realm and session manager are required; the
/// credentials matcher defaults to [`HashedCredentialsMatcher::default`].
#[derive(Default)]
pub struct SecurityManagerBuilder {
    interceptor: Option<Box<dyn AccessInterceptor>>,
    realm: Option<Arc<dyn Realm>>,
    credentials_matcher: Option<Arc<dyn CredentialsMatcher>>,
    sessions: Option<SessionManager>,
    session_cookie: SessionCookie,
    redirect_mode: RedirectMode,
    store_failure_policy: StoreFailurePolicy,
}

impl SecurityManagerBuilder {
    /// Any [`AccessInterceptor`], usually a [`FilterChain`](crate::http::security::FilterChain).
    pub fn filter_chain<I: AccessInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptor = Some(Box::new(interceptor));
        self
    }

    pub fn realm<R: Realm + 'static>(self, realm: R) -> Self {
        self.realm_arc(Arc::new(realm))
    }

    pub fn realm_arc(mut self, realm: Arc<dyn Realm>) -> Self {
        self.realm = Some(realm);
        self
    }

    pub fn credentials_matcher<M: CredentialsMatcher + 'static>(mut self, matcher: M) -> Self {
        self.credentials_matcher = Some(Arc::new(matcher));
        self
    }

    pub fn session_manager(mut self, sessions: SessionManager) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn session_cookie(mut self, cookie: SessionCookie) -> Self {
        self.session_cookie = cookie;
        self
    }

    pub fn redirect_mode(mut self, mode: RedirectMode) -> Self {
        self.redirect_mode = mode;
        self
    }

    pub fn store_failure_policy(mut self, policy: StoreFailurePolicy) -> Self {
        self.store_failure_policy = policy;
        self
    }

    /// # Errors
    /// [`ConfigError::MissingComponent`] if a required part was not set.
    pub fn build(self) -> Result<SecurityManager, ConfigError> {
        let interceptor = self.interceptor.ok_or(ConfigError::MissingComponent {
            component: "filter chain",
        })?;
        let realm = self
            .realm
            .ok_or(ConfigError::MissingComponent { component: "realm" })?;
        let sessions = self.sessions.ok_or(ConfigError::MissingComponent {
            component: "session manager",
        })?;
        let credentials_matcher = self
            .credentials_matcher
            .unwrap_or_else(|| Arc::new(HashedCredentialsMatcher::default()));

        Ok(SecurityManager {
            interceptor,
            realm,
            credentials_matcher,
            sessions,
            session_cookie: self.session_cookie,
            redirect_mode: self.redirect_mode,
            store_failure_policy: self.store_failure_policy,
        })
    }
}
