use std::sync::Arc;
use log::{debug, error, info, trace, warn};
use parking_lot::{Mutex, RwLock};
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::auth_api::{AuthApi, AuthApiError, ProductionAuthApi};
use crate::config::AppConfig;
use crate::data::{Identity, Role, TokenPair};
use crate::lib_constants::RENEWAL_MARGIN;
use crate::session::{AccessTokenSource, SessionError};
use crate::session::internal::io_trait::{ProductionSessionIo, SessionIo};
use crate::token_store::{ProductionTokenStore, TokenStore};

mod io_trait;
#[cfg(test)] mod tests;

/// Observable lifecycle phase. `Unauthenticated` is a resting state, not a
/// terminal one; a consuming surface reacts to it by returning to its
/// sign-in view.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionPhase {
    Restoring,
    Unauthenticated,
    Authenticated,
    Renewing,
}

pub type ProductionSessionManager = SessionManagerImpl<
    ProductionAuthApi,
    ProductionTokenStore,
    ProductionSessionIo,
>;

/// Owns the token pair and the renewal timer, exposes identity/role/phase,
/// and performs sign-in and sign-out. Cheap to clone; all clones share one
/// session.
#[allow(private_bounds)]
pub struct SessionManagerImpl<A: AuthApi, T: TokenStore, Io: SessionIo> {
    inner: Arc<Inner<A, T, Io>>,
}

impl<A: AuthApi, T: TokenStore, Io: SessionIo> Clone
    for SessionManagerImpl<A, T, Io>
{
    fn clone(&self) -> Self {
        SessionManagerImpl { inner: self.inner.clone() }
    }
}

struct Inner<A: AuthApi, T: TokenStore, Io: SessionIo> {
    auth_api: A,
    token_store: T,
    io: Io,
    state: RwLock<State>,
    renewal_timer: Mutex<Option<AbortHandle>>,
    phase_tx: watch::Sender<SessionPhase>,
}

struct State {
    phase: SessionPhase,
    // bumped on every token mutation and teardown; in-flight async
    // continuations re-check it before applying their result, so a stale
    // response never clobbers a newer session
    generation: u64,
    tokens: Option<TokenPair>,
    identity: Option<Identity>,
    restored: bool,
}

enum IdentityOutcome {
    Applied,
    Stale,
    Failed(AuthApiError),
}

impl<A: AuthApi, T: TokenStore, Io: SessionIo> Drop for Inner<A, T, Io> {
    fn drop(&mut self) {
        if let Some(timer) = self.renewal_timer.lock().take() {
            trace!("session manager dropped, cancelling the renewal timer");
            timer.abort();
        }
    }
}

impl ProductionSessionManager {
    pub fn new(
        http: reqwest::Client,
        config: &AppConfig,
    ) -> ProductionSessionManager {
        SessionManagerImpl::new_with(
            ProductionAuthApi::new(http, &config.base_url),
            ProductionTokenStore::new(&config.state_directory),
            ProductionSessionIo,
        )
    }
}

#[allow(private_bounds)]
impl<A: AuthApi, T: TokenStore, Io: SessionIo> SessionManagerImpl<A, T, Io> {
    pub fn new_with(auth_api: A, token_store: T, io: Io) -> Self {
        let (phase_tx, _) = watch::channel(SessionPhase::Restoring);
        SessionManagerImpl {
            inner: Arc::new(Inner {
                auth_api,
                token_store,
                io,
                state: RwLock::new(State {
                    phase: SessionPhase::Restoring,
                    generation: 0,
                    tokens: None,
                    identity: None,
                    restored: false,
                }),
                renewal_timer: Mutex::new(None),
                phase_tx,
            }),
        }
    }

    /// Session restoration; run once at process start.
    pub async fn restore(&self) {
        Inner::restore(&self.inner).await
    }

    /// Submits the credentials and, on success, stores the token pair,
    /// schedules renewal and fetches the identity. On failure nothing is
    /// mutated. Field validation is the caller's job.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        Inner::sign_in(&self.inner, email, password).await
    }

    /// Best-effort backend logout, then an unconditional local teardown.
    /// Idempotent; never fails.
    pub async fn sign_out(&self) {
        Inner::sign_out(&self.inner).await
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.state.read().identity.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.inner
            .state
            .read()
            .identity
            .as_ref()
            .and_then(Identity::role)
    }

    /// True from construction until the first resolution of [`Self::restore`].
    pub fn is_loading(&self) -> bool {
        !self.inner.state.read().restored
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.read().phase
    }

    /// Phase transitions as an observable stream; the headless equivalent
    /// of forced navigation to the sign-in view.
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.inner.phase_tx.subscribe()
    }
}

impl<A: AuthApi, T: TokenStore, Io: SessionIo> AccessTokenSource
    for SessionManagerImpl<A, T, Io>
{
    fn access_token(&self) -> Option<String> {
        self.inner
            .state
            .read()
            .tokens
            .as_ref()
            .map(|tokens| tokens.access_token.clone())
    }
}

impl<A: AuthApi, T: TokenStore, Io: SessionIo> Inner<A, T, Io> {
    async fn restore(self: &Arc<Self>) {
        debug!("restoring the persisted session");
        let stored = match self.token_store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                error!("could not read the persisted session: {e}");
                None
            },
        };
        let Some(tokens) = stored else {
            debug!("no persisted session, starting unauthenticated");
            let mut state = self.state.write();
            state.restored = true;
            self.set_phase(&mut state, SessionPhase::Unauthenticated);
            return;
        };
        let expires_at = tokens.expires_at;
        let generation = {
            let mut state = self.state.write();
            state.tokens = Some(tokens);
            state.generation
        };
        let now = self.io.now();
        if now < expires_at {
            debug!("persisted session valid until {expires_at}");
            match self.fetch_identity(generation).await {
                IdentityOutcome::Applied => {
                    let delay = expires_at - now - RENEWAL_MARGIN;
                    if delay > time::Duration::ZERO {
                        self.schedule_renewal_in(delay, generation);
                    } else {
                        // the margin has already passed, renew at once
                        self.renew(generation).await;
                    }
                },
                IdentityOutcome::Stale | IdentityOutcome::Failed(_) => {},
            }
        } else {
            debug!("persisted session already expired, renewing before use");
            self.renew(generation).await;
        }
    }

    async fn sign_in(
        self: &Arc<Self>,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        debug!("signing in \"{email}\"");
        let generation = self.state.read().generation;
        let grant = self.auth_api
            .login(email, password)
            .await
            .map_err(|e| match e {
                AuthApiError::InvalidCredentials =>
                    SessionError::InvalidCredentials,
                other => SessionError::AuthApi(other),
            })?;
        let tokens = grant.into_pair(self.io.now());
        let expires_at = tokens.expires_at;
        let new_generation = {
            let mut state = self.state.write();
            if state.generation != generation {
                debug!("sign-in superseded before its tokens could apply");
                return Err(SessionError::Superseded);
            }
            state.generation += 1;
            state.tokens = Some(tokens.clone());
            state.generation
        };
        self.persist(&tokens).await;
        self.schedule_renewal(expires_at, new_generation);
        match self.fetch_identity(new_generation).await {
            IdentityOutcome::Applied => Ok(()),
            IdentityOutcome::Stale => Err(SessionError::Superseded),
            IdentityOutcome::Failed(e) => Err(SessionError::IdentityFetch(e)),
        }
    }

    async fn sign_out(self: &Arc<Self>) {
        info!("signing out");
        let refresh_token = self
            .state
            .read()
            .tokens
            .as_ref()
            .map(|tokens| tokens.refresh_token.clone());
        if let Some(refresh_token) = refresh_token {
            // best effort; the backend may never see the revocation, the
            // local session is torn down regardless
            if let Err(e) = self.auth_api.logout(&refresh_token).await {
                warn!("logout request failed: {e}");
            }
        }
        {
            let mut state = self.state.write();
            state.generation += 1;
            state.tokens = None;
            state.identity = None;
            state.restored = true;
            self.set_phase(&mut state, SessionPhase::Unauthenticated);
        }
        self.cancel_renewal_timer();
        if let Err(e) = self.token_store.clear().await {
            warn!("could not clear the persisted session: {e}");
        }
    }

    /// Token renewal, entered from the timer or from expired-on-load
    /// restoration. Any failure is session-fatal; there is no retry.
    async fn renew(self: &Arc<Self>, generation: u64) {
        let refresh_token = {
            let state = self.state.read();
            if state.generation != generation {
                trace!("stale renewal skipped");
                return;
            }
            state.tokens.as_ref().map(|tokens| tokens.refresh_token.clone())
        };
        let Some(refresh_token) = refresh_token else {
            warn!("renewal requested with no refresh token");
            self.reset_to_unauthenticated(generation).await;
            return;
        };
        {
            let mut state = self.state.write();
            if state.generation != generation {
                return;
            }
            self.set_phase(&mut state, SessionPhase::Renewing);
        }
        debug!("renewing the session tokens");
        match self.auth_api.refresh(&refresh_token).await {
            Ok(grant) => {
                let tokens = grant.into_pair(self.io.now());
                let expires_at = tokens.expires_at;
                let (new_generation, needs_identity) = {
                    let mut state = self.state.write();
                    if state.generation != generation {
                        debug!("renewal result arrived stale, dropped");
                        return;
                    }
                    state.generation += 1;
                    state.tokens = Some(tokens.clone());
                    state.restored = true;
                    let needs_identity = state.identity.is_none();
                    if !needs_identity {
                        self.set_phase(&mut state, SessionPhase::Authenticated);
                    }
                    (state.generation, needs_identity)
                };
                debug!("session renewed, new expiry at {expires_at}");
                self.persist(&tokens).await;
                self.schedule_renewal(expires_at, new_generation);
                if needs_identity {
                    // reached from expired-on-load restoration: the
                    // identity is only fetched after the refresh
                    let _ = self.fetch_identity(new_generation).await;
                }
            },
            Err(e) => {
                error!("session renewal failed: {e}");
                self.reset_to_unauthenticated(generation).await;
            },
        }
    }

    async fn fetch_identity(self: &Arc<Self>, generation: u64) -> IdentityOutcome {
        let access_token = {
            let state = self.state.read();
            if state.generation != generation {
                return IdentityOutcome::Stale;
            }
            state.tokens.as_ref().map(|tokens| tokens.access_token.clone())
        };
        let Some(access_token) = access_token else {
            // same generation but no tokens: a teardown won the race
            return IdentityOutcome::Stale;
        };
        match self.auth_api.fetch_identity(&access_token).await {
            Ok(identity) => {
                let mut state = self.state.write();
                if state.generation != generation {
                    debug!("identity result arrived stale, dropped");
                    return IdentityOutcome::Stale;
                }
                info!("signed in as \"{}\"", identity.display_name());
                state.identity = Some(identity);
                state.restored = true;
                self.set_phase(&mut state, SessionPhase::Authenticated);
                IdentityOutcome::Applied
            },
            Err(e) => {
                // an access token that cannot fetch its own owner is no
                // session at all
                error!("could not fetch the signed-in user: {e}");
                self.reset_to_unauthenticated(generation).await;
                IdentityOutcome::Failed(e)
            },
        }
    }

    /// Session-fatal teardown: clear the pair and the identity, cancel the
    /// timer, land in the unauthenticated phase. A no-op when `generation`
    /// is no longer current.
    async fn reset_to_unauthenticated(self: &Arc<Self>, generation: u64) {
        {
            let mut state = self.state.write();
            if state.generation != generation {
                trace!("stale failure result ignored");
                return;
            }
            state.generation += 1;
            state.tokens = None;
            state.identity = None;
            state.restored = true;
            self.set_phase(&mut state, SessionPhase::Unauthenticated);
        }
        self.cancel_renewal_timer();
        if let Err(e) = self.token_store.clear().await {
            warn!("could not clear the persisted session: {e}");
        }
    }

    async fn persist(&self, tokens: &TokenPair) {
        if let Err(e) = self.token_store.store(tokens).await {
            // the in-memory session still works; a reload just will not
            // resume it
            warn!("could not persist the session tokens: {e}");
        }
    }

    fn schedule_renewal(
        self: &Arc<Self>,
        expires_at: OffsetDateTime,
        generation: u64,
    ) {
        let delay = expires_at - self.io.now() - RENEWAL_MARGIN;
        self.schedule_renewal_in(delay, generation);
    }

    /// At most one renewal timer is outstanding: scheduling always cancels
    /// the previous one, so two refresh attempts can never race each other
    /// and invalidate a refresh token the other one still depends on.
    fn schedule_renewal_in(
        self: &Arc<Self>,
        delay: time::Duration,
        generation: u64,
    ) {
        let sleep_for = std::time::Duration::from_millis(
            delay.whole_milliseconds().max(0) as u64,
        );
        if sleep_for.is_zero() {
            debug!("renewal due immediately");
        } else {
            debug!("renewal scheduled in {delay}");
        }
        let weak = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            if !sleep_for.is_zero() {
                tokio::time::sleep(sleep_for).await;
            }
            let Some(inner) = weak.upgrade() else {
                return;
            };
            Inner::renew(&inner, generation).await;
        });
        let mut slot = self.renewal_timer.lock();
        if let Some(previous) = slot.replace(task.abort_handle()) {
            trace!("replacing the pending renewal timer");
            previous.abort();
        }
    }

    fn cancel_renewal_timer(&self) {
        if let Some(timer) = self.renewal_timer.lock().take() {
            trace!("cancelling the pending renewal timer");
            timer.abort();
        }
    }

    fn set_phase(&self, state: &mut State, phase: SessionPhase) {
        if state.phase != phase {
            trace!("session phase {:?} -> {:?}", state.phase, phase);
            state.phase = phase;
            self.phase_tx.send_replace(phase);
        }
    }
}
