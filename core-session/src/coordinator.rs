//! # Session Coordinator
//!
//! Orchestrates the redirect-based session lifecycle against the injected
//! host bridges:
//!
//! 1. On startup it inspects the current URL for a `state` parameter left by
//!    the hosted auth page, exchanges the one-time token it may carry, and
//!    strips the parameter from the visible URL.
//! 2. It subscribes to the external SDK's auth-state stream and republishes
//!    every value through a `tokio::sync::watch` channel as
//!    [`SessionState`], so embedders observe `{ loading, user }` instead of
//!    raw SDK callbacks.
//! 3. It builds and issues the hosted sign-in/sign-up redirects and performs
//!    sign-out.
//!
//! Inbound handling is fail-open: a malformed payload or a rejected token is
//! logged and surfaced as an event, and the page simply loads anonymously.
//! The coordinator itself never performs network I/O; everything external
//! goes through the bridges.

use crate::error::{Result, SessionError};
use crate::hosted::{HostedUrls, LogoutOptions, RedirectOptions};
use crate::state::{decode_state, extract_state_param, strip_state_param, InboundState};
use bridge_traits::error::BridgeError;
use bridge_traits::identity::AuthUser;
use core_runtime::config::SessionConfig;
use core_runtime::events::{EventBus, Receiver, SessionEvent};
use core_runtime::logging::redact_if_sensitive;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Snapshot of the session as seen by the embedding application.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// True until the SDK has delivered its initial auth determination.
    ///
    /// Once false, never true again for this coordinator.
    pub loading: bool,
    /// The authenticated principal, `None` when signed out.
    pub user: Option<AuthUser>,
}

impl SessionState {
    fn initial() -> Self {
        Self {
            loading: true,
            user: None,
        }
    }

    /// True when a principal is present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// The session coordinator.
///
/// Construct with [`SessionCoordinator::start`]; one instance per page load.
/// Dropping the coordinator closes the auth-state subscription.
pub struct SessionCoordinator {
    config: SessionConfig,
    urls: HostedUrls,
    events: EventBus,
    state_tx: watch::Sender<SessionState>,
    state_rx: watch::Receiver<SessionState>,
    pending_logout_redirect: Mutex<Option<String>>,
    observer: Mutex<Option<JoinHandle<()>>>,
}

impl SessionCoordinator {
    /// Starts the coordinator: runs the inbound token check once, then
    /// begins observing the SDK's auth state.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(config), fields(domain = %config.domain))]
    pub async fn start(config: SessionConfig) -> Self {
        if config.debug {
            debug!(?config, "starting session coordinator");
        }

        let events = EventBus::new(config.event_buffer);
        let (state_tx, state_rx) = watch::channel(SessionState::initial());
        let urls = HostedUrls::new(&config.domain, &config.redirect_url);

        let coordinator = Self {
            config,
            urls,
            events,
            state_tx,
            state_rx,
            pending_logout_redirect: Mutex::new(None),
            observer: Mutex::new(None),
        };

        coordinator.consume_inbound_state().await;
        coordinator.spawn_observer();

        coordinator
    }

    /// One-shot inbound token check. Fail-open throughout: nothing here can
    /// prevent the page from loading.
    async fn consume_inbound_state(&self) {
        let url = match self.config.navigator.current_url() {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Could not read current URL; skipping token check");
                return;
            }
        };

        let Some(raw) = extract_state_param(&url) else {
            debug!("No state parameter on current URL");
            return;
        };

        let inbound: InboundState = match decode_state(&raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed state parameter");
                self.events
                    .emit(SessionEvent::InvalidStatePayload {
                        message: e.to_string(),
                    })
                    .ok();
                return;
            }
        };

        let Some(token) = inbound.token else {
            debug!("State parameter carried no exchange token");
            return;
        };

        debug!(
            token = %redact_if_sensitive("token", &token),
            "Exchanging one-time token"
        );
        self.events.emit(SessionEvent::ExchangingToken).ok();

        match self.config.identity.sign_in_with_token(&token).await {
            Ok(user) => {
                // The token is consumed; the blob must not survive a reload
                // or end up in a shared link.
                if let Err(e) = self.config.navigator.replace_url(&strip_state_param(&url)) {
                    warn!(error = %e, "Could not strip consumed state parameter");
                }

                info!(uid = %user.uid, "Token exchanged");
                self.events
                    .emit(SessionEvent::TokenExchanged { uid: user.uid })
                    .ok();
            }
            Err(e) => {
                error!(error = %e, "Token exchange failed; continuing unauthenticated");
                self.events
                    .emit(SessionEvent::ExchangeFailed {
                        message: e.to_string(),
                        // A rejected credential stays rejected; anything else
                        // may succeed on a fresh login.
                        recoverable: !matches!(e, BridgeError::CredentialRejected(_)),
                    })
                    .ok();
            }
        }
    }

    fn spawn_observer(&self) {
        let mut subscription = self.config.identity.subscribe_auth_state();
        let state_tx = self.state_tx.clone();
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            while let Some(user) = subscription.recv().await {
                let uid = user.as_ref().map(|u| u.uid.clone());
                debug!(?uid, "Auth state changed");

                state_tx.send_replace(SessionState {
                    loading: false,
                    user,
                });
                events.emit(SessionEvent::AuthStateChanged { uid }).ok();
            }
        });

        *lock_ignoring_poison(&self.observer) = Some(handle);
    }

    /// Watch receiver over the session state.
    ///
    /// `borrow()` gives the current snapshot; `changed().await` wakes on
    /// every update.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Current session snapshot.
    pub fn snapshot(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    /// True until the SDK has delivered its initial auth determination.
    pub fn is_loading(&self) -> bool {
        self.state_rx.borrow().loading
    }

    /// True when a principal is present.
    pub fn is_authenticated(&self) -> bool {
        self.state_rx.borrow().is_authenticated()
    }

    /// The authenticated principal, `None` when signed out (or still
    /// loading).
    pub fn current_user(&self) -> Option<AuthUser> {
        self.state_rx.borrow().user.clone()
    }

    /// Subscribes to coordinator lifecycle events.
    pub fn events(&self) -> Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// URL of the hosted sign-in page.
    ///
    /// Pure given the configuration, except that a redirect destination
    /// recorded by [`logout`](Self::logout) is consumed by the first call
    /// that does not supply its own.
    pub fn login_url(&self, options: &RedirectOptions) -> String {
        self.urls.sign_in(&self.resolve_redirect(options))
    }

    /// URL of the hosted sign-up page. Same resolution as
    /// [`login_url`](Self::login_url).
    pub fn register_url(&self, options: &RedirectOptions) -> String {
        self.urls.sign_up(&self.resolve_redirect(options))
    }

    /// Sends the user to the hosted sign-in page.
    #[instrument(skip(self, options))]
    pub fn login_with_redirect(&self, options: &RedirectOptions) -> Result<()> {
        self.issue_redirect(self.login_url(options))
    }

    /// Sends the user to the hosted sign-up page.
    #[instrument(skip(self, options))]
    pub fn register_with_redirect(&self, options: &RedirectOptions) -> Result<()> {
        self.issue_redirect(self.register_url(options))
    }

    /// Signs out and, by default, sends the user to the hosted sign-in page.
    ///
    /// Sign-out happens first and its failure aborts the whole operation,
    /// so a user is never redirected while still holding a session.
    ///
    /// # Errors
    ///
    /// [`SessionError::SignOutFailed`] when the SDK rejects the sign-out;
    /// [`SessionError::Navigation`] when the post-sign-out redirect fails.
    #[instrument(skip(self, options), fields(no_redirect = options.no_redirect))]
    pub async fn logout(&self, options: &LogoutOptions) -> Result<()> {
        self.config
            .identity
            .sign_out()
            .await
            .map_err(|e| SessionError::SignOutFailed(e.to_string()))?;

        if let Some(url) = &options.redirect_url {
            *lock_ignoring_poison(&self.pending_logout_redirect) = Some(url.clone());
        }

        info!("Signed out");
        self.events.emit(SessionEvent::SignedOut).ok();

        if options.no_redirect {
            return Ok(());
        }

        let destination = options
            .redirect_url
            .clone()
            .unwrap_or_else(|| self.urls.sign_in(&RedirectOptions::default()));

        self.issue_redirect(destination)
    }

    /// Aborts the auth-state observer, closing the SDK subscription.
    ///
    /// Idempotent; also runs on drop.
    pub fn shutdown(&self) {
        if let Some(handle) = lock_ignoring_poison(&self.observer).take() {
            handle.abort();
            debug!("Auth state observer stopped");
        }
    }

    fn issue_redirect(&self, url: String) -> Result<()> {
        self.config
            .navigator
            .navigate(&url)
            .map_err(|e| SessionError::Navigation(e.to_string()))?;

        debug!(%url, "Redirect issued");
        self.events.emit(SessionEvent::RedirectIssued { url }).ok();
        Ok(())
    }

    fn resolve_redirect(&self, options: &RedirectOptions) -> RedirectOptions {
        let redirect_url = options
            .redirect_url
            .clone()
            .or_else(|| lock_ignoring_poison(&self.pending_logout_redirect).take());

        RedirectOptions {
            redirect_url,
            page: options.page,
        }
    }
}

impl Drop for SessionCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("domain", &self.config.domain)
            .field("state", &*self.state_rx.borrow())
            .finish()
    }
}

/// A poisoned lock only means another thread panicked mid-update of an
/// `Option<String>`; the value itself is always coherent.
fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{decode_state, HostedPage, RedirectIntent};
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::identity::{AuthStateSubscription, IdentityBridge};
    use bridge_traits::navigation::Navigator;
    use mockall::mock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    // base64(`{"token":"abc"}`)
    const TOKEN_STATE: &str = "eyJ0b2tlbiI6ImFiYyJ9";

    struct FakeIdentity {
        exchange_user: Option<AuthUser>,
        fail_sign_out: bool,
        exchanged: Mutex<Vec<String>>,
        sign_outs: AtomicUsize,
        subscribers: Mutex<Vec<mpsc::UnboundedSender<Option<AuthUser>>>>,
    }

    impl FakeIdentity {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                exchange_user: Some(AuthUser::new("u1")),
                fail_sign_out: false,
                exchanged: Mutex::new(Vec::new()),
                sign_outs: AtomicUsize::new(0),
                subscribers: Mutex::new(Vec::new()),
            })
        }

        fn rejecting_tokens() -> Arc<Self> {
            let mut fake = Self::new();
            Arc::get_mut(&mut fake).unwrap().exchange_user = None;
            fake
        }

        fn failing_sign_out() -> Arc<Self> {
            let mut fake = Self::new();
            Arc::get_mut(&mut fake).unwrap().fail_sign_out = true;
            fake
        }

        fn push_auth_state(&self, user: Option<AuthUser>) {
            for tx in self.subscribers.lock().unwrap().iter() {
                tx.send(user.clone()).ok();
            }
        }

        fn exchanged_tokens(&self) -> Vec<String> {
            self.exchanged.lock().unwrap().clone()
        }

        fn sign_out_count(&self) -> usize {
            self.sign_outs.load(Ordering::SeqCst)
        }

        fn subscription_closed(&self) -> bool {
            self.subscribers
                .lock()
                .unwrap()
                .iter()
                .all(|tx| tx.is_closed())
        }
    }

    #[async_trait::async_trait]
    impl IdentityBridge for FakeIdentity {
        async fn sign_in_with_token(&self, token: &str) -> BridgeResult<AuthUser> {
            self.exchanged.lock().unwrap().push(token.to_string());
            match &self.exchange_user {
                Some(user) => Ok(user.clone()),
                None => Err(BridgeError::CredentialRejected(
                    "token already consumed".to_string(),
                )),
            }
        }

        fn subscribe_auth_state(&self) -> AuthStateSubscription {
            let (tx, rx) = mpsc::unbounded_channel();
            self.subscribers.lock().unwrap().push(tx);
            AuthStateSubscription::new(rx)
        }

        async fn sign_out(&self) -> BridgeResult<()> {
            self.sign_outs.fetch_add(1, Ordering::SeqCst);
            if self.fail_sign_out {
                Err(BridgeError::OperationFailed("sdk unavailable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct FakeNavigator {
        url: Mutex<String>,
        replacements: Mutex<Vec<String>>,
        navigations: Mutex<Vec<String>>,
    }

    impl FakeNavigator {
        fn at(url: &str) -> Arc<Self> {
            Arc::new(Self {
                url: Mutex::new(url.to_string()),
                replacements: Mutex::new(Vec::new()),
                navigations: Mutex::new(Vec::new()),
            })
        }

        fn replacements(&self) -> Vec<String> {
            self.replacements.lock().unwrap().clone()
        }

        fn navigations(&self) -> Vec<String> {
            self.navigations.lock().unwrap().clone()
        }
    }

    impl Navigator for FakeNavigator {
        fn current_url(&self) -> BridgeResult<String> {
            Ok(self.url.lock().unwrap().clone())
        }

        fn replace_url(&self, url: &str) -> BridgeResult<()> {
            *self.url.lock().unwrap() = url.to_string();
            self.replacements.lock().unwrap().push(url.to_string());
            Ok(())
        }

        fn navigate(&self, url: &str) -> BridgeResult<()> {
            self.navigations.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    mock! {
        ScriptedNavigator {}

        impl Navigator for ScriptedNavigator {
            fn current_url(&self) -> BridgeResult<String>;
            fn replace_url(&self, url: &str) -> BridgeResult<()>;
            fn navigate(&self, url: &str) -> BridgeResult<()>;
        }
    }

    fn config(identity: Arc<FakeIdentity>, navigator: Arc<FakeNavigator>) -> SessionConfig {
        SessionConfig::builder()
            .domain("app.example.com")
            .redirect_url("https://host.example/")
            .identity(identity)
            .navigator(navigator)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn starts_loading_until_first_auth_determination() {
        let identity = FakeIdentity::new();
        let navigator = FakeNavigator::at("https://host.example/");
        let coordinator = SessionCoordinator::start(config(identity.clone(), navigator)).await;

        assert!(coordinator.is_loading());
        assert!(!coordinator.is_authenticated());

        let mut rx = coordinator.state();
        identity.push_auth_state(None);
        rx.changed().await.unwrap();

        assert!(!rx.borrow().loading);
        assert!(!coordinator.is_authenticated());
    }

    #[tokio::test]
    async fn mount_without_state_skips_exchange() {
        let identity = FakeIdentity::new();
        let navigator = FakeNavigator::at("https://host.example/app?tab=2");
        let _coordinator = SessionCoordinator::start(config(identity.clone(), navigator.clone())).await;

        assert!(identity.exchanged_tokens().is_empty());
        assert!(navigator.replacements().is_empty());
    }

    #[tokio::test]
    async fn mount_with_token_exchanges_and_strips_state() {
        let identity = FakeIdentity::new();
        let navigator = FakeNavigator::at(&format!(
            "https://host.example/app?tab=2&state={}",
            TOKEN_STATE
        ));
        let coordinator = SessionCoordinator::start(config(identity.clone(), navigator.clone())).await;

        assert_eq!(identity.exchanged_tokens(), vec!["abc".to_string()]);
        assert_eq!(
            navigator.replacements(),
            vec!["https://host.example/app?tab=2".to_string()]
        );

        let mut rx = coordinator.state();
        identity.push_auth_state(Some(AuthUser::new("u1")));
        rx.changed().await.unwrap();

        let state = rx.borrow().clone();
        assert!(!state.loading);
        assert!(state.is_authenticated());
        assert_eq!(state.user.unwrap().uid, "u1");
    }

    #[tokio::test]
    async fn malformed_state_is_ignored() {
        let identity = FakeIdentity::new();
        let navigator = FakeNavigator::at("https://host.example/app?state=%%%not-base64");
        let coordinator = SessionCoordinator::start(config(identity.clone(), navigator.clone())).await;

        assert!(identity.exchanged_tokens().is_empty());
        assert!(navigator.replacements().is_empty());

        let mut rx = coordinator.state();
        identity.push_auth_state(None);
        rx.changed().await.unwrap();
        assert!(!rx.borrow().loading);
    }

    #[tokio::test]
    async fn state_without_token_skips_exchange() {
        let identity = FakeIdentity::new();
        // base64(`{"redirectUrl":"X"}`)
        let navigator =
            FakeNavigator::at("https://host.example/app?state=eyJyZWRpcmVjdFVybCI6IlgifQ==");
        let _coordinator = SessionCoordinator::start(config(identity.clone(), navigator)).await;

        assert!(identity.exchanged_tokens().is_empty());
    }

    #[tokio::test]
    async fn rejected_token_leaves_page_usable() {
        let identity = FakeIdentity::rejecting_tokens();
        let navigator = FakeNavigator::at(&format!("https://host.example/app?state={}", TOKEN_STATE));
        let coordinator = SessionCoordinator::start(config(identity.clone(), navigator.clone())).await;

        assert_eq!(identity.exchanged_tokens(), vec!["abc".to_string()]);
        // State is only stripped after a successful exchange.
        assert!(navigator.replacements().is_empty());

        let mut rx = coordinator.state();
        identity.push_auth_state(None);
        rx.changed().await.unwrap();
        assert!(!coordinator.is_authenticated());

        // Redirect construction still works after the failure.
        assert!(coordinator
            .login_url(&RedirectOptions::default())
            .starts_with("https://app.example.com/sign-in?state="));
    }

    #[tokio::test]
    async fn register_url_matches_hosted_contract() {
        let coordinator = SessionCoordinator::start(config(
            FakeIdentity::new(),
            FakeNavigator::at("https://host.example/"),
        ))
        .await;

        assert_eq!(
            coordinator.register_url(&RedirectOptions::default()),
            "https://app.example.com/sign-up?state=eyJyZWRpcmVjdFVybCI6Imh0dHBzOi8vaG9zdC5leGFtcGxlLyJ9"
        );
        assert_eq!(
            coordinator.login_url(&RedirectOptions::default()),
            "https://app.example.com/sign-in?state=eyJyZWRpcmVjdFVybCI6Imh0dHBzOi8vaG9zdC5leGFtcGxlLyJ9"
        );
    }

    #[tokio::test]
    async fn login_with_redirect_navigates_and_emits() {
        let navigator = FakeNavigator::at("https://host.example/");
        let coordinator =
            SessionCoordinator::start(config(FakeIdentity::new(), navigator.clone())).await;
        let mut events = coordinator.events();

        let options = RedirectOptions {
            redirect_url: None,
            page: Some(HostedPage::SignUp),
        };
        coordinator.login_with_redirect(&options).unwrap();

        let navigations = navigator.navigations();
        assert_eq!(navigations.len(), 1);
        assert!(navigations[0].starts_with("https://app.example.com/sign-in?state="));

        match events.recv().await.unwrap() {
            SessionEvent::RedirectIssued { url } => assert_eq!(url, navigations[0]),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn logout_defaults_to_hosted_sign_in() {
        let identity = FakeIdentity::new();
        let navigator = FakeNavigator::at("https://host.example/");
        let coordinator = SessionCoordinator::start(config(identity.clone(), navigator.clone())).await;

        coordinator.logout(&LogoutOptions::default()).await.unwrap();

        assert_eq!(identity.sign_out_count(), 1);
        assert_eq!(
            navigator.navigations(),
            vec![
                "https://app.example.com/sign-in?state=eyJyZWRpcmVjdFVybCI6Imh0dHBzOi8vaG9zdC5leGFtcGxlLyJ9"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn logout_with_override_navigates_there() {
        let identity = FakeIdentity::new();
        let navigator = FakeNavigator::at("https://host.example/");
        let coordinator = SessionCoordinator::start(config(identity.clone(), navigator.clone())).await;

        let options = LogoutOptions {
            redirect_url: Some("https://host.example/bye".to_string()),
            no_redirect: false,
        };
        coordinator.logout(&options).await.unwrap();

        assert_eq!(
            navigator.navigations(),
            vec!["https://host.example/bye".to_string()]
        );
    }

    #[tokio::test]
    async fn logout_local_only_signs_out_without_navigating() {
        let identity = FakeIdentity::new();
        let navigator = FakeNavigator::at("https://host.example/");
        let coordinator = SessionCoordinator::start(config(identity.clone(), navigator.clone())).await;

        coordinator.logout(&LogoutOptions::local_only()).await.unwrap();

        assert_eq!(identity.sign_out_count(), 1);
        assert!(navigator.navigations().is_empty());
    }

    #[tokio::test]
    async fn logout_failure_propagates_and_skips_navigation() {
        let identity = FakeIdentity::failing_sign_out();
        let navigator = FakeNavigator::at("https://host.example/");
        let coordinator = SessionCoordinator::start(config(identity.clone(), navigator.clone())).await;

        let result = coordinator.logout(&LogoutOptions::default()).await;

        assert!(matches!(result, Err(SessionError::SignOutFailed(_))));
        assert!(navigator.navigations().is_empty());
    }

    #[tokio::test]
    async fn pending_logout_redirect_is_consumed_once() {
        let coordinator = SessionCoordinator::start(config(
            FakeIdentity::new(),
            FakeNavigator::at("https://host.example/"),
        ))
        .await;

        let options = LogoutOptions {
            redirect_url: Some("https://host.example/back".to_string()),
            no_redirect: true,
        };
        coordinator.logout(&options).await.unwrap();

        let first = coordinator.login_url(&RedirectOptions::default());
        let (_, blob) = first.split_once("?state=").unwrap();
        let intent: RedirectIntent = decode_state(blob).unwrap();
        assert_eq!(intent.redirect_url, "https://host.example/back");

        let second = coordinator.login_url(&RedirectOptions::default());
        let (_, blob) = second.split_once("?state=").unwrap();
        let intent: RedirectIntent = decode_state(blob).unwrap();
        assert_eq!(intent.redirect_url, "https://host.example/");
    }

    #[tokio::test]
    async fn explicit_redirect_beats_pending_logout_redirect() {
        let coordinator = SessionCoordinator::start(config(
            FakeIdentity::new(),
            FakeNavigator::at("https://host.example/"),
        ))
        .await;

        let options = LogoutOptions {
            redirect_url: Some("https://host.example/back".to_string()),
            no_redirect: true,
        };
        coordinator.logout(&options).await.unwrap();

        let url = coordinator.login_url(&RedirectOptions::with_redirect("https://host.example/a"));
        let (_, blob) = url.split_once("?state=").unwrap();
        let intent: RedirectIntent = decode_state(blob).unwrap();
        assert_eq!(intent.redirect_url, "https://host.example/a");

        // The pending destination was not consumed by the explicit call.
        let next = coordinator.login_url(&RedirectOptions::default());
        let (_, blob) = next.split_once("?state=").unwrap();
        let intent: RedirectIntent = decode_state(blob).unwrap();
        assert_eq!(intent.redirect_url, "https://host.example/back");
    }

    #[tokio::test]
    async fn auth_state_changes_flow_through_watch_and_events() {
        let identity = FakeIdentity::new();
        let coordinator = SessionCoordinator::start(config(
            identity.clone(),
            FakeNavigator::at("https://host.example/"),
        ))
        .await;
        let mut events = coordinator.events();
        let mut rx = coordinator.state();

        identity.push_auth_state(Some(AuthUser::new("u1")));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().user.as_ref().unwrap().uid, "u1");
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::AuthStateChanged {
                uid: Some("u1".to_string())
            }
        );

        identity.push_auth_state(None);
        rx.changed().await.unwrap();
        assert!(rx.borrow().user.is_none());
        assert!(!rx.borrow().loading);
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::AuthStateChanged { uid: None }
        );
    }

    #[tokio::test]
    async fn shutdown_closes_the_subscription() {
        let identity = FakeIdentity::new();
        let coordinator = SessionCoordinator::start(config(
            identity.clone(),
            FakeNavigator::at("https://host.example/"),
        ))
        .await;

        coordinator.shutdown();
        coordinator.shutdown(); // idempotent

        for _ in 0..50 {
            if identity.subscription_closed() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("subscription still open after shutdown");
    }

    #[tokio::test]
    async fn drop_closes_the_subscription() {
        let identity = FakeIdentity::new();
        let coordinator = SessionCoordinator::start(config(
            identity.clone(),
            FakeNavigator::at("https://host.example/"),
        ))
        .await;

        drop(coordinator);

        for _ in 0..50 {
            if identity.subscription_closed() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("subscription still open after drop");
    }

    #[tokio::test]
    async fn mount_reads_url_exactly_once() {
        let mut navigator = MockScriptedNavigator::new();
        navigator
            .expect_current_url()
            .times(1)
            .returning(|| Ok("https://host.example/".to_string()));
        navigator.expect_replace_url().never();
        navigator.expect_navigate().never();

        let config = SessionConfig::builder()
            .domain("app.example.com")
            .redirect_url("https://host.example/")
            .identity(FakeIdentity::new())
            .navigator(Arc::new(navigator))
            .build()
            .unwrap();

        let coordinator = SessionCoordinator::start(config).await;
        coordinator.shutdown();
    }
}
