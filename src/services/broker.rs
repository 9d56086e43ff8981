//! The message broker: the only writer of durable state and the single
//! dispatch point for every context request.
//!
//! Each accepted request produces exactly one [`Response`]. Handler
//! failures never escape as panics or dropped channels; they are folded
//! into the response envelope with `success: false`.

use std::sync::Arc;

use anyhow::bail;

use crate::config::SettingsPatch;
use crate::domain::{EmailData, Feedback, Request, Response, Sender, TrustListKind};
use crate::providers::{
    AnalysisApi, AuthToken, ExtractionBridge, HostSurface, IdentityError, IdentityFlow,
    OAuthProvider,
};
use crate::services::StatusService;
use crate::storage::{StorageBackend, StorageLayer, StoreArea};

/// The background coordination core.
///
/// Owns the storage layer, the outbound capability handles, and status
/// presentation. UI contexts hold no state of their own; everything they
/// display comes back through [`Broker::handle`].
pub struct Broker<B: StorageBackend> {
    backend: Arc<B>,
    stores: StorageLayer<B>,
    api: Arc<dyn AnalysisApi>,
    bridge: Arc<ExtractionBridge>,
    host: Arc<dyn HostSurface>,
    status: StatusService,
    identity: Option<Arc<dyn IdentityFlow>>,
}

impl<B: StorageBackend> Broker<B> {
    pub fn new(
        backend: Arc<B>,
        api: Arc<dyn AnalysisApi>,
        bridge: Arc<ExtractionBridge>,
        host: Arc<dyn HostSurface>,
    ) -> Self {
        Self {
            stores: StorageLayer::new(backend.clone()),
            backend,
            api,
            bridge,
            status: StatusService::new(host.clone()),
            host,
            identity: None,
        }
    }

    /// Installs the host's interactive OAuth flow. Without one, OAuth
    /// requests fail with a caller-visible error.
    pub fn with_identity(mut self, identity: Arc<dyn IdentityFlow>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn stores(&self) -> &StorageLayer<B> {
        &self.stores
    }

    pub fn bridge(&self) -> &Arc<ExtractionBridge> {
        &self.bridge
    }

    /// Handles one raw wire payload.
    ///
    /// Payloads without a recognized `type` tag are rejected with an
    /// explicit error response, never silently dropped.
    pub async fn handle_raw(&self, payload: serde_json::Value, sender: Sender) -> Response {
        match Request::from_value(payload) {
            Ok(request) => self.handle(request, sender).await,
            Err(e) => {
                tracing::warn!("rejected undecodable request: {e}");
                Response::err(e.to_string())
            }
        }
    }

    /// Handles one typed request and always returns a response envelope.
    pub async fn handle(&self, request: Request, sender: Sender) -> Response {
        let kind = request.kind();
        tracing::debug!(kind, context = ?sender.context, "handling request");

        let result = match request {
            Request::AnalyzeEmail { email_data } => self.analyze_email(email_data).await,
            Request::GetCurrentEmail => self.get_current_email(sender).await,
            Request::SubmitFeedback { feedback } => self.submit_feedback(feedback).await,
            Request::OauthAuthorize { provider } => self.oauth_authorize(&provider).await,
            Request::GetSettings => self.get_settings().await,
            Request::UpdateSettings { settings } => self.update_settings(settings).await,
            Request::AddToTrustlist { list_type, email } => {
                self.add_to_trustlist(list_type, &email).await
            }
            Request::RemoveFromTrustlist { list_type, email } => {
                self.remove_from_trustlist(list_type, &email).await
            }
            Request::GetTrustlists => self.get_trustlists().await,
            Request::GetStatistics => self.get_statistics().await,
            Request::ShowNotification { title, message } => {
                self.show_notification(&title, &message).await
            }
            Request::OpenPopup => self.open_popup().await,
        };

        match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(kind, "request failed: {e:#}");
                Response::err(e.to_string())
            }
        }
    }

    /// Scores an email via the remote service, caches the result, and
    /// pulses the badge.
    ///
    /// On failure nothing is cached and the badge is left untouched, so a
    /// stale "safe" indicator can never outlive a failed re-analysis.
    async fn analyze_email(&self, email_data: EmailData) -> anyhow::Result<Response> {
        let settings = self.stores.settings().get().await?;
        let result = self.api.analyze(&email_data, &settings.api_url).await?;

        self.stores.cache().put(result.clone(), email_data).await?;
        self.status
            .present(result.risk_level, settings.show_notifications)
            .await;

        Ok(Response::ok(result))
    }

    async fn get_current_email(&self, sender: Sender) -> anyhow::Result<Response> {
        let Some(tab_id) = sender.tab_id else {
            bail!("Request has no originating tab");
        };

        let email = self.bridge.extract_from_tab(tab_id).await?;
        Ok(Response::ok(email))
    }

    async fn submit_feedback(&self, feedback: Feedback) -> anyhow::Result<Response> {
        if feedback.message_id.trim().is_empty() {
            bail!("Feedback requires a message_id");
        }

        let settings = self.stores.settings().get().await?;
        let ack = self
            .api
            .submit_feedback(&feedback, &settings.api_url)
            .await?;
        Ok(Response::ok(ack))
    }

    /// Runs the host's interactive OAuth flow and persists the resulting
    /// token under `oauth_<provider>` with a one-hour expiry.
    async fn oauth_authorize(&self, provider: &str) -> anyhow::Result<Response> {
        let provider: OAuthProvider = provider.parse()?;
        let Some(identity) = &self.identity else {
            return Err(IdentityError::NotAvailable.into());
        };

        let raw = identity.acquire_token(provider).await?;
        let token = AuthToken::new(raw, provider);

        self.backend
            .set(
                StoreArea::Local,
                &provider.token_key(),
                serde_json::to_value(&token)?,
            )
            .await?;

        Ok(Response::ok(token))
    }

    async fn get_settings(&self) -> anyhow::Result<Response> {
        Ok(Response::ok(self.stores.settings().get().await?))
    }

    async fn update_settings(&self, patch: SettingsPatch) -> anyhow::Result<Response> {
        self.stores.settings().update(&patch).await?;
        Ok(Response::ack())
    }

    async fn add_to_trustlist(&self, kind: TrustListKind, email: &str) -> anyhow::Result<Response> {
        self.stores.trust().add(kind, email).await?;
        Ok(Response::ack())
    }

    async fn remove_from_trustlist(
        &self,
        kind: TrustListKind,
        email: &str,
    ) -> anyhow::Result<Response> {
        self.stores.trust().remove(kind, email).await?;
        Ok(Response::ack())
    }

    async fn get_trustlists(&self) -> anyhow::Result<Response> {
        Ok(Response::ok(self.stores.trust().get_all().await?))
    }

    async fn get_statistics(&self) -> anyhow::Result<Response> {
        Ok(Response::ok(self.stores.cache().stats().await?))
    }

    async fn show_notification(&self, title: &str, message: &str) -> anyhow::Result<Response> {
        self.host.show_notification(title, message).await?;
        Ok(Response::ack())
    }

    async fn open_popup(&self) -> anyhow::Result<Response> {
        self.host.open_popup().await?;
        Ok(Response::ack())
    }
}

impl<B: StorageBackend> std::fmt::Debug for Broker<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker").finish_non_exhaustive()
    }
}
