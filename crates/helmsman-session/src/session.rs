//! Instance session: the content and control clients of one remote instance.

use std::sync::Arc;

use helmsman_cdp::{CdpClient, CdpError, discover_targets};
use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::action::ActionResult;
use crate::error::SessionError;
use crate::health::{HealthCheck, HealthCheckError};
use crate::options::SessionOptions;
use crate::rules::{TargetRole, TargetSelection};

/// Event signalling that a navigation finished loading.
const LOAD_EVENT: &str = "Page.loadEventFired";

/// Two protocol clients to one remote process: the content view showing
/// the external site and the control view hosting the application shell.
///
/// Created empty, populated by [`connect`](Self::connect), emptied by
/// [`disconnect`](Self::disconnect). Both handles are present or neither is.
pub struct InstanceSession {
    options: SessionOptions,
    content: Option<CdpClient>,
    control: Option<CdpClient>,
    health_checker: Option<Arc<dyn HealthCheck>>,
}

impl InstanceSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            content: None,
            control: None,
            health_checker: None,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Install or clear the hook run after every evaluation.
    pub fn set_health_checker(&mut self, checker: Option<Arc<dyn HealthCheck>>) {
        self.health_checker = checker;
    }

    /// True only when both clients exist and are individually connected.
    pub fn is_connected(&self) -> bool {
        matches!(
            (&self.content, &self.control),
            (Some(content), Some(control)) if content.is_connected() && control.is_connected()
        )
    }

    pub fn content(&self) -> Option<&CdpClient> {
        self.content.as_ref()
    }

    pub fn control(&self) -> Option<&CdpClient> {
        self.control.as_ref()
    }

    /// Wait for both views to appear, then open one client per view.
    ///
    /// Either both clients end up connected or none is kept.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        if self.is_connected() {
            debug!("Session on port {} already connected", self.options.client.port);
            return Ok(());
        }
        // Drop whatever survived a previous crash.
        self.disconnect().await;

        info!("Connecting session on port {}", self.options.client.port);
        let selection = self.await_targets().await?;
        let (Some(content_target), Some(control_target)) = (selection.content, selection.control)
        else {
            return Err(SessionError::NotConnected);
        };

        let content = CdpClient::connect(&self.options.client, &content_target.id).await?;
        let control = match CdpClient::connect(&self.options.client, &control_target.id).await {
            Ok(control) => control,
            Err(e) => {
                warn!(
                    "Control view {} failed to connect, releasing content view: {}",
                    control_target.id, e
                );
                content.disconnect().await;
                return Err(e.into());
            }
        };

        self.content = Some(content);
        self.control = Some(control);
        info!(
            "Session connected (content {}, control {})",
            content_target.id, control_target.id
        );
        Ok(())
    }

    /// Poll discovery until both views are listed or the deadline passes.
    async fn await_targets(&self) -> Result<TargetSelection, SessionError> {
        let client = &self.options.client;
        let deadline = Instant::now() + self.options.connect_deadline;

        let (missing, observed) = loop {
            let (missing, observed) = match discover_targets(client.port, &client.host).await {
                Ok(targets) => {
                    let selection = self.options.rules.select(&targets);
                    if selection.content.is_some() && selection.control.is_some() {
                        return Ok(selection);
                    }
                    (selection.missing(), selection.observed)
                }
                Err(e) => {
                    debug!("Discovery on port {} failed: {}", client.port, e);
                    (vec![TargetRole::Content, TargetRole::Control], 0)
                }
            };
            debug!(
                "Port {}: {} target(s), still waiting for {:?}",
                client.port, observed, missing
            );

            let now = Instant::now();
            if now >= deadline {
                break (missing, observed);
            }
            tokio::time::sleep(self.options.poll_interval.min(deadline - now)).await;
        };

        warn!(
            "Gave up on port {} after {:?}: missing {:?}, {} target(s) observed",
            client.port, self.options.connect_deadline, missing, observed
        );
        Err(SessionError::NotRunning { missing, observed })
    }

    /// Tear down both clients. Safe on a disconnected session.
    pub async fn disconnect(&mut self) {
        let clients = [self.content.take(), self.control.take()];
        for client in clients.into_iter().flatten() {
            client.disconnect().await;
        }
    }

    /// Navigate the content view to a profile page and wait for it to load.
    pub async fn navigate_to_profile(&self, url: &str) -> Result<(), SessionError> {
        if !self.options.rules.is_profile_url(url) {
            return Err(SessionError::InvalidTargetUrl(url.to_string()));
        }
        let content = self.content.as_ref().ok_or(SessionError::NotConnected)?;

        content.send("Page.enable", None).await?;
        let loaded = content.event_waiter(LOAD_EVENT);
        content.navigate(url).await?;
        loaded.wait().await?;

        info!("Profile loaded: {}", url);
        Ok(())
    }

    /// Ask the application shell to run `action` with `config` (defaults to
    /// `{}`) and wait for it to finish.
    pub async fn execute_action(
        &self,
        action: &str,
        config: Option<Value>,
    ) -> Result<ActionResult, SessionError> {
        let expression = self.bridge_expression(action, config.unwrap_or_else(|| json!({})));
        debug!("Executing action {}", action);

        let outcome = match self.control.as_ref() {
            Some(control) => {
                control
                    .evaluate_with_timeout(&expression, true, self.options.action_timeout)
                    .await
            }
            None => Err(CdpError::NotConnected),
        };

        match outcome {
            Ok(_) => {
                self.run_health_check().await?;
                info!("Action {} completed", action);
                Ok(ActionResult::succeeded(action))
            }
            Err(source) => {
                if source.is_timeout() {
                    self.run_health_check().await?;
                }
                warn!("Action {} failed: {}", action, source);
                Err(SessionError::ActionExecution {
                    action: action.to_string(),
                    message: source.to_string(),
                    source,
                })
            }
        }
    }

    /// Evaluate `expression` in the control view.
    pub async fn evaluate_ui(&self, expression: &str, await_result: bool) -> Result<Value, SessionError> {
        let control = self.control.as_ref().ok_or(SessionError::NotConnected)?;

        match control.evaluate(expression, await_result).await {
            Ok(value) => {
                self.run_health_check().await?;
                Ok(value)
            }
            Err(e) => {
                if e.is_timeout() {
                    self.run_health_check().await?;
                }
                Err(e.into())
            }
        }
    }

    fn bridge_expression(&self, action: &str, config: Value) -> String {
        format!(
            "{}({}, {})",
            self.options.bridge_function,
            Value::String(action.to_string()),
            config
        )
    }

    /// Only a `UiBlocked` verdict escapes; any other failure, including the
    /// hook overrunning its budget, is logged and dropped.
    async fn run_health_check(&self) -> Result<(), SessionError> {
        let Some(checker) = self.health_checker.as_ref() else {
            return Ok(());
        };

        match tokio::time::timeout(self.options.health_check_timeout, checker.check()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(HealthCheckError::UiBlocked(reason))) => {
                warn!("Health check reports blocked UI: {}", reason);
                Err(SessionError::UiBlocked(reason))
            }
            Ok(Err(e)) => {
                warn!("Ignoring health check failure: {}", e);
                Ok(())
            }
            Err(_) => {
                warn!(
                    "Ignoring health check that exceeded {:?}",
                    self.options.health_check_timeout
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
