// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Dev-server launching
//!
//! A serve target is started as a nested sub-task. The pipeline waits for
//! its first readiness event only; the rest of the event stream is
//! abandoned and the server deliberately keeps running past pipeline
//! completion. Shutting it down belongs to the surrounding process
//! lifecycle, not to this pipeline.

mod command;

pub use command::CommandServiceProvider;

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::config::{baseurl, ComputedFields, RunOptions, TargetRef};
use crate::errors::{E2eflowError, E2eflowResult};
use crate::pipeline::Stage;

/// How long the pipeline waits for the first readiness event
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(120);

/// Caller overrides applied on top of target defaults; overrides always win
#[derive(Debug, Clone)]
pub struct ServeOverrides {
    /// Requested bind host
    pub host: String,
    /// Pinned port, when explicitly provided
    pub port: Option<u16>,
    /// Continuous-watch mode; forced off for one-shot test runs
    pub watch: bool,
}

/// One event emitted by a launched service. The payload is opaque JSON;
/// typed accessors pull out the fields this pipeline consumes.
#[derive(Debug, Clone)]
pub struct ServiceEvent {
    pub success: bool,
    pub result: serde_json::Value,
}

impl ServiceEvent {
    /// Successful readiness event carrying the bound port and whether the
    /// target declared itself TLS
    pub fn ready(port: u16, tls: bool) -> Self {
        Self {
            success: true,
            result: serde_json::json!({ "port": port, "tls": tls }),
        }
    }

    /// Failure event with a human-readable detail
    pub fn failed(detail: impl Into<String>) -> Self {
        let detail: String = detail.into();
        Self {
            success: false,
            result: serde_json::json!({ "detail": detail }),
        }
    }

    /// Port reported by the service, when present in the payload
    pub fn port(&self) -> Option<u16> {
        self.result
            .get("port")
            .and_then(serde_json::Value::as_u64)
            .and_then(|p| u16::try_from(p).ok())
    }

    /// Whether the service declared itself TLS; absent means plain HTTP
    pub fn tls(&self) -> bool {
        self.result
            .get("tls")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }

    /// Failure detail, when present in the payload
    pub fn detail(&self) -> Option<&str> {
        self.result.get("detail").and_then(serde_json::Value::as_str)
    }
}

/// Handle onto a launched service's event stream
#[derive(Debug)]
pub struct ServiceHandle {
    events: mpsc::Receiver<ServiceEvent>,
}

impl ServiceHandle {
    pub fn new(events: mpsc::Receiver<ServiceEvent>) -> Self {
        Self { events }
    }

    /// Receive the next event; `None` means the service hung up without
    /// ever reporting readiness
    pub async fn next_event(&mut self) -> Option<ServiceEvent> {
        self.events.recv().await
    }
}

/// Provider of launchable sub-services.
///
/// `start` resolves the target reference into a runnable description,
/// validates the combined configuration, and launches it. Implementations
/// must leave the service running when the returned handle is dropped.
#[async_trait]
pub trait ServiceProvider: Send + Sync {
    async fn start(
        &self,
        target: &TargetRef,
        overrides: &ServeOverrides,
        root: &Path,
    ) -> E2eflowResult<ServiceHandle>;
}

/// Pipeline stage that launches the dev server and records the base URL
pub struct DevServerStage<P: ServiceProvider> {
    provider: P,
}

impl<P: ServiceProvider> DevServerStage<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: ServiceProvider> Stage for DevServerStage<P> {
    fn name(&self) -> &str {
        "dev-server"
    }

    fn enabled(&self, opts: &RunOptions) -> bool {
        opts.dev_server.is_some()
    }

    async fn run(&self, opts: &RunOptions, computed: &mut ComputedFields) -> E2eflowResult<()> {
        // enabled() gates on this being present
        let Some(target) = opts.dev_server.as_ref() else {
            return Ok(());
        };

        let overrides = ServeOverrides {
            host: opts.host.clone(),
            port: opts.port,
            watch: false,
        };

        let mut handle = self.provider.start(target, &overrides, &opts.root).await?;

        let event = tokio::time::timeout(READINESS_TIMEOUT, handle.next_event())
            .await
            .map_err(|_| E2eflowError::ServiceStartFailure {
                target: target.to_string(),
                detail: format!(
                    "no readiness event within {}s",
                    READINESS_TIMEOUT.as_secs()
                ),
                help: None,
            })?
            .ok_or_else(|| E2eflowError::ServiceStartFailure {
                target: target.to_string(),
                detail: "service stopped before reporting readiness".to_string(),
                help: None,
            })?;

        if !event.success {
            // A failed event must not record anything
            return Err(E2eflowError::ServiceStartFailure {
                target: target.to_string(),
                detail: event.detail().unwrap_or("service reported failure").to_string(),
                help: None,
            });
        }

        // TLS comes from either side: the --tls flag or the target's own
        // declaration, reported back in the readiness event.
        let tls = opts.tls || event.tls();

        let base_url = if let Some(ref public_host) = opts.public_host {
            baseurl::normalize_public_address(public_host, tls)
        } else {
            let port = event.port().or(opts.port).ok_or_else(|| {
                E2eflowError::ServiceStartFailure {
                    target: target.to_string(),
                    detail: "readiness event carried no port and none was configured".to_string(),
                    help: Some("Set 'port' on the serve target or pass --port".to_string()),
                }
            })?;
            // The originally requested host is used here, not whatever host
            // the service ended up binding.
            baseurl::synthesize_base_url(&opts.host, port, tls)
        };

        tracing::info!(%base_url, server = %target, "dev server ready");
        computed.record_base_url(base_url)?;

        // Dropping the handle abandons the remaining events; the server
        // stays up for the run stage to hit.
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::StubProvider;
    use super::*;
    use std::str::FromStr;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn opts_with_server() -> RunOptions {
        RunOptions {
            dev_server: Some(TargetRef::from_str("app:serve:production").unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn records_synthesized_base_url_on_readiness() {
        let stage = DevServerStage::new(StubProvider::ready(4200));
        let mut computed = ComputedFields::default();

        stage.run(&opts_with_server(), &mut computed).await.unwrap();
        assert_eq!(computed.base_url(), Some("http://localhost:4200"));
    }

    #[tokio::test]
    async fn base_url_uses_original_host_not_reported_host() {
        // The provider payload may carry a different host than requested;
        // the synthesized URL intentionally sticks to the original option.
        let provider = StubProvider {
            event: Some(ServiceEvent {
                success: true,
                result: serde_json::json!({ "port": 4200, "host": "0.0.0.0" }),
            }),
            starts: Arc::new(AtomicUsize::new(0)),
        };
        let stage = DevServerStage::new(provider);
        let mut computed = ComputedFields::default();

        stage.run(&opts_with_server(), &mut computed).await.unwrap();
        assert_eq!(computed.base_url(), Some("http://localhost:4200"));
    }

    #[tokio::test]
    async fn public_host_override_is_used_verbatim() {
        let stage = DevServerStage::new(StubProvider::ready(4200));
        let mut computed = ComputedFields::default();
        let opts = RunOptions {
            public_host: Some("example.com".to_string()),
            ..opts_with_server()
        };

        stage.run(&opts, &mut computed).await.unwrap();
        assert_eq!(computed.base_url(), Some("http://example.com"));
    }

    #[tokio::test]
    async fn tls_flag_selects_https_for_bare_override() {
        let stage = DevServerStage::new(StubProvider::ready(4200));
        let mut computed = ComputedFields::default();
        let opts = RunOptions {
            public_host: Some("example.com".to_string()),
            tls: true,
            ..opts_with_server()
        };

        stage.run(&opts, &mut computed).await.unwrap();
        assert_eq!(computed.base_url(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn failed_event_records_nothing() {
        let stage = DevServerStage::new(StubProvider::failing("bind refused"));
        let mut computed = ComputedFields::default();

        let err = stage.run(&opts_with_server(), &mut computed).await.unwrap_err();
        assert!(matches!(err, E2eflowError::ServiceStartFailure { .. }));
        assert!(computed.base_url().is_none());
    }

    #[tokio::test]
    async fn hang_up_before_readiness_is_start_failure() {
        let stage = DevServerStage::new(StubProvider::hang_up());
        let mut computed = ComputedFields::default();

        let err = stage.run(&opts_with_server(), &mut computed).await.unwrap_err();
        assert!(matches!(err, E2eflowError::ServiceStartFailure { .. }));
    }

    #[tokio::test]
    async fn stage_disabled_without_dev_server() {
        let stage = DevServerStage::new(StubProvider::ready(4200));
        assert!(!stage.enabled(&RunOptions::default()));
        assert!(stage.enabled(&opts_with_server()));
    }

    #[tokio::test]
    async fn target_reported_tls_selects_https() {
        // The target declared tls in the workspace file; no --tls flag.
        let provider = StubProvider {
            event: Some(ServiceEvent::ready(4200, true)),
            starts: Arc::new(AtomicUsize::new(0)),
        };
        let stage = DevServerStage::new(provider);
        let mut computed = ComputedFields::default();

        stage.run(&opts_with_server(), &mut computed).await.unwrap();
        assert_eq!(computed.base_url(), Some("https://localhost:4200"));
    }

    #[tokio::test]
    async fn pinned_port_fallback_when_event_has_none() {
        let provider = StubProvider {
            event: Some(ServiceEvent {
                success: true,
                result: serde_json::json!({}),
            }),
            starts: Arc::new(AtomicUsize::new(0)),
        };
        let stage = DevServerStage::new(provider);
        let mut computed = ComputedFields::default();
        let opts = RunOptions {
            port: Some(4444),
            ..opts_with_server()
        };

        stage.run(&opts, &mut computed).await.unwrap();
        assert_eq!(computed.base_url(), Some("http://localhost:4444"));
    }
}
