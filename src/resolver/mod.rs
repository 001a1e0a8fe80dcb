//! Redirect resolution
//!
//! Follows an initial URL through server redirects and delayed script-driven
//! navigation until the chain settles or the poll budget runs out.
//!
//! Resolution is a small state machine over [`ResolvePhase`]. Each transition
//! performs one blocking wait (a navigation, a poll interval or the network
//! idle wait), so a [`VirtualClock`](crate::clock::VirtualClock) can drive it
//! without real delays.

use crate::clock::Clock;
use crate::config::ResolverConfig;
use crate::driver::{Navigator, WaitPolicy};
use crate::model::RedirectTrace;
use crate::state::ResolvePhase;
use std::time::Duration;

/// Timing knobs for one resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Length of the polling window
    pub max_wait: Duration,

    /// Delay between two observations of the current URL
    pub poll_interval: Duration,

    /// Bound on the final network quiescence wait
    pub network_idle_timeout: Duration,
}

impl ResolverSettings {
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            max_wait: Duration::from_secs(config.max_wait_seconds),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            network_idle_timeout: Duration::from_millis(config.network_idle_timeout_ms),
        }
    }

    /// Number of polls in the window, rounded up
    pub fn poll_count(&self) -> u64 {
        let window = self.max_wait.as_millis() as u64;
        let interval = (self.poll_interval.as_millis() as u64).max(1);
        window.div_ceil(interval)
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

/// Resolves initial URLs to stable final URLs on one navigation handle
///
/// The handle is reused across calls. `resolve` takes `&mut self`, so calls on
/// the same handle are serialized by construction.
pub struct RedirectResolver<N, C> {
    navigator: N,
    clock: C,
    settings: ResolverSettings,
}

impl<N: Navigator, C: Clock> RedirectResolver<N, C> {
    pub fn new(navigator: N, clock: C, settings: ResolverSettings) -> Self {
        Self {
            navigator,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Gives the handle back, e.g. to reuse it for content fetches
    pub fn into_navigator(self) -> N {
        self.navigator
    }

    /// Resolves `initial_url` with the configured settings
    pub async fn resolve(&mut self, initial_url: &str) -> RedirectTrace {
        let settings = self.settings;
        self.run(initial_url, settings).await
    }

    /// Resolves `initial_url` with an explicit polling window
    ///
    /// # Arguments
    ///
    /// * `initial_url` - The URL captured from the popup
    /// * `max_wait_seconds` - Length of the polling window
    /// * `poll_interval_ms` - Delay between two URL observations
    ///
    /// # Returns
    ///
    /// A trace whose chain starts with `initial_url`. A failed initial
    /// navigation yields a single-element chain and an error message.
    pub async fn resolve_with(
        &mut self,
        initial_url: &str,
        max_wait_seconds: u64,
        poll_interval_ms: u64,
    ) -> RedirectTrace {
        let settings = ResolverSettings {
            max_wait: Duration::from_secs(max_wait_seconds),
            poll_interval: Duration::from_millis(poll_interval_ms),
            network_idle_timeout: self.settings.network_idle_timeout,
        };
        self.run(initial_url, settings).await
    }

    async fn run(&mut self, initial_url: &str, settings: ResolverSettings) -> RedirectTrace {
        let mut chain = vec![initial_url.to_string()];
        let mut polls_left = settings.poll_count();
        let mut error = None;
        let mut phase = ResolvePhase::Navigating;

        while !phase.is_terminal() {
            let next = match phase {
                ResolvePhase::Navigating => {
                    match self
                        .navigator
                        .navigate(initial_url, WaitPolicy::DomContentLoaded)
                        .await
                    {
                        Ok(()) => {
                            self.observe(&mut chain).await;
                            ResolvePhase::Polling
                        }
                        Err(e) => {
                            error = Some(e.to_string());
                            ResolvePhase::Failed
                        }
                    }
                }
                ResolvePhase::Polling if polls_left == 0 => ResolvePhase::Stabilizing,
                ResolvePhase::Polling => {
                    self.clock.sleep(settings.poll_interval).await;
                    polls_left -= 1;
                    self.observe(&mut chain).await;
                    ResolvePhase::Polling
                }
                ResolvePhase::Stabilizing => {
                    if let Err(e) = self
                        .navigator
                        .wait_for_network_idle(settings.network_idle_timeout)
                        .await
                    {
                        tracing::debug!("Network did not settle for {}: {}", initial_url, e);
                    }
                    self.observe(&mut chain).await;
                    ResolvePhase::Done
                }
                ResolvePhase::Done | ResolvePhase::Failed => phase,
            };

            if next != phase {
                tracing::trace!("Resolve {}: {} -> {}", initial_url, phase, next);
            }
            phase = next;
        }

        if phase == ResolvePhase::Failed {
            let message = error.unwrap_or_else(|| "navigation failed".to_string());
            tracing::warn!("Could not resolve {}: {}", initial_url, message);
            return RedirectTrace::failed(initial_url, message);
        }

        let page_title = match self.navigator.page_title().await {
            Ok(title) => title,
            Err(e) => {
                tracing::debug!("No title for {}: {}", initial_url, e);
                None
            }
        };

        let final_url = chain.last().cloned().unwrap_or_else(|| initial_url.to_string());
        tracing::debug!(
            "Resolved {} -> {} ({} redirects)",
            initial_url,
            final_url,
            chain.len() - 1
        );

        RedirectTrace {
            initial_url: initial_url.to_string(),
            chain,
            final_url,
            success: true,
            error_message: None,
            page_title,
        }
    }

    /// Appends the current URL to the chain if it differs from the last entry
    async fn observe(&mut self, chain: &mut Vec<String>) {
        match self.navigator.current_url().await {
            Ok(url) => {
                if chain.last() != Some(&url) && !url.is_empty() {
                    tracing::debug!("Redirect observed: {}", url);
                    chain.push(url);
                }
            }
            Err(e) => tracing::debug!("Could not read current URL: {}", e),
        }
    }
}
