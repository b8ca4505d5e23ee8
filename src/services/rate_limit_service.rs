use crate::config::{RateLimitConfig, ServerConfig};
use axum::http::HeaderMap;
use dashmap::DashMap;
use ipnetwork::IpNetwork;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

#[derive(Clone, Debug)]
struct Metrics {
    decisions_total: Counter<u64>,
    tracked_clients_purged: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("mensageria-server");
        Self {
            decisions_total: meter
                .u64_counter("rate_limit_decisions_total")
                .with_description("Rate limit decisions (allowed/throttled)")
                .build(),
            tracked_clients_purged: meter
                .u64_counter("rate_limit_clients_purged_total")
                .with_description("Client windows dropped after going idle")
                .build(),
        }
    }
}

/// Outcome of charging one request against a client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// Rejected; the oldest counted request leaves the window after this long.
    Throttled { retry_after: Duration },
}

/// Per-IP sliding-window log: a client may have at most `quota` requests
/// admitted inside any `window`-long span.
#[derive(Clone, Debug)]
pub struct RateLimitService {
    quota: usize,
    window: Duration,
    trusted_proxies: Arc<[IpNetwork]>,
    // Admission instants per client, oldest first, never more than `quota` long.
    windows: Arc<DashMap<IpAddr, VecDeque<Instant>>>,
    metrics: Metrics,
}

impl RateLimitService {
    #[must_use]
    pub fn new(limits: &RateLimitConfig, server: &ServerConfig) -> Self {
        Self {
            quota: usize::try_from(limits.requests).unwrap_or(usize::MAX).max(1),
            window: Duration::from_secs(limits.window_secs.max(1)),
            trusted_proxies: server.trusted_proxies.clone().into(),
            windows: Arc::new(DashMap::new()),
            metrics: Metrics::new(),
        }
    }

    /// Client address for limiting. `X-Forwarded-For` is honoured only when the
    /// peer is a trusted proxy; then the rightmost untrusted hop is the client.
    #[must_use]
    pub fn client_ip(&self, headers: &HeaderMap, peer_addr: IpAddr) -> IpAddr {
        if !self.is_trusted(peer_addr) {
            return peer_addr;
        }

        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|chain| {
                chain.rsplit(',').filter_map(|hop| hop.trim().parse::<IpAddr>().ok()).find(|ip| !self.is_trusted(*ip))
            })
            .unwrap_or(peer_addr)
    }

    fn is_trusted(&self, ip: IpAddr) -> bool {
        self.trusted_proxies.iter().any(|net| net.contains(ip))
    }

    /// Charges one request for `client` and records the decision.
    pub fn check(&self, client: IpAddr) -> Decision {
        let decision = self.check_at(client, Instant::now());

        let label = match decision {
            Decision::Allowed => "allowed",
            Decision::Throttled { retry_after } => {
                tracing::warn!(client = %client, retry_after_secs = retry_after.as_secs(), "Rate limit exceeded");
                "throttled"
            }
        };
        self.metrics.decisions_total.add(1, &[KeyValue::new("status", label)]);

        decision
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> Decision {
        let mut log = self.windows.entry(client).or_default();

        while log.front().is_some_and(|&at| now.saturating_duration_since(at) >= self.window) {
            log.pop_front();
        }

        if log.len() < self.quota {
            log.push_back(now);
            return Decision::Allowed;
        }

        // Full log: the front entry is still inside the window.
        let oldest = log.front().copied().unwrap_or(now);
        Decision::Throttled { retry_after: self.window.saturating_sub(now.saturating_duration_since(oldest)) }
    }

    /// Drops clients whose every admission has left the window.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, log| log.back().is_some_and(|&at| now.saturating_duration_since(at) < self.window));
        let purged = before.saturating_sub(self.windows.len());

        if purged > 0 {
            self.metrics.tracked_clients_purged.add(u64::try_from(purged).unwrap_or(u64::MAX), &[]);
            tracing::debug!(purged, remaining = self.windows.len(), "Purged idle rate limit windows");
        }
        purged
    }

    /// Sweeps idle client windows once per window length until shutdown.
    pub fn spawn_janitor(&self, mut shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(service.window);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        service.purge_expired();
                    }
                    _ = shutdown.wait_for(|&s| s) => break,
                }
            }
        })
    }
}
