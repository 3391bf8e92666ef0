/// Session liveness tracking
///
/// Drives the server-side heartbeat for authenticated sessions: ping after
/// a quiet interval, close when the client stays silent past the idle
/// window or never answers a ping.
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct LivenessConfig {
    /// Quiet time before the server sends a ping
    pub heartbeat_interval: Duration,
    /// No client activity past this window closes the session
    pub idle_timeout: Duration,
    /// Time allowed for a pong after a ping was sent
    pub pong_timeout: Duration,
}

impl LivenessConfig {
    pub fn new(heartbeat_secs: u64, idle_timeout_secs: u64) -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(heartbeat_secs),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
            pong_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug)]
pub struct LivenessTracker {
    last_activity: Instant,
    pending_ping: Option<Instant>,
    config: LivenessConfig,
}

/// What the session loop should do on a liveness tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessAction {
    Healthy,
    SendPing,
    Close,
}

impl LivenessTracker {
    pub fn new(config: LivenessConfig) -> Self {
        Self {
            last_activity: Instant::now(),
            pending_ping: None,
            config,
        }
    }

    /// Any inbound frame counts as activity and clears a pending ping
    pub fn record_activity(&mut self) {
        self.last_activity = Instant::now();
        self.pending_ping = None;
    }

    /// Note that a ping went out
    pub fn record_ping(&mut self) {
        self.pending_ping = Some(Instant::now());
    }

    /// Evaluate the session on a periodic tick
    pub fn check(&self) -> LivenessAction {
        if self.last_activity.elapsed() > self.config.idle_timeout {
            return LivenessAction::Close;
        }
        if let Some(pinged_at) = self.pending_ping {
            if pinged_at.elapsed() > self.config.pong_timeout {
                return LivenessAction::Close;
            }
            return LivenessAction::Healthy;
        }
        if self.last_activity.elapsed() > self.config.heartbeat_interval {
            return LivenessAction::SendPing;
        }
        LivenessAction::Healthy
    }
}
