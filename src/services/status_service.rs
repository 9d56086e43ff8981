//! Status presentation: badge pulses and risk notifications.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::RiskLevel;
use crate::providers::HostSurface;

/// How long a badge pulse stays visible.
pub const BADGE_CLEAR_DELAY: Duration = Duration::from_secs(10);

/// Badge text and background color for one risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeStyle {
    pub text: &'static str,
    pub color: &'static str,
}

/// Pure mapping from risk level to badge appearance.
pub fn badge_style(level: RiskLevel) -> BadgeStyle {
    match level {
        RiskLevel::Safe => BadgeStyle {
            text: "✓",
            color: "#4CAF50",
        },
        RiskLevel::Low => BadgeStyle {
            text: "!",
            color: "#FF9800",
        },
        RiskLevel::Medium => BadgeStyle {
            text: "!!",
            color: "#FF5722",
        },
        RiskLevel::High => BadgeStyle {
            text: "!!!",
            color: "#F44336",
        },
        RiskLevel::Critical => BadgeStyle {
            text: "💀",
            color: "#B71C1C",
        },
    }
}

fn notification_title(level: RiskLevel) -> String {
    let emoji = match level {
        RiskLevel::Safe => "✅",
        RiskLevel::Low => "⚠️",
        RiskLevel::Medium => "🚨",
        RiskLevel::High => "🔴",
        RiskLevel::Critical => "💀",
    };
    format!("{emoji} PhishShield Alert")
}

fn notification_message(level: RiskLevel) -> String {
    format!(
        "High risk email detected! Risk level: {}",
        level.as_str().to_uppercase()
    )
}

/// Presents analysis outcomes on the host's surfaces.
///
/// The badge is a display pulse, not a persistent indicator: it auto-clears
/// after [`BADGE_CLEAR_DELAY`]. Each pulse carries a monotonic id and a
/// clear timer only clears the badge while it still owns the current
/// pulse, so an earlier analysis's timer cannot erase a fresher badge.
#[derive(Clone)]
pub struct StatusService {
    host: Arc<dyn HostSurface>,
    pulse: Arc<AtomicU64>,
}

impl StatusService {
    pub fn new(host: Arc<dyn HostSurface>) -> Self {
        Self {
            host,
            pulse: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shows the badge pulse for a risk level and, when `notify` is set and
    /// the level is high or critical, one system notification.
    ///
    /// All host failures are logged and swallowed; presentation is a side
    /// channel, never part of a response.
    pub async fn present(&self, level: RiskLevel, notify: bool) {
        let style = badge_style(level);
        if let Err(e) = self.host.set_badge(style.text, style.color).await {
            tracing::warn!("failed to set badge: {e}");
        }

        let pulse_id = self.pulse.fetch_add(1, Ordering::SeqCst) + 1;
        let host = self.host.clone();
        let pulse = self.pulse.clone();
        tokio::spawn(async move {
            tokio::time::sleep(BADGE_CLEAR_DELAY).await;
            if pulse.load(Ordering::SeqCst) == pulse_id {
                if let Err(e) = host.clear_badge().await {
                    tracing::warn!("failed to clear badge: {e}");
                }
            }
        });

        if notify && level.is_alert() {
            let title = notification_title(level);
            let message = notification_message(level);
            if let Err(e) = self.host.show_notification(&title, &message).await {
                tracing::warn!("failed to show notification: {e}");
            }
        }
    }
}

impl std::fmt::Debug for StatusService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusService").finish_non_exhaustive()
    }
}
