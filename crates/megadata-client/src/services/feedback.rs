//! User-facing feedback banners
//!
//! Success banners disappear on their own after [`SUCCESS_BANNER_TTL`];
//! error banners stay until dismissed or replaced.

use serde::Serialize;
use std::time::{Duration, Instant};

pub const SUCCESS_BANNER_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    shown_at: Instant,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(BannerKind::Success, message, Instant::now())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(BannerKind::Error, message, Instant::now())
    }

    fn new(kind: BannerKind, message: impl Into<String>, shown_at: Instant) -> Self {
        Self {
            kind,
            message: message.into(),
            shown_at,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == BannerKind::Error
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.kind {
            BannerKind::Success => now.saturating_duration_since(self.shown_at) >= SUCCESS_BANNER_TTL,
            BannerKind::Error => false,
        }
    }
}

/// The single banner slot of a screen
#[derive(Debug, Clone, Default)]
pub struct Feedback {
    banner: Option<Banner>,
}

impl Feedback {
    pub fn show(&mut self, banner: Banner) {
        self.banner = Some(banner);
    }

    pub fn dismiss(&mut self) {
        self.banner = None;
    }

    /// Banner still on screen at `now`
    pub fn visible_at(&mut self, now: Instant) -> Option<&Banner> {
        if self.banner.as_ref().is_some_and(|b| b.is_expired_at(now)) {
            self.banner = None;
        }
        self.banner.as_ref()
    }

    pub fn visible(&mut self) -> Option<&Banner> {
        self.visible_at(Instant::now())
    }
}
