//! Dashboard landing
//!
//! Static hero, feature carousel, stats and call-to-action. Every shortcut
//! targets a typed [`Route`], so there are no dangling links.

use std::fmt;
use std::time::{Duration, Instant};

use crate::router::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub target: Route,
}

pub const FEATURES: [Feature; 3] = [
    Feature {
        title: "Manage Clients",
        description: "View, add, and organize client details with ease.",
        icon: "👥",
        target: Route::Appointments,
    },
    Feature {
        title: "Track Schedule",
        description: "Monitor and adjust upcoming appointments in one place.",
        icon: "📊",
        target: Route::Appointments,
    },
    Feature {
        title: "AI Assistant Help",
        description: "Let the AI bot help you with reminders, follow-ups, and smart suggestions.",
        icon: "🤖",
        target: Route::Bot,
    },
];

/// (value, label)
pub const STATS: [(&str, &str); 3] = [
    ("1200+", "Appointments Managed"),
    ("95%", "Efficiency Boost"),
    ("24/7", "AI Support"),
];

/// (label, target) buttons in the hero
pub const HERO_SHORTCUTS: [(&str, Route); 2] = [
    ("View Appointments", Route::Appointments),
    ("Ask AI Assistant", Route::Bot),
];

pub const CALL_TO_ACTION: (&str, Route) = ("Start Using AI Assistant", Route::Bot);

/// Highlighted feature, rotating on a fixed interval
#[derive(Debug, Clone)]
pub struct FeatureCarousel {
    current: usize,
    interval: Duration,
    last_change: Instant,
}

impl FeatureCarousel {
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, now: Instant) -> Self {
        Self {
            current: 0,
            interval,
            last_change: now,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn feature(&self) -> &'static Feature {
        &FEATURES[self.current]
    }

    pub fn advance(&mut self) {
        self.current = (self.current + 1) % FEATURES.len();
    }

    /// Highlight `index` now; the rotation continues from there
    pub fn focus(&mut self, index: usize, now: Instant) -> bool {
        if index >= FEATURES.len() {
            return false;
        }
        self.current = index;
        self.last_change = now;
        true
    }

    /// Advance once per whole interval elapsed since the last change
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.interval.is_zero() {
            return false;
        }
        let elapsed = now.saturating_duration_since(self.last_change);
        let steps = (elapsed.as_nanos() / self.interval.as_nanos()) as u32;
        if steps == 0 {
            return false;
        }
        for _ in 0..steps % FEATURES.len() as u32 {
            self.advance();
        }
        self.last_change += self.interval * steps;
        true
    }
}

pub struct HomeView {
    carousel: FeatureCarousel,
}

impl HomeView {
    pub fn new(carousel_interval: Duration) -> Self {
        Self {
            carousel: FeatureCarousel::new(carousel_interval),
        }
    }

    pub fn carousel(&self) -> &FeatureCarousel {
        &self.carousel
    }

    pub fn carousel_mut(&mut self) -> &mut FeatureCarousel {
        &mut self.carousel
    }

    /// Route behind a numbered shortcut, as listed by the renderer
    pub fn shortcut(&self, number: usize) -> Option<Route> {
        shortcuts().get(number.checked_sub(1)?).map(|(_, route)| *route)
    }
}

/// Every navigable shortcut in render order
pub fn shortcuts() -> Vec<(&'static str, Route)> {
    let mut all: Vec<(&'static str, Route)> = HERO_SHORTCUTS.to_vec();
    all.extend(FEATURES.iter().map(|f| (f.title, f.target)));
    all.push(CALL_TO_ACTION);
    all
}

impl fmt::Display for HomeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Welcome Admin 👋")?;
        writeln!(f, "Appointment Manager Dashboard")?;
        writeln!(
            f,
            "Manage clients, track schedules, and let AI make your work easier."
        )?;
        writeln!(f)?;

        let mut number = 1;
        for (label, _) in HERO_SHORTCUTS {
            writeln!(f, "  [{}] {}", number, label)?;
            number += 1;
        }

        writeln!(f)?;
        writeln!(f, "Admin Tools at Your Fingertips")?;
        for (index, feature) in FEATURES.iter().enumerate() {
            let marker = if index == self.carousel.current() { ">" } else { " " };
            writeln!(
                f,
                "{} [{}] {} {}: {}",
                marker, number, feature.icon, feature.title, feature.description
            )?;
            number += 1;
        }

        writeln!(f)?;
        let stats: Vec<String> = STATS
            .iter()
            .map(|(value, label)| format!("{} {}", value, label))
            .collect();
        writeln!(f, "{}", stats.join("  |  "))?;

        writeln!(f)?;
        writeln!(f, "Boost Your Productivity")?;
        writeln!(f, "AI-powered appointment management for admins")?;
        write!(f, "  [{}] {}", number, CALL_TO_ACTION.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps() {
        let start = Instant::now();
        let mut carousel = FeatureCarousel::starting_at(Duration::from_secs(4), start);

        assert!(!carousel.tick(start + Duration::from_millis(3999)));
        assert_eq!(carousel.current(), 0);

        assert!(carousel.tick(start + Duration::from_secs(4)));
        assert_eq!(carousel.current(), 1);

        assert!(carousel.tick(start + Duration::from_secs(12)));
        assert_eq!(carousel.current(), 0);
        assert_eq!(carousel.feature().title, "Manage Clients");
    }

    #[test]
    fn test_focus_restarts_interval() {
        let start = Instant::now();
        let mut carousel = FeatureCarousel::starting_at(Duration::from_secs(4), start);

        let hover = start + Duration::from_secs(3);
        assert!(carousel.focus(2, hover));
        assert!(!carousel.tick(start + Duration::from_secs(5)));
        assert_eq!(carousel.current(), 2);

        assert!(carousel.tick(hover + Duration::from_secs(4)));
        assert_eq!(carousel.current(), 0);
        assert!(!carousel.focus(3, hover));
    }

    #[test]
    fn test_shortcuts_are_admin_routes() {
        let view = HomeView::new(Duration::from_secs(4));
        assert_eq!(view.shortcut(1), Some(Route::Appointments));
        assert_eq!(view.shortcut(2), Some(Route::Bot));
        assert_eq!(view.shortcut(6), Some(Route::Bot));
        assert_eq!(view.shortcut(0), None);
        assert_eq!(view.shortcut(7), None);

        for (_, route) in shortcuts() {
            assert!(Route::ADMIN.contains(&route));
        }
    }

    #[test]
    fn test_render_marks_current_feature() {
        let mut view = HomeView::new(Duration::from_secs(4));
        view.carousel_mut().focus(1, Instant::now());
        let rendered = view.to_string();

        assert!(rendered.contains("> [4] 📊 Track Schedule"));
        assert!(rendered.contains("1200+ Appointments Managed"));
        assert!(rendered.contains("[6] Start Using AI Assistant"));
    }
}
