//! Renderer Configuration

use std::time::Duration;

/// Renderer configuration options
#[derive(Debug, Clone)]
pub struct Config {
    /// Time a single flush may spend re-rendering before yielding to the next frame
    pub frame_budget: Duration,

    /// A flush stops once the remaining budget drops below this many average renders
    pub preempt_factor: f64,

    /// Tag rendered in place of a component that returns an empty body
    pub placeholder_tag: String,

    /// Tag the root component must render for `render_body`
    pub body_tag: String,

    /// Properties compared against the live host value instead of the previous render
    pub live_properties: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_refresh_rate(60)
    }
}

impl Config {
    /// Configuration whose frame budget matches a display refresh rate
    pub fn for_refresh_rate(hz: u32) -> Self {
        Self {
            frame_budget: Duration::from_secs(1) / hz.max(1),
            preempt_factor: 2.0,
            placeholder_tag: "noscript".to_string(),
            body_tag: "body".to_string(),
            live_properties: vec!["value".to_string(), "checked".to_string()],
        }
    }

    /// Override the frame budget
    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = budget;
        self
    }

    /// Whether `name` must be compared against the live host value
    pub fn is_live_property(&self, name: &str) -> bool {
        self.live_properties.iter().any(|p| p == name)
    }
}
