//! Home page rendering.

use axum::body::Bytes;

use crate::config::CycleConfig;

const TEMPLATE: &str = include_str!("../../www/index.html");

/// The rendered web UI.
///
/// Rendered once at startup with the cycle settings filled in, then served
/// as-is for every request to `/`.
#[derive(Debug, Clone)]
pub struct HomePage {
    body: Bytes,
}

impl HomePage {
    /// Render the page for the given cycle settings.
    pub fn render(cycle: &CycleConfig) -> Self {
        let html = TEMPLATE
            .replace("{{period_secs}}", &cycle.period_secs.to_string())
            .replace(
                "{{open_duration_secs}}",
                &cycle.open_duration_secs.to_string(),
            );
        Self {
            body: Bytes::from(html),
        }
    }

    /// Rendered HTML.
    pub fn body(&self) -> Bytes {
        self.body.clone()
    }
}
