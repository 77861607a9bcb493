//! HTML event body rendering

use std::path::Path;

use calsync_core::BodyRenderer;
use tracing::{debug, warn};

/// Empty paragraph in the template that receives the order details.
const PLACEHOLDER: &str = r#"<p class="MsoNormal"></p>"#;

/// Renders event bodies from an HTML template (typically exported from Outlook).
#[derive(Debug, Clone)]
pub struct TemplateBodyRenderer {
    template: Option<String>,
}

impl TemplateBodyRenderer {
    /// Load the template at `path`. An unreadable template is logged and
    /// bodies fall back to the bare order-details paragraph.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(template) => {
                if !template.contains(PLACEHOLDER) {
                    warn!(path = %path.display(), "body template has no empty MsoNormal paragraph");
                }
                debug!(path = %path.display(), "loaded body template");
                Self { template: Some(template) }
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "body template unavailable; using plain body"
                );
                Self { template: None }
            }
        }
    }

    pub fn from_template(template: impl Into<String>) -> Self {
        Self { template: Some(template.into()) }
    }
}

impl BodyRenderer for TemplateBodyRenderer {
    fn render(&self, hyperlink_html: &str, asset_count: usize) -> String {
        let details = format!(
            r#"<p class="MsoNormal"><b>{hyperlink_html}<br> Number of Assets:</b> {asset_count}</p>"#
        );
        match &self.template {
            Some(template) => template.replace(PLACEHOLDER, &details),
            None => details,
        }
    }
}
