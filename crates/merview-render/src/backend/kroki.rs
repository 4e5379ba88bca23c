//! Kroki HTTP backend.

use std::time::Duration;

use ureq::Agent;

use super::{DiagramBackend, assign_svg_id};
use crate::error::RenderError;
use crate::options::RenderOptions;

/// Default HTTP timeout for Kroki requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Renders through a Kroki server's `/mermaid/svg` endpoint.
///
/// The agent is created once and reused for connection pooling.
pub struct KrokiBackend {
    agent: Agent,
    server_url: String,
}

impl KrokiBackend {
    #[must_use]
    pub fn new(server_url: &str) -> Self {
        Self {
            agent: create_agent(DEFAULT_TIMEOUT),
            server_url: server_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Replace the HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/mermaid/svg", self.server_url)
    }
}

/// Create HTTP agent with the specified timeout.
///
/// HTTP error statuses are returned as responses so the server's error body
/// can be reported.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

impl DiagramBackend for KrokiBackend {
    fn render_to_markup(
        &self,
        id: &str,
        source: &str,
        options: &RenderOptions,
    ) -> Result<String, RenderError> {
        let url = self.endpoint();
        let body = options.apply_to(source);
        tracing::debug!(%url, id, "sending diagram to Kroki");

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/plain")
            .send(body.as_bytes())
            .map_err(|e| RenderError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            // Kroki reports syntax errors as 400 with the parser message
            return Err(RenderError::Rejected(format!(
                "HTTP {status}: {}",
                error_body.trim()
            )));
        }

        let bytes = body
            .read_to_vec()
            .map_err(|e| RenderError::Http(e.to_string()))?;
        let markup = String::from_utf8(bytes).map_err(|_| RenderError::InvalidUtf8)?;
        Ok(assign_svg_id(&markup, id))
    }
}
