//! Outbound request logging for every upstream call.

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use std::time::Instant;
use tracing::{debug, warn};

use crate::utils::fmt_duration;

/// Logs method, URL, status, and latency of each request at `debug`;
/// transport failures at `warn`.
pub struct RequestLogger;

#[async_trait::async_trait]
impl Middleware for RequestLogger {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let method = req.method().clone();
        let url = req.url().clone();
        let start = Instant::now();

        let result = next.run(req, extensions).await;
        let duration = fmt_duration(start.elapsed());

        match &result {
            Ok(response) => debug!(
                method = %method,
                url = %url,
                status = response.status().as_u16(),
                duration,
                "Upstream response"
            ),
            Err(e) => warn!(
                method = %method,
                url = %url,
                error = %e,
                duration,
                "Upstream request failed"
            ),
        }
        result
    }
}
