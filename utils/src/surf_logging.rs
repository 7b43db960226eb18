use std::time::Instant;
use surf::middleware::{Middleware, Next};
use surf::{Client, Request, Response};

/// Logs every request going through a `surf::Client` together with the
/// response status and the time it took.
#[derive(Debug, Default, Clone, Copy)]
pub struct SurfLogging;

#[surf::utils::async_trait]
impl Middleware for SurfLogging {
    async fn handle(&self, req: Request, client: Client, next: Next<'_>) -> surf::Result<Response> {
        let method = req.method();
        let url = req.url().to_string();
        let start = Instant::now();
        log::debug!("--> {} {}", method, url);

        let res = next.run(req, client).await;
        match &res {
            Ok(response) => log::debug!(
                "<-- {} {} {} ({} ms)",
                method,
                url,
                response.status(),
                start.elapsed().as_millis()
            ),
            Err(err) => log::warn!("<-- {} {} failed: {}", method, url, err),
        }
        res
    }
}
