use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;

use crate::metrics::RequestSample;

/// Joins `path` onto the base address, keeping any path prefix of the base.
pub fn endpoint(base: &Url, path: &str) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), path)
}

pub fn build_client(workers: usize) -> reqwest::Result<Client> {
    Client::builder().pool_max_idle_per_host(workers).build()
}

/// Thin wrapper over the shared `reqwest` client that turns every call into a
/// [`RequestSample`]. Errors never escape: a failed call is just a sample.
#[derive(Clone)]
pub struct ServiceClient {
    client: Client,
    base: Url,
    timeout: Duration,
}

impl ServiceClient {
    pub fn new(client: Client, base: Url, timeout: Duration) -> Self {
        Self {
            client,
            base,
            timeout,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub async fn get(
        &self,
        name: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> RequestSample {
        let req = self.client.get(endpoint(&self.base, path)).query(query);
        self.execute(name, req).await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        name: &'static str,
        path: &str,
        body: &T,
    ) -> RequestSample {
        let req = self.client.post(endpoint(&self.base, path)).json(body);
        self.execute(name, req).await
    }

    async fn execute(&self, name: &'static str, req: RequestBuilder) -> RequestSample {
        let start = Instant::now();
        let res = req.timeout(self.timeout).send().await;
        match res {
            Ok(res) => {
                let status = res.status().as_u16();
                let bytes_received = res.bytes().await.map(|b| b.len() as u64).unwrap_or(0);
                RequestSample {
                    name,
                    latency: start.elapsed(),
                    status: Some(status),
                    bytes_received,
                }
            }
            Err(err) => {
                tracing::debug!(request = name, "Request failed: {err}");
                RequestSample {
                    name,
                    latency: start.elapsed(),
                    status: None,
                    bytes_received: 0,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_prefix() {
        let base = Url::parse("http://localhost:8080").unwrap();
        assert_eq!(endpoint(&base, "/team/add"), "http://localhost:8080/team/add");

        let base = Url::parse("http://gateway/api/").unwrap();
        assert_eq!(endpoint(&base, "/statistics"), "http://gateway/api/statistics");
    }

    #[tokio::test]
    async fn unreachable_service_yields_failed_sample() {
        let client = ServiceClient::new(
            Client::new(),
            Url::parse("http://127.0.0.1:9").unwrap(),
            Duration::from_millis(200),
        );
        let sample = client.get("/statistics", "/statistics", &[]).await;
        assert_eq!(sample.name, "/statistics");
        assert_eq!(sample.status, None);
        assert!(sample.is_failure());
    }
}
