use reqwest::blocking::{RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::*;

/// Retries transport failures only; any HTTP response is final.
pub(super) fn with_retries<T>(
    label: &str,
    mut f: impl FnMut() -> std::result::Result<T, GatewayError>,
) -> std::result::Result<T, GatewayError> {
    const ATTEMPTS: usize = 3;
    let mut last = None;
    for i in 0..ATTEMPTS {
        match f() {
            Ok(v) => return Ok(v),
            Err(err) if err.is_network() => {
                tracing::debug!(label, attempt = i + 1, error = %err, "request failed");
                last = Some(err);
                if i + 1 < ATTEMPTS {
                    std::thread::sleep(Duration::from_millis(200 * (1 << i)));
                }
            }
            Err(err) => return Err(err),
        }
    }
    Err(last.unwrap_or_else(|| GatewayError::network(format!("{}: unknown error", label))))
}

impl RestClient {
    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(super) fn send(
        &self,
        req: RequestBuilder,
        label: &str,
    ) -> std::result::Result<Response, GatewayError> {
        let resp = req
            .send()
            .map_err(|e| GatewayError::network(format!("{}: {}", label, e)))?;
        let status = resp.status();
        tracing::debug!(label, status = status.as_u16(), "response");
        if status.is_success() || status.is_redirection() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(GatewayError::from_response(status, &body))
    }

    pub(super) fn read_json<T: DeserializeOwned>(
        resp: Response,
        label: &str,
    ) -> std::result::Result<T, GatewayError> {
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| GatewayError::network(format!("read {} response: {}", label, e)))?;
        let body = if body.trim().is_empty() {
            "null"
        } else {
            body.as_str()
        };
        serde_json::from_str(body).map_err(|e| GatewayError {
            status: status.as_u16(),
            message: format!("parse {} response: {}", label, e),
            data: None,
        })
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<T, GatewayError> {
        let resp = with_retries(path, || {
            self.send(self.client.get(self.url(path)).query(query), path)
        })?;
        Self::read_json(resp, path)
    }

    pub fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<T, GatewayError> {
        let resp = self.send(self.client.post(self.url(path)).json(body), path)?;
        Self::read_json(resp, path)
    }

    pub fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<T, GatewayError> {
        let resp = self.send(self.client.put(self.url(path)).json(body), path)?;
        Self::read_json(resp, path)
    }

    pub fn delete<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, GatewayError> {
        let resp = self.send(self.client.delete(self.url(path)), path)?;
        Self::read_json(resp, path)
    }

    pub(super) fn get_bytes(&self, path: &str) -> std::result::Result<Vec<u8>, GatewayError> {
        let resp = with_retries(path, || self.send(self.client.get(self.url(path)), path))?;
        let bytes = resp
            .bytes()
            .map_err(|e| GatewayError::network(format!("read {}: {}", path, e)))?;
        Ok(bytes.to_vec())
    }
}
