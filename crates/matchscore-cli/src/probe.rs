//! `matchscore probe`: exercise a running server end to end

use anyhow::{bail, Context};
use matchscore_core::ScoringRequest;
use serde_json::Value;
use std::io::Write;
use tracing::debug;

/// Status code and body of one probe call
#[derive(Debug)]
pub struct ProbeResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl ProbeResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Thin client over the three scoring endpoints
pub struct ProbeClient {
    base: String,
    client: reqwest::Client,
}

impl ProbeClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn health(&self) -> anyhow::Result<ProbeResponse> {
        self.get("/health").await
    }

    pub async fn features(&self) -> anyhow::Result<ProbeResponse> {
        self.get("/features").await
    }

    pub async fn score(&self, body: &ScoringRequest) -> anyhow::Result<ProbeResponse> {
        let url = format!("{}/score", self.base);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        Self::collect(response).await
    }

    async fn get(&self, path: &str) -> anyhow::Result<ProbeResponse> {
        let url = format!("{}{}", self.base, path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        Self::collect(response).await
    }

    async fn collect(response: reqwest::Response) -> anyhow::Result<ProbeResponse> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        Ok(ProbeResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Every required feature set to `0.0`, then overlaid with the example
/// values for names the server actually requires
pub fn build_probe_body(features: &[String], known: &ScoringRequest) -> ScoringRequest {
    features
        .iter()
        .map(|name| {
            let value = known.get(name).cloned().unwrap_or(Value::from(0.0));
            (name.as_str(), value)
        })
        .collect()
}

/// Feature names from a `/features` response body
fn feature_names(body: &Value) -> anyhow::Result<Vec<String>> {
    let names = body
        .get("features")
        .and_then(Value::as_array)
        .context("response has no 'features' array")?;
    names
        .iter()
        .map(|name| {
            name.as_str()
                .map(str::to_string)
                .context("feature names must be strings")
        })
        .collect()
}

/// Run the full probe sequence, printing every response to `out`
pub async fn run(target: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let client = ProbeClient::new(target);

    let health = client.health().await?;
    writeln!(out, "HEALTH: {} {}", health.status, health.body)?;

    let features = client.features().await?;
    if !features.is_success() {
        writeln!(
            out,
            "Could not fetch features: {} {}",
            features.status, features.body
        )?;
        bail!("GET /features returned {}", features.status);
    }

    let body = features.json().context("/features returned invalid JSON")?;
    let names = feature_names(&body)?;
    writeln!(out, "Required features ({}): {:?}", names.len(), names)?;

    let request = build_probe_body(&names, &matchscore_core::example_payload());
    let score = client.score(&request).await?;
    writeln!(out, "STATUS: {}", score.status)?;
    writeln!(
        out,
        "CONTENT-TYPE: {}",
        score.content_type.as_deref().unwrap_or("-")
    )?;
    match score.json() {
        Some(json) => writeln!(out, "JSON: {}", serde_json::to_string_pretty(&json)?)?,
        None => writeln!(out, "RESP: {}", score.body)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_probe_body_defaults_unknown_features_to_zero() {
        let features = vec!["Goals".to_string(), "Yellow_Cards".to_string()];
        let body = build_probe_body(&features, &matchscore_core::example_payload());

        assert_eq!(body.len(), 2);
        assert_eq!(body.get("Goals"), Some(&json!(2)));
        assert_eq!(body.get("Yellow_Cards"), Some(&json!(0.0)));
        assert!(!body.contains("Possession"));
    }

    #[test]
    fn test_feature_names_from_response() {
        let names = feature_names(&json!({"features": ["a", "b"], "count": 2})).unwrap();
        assert_eq!(names, vec!["a", "b"]);

        assert!(feature_names(&json!({"count": 0})).is_err());
        assert!(feature_names(&json!({"features": [1]})).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ProbeClient::new("http://localhost:8000/");
        assert_eq!(client.base, "http://localhost:8000");
    }
}
