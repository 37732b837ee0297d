//! Pinecone serverless index client

use crate::config::IndexConfig;
use crate::index::{HitMetadata, IndexError, IndexStats, NamespaceStats, RawMatch, VectorIndex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;

/// HTTP client for one Pinecone index
#[derive(Clone)]
pub struct PineconeIndex {
    client: reqwest::Client,
    host: String,
    api_key: String,
    api_version: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    namespace: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    namespaces: BTreeMap<String, NamespaceSummary>,
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    total_vector_count: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceSummary {
    #[serde(default)]
    vector_count: u64,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

impl PineconeIndex {
    /// Connect to the configured index, resolving its data-plane host if needed
    pub async fn connect(config: &IndexConfig) -> Result<Self, IndexError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| IndexError::MissingApiKey {
                env: config.api_key_env.clone(),
            })?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let host = match &config.host {
            Some(host) => host.clone(),
            None => {
                Self::resolve_host(
                    &client,
                    &config.control_plane_url,
                    &config.name,
                    &api_key,
                    &config.api_version,
                )
                .await?
            }
        };

        tracing::info!("Connected to index {} at {}", config.name, host);

        Ok(Self::with_client(client, &host, api_key, &config.api_version))
    }

    /// Build a client for a known data-plane host
    pub fn with_client(
        client: reqwest::Client,
        host: &str,
        api_key: String,
        api_version: &str,
    ) -> Self {
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        };

        Self {
            client,
            host,
            api_key,
            api_version: api_version.to_string(),
        }
    }

    async fn resolve_host(
        client: &reqwest::Client,
        control_plane_url: &str,
        index_name: &str,
        api_key: &str,
        api_version: &str,
    ) -> Result<String, IndexError> {
        let url = format!(
            "{}/indexes/{}",
            control_plane_url.trim_end_matches('/'),
            index_name
        );

        let resp = client
            .get(&url)
            .header("Api-Key", api_key)
            .header("X-Pinecone-API-Version", api_version)
            .send()
            .await?;

        let body: DescribeIndexResponse = Self::parse(resp).await?;
        if body.host.is_empty() {
            return Err(IndexError::InvalidResponse(format!(
                "Index {} has no host",
                index_name
            )));
        }
        Ok(body.host)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, IndexError> {
        let resp = self
            .client
            .post(format!("{}{}", self.host, path))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", &self.api_version)
            .json(body)
            .send()
            .await?;
        Ok(resp)
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, IndexError> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(IndexError::Service { status, body });
        }

        resp.json::<T>()
            .await
            .map_err(|e| IndexError::InvalidResponse(e.to_string()))
    }
}

impl VectorIndex for PineconeIndex {
    async fn list_partitions(&self) -> Result<Vec<String>, IndexError> {
        let stats = self.describe_stats().await?;
        Ok(stats.namespaces.into_keys().collect())
    }

    async fn query_partition(
        &self,
        vector: &[f32],
        limit: usize,
        partition: &str,
    ) -> Result<Vec<RawMatch>, IndexError> {
        let request = QueryRequest {
            vector,
            top_k: limit,
            include_metadata: true,
            include_values: false,
            namespace: partition,
        };

        let resp = self.post("/query", &request).await?;
        let body: QueryResponse = Self::parse(resp).await?;

        Ok(body
            .matches
            .into_iter()
            .map(|m| RawMatch {
                id: m.id,
                score: m.score,
                metadata: HitMetadata::from_map(m.metadata.unwrap_or_default()),
            })
            .collect())
    }

    async fn describe_stats(&self) -> Result<IndexStats, IndexError> {
        let resp = self
            .post("/describe_index_stats", &serde_json::json!({}))
            .await?;
        let body: StatsResponse = Self::parse(resp).await?;

        Ok(IndexStats {
            total_vector_count: body.total_vector_count,
            dimension: body.dimension,
            namespaces: body
                .namespaces
                .into_iter()
                .map(|(name, summary)| {
                    (
                        name,
                        NamespaceStats {
                            vector_count: summary.vector_count,
                        },
                    )
                })
                .collect(),
        })
    }
}
