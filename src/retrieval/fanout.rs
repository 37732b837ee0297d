//! Per-partition similarity queries

use crate::index::{IndexError, VectorIndex};
use crate::retrieval::hit::Hit;
use futures::future::join_all;
use std::time::Duration;

/// Query every partition and keep the matches scoring at least `threshold`.
///
/// Partitions are queried concurrently but merged in the order given, so the
/// output is deterministic for a stable index. A partition that fails or
/// exceeds `timeout` is logged and contributes nothing.
pub async fn fan_out<I: VectorIndex>(
    index: &I,
    vector: &[f32],
    partitions: &[String],
    limit: usize,
    threshold: f32,
    timeout: Duration,
) -> Vec<Hit> {
    let queries = partitions
        .iter()
        .map(|partition| query_with_timeout(index, vector, limit, partition, timeout));

    let responses = join_all(queries).await;

    let mut hits = Vec::new();
    for (partition, response) in partitions.iter().zip(responses) {
        match response {
            Ok(matches) => {
                tracing::info!("Found {} matches in {}", matches.len(), partition);
                for raw in matches {
                    if raw.score >= threshold {
                        tracing::debug!(
                            "Match {} score {:.4} (above threshold {})",
                            raw.id,
                            raw.score,
                            threshold
                        );
                        hits.push(Hit::from_match(raw, partition));
                    } else {
                        tracing::debug!(
                            "Match {} score {:.4} (below threshold {})",
                            raw.id,
                            raw.score,
                            threshold
                        );
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Skipping partition {}: {}", partition, e);
            }
        }
    }

    tracing::info!("Total results after filtering: {}", hits.len());
    hits
}

async fn query_with_timeout<I: VectorIndex>(
    index: &I,
    vector: &[f32],
    limit: usize,
    partition: &str,
    timeout: Duration,
) -> Result<Vec<crate::index::RawMatch>, IndexError> {
    tracing::debug!("Querying partition: {}", partition);
    match tokio::time::timeout(timeout, index.query_partition(vector, limit, partition)).await {
        Ok(result) => result,
        Err(_) => Err(IndexError::Timeout {
            partition: partition.to_string(),
            secs: timeout.as_secs(),
        }),
    }
}

/// Flag and boost the hits whose section equals `target`
pub fn apply_section_boost(mut hits: Vec<Hit>, target: &str, factor: f32) -> Vec<Hit> {
    let boosted = hits
        .iter_mut()
        .map(|hit| hit.boost_if_target(target, factor))
        .filter(|&b| b)
        .count();

    if boosted > 0 {
        tracing::info!("Boosted {} hits for section {}", boosted, target);
    }
    hits
}
