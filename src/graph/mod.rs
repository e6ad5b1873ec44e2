//! Bipartite attribute graphs built from a candidate/role profile pair.
//!
//! [`GraphBuilder::build`] embeds every attribute of both profiles through the
//! [`AttributeEmbedder`] gateway and groups the resulting nodes per category.
//! A failing attribute is dropped from its category and recorded in the
//! [`BuildReport`]; the build itself never fails.

mod types;


pub use types::{AttributeNode, BuildReport, BuiltGraph, CategoryGraph, DroppedAttribute, Side};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::constants::{DEFAULT_EMBED_CONCURRENCY, DEFAULT_EMBED_TIMEOUT_MS};
use crate::embedding::{AttributeEmbedder, EmbeddingError};
use crate::hashing::fingerprint;
use crate::profile::{Category, Profile};

/// Limits applied to gateway calls during a build.
#[derive(Debug, Clone)]
pub struct GraphBuilderConfig {
    /// Max concurrent embedding requests per build.
    pub concurrency: usize,
    /// Timeout per embedding request.
    pub timeout: Duration,
}

impl Default for GraphBuilderConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_EMBED_CONCURRENCY,
            timeout: Duration::from_millis(DEFAULT_EMBED_TIMEOUT_MS),
        }
    }
}

/// Builds per-category node lists for a profile pair.
#[derive(Clone)]
pub struct GraphBuilder {
    embedder: Arc<dyn AttributeEmbedder>,
    config: GraphBuilderConfig,
}

impl std::fmt::Debug for GraphBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphBuilder")
            .field("embedder", &self.embedder.mode())
            .field("config", &self.config)
            .finish()
    }
}

impl GraphBuilder {
    /// Creates a builder with default limits.
    pub fn new(embedder: Arc<dyn AttributeEmbedder>) -> Self {
        Self::with_config(embedder, GraphBuilderConfig::default())
    }

    /// Creates a builder with explicit limits.
    pub fn with_config(embedder: Arc<dyn AttributeEmbedder>, config: GraphBuilderConfig) -> Self {
        Self { embedder, config }
    }

    /// Returns the active limits.
    pub fn config(&self) -> &GraphBuilderConfig {
        &self.config
    }

    /// Returns the embedding gateway.
    pub fn embedder(&self) -> &Arc<dyn AttributeEmbedder> {
        &self.embedder
    }

    /// Builds one [`CategoryGraph`] per category present in either profile.
    ///
    /// Node order follows attribute order in the profiles, independent of the
    /// order in which embedding calls complete.
    pub async fn build(&self, candidate: &Profile, role: &Profile) -> BuiltGraph {
        let categories = Profile::category_union(candidate, role);

        let mut texts: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for category in &categories {
            for text in candidate
                .attributes(*category)
                .iter()
                .chain(role.attributes(*category))
            {
                if seen.insert(text.as_str()) {
                    texts.push(text.as_str());
                }
            }
        }

        let embeddings = self.embed_all(&texts).await;

        let mut report = BuildReport {
            dropped: Vec::new(),
            embedded: texts.len(),
        };
        let mut graphs = Vec::with_capacity(categories.len());

        for category in categories {
            let mut graph = CategoryGraph::new(category);
            graph.candidate = Self::collect_side(
                category,
                Side::Candidate,
                candidate.attributes(category),
                &embeddings,
                &mut report,
            );
            graph.role = Self::collect_side(
                category,
                Side::Role,
                role.attributes(category),
                &embeddings,
                &mut report,
            );
            graphs.push(graph);
        }

        if report.is_degraded() {
            warn!(
                dropped = report.dropped.len(),
                embedded = report.embedded,
                "Graph built in degraded mode"
            );
        } else {
            debug!(
                categories = graphs.len(),
                embedded = report.embedded,
                "Graph built"
            );
        }

        BuiltGraph { graphs, report }
    }

    async fn embed_all<'a>(
        &self,
        texts: &[&'a str],
    ) -> HashMap<&'a str, Result<Vec<f32>, EmbeddingError>> {
        let timeout = self.config.timeout;

        // Futures own their inputs; results are keyed back by index.
        let calls = texts.iter().enumerate().map(|(index, text)| {
            let embedder = Arc::clone(&self.embedder);
            let text = text.to_string();
            async move {
                let result = match tokio::time::timeout(timeout, embedder.embed(&text)).await {
                    Ok(Ok(vector)) if vector.is_empty() => Err(EmbeddingError::EmptyVector),
                    Ok(result) => result,
                    Err(_) => Err(EmbeddingError::Timeout {
                        timeout_ms: timeout.as_millis() as u64,
                    }),
                };
                (index, result)
            }
        }).collect::<Vec<_>>();

        let results: Vec<(usize, Result<Vec<f32>, EmbeddingError>)> = stream::iter(calls)
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        results
            .into_iter()
            .map(|(index, result)| (texts[index], result))
            .collect()
    }

    fn collect_side(
        category: Category,
        side: Side,
        attributes: &[String],
        embeddings: &HashMap<&str, Result<Vec<f32>, EmbeddingError>>,
        report: &mut BuildReport,
    ) -> Vec<AttributeNode> {
        let mut nodes = Vec::with_capacity(attributes.len());
        for text in attributes {
            match embeddings.get(text.as_str()) {
                Some(Ok(vector)) => nodes.push(AttributeNode::new(text.clone(), vector.clone())),
                Some(Err(e)) => {
                    warn!(
                        %category,
                        %side,
                        attribute = %fingerprint(text),
                        error = %e,
                        "Dropping attribute: embedding failed"
                    );
                    report.dropped.push(DroppedAttribute {
                        category,
                        side,
                        text: text.clone(),
                        reason: e.to_string(),
                    });
                }
                None => {
                    report.dropped.push(DroppedAttribute {
                        category,
                        side,
                        text: text.clone(),
                        reason: "attribute was not embedded".to_string(),
                    });
                }
            }
        }
        nodes
    }
}
