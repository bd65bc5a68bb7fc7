//! 非同期コンテキストから共有される推論エンジン

use std::future::Future;
use std::sync::Arc;

use mimizuku_core::{Graph, Triple, TripleSource};
use mimizuku_rete::{BuildReport, CancellationFlag, FeedReport, NetworkStats};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::EngineOptions;
use crate::engine::{EngineResult, ReasoningEngine};
use crate::EngineError;

/// Cloneable handle to one engine.
///
/// Feeds take the write lock for the whole batch, so readers see either the
/// state before a batch or its fixpoint. `cancel` does not need the lock.
#[derive(Clone)]
pub struct SharedReasoner {
    engine: Arc<RwLock<ReasoningEngine>>,
    cancellation: CancellationFlag,
}

impl SharedReasoner {
    pub fn new(engine: ReasoningEngine) -> Self {
        let cancellation = engine.cancellation_flag();
        Self { engine: Arc::new(RwLock::new(engine)), cancellation }
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self::new(ReasoningEngine::with_options(options))
    }

    /// Stop the running feed after its current fact
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub async fn load_n3_rules(&self, document: &str) -> Result<BuildReport, EngineError> {
        self.engine.write().await.load_n3_rules(document)
    }

    pub async fn load_ontology(&self, ontology: &Graph) -> Result<BuildReport, EngineError> {
        self.engine.write().await.load_ontology(ontology)
    }

    /// Feed a batch. A cancellation requested before the batch starts is
    /// cleared, one requested during it is honoured.
    pub async fn feed(&self, facts: Vec<Triple>) -> Result<FeedReport, EngineError> {
        let mut engine = self.engine.write().await;
        self.cancellation.reset();
        engine.feed(facts)
    }

    /// Await facts from a collaborator, then feed them
    pub async fn feed_with<F>(&self, source: F) -> Result<FeedReport, EngineError>
    where
        F: Future<Output = anyhow::Result<Vec<Triple>>>,
    {
        let facts = source.await.map_err(EngineError::Collaborator)?;
        debug!(facts = facts.len(), "collaborator delivered facts");
        self.feed(facts).await
    }

    pub async fn compute_closure(&self, graph: &Graph) -> Result<EngineResult, EngineError> {
        let mut engine = self.engine.write().await;
        self.cancellation.reset();
        engine.compute_closure(graph)
    }

    pub async fn contains(&self, triple: &Triple) -> bool {
        self.engine.read().await.closure().contains(triple)
    }

    /// Sorted copy of the current closure
    pub async fn closure(&self) -> Vec<Triple> {
        self.engine.read().await.closure().sorted()
    }

    pub async fn stats(&self) -> NetworkStats {
        self.engine.read().await.stats()
    }

    pub async fn reset(&self) {
        self.engine.write().await.reset();
    }
}
