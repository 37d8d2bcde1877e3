//! Qdrant sink built on the builder API of `qdrant-client`.
//!
//! The collection is created lazily with the size of the first stored
//! vector. Points are buffered and upserted in batches; point ids are
//! derived from `(namespace, id)` so re-runs overwrite instead of duplicate.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, UpsertPointsBuilder, Value as QValue,
    VectorParamsBuilder,
};
use services::uuid::scoped_uuid;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{DistanceKind, QdrantSinkConfig};
use crate::embed::EmbedFuture;
use crate::errors::EmbedError;
use crate::sink::EmbeddingSink;

pub struct QdrantSink {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
    upsert_batch: usize,
    state: Mutex<SinkState>,
}

#[derive(Default)]
struct SinkState {
    dim: Option<usize>,
    pending: Vec<PointStruct>,
}

impl QdrantSink {
    pub fn new(cfg: &QdrantSinkConfig) -> Result<Self, EmbedError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.url);
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build().map_err(|e| EmbedError::Sink(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
            upsert_batch: cfg.upsert_batch,
            state: Mutex::new(SinkState::default()),
        })
    }

    /// Creates the collection if missing.
    async fn ensure_collection(&self, size: usize) -> Result<(), EmbedError> {
        info!(
            "Ensuring collection '{}' with size={} distance={:?}",
            self.collection, size, self.distance
        );

        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| EmbedError::Sink(e.to_string()))?;
        if exists {
            debug!("Collection '{}' already exists", self.collection);
            return Ok(());
        }

        warn!("Collection '{}' not found, creating it", self.collection);
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(size as u64, to_distance(self.distance))),
            )
            .await
            .map_err(|e| EmbedError::Sink(e.to_string()))?;

        info!("Collection '{}' created successfully", self.collection);
        Ok(())
    }

    async fn upsert(&self, points: Vec<PointStruct>) -> Result<(), EmbedError> {
        if points.is_empty() {
            return Ok(());
        }
        info!(
            "Upserting {} points into collection '{}'",
            points.len(),
            self.collection
        );
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| EmbedError::Sink(e.to_string()))?;
        Ok(())
    }
}

impl EmbeddingSink for QdrantSink {
    fn store<'a>(
        &'a self,
        id: &'a str,
        embedding: &'a [f32],
        namespace: &'a str,
    ) -> EmbedFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;

            match state.dim {
                None => {
                    self.ensure_collection(embedding.len()).await?;
                    state.dim = Some(embedding.len());
                }
                Some(want) if want != embedding.len() => {
                    return Err(EmbedError::VectorSizeMismatch {
                        got: embedding.len(),
                        want,
                    });
                }
                Some(_) => {}
            }

            state.pending.push(to_point(id, embedding, namespace));
            if state.pending.len() >= self.upsert_batch {
                let batch = std::mem::take(&mut state.pending);
                self.upsert(batch).await?;
            }
            Ok(())
        })
    }

    fn flush(&self) -> EmbedFuture<'_, ()> {
        Box::pin(async move {
            let batch = std::mem::take(&mut self.state.lock().await.pending);
            self.upsert(batch).await
        })
    }
}

fn to_distance(kind: DistanceKind) -> Distance {
    match kind {
        DistanceKind::Cosine => Distance::Cosine,
        DistanceKind::Dot => Distance::Dot,
        DistanceKind::Euclid => Distance::Euclid,
    }
}

/// Builds a point keyed by a UUID derived from `(namespace, id)`.
fn to_point(id: &str, embedding: &[f32], namespace: &str) -> PointStruct {
    let mut payload: HashMap<String, QValue> = HashMap::new();
    payload.insert("id".into(), QValue::from(id.to_string()));
    payload.insert("namespace".into(), QValue::from(namespace.to_string()));

    PointStruct::new(
        scoped_uuid(namespace, id).to_string(),
        embedding.to_vec(),
        payload,
    )
}
