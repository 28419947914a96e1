//! Cached, coalesced access to the letter store.
//!
//! Reads go through the in-flight table first, then the response cache, and
//! only then to the store. Mutations always reach the store and, once they
//! succeed, drop every cached or pending read against the letter endpoints
//! before returning, so a caller never reads data older than its own write.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::api::RemoteStore;
use crate::api::endpoints;
use crate::api::models::{
    DeleteOutcome, Folder, Letter, LetterDraft, LetterPatch, MailboxStats, Payload, UpdateOutcome,
};
use crate::cache::{InFlight, ResponseCache, Signature, lock};
use crate::config::{EndpointTemplates, Settings};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct FacadeConfig {
    pub cache_ttl: Duration,
    pub endpoints: EndpointTemplates,
}

impl FacadeConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            cache_ttl: settings.cache_ttl(),
            endpoints: settings.endpoints.clone(),
        }
    }
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

pub struct LetterFacade<S> {
    store: Arc<S>,
    endpoints: EndpointTemplates,
    cache: Arc<Mutex<ResponseCache<Arc<Payload>>>>,
    inflight: InFlight<Arc<Payload>>,
}

impl<S: RemoteStore> LetterFacade<S> {
    pub fn new(store: S, config: FacadeConfig) -> Self {
        Self::with_store(Arc::new(store), config)
    }

    pub fn with_store(store: Arc<S>, config: FacadeConfig) -> Self {
        Self {
            store,
            endpoints: config.endpoints,
            cache: Arc::new(Mutex::new(ResponseCache::new(config.cache_ttl))),
            inflight: InFlight::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn list(&self, folder: Option<&Folder>) -> StoreResult<Vec<Letter>> {
        let query = endpoints::list_query(folder);
        let signature = Signature::get(&self.endpoints.letters, &query);
        let store = Arc::clone(&self.store);
        let folder = folder.cloned();

        let payload = self
            .read(signature, async move {
                store.list(folder.as_ref()).await.map(Payload::Letters)
            })
            .await?;

        match payload.as_ref() {
            Payload::Letters(letters) => Ok(letters.clone()),
            Payload::Letter(_) => Err(mismatched_payload("list")),
        }
    }

    /// Lists one folder through the per-folder endpoint.
    pub async fn list_by_folder(&self, folder: &Folder) -> StoreResult<Vec<Letter>> {
        let path = endpoints::folder_path(&self.endpoints.folder, folder);
        let signature = Signature::get(&path, &[]);
        let store = Arc::clone(&self.store);
        let folder = folder.clone();

        let payload = self
            .read(signature, async move {
                store.list_by_folder(&folder).await.map(Payload::Letters)
            })
            .await?;

        match payload.as_ref() {
            Payload::Letters(letters) => Ok(letters.clone()),
            Payload::Letter(_) => Err(mismatched_payload("list_by_folder")),
        }
    }

    pub async fn get(&self, id: i64) -> StoreResult<Letter> {
        let path = endpoints::letter_path(&self.endpoints.letter_by_id, id);
        let signature = Signature::get(&path, &[]);
        let store = Arc::clone(&self.store);

        let payload = self
            .read(signature, async move { store.get(id).await.map(Payload::Letter) })
            .await?;

        match payload.as_ref() {
            Payload::Letter(letter) => Ok(letter.clone()),
            Payload::Letters(_) => Err(mismatched_payload("get")),
        }
    }

    pub async fn create(&self, draft: &LetterDraft) -> StoreResult<Letter> {
        let letter = self.store.create(draft).await?;
        info!(id = letter.id, folder = %letter.folder, "letter created");
        self.invalidate_letters();
        Ok(letter)
    }

    pub async fn update(&self, id: i64, patch: &LetterPatch) -> StoreResult<UpdateOutcome> {
        let outcome = self.store.update(id, patch).await?;
        info!(id, ?patch, updated = outcome.updated, "letter updated");
        self.invalidate_letters();
        Ok(outcome)
    }

    pub async fn soft_delete(&self, id: i64) -> StoreResult<DeleteOutcome> {
        let outcome = self.store.soft_delete(id).await?;
        info!(id, deleted = outcome.deleted, "letter moved to trash");
        self.invalidate_letters();
        Ok(outcome)
    }

    pub async fn health(&self) -> bool {
        self.store.health().await
    }

    pub async fn stats(&self) -> StoreResult<MailboxStats> {
        let letters = self.list(None).await?;
        Ok(MailboxStats::tally(&letters))
    }

    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
        debug!("response cache cleared");
    }

    pub fn clear_cache_for_endpoint(&self, path: &str) -> usize {
        let dropped = lock(&self.cache).invalidate(path);
        debug!(path, dropped, "response cache cleared for endpoint");
        dropped
    }

    pub fn cached_entries(&self) -> usize {
        lock(&self.cache).len()
    }

    pub fn pending_requests(&self) -> usize {
        self.inflight.len()
    }

    async fn read<F>(&self, signature: Signature, fetch: F) -> StoreResult<Arc<Payload>>
    where
        F: Future<Output = StoreResult<Payload>> + Send + 'static,
    {
        if let Some(shared) = self.inflight.pending(&signature) {
            debug!(%signature, "joining in-flight request");
            return shared.await;
        }

        let generation = {
            let mut cache = lock(&self.cache);
            if let Some(hit) = cache.get(&signature, Instant::now()) {
                debug!(%signature, "cache hit");
                return Ok(hit);
            }
            cache.generation()
        };
        debug!(%signature, "cache miss");

        let cache = Arc::clone(&self.cache);
        let key = signature.clone();
        let operation = async move {
            let payload = Arc::new(fetch.await?);
            let stored =
                lock(&cache).put(key.clone(), Arc::clone(&payload), generation, Instant::now());
            if !stored {
                debug!(signature = %key, "discarding response fetched before invalidation");
            }
            Ok(payload)
        };

        self.inflight.coalesce(signature, operation).await
    }

    fn invalidate_letters(&self) {
        for prefix in self.letter_prefixes() {
            let dropped = lock(&self.cache).invalidate(&prefix);
            let detached = self.inflight.forget(&prefix);
            debug!(%prefix, dropped, detached, "invalidated letter reads");
        }
    }

    /// Static leading part of each letter endpoint template.
    fn letter_prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = Vec::new();
        let templates = [
            &self.endpoints.letters,
            &self.endpoints.letter_by_id,
            &self.endpoints.folder,
        ];
        for template in templates {
            let prefix = template.split(':').next().unwrap_or_default().to_string();
            if prefixes.iter().any(|known| prefix.starts_with(known)) {
                continue;
            }
            prefixes.retain(|known| !known.starts_with(&prefix));
            prefixes.push(prefix);
        }
        prefixes
    }
}

impl<S> fmt::Debug for LetterFacade<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LetterFacade")
            .field("endpoints", &self.endpoints)
            .field("cached", &lock(&self.cache).len())
            .field("inflight", &self.inflight)
            .finish()
    }
}

fn mismatched_payload(operation: &str) -> StoreError {
    StoreError::remote(None, format!("cached response does not match `{operation}`"))
}
