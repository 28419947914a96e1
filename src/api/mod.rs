pub mod client;
pub mod endpoints;
pub mod models;

use std::future::Future;

use crate::error::StoreResult;

use models::{DeleteOutcome, Folder, Letter, LetterDraft, LetterPatch, UpdateOutcome};

pub use client::LetterClient;

/// The five letter operations a backing store provides, the per-folder
/// listing, and a liveness check.
///
/// Every call is one round trip with no retries.
pub trait RemoteStore: Send + Sync + 'static {
    fn list(
        &self,
        folder: Option<&Folder>,
    ) -> impl Future<Output = StoreResult<Vec<Letter>>> + Send;

    fn list_by_folder(
        &self,
        folder: &Folder,
    ) -> impl Future<Output = StoreResult<Vec<Letter>>> + Send;

    fn get(&self, id: i64) -> impl Future<Output = StoreResult<Letter>> + Send;

    fn create(&self, draft: &LetterDraft) -> impl Future<Output = StoreResult<Letter>> + Send;

    fn update(
        &self,
        id: i64,
        patch: &LetterPatch,
    ) -> impl Future<Output = StoreResult<UpdateOutcome>> + Send;

    fn soft_delete(&self, id: i64) -> impl Future<Output = StoreResult<DeleteOutcome>> + Send;

    fn health(&self) -> impl Future<Output = bool> + Send;
}
