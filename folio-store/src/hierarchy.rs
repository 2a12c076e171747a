//! Section → notebook hierarchy boundary.
//!
//! Pages only carry a `section_id`; sections and notebooks are owned by a
//! separate service. Lookups are batched: callers pass every id they need
//! and receive the ones that resolved. Ids that do not resolve are simply
//! absent from the returned map.

use std::collections::HashMap;
use std::future::Future;

use folio_core::{Notebook, Section};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

/// Batched lookups against the hierarchy owner.
pub trait HierarchyService: Send + Sync {
    fn sections(
        &self,
        ids: &[Uuid],
    ) -> impl Future<Output = Result<HashMap<Uuid, Section>, StoreError>> + Send;

    fn notebooks(
        &self,
        ids: &[Uuid],
    ) -> impl Future<Output = Result<HashMap<Uuid, Notebook>, StoreError>> + Send;
}

/// Hierarchy held in process memory.
#[derive(Default)]
pub struct InMemoryHierarchy {
    sections: RwLock<HashMap<Uuid, Section>>,
    notebooks: RwLock<HashMap<Uuid, Notebook>>,
}

impl InMemoryHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_notebook(&self, name: impl Into<String>) -> Notebook {
        let notebook = Notebook {
            id: Uuid::new_v4(),
            name: name.into(),
        };
        self.notebooks
            .write()
            .await
            .insert(notebook.id, notebook.clone());
        notebook
    }

    pub async fn add_section(&self, notebook_id: Uuid, name: impl Into<String>) -> Section {
        let section = Section {
            id: Uuid::new_v4(),
            notebook_id,
            name: name.into(),
        };
        self.sections
            .write()
            .await
            .insert(section.id, section.clone());
        section
    }

    /// Returns whether the section existed.
    pub async fn remove_section(&self, section_id: Uuid) -> bool {
        self.sections.write().await.remove(&section_id).is_some()
    }

    /// Returns whether the notebook existed. Its sections are left in place.
    pub async fn remove_notebook(&self, notebook_id: Uuid) -> bool {
        self.notebooks.write().await.remove(&notebook_id).is_some()
    }
}

impl HierarchyService for InMemoryHierarchy {
    async fn sections(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Section>, StoreError> {
        let sections = self.sections.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| sections.get(id).map(|s| (*id, s.clone())))
            .collect())
    }

    async fn notebooks(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Notebook>, StoreError> {
        let notebooks = self.notebooks.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| notebooks.get(id).map(|n| (*id, n.clone())))
            .collect())
    }
}
