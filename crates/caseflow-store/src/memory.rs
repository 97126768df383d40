//! In-memory case store.
//!
//! Cases live in a `HashMap` behind a single `RwLock`. Reads share the lock;
//! every write, including the read-modify-write in `update_case`, takes it
//! exclusively, which gives the single-writer discipline SLA transitions
//! rely on.

use std::collections::HashMap;

use caseflow_core::CaseId;
use caseflow_sla::{Case, CaseStatus};
use parking_lot::RwLock;

use crate::error::{Result, StoreError};
use crate::Store;

/// A lock-guarded in-memory case store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cases: RwLock<HashMap<CaseId, Case>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with `cases`.
    ///
    /// Later duplicates replace earlier ones.
    #[must_use]
    pub fn from_cases(cases: impl IntoIterator<Item = Case>) -> Self {
        let map: HashMap<CaseId, Case> = cases.into_iter().map(|case| (case.id, case)).collect();
        tracing::debug!(count = map.len(), "Loaded cases into memory store");
        Self {
            cases: RwLock::new(map),
        }
    }

    /// Copy out every case, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Case> {
        let mut cases: Vec<Case> = self.cases.read().values().cloned().collect();
        sort_oldest_first(&mut cases);
        cases
    }

    /// Number of stored cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.read().len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.read().is_empty()
    }
}

fn sort_oldest_first(cases: &mut [Case]) {
    cases.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

impl Store for MemoryStore {
    fn put_case(&self, case: &Case) -> Result<()> {
        let mut cases = self.cases.write();
        if cases.contains_key(&case.id) {
            return Err(StoreError::AlreadyExists(case.id));
        }
        cases.insert(case.id, case.clone());
        tracing::debug!(case_id = %case.id, "Stored case");
        Ok(())
    }

    fn get_case(&self, case_id: &CaseId) -> Result<Option<Case>> {
        Ok(self.cases.read().get(case_id).cloned())
    }

    fn delete_case(&self, case_id: &CaseId) -> Result<()> {
        self.cases
            .write()
            .remove(case_id)
            .map(|_| tracing::debug!(case_id = %case_id, "Deleted case"))
            .ok_or(StoreError::NotFound(*case_id))
    }

    fn list_cases(&self) -> Result<Vec<Case>> {
        Ok(self.snapshot())
    }

    fn list_cases_by_status(&self, status: CaseStatus) -> Result<Vec<Case>> {
        let mut cases: Vec<Case> = self
            .cases
            .read()
            .values()
            .filter(|case| case.status == status)
            .cloned()
            .collect();
        sort_oldest_first(&mut cases);
        Ok(cases)
    }

    fn update_case<T, E, F>(&self, case_id: &CaseId, f: F) -> std::result::Result<(Case, T), E>
    where
        F: FnOnce(&mut Case) -> std::result::Result<T, E>,
        E: From<StoreError>,
    {
        let mut cases = self.cases.write();
        let stored = cases
            .get_mut(case_id)
            .ok_or(StoreError::NotFound(*case_id))?;

        let mut draft = stored.clone();
        let value = f(&mut draft)?;
        *stored = draft;
        Ok((stored.clone(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caseflow_core::CategoryId;
    use caseflow_sla::{PauseReason, PolicyTable, Priority, Transition};
    use chrono::{DateTime, TimeDelta, Utc};

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-06T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn create_test_case(title: &str, created_at: DateTime<Utc>) -> Case {
        Case::open(
            CaseId::generate(),
            title,
            Priority::High,
            CategoryId::new("credentialing").unwrap(),
            created_at,
            &PolicyTable::default(),
        )
    }

    #[test]
    fn case_crud() {
        let store = MemoryStore::new();
        let case = create_test_case("case", t0());

        // Create
        store.put_case(&case).unwrap();
        assert_eq!(store.len(), 1);

        // Read
        let retrieved = store.get_case(&case.id).unwrap().unwrap();
        assert_eq!(retrieved, case);

        // Delete
        store.delete_case(&case.id).unwrap();
        assert!(store.get_case(&case.id).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn put_rejects_duplicates() {
        let store = MemoryStore::new();
        let case = create_test_case("case", t0());
        store.put_case(&case).unwrap();
        assert_eq!(
            store.put_case(&case),
            Err(StoreError::AlreadyExists(case.id))
        );
    }

    #[test]
    fn delete_missing_case() {
        let store = MemoryStore::new();
        let id = CaseId::generate();
        assert_eq!(store.delete_case(&id), Err(StoreError::NotFound(id)));
    }

    #[test]
    fn list_is_oldest_first() {
        let newer = create_test_case("newer", t0() + TimeDelta::hours(1));
        let older = create_test_case("older", t0());
        let store = MemoryStore::from_cases([newer, older]);

        let titles: Vec<String> = store
            .list_cases()
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["older", "newer"]);
    }

    #[test]
    fn list_by_status() {
        let open = create_test_case("open", t0());
        let mut closed = create_test_case("closed", t0());
        closed.status = CaseStatus::Closed;
        let store = MemoryStore::from_cases([open, closed]);

        assert_eq!(
            store.list_cases_by_status(CaseStatus::Open).unwrap().len(),
            1
        );
        assert_eq!(
            store.list_cases_by_status(CaseStatus::Closed).unwrap()[0].title,
            "closed"
        );
        assert!(store
            .list_cases_by_status(CaseStatus::Resolved)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn update_commits_on_ok() {
        let store = MemoryStore::new();
        let case = create_test_case("case", t0());
        store.put_case(&case).unwrap();

        let (updated, transition) = store
            .update_case(&case.id, |c| {
                Ok::<_, StoreError>(c.sla.pause(PauseReason::AwaitingProvider, t0()))
            })
            .unwrap();
        assert_eq!(transition, Transition::Applied);
        assert!(updated.sla.is_paused());
        assert!(store.get_case(&case.id).unwrap().unwrap().sla.is_paused());
    }

    #[test]
    fn update_discards_on_err() {
        let store = MemoryStore::new();
        let case = create_test_case("case", t0());
        store.put_case(&case).unwrap();

        let result = store.update_case(&case.id, |c| {
            c.title = "changed".to_string();
            Err::<(), _>(StoreError::NotFound(c.id))
        });
        assert!(result.is_err());
        assert_eq!(store.get_case(&case.id).unwrap().unwrap().title, "case");
    }

    #[test]
    fn update_missing_case() {
        let store = MemoryStore::new();
        let id = CaseId::generate();
        let result = store.update_case(&id, |_| Ok::<_, StoreError>(()));
        assert_eq!(result, Err(StoreError::NotFound(id)));
    }

    #[test]
    fn concurrent_pauses_apply_once() {
        let store = MemoryStore::new();
        let case = create_test_case("case", t0());
        store.put_case(&case).unwrap();

        let applied: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = &store;
                    let id = case.id;
                    scope.spawn(move || {
                        let at = t0() + TimeDelta::minutes(i);
                        let (_, transition) = store
                            .update_case(&id, |c| {
                                Ok::<_, StoreError>(c.sla.pause(PauseReason::AwaitingProvider, at))
                            })
                            .unwrap();
                        usize::from(transition.is_applied())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(applied, 1);
        assert!(store.get_case(&case.id).unwrap().unwrap().sla.is_paused());
    }
}
