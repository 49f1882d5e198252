//! Request-scoped record lookup and visibility decisions
//!
//! A resolver belongs to one request on one tree. Records are loaded on first
//! use and cached for the rest of the request, as are visibility answers.

use super::{AnyRecord, GedcomRecord, Individual, Media, Record, RecordKind};
use crate::errors::Result;
use crate::metrics;
use crate::privacy::{AccessLevel, Restriction, TreePrivacy};
use crate::store::{RecordStore, SettingStore, Tree};
use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

type VisibilityKey = (String, AccessLevel);

pub struct RecordResolver {
    tree: Tree,
    privacy: TreePrivacy,
    store: Arc<dyn RecordStore>,
    records: Mutex<HashMap<String, Option<AnyRecord>>>,
    visibility: Mutex<HashMap<VisibilityKey, bool>>,
    evaluating: Mutex<HashSet<VisibilityKey>>,
    /// Times a cycle was cut short by assuming the record visible.
    cycle_hits: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RecordResolver {
    pub fn new(tree: Tree, privacy: TreePrivacy, store: Arc<dyn RecordStore>) -> Self {
        Self {
            tree,
            privacy,
            store,
            records: Mutex::new(HashMap::new()),
            visibility: Mutex::new(HashMap::new()),
            evaluating: Mutex::new(HashSet::new()),
            cycle_hits: AtomicUsize::new(0),
        }
    }

    /// Build a resolver with the tree's privacy settings loaded.
    pub async fn load(
        tree: Tree,
        settings: &dyn SettingStore,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self> {
        let privacy = TreePrivacy::load(settings, tree.id).await?;
        Ok(Self::new(tree, privacy, store))
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn privacy(&self) -> &TreePrivacy {
        &self.privacy
    }

    /// A record of any kind.
    pub async fn instance(&self, xref: &str) -> Result<Option<AnyRecord>> {
        let cached = lock(&self.records).get(xref).cloned();
        if let Some(cached) = cached {
            return Ok(cached);
        }

        let record = self
            .store
            .fetch_any_gedcom_record(xref, self.tree.id)
            .await?
            .map(|gedcom| AnyRecord::from_gedcom(xref, self.tree.id, gedcom));

        metrics::record_lookup(record.is_some());
        lock(&self.records).insert(xref.to_string(), record.clone());

        Ok(record)
    }

    /// A record of a known kind. A cached record of another kind is `None`.
    pub async fn instance_of(&self, kind: RecordKind, xref: &str) -> Result<Option<AnyRecord>> {
        let cached = lock(&self.records).get(xref).cloned();
        if let Some(cached) = cached {
            return Ok(cached.filter(|record| kind.accepts(record.kind())));
        }

        let record = self
            .store
            .fetch_gedcom_record(kind, xref, self.tree.id)
            .await?
            .map(|gedcom| AnyRecord::from_gedcom(xref, self.tree.id, gedcom));

        metrics::record_lookup(record.is_some());

        // A miss here says nothing about other kinds, so only hits are cached.
        if let Some(ref record) = record {
            lock(&self.records).insert(xref.to_string(), Some(record.clone()));
        }

        Ok(record.filter(|record| kind.accepts(record.kind())))
    }

    pub async fn individual(&self, xref: &str) -> Result<Option<Arc<Individual>>> {
        Ok(self
            .instance_of(RecordKind::Individual, xref)
            .await?
            .and_then(|record| record.as_individual()))
    }

    pub async fn media(&self, xref: &str) -> Result<Option<Arc<Media>>> {
        Ok(self
            .instance_of(RecordKind::Media, xref)
            .await?
            .and_then(|record| record.as_media()))
    }

    /// Xrefs of records linking to `xref`, without repeats.
    pub async fn linked_from(&self, xref: &str) -> Result<Vec<String>> {
        let mut linked = self.store.fetch_linked_from_ids(xref, self.tree.id).await?;
        let mut seen = HashSet::new();
        linked.retain(|id| seen.insert(id.clone()));
        Ok(linked)
    }

    /// May a viewer with `access` see this record?
    ///
    /// Order of rules: privacy switched off or bypassed, the record's own
    /// `RESN`, a per-record default restriction, manager override, then the
    /// kind-specific rule. A record already under evaluation further up a
    /// chain of links does not block.
    ///
    /// A "shown" answer that leaned on such an assumption is only cached at
    /// the outermost call; "hidden" answers are always final.
    pub fn can_show<'a>(&'a self, record: &'a dyn Record, access: AccessLevel) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let base = record.base();

            if !self.privacy.enabled || access == AccessLevel::Hidden {
                return Ok(true);
            }

            if let Some(shown) = base
                .restriction()
                .and_then(Restriction::parse)
                .and_then(|restriction| restriction.allows(access))
            {
                return Ok(shown);
            }

            if let Some(level) = self.privacy.records.get(base.xref()) {
                return Ok(*level >= access);
            }

            if AccessLevel::Manager >= access {
                return Ok(true);
            }

            let key = (base.xref().to_string(), access);

            let cached = lock(&self.visibility).get(&key).copied();
            if let Some(shown) = cached {
                return Ok(shown);
            }

            let first_visit = lock(&self.evaluating).insert(key.clone());
            if !first_visit {
                debug!(xref = %base.xref(), "Link cycle, not blocking");
                self.cycle_hits.fetch_add(1, Ordering::Relaxed);
                return Ok(true);
            }

            let hits_before = self.cycle_hits.load(Ordering::Relaxed);
            let result = record.can_show_by_type(access, self).await;
            let outermost = {
                let mut evaluating = lock(&self.evaluating);
                evaluating.remove(&key);
                evaluating.is_empty()
            };
            let shown = result?;

            let provisional = shown && self.cycle_hits.load(Ordering::Relaxed) != hits_before;
            if provisional && !outermost {
                debug!(xref = %base.xref(), "Visibility depends on an open cycle, not cached");
            } else {
                lock(&self.visibility).insert(key, shown);
            }
            metrics::record_visibility(base.record_type(), shown);

            Ok(shown)
        })
    }

    /// The rule for kinds without their own: the tree's restriction for the
    /// record type, if any.
    pub fn default_visibility(&self, record: &GedcomRecord, access: AccessLevel) -> bool {
        self.privacy
            .record_types
            .get(record.record_type())
            .map(|level| *level >= access)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn tree() -> Tree {
        Tree {
            id: 1,
            name: "demo".to_string(),
            title: "Demo tree".to_string(),
        }
    }

    fn resolver(store: &Arc<MemoryStore>, privacy: TreePrivacy) -> RecordResolver {
        RecordResolver::new(tree(), privacy, store.clone())
    }

    fn family_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.add_record(1, "0 @I1@ INDI\n1 NAME John /Smith/\n1 OBJE @M1@");
        store.add_record(1, "0 @I2@ INDI\n1 NAME Secret /Person/\n1 RESN confidential\n1 OBJE @M2@");
        store.add_record(1, "0 @M1@ OBJE\n1 FILE john.jpg");
        store.add_record(1, "0 @M2@ OBJE\n1 FILE secret.jpg");
        store.add_record(1, "0 @M3@ OBJE\n1 FILE orphan.jpg");
        store
    }

    #[tokio::test]
    async fn test_instance_is_cached_per_request() {
        let store = family_store();
        let resolver = resolver(&store, TreePrivacy::enabled());

        let first = resolver.instance("I1").await.unwrap().unwrap();
        store.remove_record(1, "I1");
        let second = resolver.instance("I1").await.unwrap().unwrap();

        assert_eq!(first.as_record().xref(), second.as_record().xref());
        assert!(resolver.instance("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_typed_lookup_rejects_other_kinds() {
        let store = family_store();
        let resolver = resolver(&store, TreePrivacy::enabled());

        assert!(resolver.media("I1").await.unwrap().is_none());
        assert!(resolver.individual("I1").await.unwrap().is_some());
        assert!(resolver.media("M1").await.unwrap().is_some());
        assert!(resolver.individual("M1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_media_hidden_by_private_linked_record() {
        let store = family_store();
        let resolver = resolver(&store, TreePrivacy::enabled());

        let hidden = resolver.media("M2").await.unwrap().unwrap();
        let shown = resolver.media("M1").await.unwrap().unwrap();

        assert!(!resolver.can_show(hidden.as_ref(), AccessLevel::Member).await.unwrap());
        assert!(!resolver.can_show(hidden.as_ref(), AccessLevel::Visitor).await.unwrap());
        assert!(resolver.can_show(hidden.as_ref(), AccessLevel::Manager).await.unwrap());
        assert!(resolver.can_show(shown.as_ref(), AccessLevel::Visitor).await.unwrap());
    }

    #[tokio::test]
    async fn test_linked_record_overrides_media_default() {
        let store = family_store();
        // Media would be visible to members by its own rule.
        let privacy = TreePrivacy::enabled().with_record_type("OBJE", AccessLevel::Visitor);
        let resolver = resolver(&store, privacy);

        let media = resolver.media("M2").await.unwrap().unwrap();
        assert!(!resolver.can_show(media.as_ref(), AccessLevel::Member).await.unwrap());
    }

    #[tokio::test]
    async fn test_dangling_link_is_ignored() {
        let store = family_store();
        store.add_link(1, "GONE", "M3");
        let resolver = resolver(&store, TreePrivacy::enabled());

        let media = resolver.media("M3").await.unwrap().unwrap();
        assert!(resolver.can_show(media.as_ref(), AccessLevel::Visitor).await.unwrap());
    }

    #[tokio::test]
    async fn test_media_falls_back_to_record_type_rule() {
        let store = family_store();
        let privacy = TreePrivacy::enabled().with_record_type("OBJE", AccessLevel::Member);
        let resolver = resolver(&store, privacy);

        let media = resolver.media("M3").await.unwrap().unwrap();
        assert!(resolver.can_show(media.as_ref(), AccessLevel::Member).await.unwrap());
        assert!(!resolver.can_show(media.as_ref(), AccessLevel::Visitor).await.unwrap());
    }

    #[tokio::test]
    async fn test_privacy_disabled_shows_everything() {
        let store = family_store();
        let resolver = resolver(&store, TreePrivacy::disabled());

        let media = resolver.media("M2").await.unwrap().unwrap();
        assert!(resolver.can_show(media.as_ref(), AccessLevel::Visitor).await.unwrap());
    }

    #[tokio::test]
    async fn test_resn_rules() {
        let store = Arc::new(MemoryStore::new());
        store.add_record(1, "0 @S1@ SOUR\n1 RESN none");
        store.add_record(1, "0 @S2@ SOUR\n1 RESN privacy");
        let privacy = TreePrivacy::enabled().with_record_type("SOUR", AccessLevel::Hidden);
        let resolver = resolver(&store, privacy);

        let open = resolver.instance("S1").await.unwrap().unwrap();
        let members = resolver.instance("S2").await.unwrap().unwrap();

        assert!(resolver.can_show(open.as_record(), AccessLevel::Visitor).await.unwrap());
        assert!(resolver.can_show(members.as_record(), AccessLevel::Member).await.unwrap());
        assert!(!resolver.can_show(members.as_record(), AccessLevel::Visitor).await.unwrap());
    }

    #[tokio::test]
    async fn test_per_record_restriction() {
        let store = family_store();
        let privacy = TreePrivacy::enabled().with_record("I1", AccessLevel::Manager);
        let resolver = resolver(&store, privacy);

        let media = resolver.media("M1").await.unwrap().unwrap();
        assert!(!resolver.can_show(media.as_ref(), AccessLevel::Member).await.unwrap());
    }

    #[tokio::test]
    async fn test_link_cycle_terminates() {
        let store = Arc::new(MemoryStore::new());
        store.add_record(1, "0 @M1@ OBJE\n1 FILE a.jpg\n1 OBJE @M2@");
        store.add_record(1, "0 @M2@ OBJE\n1 FILE b.jpg\n1 OBJE @M1@");
        let resolver = resolver(&store, TreePrivacy::enabled());

        let media = resolver.media("M1").await.unwrap().unwrap();
        assert!(resolver.can_show(media.as_ref(), AccessLevel::Visitor).await.unwrap());
        // Second call is answered from the cache.
        assert!(resolver.can_show(media.as_ref(), AccessLevel::Visitor).await.unwrap());
    }

    fn cycle_with_hidden_link() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.add_record(1, "0 @M2@ OBJE\n1 FILE b.jpg\n1 OBJE @M1@");
        store.add_record(1, "0 @I9@ INDI\n1 NAME Hidden /Person/\n1 RESN confidential\n1 OBJE @M1@");
        store.add_record(1, "0 @M1@ OBJE\n1 FILE a.jpg\n1 OBJE @M2@");
        store
    }

    #[tokio::test]
    async fn test_cycle_does_not_leak_visibility() {
        let store = cycle_with_hidden_link();

        // M1 first: M2 is reached inside the M1 cycle
        let first = resolver(&store, TreePrivacy::enabled());
        let m1 = first.media("M1").await.unwrap().unwrap();
        let m2 = first.media("M2").await.unwrap().unwrap();
        assert!(!first.can_show(m1.as_ref(), AccessLevel::Visitor).await.unwrap());
        assert!(!first.can_show(m2.as_ref(), AccessLevel::Visitor).await.unwrap());

        // M2 on its own
        let fresh = resolver(&store, TreePrivacy::enabled());
        let m2 = fresh.media("M2").await.unwrap().unwrap();
        assert!(!fresh.can_show(m2.as_ref(), AccessLevel::Visitor).await.unwrap());

        // M2 then M1
        let reversed = resolver(&store, TreePrivacy::enabled());
        let m1 = reversed.media("M1").await.unwrap().unwrap();
        let m2 = reversed.media("M2").await.unwrap().unwrap();
        assert!(!reversed.can_show(m2.as_ref(), AccessLevel::Visitor).await.unwrap());
        assert!(!reversed.can_show(m1.as_ref(), AccessLevel::Visitor).await.unwrap());
        assert!(reversed.can_show(m1.as_ref(), AccessLevel::Manager).await.unwrap());
    }

    #[tokio::test]
    async fn test_media_note_follows_pointer() {
        let store = Arc::new(MemoryStore::new());
        store.add_record(1, "0 @N1@ NOTE Taken at the\n1 CONT family farm");
        store.add_record(1, "0 @M1@ OBJE\n1 FILE farm.jpg\n1 NOTE @N1@");
        store.add_record(1, "0 @M2@ OBJE\n1 FILE inline.jpg\n1 NOTE Inline note");
        store.add_record(1, "0 @M3@ OBJE\n1 FILE none.jpg");
        store.add_record(1, "0 @M4@ OBJE\n1 FILE lost.jpg\n1 NOTE @N9@");
        let resolver = resolver(&store, TreePrivacy::disabled());

        let shared = resolver.media("M1").await.unwrap().unwrap();
        let inline = resolver.media("M2").await.unwrap().unwrap();
        let none = resolver.media("M3").await.unwrap().unwrap();
        let lost = resolver.media("M4").await.unwrap().unwrap();

        assert_eq!(shared.note(&resolver).await.unwrap(), "Taken at the\nfamily farm");
        assert_eq!(inline.note(&resolver).await.unwrap(), "Inline note");
        assert_eq!(none.note(&resolver).await.unwrap(), "");
        assert_eq!(lost.note(&resolver).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_linked_from_has_no_repeats() {
        let store = family_store();
        store.add_link(1, "I1", "M1");
        let resolver = resolver(&store, TreePrivacy::enabled());

        assert_eq!(resolver.linked_from("M1").await.unwrap(), vec!["I1".to_string()]);
    }
}
