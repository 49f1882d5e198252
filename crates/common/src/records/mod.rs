//! GEDCOM records
//!
//! Every record is a [`GedcomRecord`] (xref, tree, raw GEDCOM, parsed facts).
//! Kinds with their own behaviour wrap it and implement [`Record`]; the
//! default methods of that trait carry the rules shared by all kinds.

mod individual;
mod media;
mod media_file;
mod resolver;

pub use individual::Individual;
pub use media::Media;
pub use media_file::MediaFile;
pub use resolver::RecordResolver;

use crate::errors::Result;
use crate::gedcom::{self, Fact};
use crate::privacy::AccessLevel;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, OnceLock};

/// Record kinds, from the tag of the level-0 line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Individual,
    Family,
    Source,
    Media,
    Repository,
    Note,
    Submitter,
    /// Anything stored in the `other` table without a dedicated kind.
    Other,
}

/// Table a record kind is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTable {
    Individuals,
    Families,
    Sources,
    Media,
    Other,
}

impl RecordKind {
    /// Tables to try, in order, when the kind of an xref is unknown.
    pub const LOOKUP_ORDER: [RecordKind; 5] = [
        RecordKind::Individual,
        RecordKind::Family,
        RecordKind::Source,
        RecordKind::Media,
        RecordKind::Other,
    ];

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "INDI" => RecordKind::Individual,
            "FAM" => RecordKind::Family,
            "SOUR" => RecordKind::Source,
            "OBJE" => RecordKind::Media,
            "REPO" => RecordKind::Repository,
            "NOTE" => RecordKind::Note,
            "SUBM" => RecordKind::Submitter,
            _ => RecordKind::Other,
        }
    }

    /// GEDCOM tag, or `None` for [`RecordKind::Other`].
    pub fn tag(self) -> Option<&'static str> {
        match self {
            RecordKind::Individual => Some("INDI"),
            RecordKind::Family => Some("FAM"),
            RecordKind::Source => Some("SOUR"),
            RecordKind::Media => Some("OBJE"),
            RecordKind::Repository => Some("REPO"),
            RecordKind::Note => Some("NOTE"),
            RecordKind::Submitter => Some("SUBM"),
            RecordKind::Other => None,
        }
    }

    pub fn table(self) -> RecordTable {
        match self {
            RecordKind::Individual => RecordTable::Individuals,
            RecordKind::Family => RecordTable::Families,
            RecordKind::Source => RecordTable::Sources,
            RecordKind::Media => RecordTable::Media,
            RecordKind::Repository
            | RecordKind::Note
            | RecordKind::Submitter
            | RecordKind::Other => RecordTable::Other,
        }
    }

    /// Does a lookup for `self` accept a record that turned out to be `actual`?
    /// `Other` accepts anything from the `other` table.
    pub fn accepts(self, actual: RecordKind) -> bool {
        self == actual || (self == RecordKind::Other && actual.table() == RecordTable::Other)
    }
}

/// A display name registered against a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordName {
    /// Tag the name was registered under (`NAME`, `OBJE`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub full: String,
}

/// Names collected during extraction.
#[derive(Debug, Default)]
pub struct NameList {
    names: Vec<RecordName>,
}

impl NameList {
    pub fn add_name(&mut self, kind: &str, full: &str) {
        self.names.push(RecordName {
            kind: kind.to_string(),
            full: full.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn into_vec(self) -> Vec<RecordName> {
        self.names
    }
}

/// Data common to every record. Immutable once loaded.
#[derive(Debug)]
pub struct GedcomRecord {
    xref: String,
    tree_id: i32,
    record_type: String,
    gedcom: String,
    facts: Vec<Fact>,
    names: OnceLock<Vec<RecordName>>,
}

impl GedcomRecord {
    /// Build a record from its GEDCOM. The type comes from the level-0 line.
    pub fn new(xref: &str, tree_id: i32, gedcom: String) -> Self {
        let record_type = gedcom::parse_header(&gedcom)
            .map(|header| header.tag)
            .unwrap_or_default();
        let facts = gedcom::split_facts(&gedcom);

        Self {
            xref: xref.to_string(),
            tree_id,
            record_type,
            gedcom,
            facts,
            names: OnceLock::new(),
        }
    }

    pub fn xref(&self) -> &str {
        &self.xref
    }

    pub fn tree_id(&self) -> i32 {
        self.tree_id
    }

    /// Tag of the level-0 line, e.g. `OBJE`.
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn kind(&self) -> RecordKind {
        RecordKind::from_tag(&self.record_type)
    }

    pub fn gedcom(&self) -> &str {
        &self.gedcom
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Facts with a given tag, in document order.
    pub fn facts_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.facts.iter().filter(move |fact| fact.tag() == tag)
    }

    pub fn first_fact(&self, tag: &str) -> Option<&Fact> {
        self.facts.iter().find(|fact| fact.tag() == tag)
    }

    /// Value of the record-level `1 RESN`.
    pub fn restriction(&self) -> Option<&str> {
        self.first_fact("RESN").map(|fact| fact.value())
    }

    /// Name used when nothing better can be extracted.
    pub fn fallback_name(&self) -> String {
        format!("@{}@", self.xref)
    }
}

/// Behaviour shared by all record kinds, with per-kind overrides.
#[async_trait]
pub trait Record: Send + Sync {
    fn base(&self) -> &GedcomRecord;

    fn xref(&self) -> &str {
        self.base().xref()
    }

    /// Kind-specific visibility, consulted after record-level restrictions.
    ///
    /// The default applies the tree's restriction for this record type.
    async fn can_show_by_type(&self, access: AccessLevel, resolver: &RecordResolver) -> Result<bool> {
        Ok(resolver.default_visibility(self.base(), access))
    }

    /// Register the record's names. The default uses its `NAME` facts.
    fn extract_names(&self, names: &mut NameList) {
        for fact in self.base().facts_with_tag("NAME") {
            if !fact.value().is_empty() {
                names.add_name("NAME", fact.value());
            }
        }
    }

    /// All names, extracted once. Never empty.
    fn all_names(&self) -> &[RecordName] {
        self.base().names.get_or_init(|| {
            let mut names = NameList::default();
            self.extract_names(&mut names);
            if names.is_empty() {
                let base = self.base();
                names.add_name(base.record_type(), &base.fallback_name());
            }
            names.into_vec()
        })
    }
}

#[async_trait]
impl Record for GedcomRecord {
    fn base(&self) -> &GedcomRecord {
        self
    }
}

/// A loaded record of any kind, as cached by the resolver.
#[derive(Debug, Clone)]
pub enum AnyRecord {
    Individual(Arc<Individual>),
    Media(Arc<Media>),
    Generic(Arc<GedcomRecord>),
}

impl AnyRecord {
    /// Wrap raw GEDCOM in the type matching its level-0 tag.
    pub fn from_gedcom(xref: &str, tree_id: i32, gedcom: String) -> Self {
        let record = GedcomRecord::new(xref, tree_id, gedcom);
        match record.kind() {
            RecordKind::Individual => AnyRecord::Individual(Arc::new(Individual::new(record))),
            RecordKind::Media => AnyRecord::Media(Arc::new(Media::new(record))),
            _ => AnyRecord::Generic(Arc::new(record)),
        }
    }

    pub fn as_record(&self) -> &dyn Record {
        match self {
            AnyRecord::Individual(individual) => individual.as_ref(),
            AnyRecord::Media(media) => media.as_ref(),
            AnyRecord::Generic(record) => record.as_ref(),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.as_record().base().kind()
    }

    pub fn as_individual(&self) -> Option<Arc<Individual>> {
        match self {
            AnyRecord::Individual(individual) => Some(Arc::clone(individual)),
            _ => None,
        }
    }

    pub fn as_media(&self) -> Option<Arc<Media>> {
        match self {
            AnyRecord::Media(media) => Some(Arc::clone(media)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_tag() {
        assert_eq!(RecordKind::from_tag("OBJE"), RecordKind::Media);
        assert_eq!(RecordKind::from_tag("INDI"), RecordKind::Individual);
        assert_eq!(RecordKind::from_tag("_TODO"), RecordKind::Other);
        assert_eq!(RecordKind::Note.table(), RecordTable::Other);
        assert!(RecordKind::Other.accepts(RecordKind::Note));
        assert!(!RecordKind::Note.accepts(RecordKind::Repository));
        assert!(!RecordKind::Media.accepts(RecordKind::Individual));
    }

    #[test]
    fn test_gedcom_record_fields() {
        let record = GedcomRecord::new("S1", 1, "0 @S1@ SOUR\n1 TITL Parish register\n1 RESN privacy".to_string());
        assert_eq!(record.xref(), "S1");
        assert_eq!(record.tree_id(), 1);
        assert_eq!(record.record_type(), "SOUR");
        assert_eq!(record.kind(), RecordKind::Source);
        assert_eq!(record.restriction(), Some("privacy"));
        assert_eq!(record.first_fact("TITL").map(|f| f.value()), Some("Parish register"));
        assert_eq!(record.fallback_name(), "@S1@");
    }

    #[test]
    fn test_base_names_fall_back_to_xref() {
        let record = GedcomRecord::new("R1", 1, "0 @R1@ REPO".to_string());
        let names = record.all_names();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].full, "@R1@");
        assert_eq!(names[0].kind, "REPO");
    }

    #[test]
    fn test_any_record_dispatch() {
        let media = AnyRecord::from_gedcom("M1", 1, "0 @M1@ OBJE\n1 FILE a.jpg".to_string());
        assert!(media.as_media().is_some());
        assert!(media.as_individual().is_none());
        assert_eq!(media.kind(), RecordKind::Media);

        let family = AnyRecord::from_gedcom("F1", 1, "0 @F1@ FAM".to_string());
        assert!(matches!(family, AnyRecord::Generic(_)));
        assert_eq!(family.as_record().xref(), "F1");
    }
}
