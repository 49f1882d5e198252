//! Individual (`INDI`) records

use super::{GedcomRecord, Record};
use async_trait::async_trait;

#[derive(Debug)]
pub struct Individual {
    record: GedcomRecord,
}

impl Individual {
    pub fn new(record: GedcomRecord) -> Self {
        Self { record }
    }

    /// Primary name with the surname slashes removed, e.g. `John /Smith/`
    /// becomes `John Smith`. Falls back to the xref.
    pub fn full_name(&self) -> String {
        self.all_names()
            .first()
            .map(|name| display_name(&name.full))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.record.fallback_name())
    }

    /// Value of `1 SEX`, `U` when absent.
    pub fn sex(&self) -> &str {
        self.record
            .first_fact("SEX")
            .map(|fact| fact.value())
            .filter(|sex| !sex.is_empty())
            .unwrap_or("U")
    }
}

#[async_trait]
impl Record for Individual {
    fn base(&self) -> &GedcomRecord {
        &self.record
    }
}

fn display_name(gedcom_name: &str) -> String {
    gedcom_name
        .replace('/', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
