//! A level-1 GEDCOM fact and its nested lines

use super::{continued_text, pointer_target, GedcomLine};

/// One fact of a record: `1 TAG value` plus every deeper line below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    tag: String,
    value: String,
    gedcom: String,
}

impl Fact {
    /// Build a fact from its GEDCOM text. The first line must be level 1.
    pub fn new(gedcom: &str) -> Option<Self> {
        let lines: Vec<&str> = gedcom.lines().collect();
        Self::from_lines(&lines)
    }

    pub(crate) fn from_lines(lines: &[&str]) -> Option<Self> {
        let first = GedcomLine::parse(lines.first()?)?;
        if first.level != 1 {
            return None;
        }

        Some(Self {
            tag: first.tag.to_string(),
            value: first.value.to_string(),
            gedcom: lines.join("\n"),
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Value on the fact's own line, without continuations.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn gedcom(&self) -> &str {
        &self.gedcom
    }

    /// Xref this fact points at, when its value is `@XREF@`.
    ///
    /// This is a weak reference: the target may no longer exist.
    pub fn target(&self) -> Option<&str> {
        pointer_target(&self.value)
    }

    /// Value of the first level-2 line with the given tag.
    pub fn attribute(&self, tag: &str) -> Option<&str> {
        self.nested(2, tag)
    }

    /// Value of the first line at `level` with the given tag.
    pub fn nested(&self, level: u8, tag: &str) -> Option<&str> {
        self.gedcom
            .lines()
            .skip(1)
            .filter_map(GedcomLine::parse)
            .find(|line| line.level == level && line.tag == tag)
            .map(|line| line.value)
    }

    /// The value joined with its `CONT`/`CONC` lines.
    pub fn text(&self) -> String {
        continued_text(
            &self.value,
            self.gedcom.lines().skip(1).filter_map(GedcomLine::parse),
            2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_fields() {
        let fact = Fact::new("1 FILE scans/census.png\n2 FORM png\n3 TYPE document\n2 TITL 1881 census").unwrap();
        assert_eq!(fact.tag(), "FILE");
        assert_eq!(fact.value(), "scans/census.png");
        assert_eq!(fact.attribute("TITL"), Some("1881 census"));
        assert_eq!(fact.attribute("FORM"), Some("png"));
        assert_eq!(fact.nested(3, "TYPE"), Some("document"));
        assert_eq!(fact.attribute("TYPE"), None);
        assert_eq!(fact.target(), None);
    }

    #[test]
    fn test_fact_target() {
        let fact = Fact::new("1 NOTE @N12@").unwrap();
        assert_eq!(fact.target(), Some("N12"));
    }

    #[test]
    fn test_fact_requires_level_one() {
        assert!(Fact::new("2 FORM jpg").is_none());
        assert!(Fact::new("").is_none());
    }

    #[test]
    fn test_fact_text() {
        let fact = Fact::new("1 NOTE Taken in\n2 CONT the garden\n2 CONC  at noon").unwrap();
        assert_eq!(fact.value(), "Taken in");
        assert_eq!(fact.text(), "Taken in\nthe garden at noon");
    }
}
