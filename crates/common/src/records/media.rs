//! Media (`OBJE`) records

use super::{GedcomRecord, MediaFile, NameList, Record, RecordResolver};
use crate::errors::Result;
use crate::gedcom;
use crate::privacy::AccessLevel;
use async_trait::async_trait;
use tracing::debug;

/// A media object: one or more files plus notes and links.
#[derive(Debug)]
pub struct Media {
    record: GedcomRecord,
}

impl Media {
    pub const RECORD_TYPE: &'static str = "OBJE";

    pub fn new(record: GedcomRecord) -> Self {
        Self { record }
    }

    /// Files attached to this object, in document order.
    ///
    /// Rebuilt from the facts on every call.
    pub fn media_files(&self) -> Vec<MediaFile> {
        self.record
            .facts_with_tag("FILE")
            .map(|fact| MediaFile::new(fact.clone(), self.record.xref()))
            .collect()
    }

    /// The first file that is an image.
    pub fn first_image_file(&self) -> Option<MediaFile> {
        self.media_files().into_iter().find(MediaFile::is_image)
    }

    /// Text of the first note. A shared note (`1 NOTE @N1@`) is followed to
    /// its record; a pointer that no longer resolves gives an empty note.
    pub async fn note(&self, resolver: &RecordResolver) -> Result<String> {
        let Some(fact) = self.record.first_fact("NOTE") else {
            return Ok(String::new());
        };

        match fact.target() {
            Some(xref) => {
                let note = resolver.instance(xref).await?;
                Ok(note
                    .map(|note| gedcom::record_text(note.as_record().base().gedcom()))
                    .unwrap_or_default())
            }
            None => Ok(fact.text()),
        }
    }
}

#[async_trait]
impl Record for Media {
    fn base(&self) -> &GedcomRecord {
        &self.record
    }

    /// Media attached to a private record is private too.
    async fn can_show_by_type(&self, access: AccessLevel, resolver: &RecordResolver) -> Result<bool> {
        for linked_id in resolver.linked_from(self.xref()).await? {
            let Some(linked) = resolver.instance(&linked_id).await? else {
                debug!(xref = %self.xref(), linked = %linked_id, "Skipping dangling link");
                continue;
            };

            if !resolver.can_show(linked.as_record(), access).await? {
                debug!(xref = %self.xref(), linked = %linked_id, "Media hidden by linked record");
                return Ok(false);
            }
        }

        Ok(resolver.default_visibility(self.base(), access))
    }

    /// Titles and filenames of every file, without blanks or repeats.
    fn extract_names(&self, names: &mut NameList) {
        let mut found: Vec<String> = Vec::new();

        for media_file in self.media_files() {
            for name in [media_file.title(), media_file.filename()] {
                if !name.is_empty() && !found.iter().any(|n| n == name) {
                    found.push(name.to_string());
                }
            }
        }

        if found.is_empty() {
            found.push(self.record.fallback_name());
        }

        for name in &found {
            names.add_name(Self::RECORD_TYPE, name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(gedcom: &str) -> Media {
        let header = gedcom::parse_header(gedcom).unwrap();
        Media::new(GedcomRecord::new(&header.xref, 1, gedcom.to_string()))
    }

    fn names(media: &Media) -> Vec<String> {
        let mut list = NameList::default();
        media.extract_names(&mut list);
        list.into_vec().into_iter().map(|n| n.full).collect()
    }

    #[test]
    fn test_no_files() {
        let object = media("0 @M1@ OBJE\n1 NOTE nothing attached");
        assert!(object.media_files().is_empty());
        assert!(object.first_image_file().is_none());
        assert_eq!(names(&object), vec!["@M1@".to_string()]);
    }

    #[test]
    fn test_media_files_in_order() {
        let object = media("0 @M2@ OBJE\n1 FILE a.pdf\n1 NOTE x\n1 FILE b.png\n2 TITL B");
        let files = object.media_files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename(), "a.pdf");
        assert_eq!(files[1].filename(), "b.png");
        assert!(files.iter().all(|f| f.media_xref() == "M2"));
    }

    #[test]
    fn test_first_image_skips_non_images() {
        let object = media("0 @M3@ OBJE\n1 FILE letter.pdf\n1 FILE portrait.jpg\n1 FILE other.png");
        let image = object.first_image_file().unwrap();
        assert_eq!(image.filename(), "portrait.jpg");
    }

    #[test]
    fn test_first_image_none_without_images() {
        let object = media("0 @M4@ OBJE\n1 FILE letter.pdf\n1 FILE song.mp3");
        assert!(object.first_image_file().is_none());
    }

    #[test]
    fn test_names_are_unique_and_non_empty() {
        let object = media(
            "0 @M5@ OBJE\n1 FILE a.jpg\n2 TITL Holiday\n1 FILE b.jpg\n2 TITL Holiday\n1 FILE a.jpg\n1 FILE c.jpg",
        );
        let found = names(&object);
        assert_eq!(found.len(), 4);
        for expected in ["Holiday", "a.jpg", "b.jpg", "c.jpg"] {
            assert!(found.iter().any(|n| n == expected), "missing {}", expected);
        }
        assert!(found.iter().all(|n| !n.is_empty()));
    }

    #[test]
    fn test_names_registered_under_media_type() {
        let object = media("0 @M6@ OBJE\n1 FILE x.png\n2 TITL X");
        assert!(object.all_names().iter().all(|n| n.kind == "OBJE"));
        assert_eq!(object.all_names().len(), 2);
    }
}
