use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::model::{ResumeDocument, Section};

/// Identifier of a list item, unique within its document.
///
/// Fresh ids are UUID v4 strings. Ids arriving from older clients (timestamps,
/// counters) are kept verbatim as long as they are non-empty and unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// New items get an id at construction, never later.
impl Default for ItemId {
    fn default() -> Self {
        Self::generate()
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Re-issues ids that are blank or collide with an id seen earlier in the
/// document (document order). Returns how many ids were replaced.
pub fn ensure_unique_ids(doc: &mut ResumeDocument) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    let mut replaced = 0;
    for (_, id) in item_ids_mut(doc) {
        if reissue_if_taken(id, &mut seen) {
            replaced += 1;
        }
    }
    replaced
}

/// Same as [`ensure_unique_ids`], but only ids inside `section` may change:
/// every id held by another section counts as taken.
pub fn ensure_unique_ids_in(doc: &mut ResumeDocument, section: Section) -> usize {
    let ids = item_ids_mut(doc);
    let mut seen: HashSet<String> = ids
        .iter()
        .filter(|(owner, _)| *owner != section)
        .map(|(_, id)| id.0.clone())
        .collect();
    let mut replaced = 0;
    for (owner, id) in ids {
        if owner == section && reissue_if_taken(id, &mut seen) {
            replaced += 1;
        }
    }
    replaced
}

fn reissue_if_taken(id: &mut ItemId, seen: &mut HashSet<String>) -> bool {
    if !id.is_blank() && seen.insert(id.0.clone()) {
        return false;
    }
    let mut fresh = ItemId::generate();
    while !seen.insert(fresh.0.clone()) {
        fresh = ItemId::generate();
    }
    *id = fresh;
    true
}

/// Every item id with the section that owns it, in document order.
fn item_ids_mut(doc: &mut ResumeDocument) -> Vec<(Section, &mut ItemId)> {
    let mut ids: Vec<(Section, &mut ItemId)> = Vec::new();
    ids.extend(doc.education.iter_mut().map(|i| (Section::Education, &mut i.id)));
    ids.extend(doc.projects.iter_mut().map(|i| (Section::Projects, &mut i.id)));
    ids.extend(doc.experience.iter_mut().map(|i| {
        let owner = if i.internship {
            Section::Internships
        } else {
            Section::Experience
        };
        (owner, &mut i.id)
    }));
    ids.extend(doc.extracurricular.iter_mut().map(|i| (Section::Extracurricular, &mut i.id)));
    ids.extend(doc.certifications.iter_mut().map(|i| (Section::Certifications, &mut i.id)));
    ids.extend(doc.languages.iter_mut().map(|i| (Section::Languages, &mut i.id)));
    ids.extend(doc.references.iter_mut().map(|i| (Section::References, &mut i.id)));
    ids
}

/// Lists every item id in document order.
pub fn all_ids(doc: &ResumeDocument) -> Vec<&ItemId> {
    doc.education
        .iter()
        .map(|i| &i.id)
        .chain(doc.projects.iter().map(|i| &i.id))
        .chain(doc.experience.iter().map(|i| &i.id))
        .chain(doc.extracurricular.iter().map(|i| &i.id))
        .chain(doc.certifications.iter().map(|i| &i.id))
        .chain(doc.languages.iter().map(|i| &i.id))
        .chain(doc.references.iter().map(|i| &i.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{EducationItem, ProjectItem};

    #[test]
    fn test_default_ids_are_distinct() {
        assert_ne!(ItemId::default(), ItemId::default());
    }

    #[test]
    fn test_duplicate_ids_across_sections_are_reissued() {
        let mut doc = ResumeDocument {
            education: vec![EducationItem {
                id: ItemId::from("1700000000000"),
                ..Default::default()
            }],
            projects: vec![ProjectItem {
                id: ItemId::from("1700000000000"),
                ..Default::default()
            }],
            ..Default::default()
        };

        let replaced = ensure_unique_ids(&mut doc);

        assert_eq!(replaced, 1);
        // The first occurrence keeps its legacy id.
        assert_eq!(doc.education[0].id.as_str(), "1700000000000");
        assert_ne!(doc.projects[0].id.as_str(), "1700000000000");
    }

    #[test]
    fn test_scoped_reissue_leaves_other_sections_alone() {
        let mut doc = ResumeDocument {
            education: vec![EducationItem {
                id: ItemId::from("x"),
                ..Default::default()
            }],
            projects: vec![ProjectItem {
                id: ItemId::from("x"),
                ..Default::default()
            }],
            ..Default::default()
        };

        assert_eq!(ensure_unique_ids_in(&mut doc, Section::Projects), 1);
        assert_eq!(doc.education[0].id.as_str(), "x");
        assert_ne!(doc.projects[0].id.as_str(), "x");
        assert_eq!(ensure_unique_ids_in(&mut doc, Section::Education), 0);
    }

    #[test]
    fn test_blank_ids_are_filled() {
        let mut doc = ResumeDocument {
            education: vec![EducationItem {
                id: ItemId::from(""),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(ensure_unique_ids(&mut doc), 1);
        assert!(!doc.education[0].id.is_blank());
    }

    #[test]
    fn test_unique_ids_untouched() {
        let mut doc = ResumeDocument {
            education: vec![EducationItem::default(), EducationItem::default()],
            ..Default::default()
        };
        let before = doc.clone();
        assert_eq!(ensure_unique_ids(&mut doc), 0);
        assert_eq!(doc, before);
        assert_eq!(all_ids(&doc).len(), 2);
    }
}
