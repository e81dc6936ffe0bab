//! Canonical résumé schema. Every template, store and wizard operation works on
//! these types; legacy JSON shapes are migrated by `normalize` before they get here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::ids::ItemId;

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

/// The full structured résumé. Singleton sections are plain structs, list
/// sections are `Vec`s of items that each carry an [`ItemId`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeDocument {
    pub personal_details: PersonalDetails,
    pub profile_summary: ProfileSummary,
    pub education: Vec<EducationItem>,
    pub coursework: Vec<String>,
    pub projects: Vec<ProjectItem>,
    pub experience: Vec<ExperienceItem>,
    pub skills: Skills,
    pub extracurricular: Vec<ExtracurricularItem>,
    pub certifications: Vec<CertificationItem>,
    pub languages: Vec<LanguageItem>,
    pub hobbies: Vec<String>,
    pub references: Vec<ReferenceItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl PersonalDetails {
    /// "First Last", skipping whichever half is blank.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSummary {
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationItem {
    pub id: ItemId,
    pub institution: String,
    pub degree: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectItem {
    pub id: ItemId,
    pub name: String,
    pub technologies: Vec<String>,
    pub description: String,
    pub key_points: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Jobs and internships share one list; `internship` marks the latter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceItem {
    pub id: ItemId,
    pub company: String,
    pub role: String,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub current: bool,
    pub internship: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub tools: Vec<String>,
    pub other: Vec<String>,
}

impl Skills {
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
            && self.frameworks.is_empty()
            && self.tools.is_empty()
            && self.other.is_empty()
    }

    /// All skills in display order: languages, frameworks, tools, other.
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.languages
            .iter()
            .chain(&self.frameworks)
            .chain(&self.tools)
            .chain(&self.other)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtracurricularItem {
    pub id: ItemId,
    pub organization: String,
    pub role: String,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificationItem {
    pub id: ItemId,
    pub name: String,
    pub issuer: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Native,
}

impl Proficiency {
    pub fn as_str(self) -> &'static str {
        match self {
            Proficiency::Beginner => "Beginner",
            Proficiency::Intermediate => "Intermediate",
            Proficiency::Advanced => "Advanced",
            Proficiency::Native => "Native",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageItem {
    pub id: ItemId,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proficiency: Option<Proficiency>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceItem {
    pub id: ItemId,
    pub name: String,
    pub title: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub relationship: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// Names of the independently replaceable subtrees of a [`ResumeDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    PersonalDetails,
    ProfileSummary,
    Education,
    Coursework,
    Projects,
    Experience,
    Internships,
    Skills,
    Extracurricular,
    Certifications,
    Languages,
    Hobbies,
    References,
}

impl Section {
    pub const ALL: [Section; 13] = [
        Section::PersonalDetails,
        Section::ProfileSummary,
        Section::Education,
        Section::Coursework,
        Section::Projects,
        Section::Experience,
        Section::Internships,
        Section::Skills,
        Section::Extracurricular,
        Section::Certifications,
        Section::Languages,
        Section::Hobbies,
        Section::References,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::PersonalDetails => "personal_details",
            Section::ProfileSummary => "profile_summary",
            Section::Education => "education",
            Section::Coursework => "coursework",
            Section::Projects => "projects",
            Section::Experience => "experience",
            Section::Internships => "internships",
            Section::Skills => "skills",
            Section::Extracurricular => "extracurricular",
            Section::Certifications => "certifications",
            Section::Languages => "languages",
            Section::Hobbies => "hobbies",
            Section::References => "references",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSection(pub String);

impl fmt::Display for UnknownSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown section '{}'", self.0)
    }
}

impl std::error::Error for UnknownSection {}

impl FromStr for Section {
    type Err = UnknownSection;

    /// Accepts both the snake_case names and the camelCase names used by older clients.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let snake = crate::document::normalize::to_snake_case(s.trim());
        let section = match snake.as_str() {
            "personal_details" => Section::PersonalDetails,
            "profile_summary" => Section::ProfileSummary,
            "education" => Section::Education,
            "coursework" | "coursework_skills" => Section::Coursework,
            "projects" => Section::Projects,
            "experience" => Section::Experience,
            "internships" | "internship" => Section::Internships,
            "skills" | "technical_skills" => Section::Skills,
            "extracurricular" => Section::Extracurricular,
            "certifications" => Section::Certifications,
            "languages" => Section::Languages,
            "hobbies" => Section::Hobbies,
            "references" => Section::References,
            _ => return Err(UnknownSection(s.to_string())),
        };
        Ok(section)
    }
}

/// The full value of one section, as carried by a wizard `update_section` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", content = "value", rename_all = "snake_case")]
pub enum SectionValue {
    PersonalDetails(PersonalDetails),
    ProfileSummary(ProfileSummary),
    Education(Vec<EducationItem>),
    Coursework(Vec<String>),
    Projects(Vec<ProjectItem>),
    Experience(Vec<ExperienceItem>),
    Internships(Vec<ExperienceItem>),
    Skills(Skills),
    Extracurricular(Vec<ExtracurricularItem>),
    Certifications(Vec<CertificationItem>),
    Languages(Vec<LanguageItem>),
    Hobbies(Vec<String>),
    References(Vec<ReferenceItem>),
}

impl SectionValue {
    pub fn section(&self) -> Section {
        match self {
            SectionValue::PersonalDetails(_) => Section::PersonalDetails,
            SectionValue::ProfileSummary(_) => Section::ProfileSummary,
            SectionValue::Education(_) => Section::Education,
            SectionValue::Coursework(_) => Section::Coursework,
            SectionValue::Projects(_) => Section::Projects,
            SectionValue::Experience(_) => Section::Experience,
            SectionValue::Internships(_) => Section::Internships,
            SectionValue::Skills(_) => Section::Skills,
            SectionValue::Extracurricular(_) => Section::Extracurricular,
            SectionValue::Certifications(_) => Section::Certifications,
            SectionValue::Languages(_) => Section::Languages,
            SectionValue::Hobbies(_) => Section::Hobbies,
            SectionValue::References(_) => Section::References,
        }
    }
}

impl ResumeDocument {
    /// Returns a copy of the named section.
    pub fn section(&self, section: Section) -> SectionValue {
        match section {
            Section::PersonalDetails => SectionValue::PersonalDetails(self.personal_details.clone()),
            Section::ProfileSummary => SectionValue::ProfileSummary(self.profile_summary.clone()),
            Section::Education => SectionValue::Education(self.education.clone()),
            Section::Coursework => SectionValue::Coursework(self.coursework.clone()),
            Section::Projects => SectionValue::Projects(self.projects.clone()),
            Section::Experience => SectionValue::Experience(self.experience_entries(false)),
            Section::Internships => SectionValue::Internships(self.experience_entries(true)),
            Section::Skills => SectionValue::Skills(self.skills.clone()),
            Section::Extracurricular => {
                SectionValue::Extracurricular(self.extracurricular.clone())
            }
            Section::Certifications => SectionValue::Certifications(self.certifications.clone()),
            Section::Languages => SectionValue::Languages(self.languages.clone()),
            Section::Hobbies => SectionValue::Hobbies(self.hobbies.clone()),
            Section::References => SectionValue::References(self.references.clone()),
        }
    }

    /// Replaces one section's subtree wholesale. Other sections are untouched.
    pub fn replace_section(&mut self, value: SectionValue) {
        match value {
            SectionValue::PersonalDetails(v) => self.personal_details = v,
            SectionValue::ProfileSummary(v) => self.profile_summary = v,
            SectionValue::Education(v) => self.education = v,
            SectionValue::Coursework(v) => self.coursework = v,
            SectionValue::Projects(v) => self.projects = v,
            SectionValue::Experience(v) => self.replace_experience(v, false),
            SectionValue::Internships(v) => self.replace_experience(v, true),
            SectionValue::Skills(v) => self.skills = v,
            SectionValue::Extracurricular(v) => self.extracurricular = v,
            SectionValue::Certifications(v) => self.certifications = v,
            SectionValue::Languages(v) => self.languages = v,
            SectionValue::Hobbies(v) => self.hobbies = v,
            SectionValue::References(v) => self.references = v,
        }
    }

    fn experience_entries(&self, internship: bool) -> Vec<ExperienceItem> {
        self.experience
            .iter()
            .filter(|e| e.internship == internship)
            .cloned()
            .collect()
    }

    /// Jobs and internships share `experience`, jobs first. Each replaces
    /// only its own entries.
    fn replace_experience(&mut self, items: Vec<ExperienceItem>, internship: bool) {
        let kept: Vec<ExperienceItem> = std::mem::take(&mut self.experience)
            .into_iter()
            .filter(|e| e.internship != internship)
            .collect();
        let incoming = items
            .into_iter()
            .map(|e| ExperienceItem { internship, ..e });
        self.experience = if internship {
            kept.into_iter().chain(incoming).collect()
        } else {
            incoming.chain(kept).collect()
        };
    }

    /// True when nothing has ever been entered: the zero state that templates
    /// may decorate with sample content.
    pub fn is_pristine(&self) -> bool {
        *self == ResumeDocument::default()
    }

    /// Total number of list items across all sections.
    pub fn item_count(&self) -> usize {
        self.education.len()
            + self.projects.len()
            + self.experience.len()
            + self.extracurricular.len()
            + self.certifications.len()
            + self.languages.len()
            + self.references.len()
    }
}

/// Returns the trimmed value when it carries any text.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Same as [`present`] for required (non-optional) string fields.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_education() -> EducationItem {
        EducationItem {
            institution: "State University".to_string(),
            degree: "B.S.".to_string(),
            start_date: "2020".to_string(),
            end_date: Some("2024".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_replace_section_round_trips_value() {
        let mut doc = ResumeDocument::default();
        let value = SectionValue::Education(vec![sample_education()]);
        doc.replace_section(value.clone());
        assert_eq!(doc.section(Section::Education), value);
    }

    #[test]
    fn test_replace_section_leaves_other_sections_alone() {
        let mut doc = ResumeDocument {
            hobbies: vec!["Chess".to_string()],
            coursework: vec!["Algorithms".to_string()],
            ..Default::default()
        };
        let before = doc.clone();
        doc.replace_section(SectionValue::Education(vec![sample_education()]));

        for section in Section::ALL {
            if section != Section::Education {
                assert_eq!(doc.section(section), before.section(section), "{section} changed");
            }
        }
    }

    #[test]
    fn test_replace_is_full_replacement_not_merge() {
        let mut doc = ResumeDocument::default();
        doc.replace_section(SectionValue::Skills(Skills {
            languages: vec!["Rust".to_string()],
            tools: vec!["Git".to_string()],
            ..Default::default()
        }));
        doc.replace_section(SectionValue::Skills(Skills {
            languages: vec!["Go".to_string()],
            ..Default::default()
        }));
        assert_eq!(doc.skills.languages, vec!["Go"]);
        assert!(doc.skills.tools.is_empty());
    }

    fn job(company: &str, internship: bool) -> ExperienceItem {
        ExperienceItem {
            id: ItemId::from(company),
            company: company.to_string(),
            role: "Engineer".to_string(),
            start_date: "2021".to_string(),
            internship,
            ..Default::default()
        }
    }

    #[test]
    fn test_internships_replace_keeps_jobs() {
        let mut doc = ResumeDocument {
            experience: vec![job("Acme", false), job("Old Intern Co", true)],
            ..Default::default()
        };
        doc.replace_section(SectionValue::Internships(vec![job("Initech", false)]));

        let companies: Vec<&str> = doc.experience.iter().map(|e| e.company.as_str()).collect();
        assert_eq!(companies, vec!["Acme", "Initech"]);
        assert!(!doc.experience[0].internship);
        assert!(doc.experience[1].internship);
        assert_eq!(doc.section(Section::Experience), SectionValue::Experience(vec![job("Acme", false)]));
    }

    #[test]
    fn test_experience_replace_keeps_internships() {
        let mut doc = ResumeDocument {
            experience: vec![job("Acme", false), job("Initech", true)],
            ..Default::default()
        };
        doc.replace_section(SectionValue::Experience(vec![job("Globex", true), job("Hooli", false)]));

        let companies: Vec<&str> = doc.experience.iter().map(|e| e.company.as_str()).collect();
        assert_eq!(companies, vec!["Globex", "Hooli", "Initech"]);
        assert!(!doc.experience[0].internship);
        assert_eq!(
            doc.section(Section::Internships),
            SectionValue::Internships(vec![job("Initech", true)])
        );
    }

    #[test]
    fn test_default_document_is_pristine() {
        assert!(ResumeDocument::default().is_pristine());
        let doc = ResumeDocument {
            hobbies: vec!["Running".to_string()],
            ..Default::default()
        };
        assert!(!doc.is_pristine());
    }

    #[test]
    fn test_section_from_str_accepts_legacy_names() {
        assert_eq!("personalDetails".parse::<Section>(), Ok(Section::PersonalDetails));
        assert_eq!("internships".parse::<Section>(), Ok(Section::Internships));
        assert_eq!("technicalSkills".parse::<Section>(), Ok(Section::Skills));
        assert!("salary".parse::<Section>().is_err());
    }

    #[test]
    fn test_full_name_skips_blank_half() {
        let details = PersonalDetails {
            first_name: "Ada".to_string(),
            last_name: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(details.full_name().as_deref(), Some("Ada"));
        assert_eq!(PersonalDetails::default().full_name(), None);
    }
}
