use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::ids::all_ids;
use crate::document::model::{ResumeDocument, Section};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field, e.g. `education[0].institution`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub const MIN_SUMMARY_CHARS: usize = 50;
pub const MAX_ITEMS_PER_SECTION: usize = 50;
pub const MAX_FIELD_CHARS: usize = 5_000;

/// Required-field rules for one section, as enforced by the wizard before it
/// advances past the step that edits that section.
pub fn validate_section(doc: &ResumeDocument, section: Section) -> Vec<FieldError> {
    let mut errors = Vec::new();
    match section {
        Section::PersonalDetails => {
            let p = &doc.personal_details;
            require(&mut errors, "personal_details.first_name", &p.first_name, "First name is required");
            require(&mut errors, "personal_details.last_name", &p.last_name, "Last name is required");
            require(&mut errors, "personal_details.title", &p.title, "Professional title is required");
            if !is_valid_email(&p.email) {
                errors.push(FieldError::new("personal_details.email", "Valid email is required"));
            }
            require(&mut errors, "personal_details.phone", &p.phone, "Phone number is required");
            for (name, value) in [
                ("linkedin", &p.linkedin),
                ("github", &p.github),
                ("portfolio", &p.portfolio),
                ("website", &p.website),
            ] {
                if let Some(url) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                    if !is_valid_url(url) {
                        errors.push(FieldError::new(
                            format!("personal_details.{name}"),
                            "Must be a valid http(s) URL",
                        ));
                    }
                }
            }
        }
        Section::ProfileSummary => {
            if doc.profile_summary.summary.trim().chars().count() < MIN_SUMMARY_CHARS {
                errors.push(FieldError::new(
                    "profile_summary.summary",
                    format!("Profile summary should be at least {MIN_SUMMARY_CHARS} characters"),
                ));
            }
        }
        Section::Education => {
            for (i, e) in doc.education.iter().enumerate() {
                let at = |f: &str| format!("education[{i}].{f}");
                require(&mut errors, at("institution"), &e.institution, "Institution name is required");
                require(&mut errors, at("degree"), &e.degree, "Degree name is required");
                require(&mut errors, at("start_date"), &e.start_date, "Start date is required");
            }
        }
        Section::Projects => {
            for (i, p) in doc.projects.iter().enumerate() {
                let at = |f: &str| format!("projects[{i}].{f}");
                require(&mut errors, at("name"), &p.name, "Project name is required");
                if p.technologies.is_empty() {
                    errors.push(FieldError::new(at("technologies"), "Technology stack is required"));
                }
                require(&mut errors, at("description"), &p.description, "Project description is required");
            }
        }
        Section::Experience | Section::Internships => {
            let internship = section == Section::Internships;
            let entries = doc.experience.iter().filter(|x| x.internship == internship);
            for (i, x) in entries.enumerate() {
                let at = |f: &str| format!("{section}[{i}].{f}");
                require(&mut errors, at("company"), &x.company, "Company name is required");
                require(&mut errors, at("role"), &x.role, "Role name is required");
                require(&mut errors, at("start_date"), &x.start_date, "Start date is required");
            }
        }
        Section::Extracurricular => {
            for (i, x) in doc.extracurricular.iter().enumerate() {
                let at = |f: &str| format!("extracurricular[{i}].{f}");
                require(&mut errors, at("organization"), &x.organization, "Organization name is required");
                require(&mut errors, at("role"), &x.role, "Role name is required");
                require(&mut errors, at("start_date"), &x.start_date, "Start date is required");
            }
        }
        Section::Certifications => {
            for (i, c) in doc.certifications.iter().enumerate() {
                let at = |f: &str| format!("certifications[{i}].{f}");
                require(&mut errors, at("name"), &c.name, "Certification name is required");
                require(&mut errors, at("issuer"), &c.issuer, "Issuer is required");
                require(&mut errors, at("date"), &c.date, "Date is required");
                if let Some(url) = c.url.as_deref().filter(|v| !v.trim().is_empty()) {
                    if !is_valid_url(url) {
                        errors.push(FieldError::new(at("url"), "Must be a valid http(s) URL"));
                    }
                }
            }
        }
        Section::Languages => {
            for (i, l) in doc.languages.iter().enumerate() {
                require(&mut errors, format!("languages[{i}].language"), &l.language, "Language is required");
            }
        }
        Section::References => {
            for (i, r) in doc.references.iter().enumerate() {
                let at = |f: &str| format!("references[{i}].{f}");
                require(&mut errors, at("name"), &r.name, "Name is required");
                require(&mut errors, at("title"), &r.title, "Title is required");
                require(&mut errors, at("company"), &r.company, "Company is required");
                if !is_valid_email(&r.email) {
                    errors.push(FieldError::new(at("email"), "Valid email is required"));
                }
                require(&mut errors, at("phone"), &r.phone, "Phone is required");
                require(&mut errors, at("relationship"), &r.relationship, "Relationship is required");
            }
        }
        // Free-form lists with nothing required.
        Section::Coursework | Section::Skills | Section::Hobbies => {}
    }
    errors
}

/// Structural checks applied to every document accepted by the API, including
/// partial autosaved drafts: unique item ids, bounded list and field sizes.
/// Required-field rules are not checked here.
pub fn validate_structure(doc: &ResumeDocument) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for id in all_ids(doc) {
        if id.is_blank() {
            errors.push(FieldError::new("id", "List items must carry an id"));
        } else if !seen.insert(id.as_str()) {
            errors.push(FieldError::new("id", format!("Duplicate item id '{id}'")));
        }
    }

    let list_sizes = [
        (Section::Education, doc.education.len()),
        (Section::Coursework, doc.coursework.len()),
        (Section::Projects, doc.projects.len()),
        (Section::Experience, doc.experience.iter().filter(|x| !x.internship).count()),
        (Section::Internships, doc.experience.iter().filter(|x| x.internship).count()),
        (Section::Extracurricular, doc.extracurricular.len()),
        (Section::Certifications, doc.certifications.len()),
        (Section::Languages, doc.languages.len()),
        (Section::Hobbies, doc.hobbies.len()),
        (Section::References, doc.references.len()),
    ];
    for (section, len) in list_sizes {
        if len > MAX_ITEMS_PER_SECTION {
            errors.push(FieldError::new(
                section.as_str(),
                format!("At most {MAX_ITEMS_PER_SECTION} entries are allowed, got {len}"),
            ));
        }
    }

    // Any single string longer than the cap is rejected, wherever it lives.
    if let Ok(value) = serde_json::to_value(doc) {
        longest_string_violations(&value, "", &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn longest_string_violations(value: &serde_json::Value, path: &str, errors: &mut Vec<FieldError>) {
    match value {
        serde_json::Value::String(s) if s.chars().count() > MAX_FIELD_CHARS => {
            errors.push(FieldError::new(
                path,
                format!("Field exceeds {MAX_FIELD_CHARS} characters"),
            ));
        }
        serde_json::Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                longest_string_violations(item, &format!("{path}[{i}]"), errors);
            }
        }
        serde_json::Value::Object(obj) => {
            for (key, item) in obj {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                longest_string_violations(item, &child, errors);
            }
        }
        _ => {}
    }
}

fn require(errors: &mut Vec<FieldError>, field: impl Into<String>, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, message));
    }
}

/// A pragmatic address check: one `@`, a non-empty local part, and a dotted
/// domain without whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

pub fn is_valid_url(url: &str) -> bool {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            !host.is_empty() && !rest.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ids::ItemId;
    use crate::document::model::{EducationItem, PersonalDetails, ProfileSummary};

    fn complete_personal_details() -> PersonalDetails {
        PersonalDetails {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            title: "Engineer".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+44 20 0000 0000".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_personal_details_complete_passes() {
        let doc = ResumeDocument {
            personal_details: complete_personal_details(),
            ..Default::default()
        };
        assert!(validate_section(&doc, Section::PersonalDetails).is_empty());
    }

    #[test]
    fn test_personal_details_reports_each_missing_field() {
        let errors = validate_section(&ResumeDocument::default(), Section::PersonalDetails);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"personal_details.first_name"));
        assert!(fields.contains(&"personal_details.email"));
        assert!(fields.contains(&"personal_details.phone"));
    }

    #[test]
    fn test_bad_linkedin_url_rejected() {
        let doc = ResumeDocument {
            personal_details: PersonalDetails {
                linkedin: Some("linkedin.com/in/ada".to_string()),
                ..complete_personal_details()
            },
            ..Default::default()
        };
        let errors = validate_section(&doc, Section::PersonalDetails);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "personal_details.linkedin");
    }

    #[test]
    fn test_short_summary_rejected() {
        let doc = ResumeDocument {
            profile_summary: ProfileSummary {
                summary: "Too short".to_string(),
            },
            ..Default::default()
        };
        assert_eq!(validate_section(&doc, Section::ProfileSummary).len(), 1);
    }

    #[test]
    fn test_education_entry_missing_institution() {
        let doc = ResumeDocument {
            education: vec![EducationItem {
                degree: "B.S.".to_string(),
                start_date: "2020".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let errors = validate_section(&doc, Section::Education);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "education[0].institution");
    }

    #[test]
    fn test_empty_list_sections_are_valid() {
        let doc = ResumeDocument::default();
        assert!(validate_section(&doc, Section::Education).is_empty());
        assert!(validate_section(&doc, Section::References).is_empty());
    }

    #[test]
    fn test_structure_rejects_duplicate_ids() {
        let doc = ResumeDocument {
            education: vec![
                EducationItem {
                    id: ItemId::from("x"),
                    ..Default::default()
                },
                EducationItem {
                    id: ItemId::from("x"),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let errors = validate_structure(&doc).unwrap_err();
        assert!(errors[0].message.contains("Duplicate"));
    }

    #[test]
    fn test_structure_accepts_partial_draft() {
        let doc = ResumeDocument {
            education: vec![EducationItem::default()],
            ..Default::default()
        };
        assert!(validate_structure(&doc).is_ok());
    }

    #[test]
    fn test_structure_rejects_oversized_field() {
        let doc = ResumeDocument {
            profile_summary: ProfileSummary {
                summary: "a".repeat(MAX_FIELD_CHARS + 1),
            },
            ..Default::default()
        };
        let errors = validate_structure(&doc).unwrap_err();
        assert_eq!(errors[0].field, "profile_summary.summary");
    }

    #[test]
    fn test_email_and_url_checks() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email(""));
        assert!(is_valid_url("https://github.com/ada"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("https://"));
    }
}
