//! Placeholder résumé shown while a document is still pristine, so the preview
//! never opens on a blank page. Never merged into user data.

use crate::document::ids::ItemId;
use crate::document::model::{
    EducationItem, ExperienceItem, LanguageItem, PersonalDetails, Proficiency, ProfileSummary,
    ProjectItem, ResumeDocument, Skills,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A fixed sample document. Ids are constant so rendering stays deterministic.
pub fn sample_document() -> ResumeDocument {
    ResumeDocument {
        personal_details: PersonalDetails {
            first_name: "Your".to_string(),
            last_name: "Name".to_string(),
            title: "Your Professional Title".to_string(),
            email: "you@example.com".to_string(),
            phone: "+1 555 010 0000".to_string(),
            location: Some("City, Country".to_string()),
            ..Default::default()
        },
        profile_summary: ProfileSummary {
            summary: "A short paragraph about who you are, what you are good at and the kind \
                      of role you are looking for next."
                .to_string(),
        },
        education: vec![EducationItem {
            id: ItemId::from("sample-education"),
            institution: "University Name".to_string(),
            degree: "Degree".to_string(),
            field_of_study: Some("Field of Study".to_string()),
            start_date: "2019".to_string(),
            end_date: Some("2023".to_string()),
            ..Default::default()
        }],
        projects: vec![ProjectItem {
            id: ItemId::from("sample-project"),
            name: "Project Name".to_string(),
            technologies: strings(&["Technology", "Stack", "Used"]),
            description: "What the project does and the problem it solves.".to_string(),
            key_points: strings(&["A measurable result you achieved with it."]),
            ..Default::default()
        }],
        experience: vec![ExperienceItem {
            id: ItemId::from("sample-experience"),
            company: "Company Name".to_string(),
            role: "Job Title".to_string(),
            start_date: "2023".to_string(),
            current: true,
            highlights: strings(&["About the role and responsibilities carried out."]),
            ..Default::default()
        }],
        skills: Skills {
            languages: strings(&["Language"]),
            frameworks: strings(&["Framework"]),
            tools: strings(&["Tool"]),
            ..Default::default()
        },
        languages: vec![LanguageItem {
            id: ItemId::from("sample-language"),
            language: "English".to_string(),
            proficiency: Some(Proficiency::Native),
        }],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_not_pristine_and_stable() {
        let sample = sample_document();
        assert!(!sample.is_pristine());
        assert_eq!(sample, sample_document());
    }
}
