use serde::{Deserialize, Serialize};

use crate::document::model::Section;

/// One page of the data-entry wizard. Each step edits exactly one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    PersonalDetails,
    ProfileSummary,
    Education,
    Coursework,
    Experience,
    Internship,
    Projects,
    Skills,
    TechnicalSkills,
    Extracurricular,
    Certifications,
    Languages,
    Hobbies,
    References,
}

impl Step {
    pub fn section(self) -> Section {
        match self {
            Step::PersonalDetails => Section::PersonalDetails,
            Step::ProfileSummary => Section::ProfileSummary,
            Step::Education => Section::Education,
            Step::Coursework => Section::Coursework,
            Step::Experience => Section::Experience,
            Step::Internship => Section::Internships,
            Step::Projects => Section::Projects,
            Step::Skills | Step::TechnicalSkills => Section::Skills,
            Step::Extracurricular => Section::Extracurricular,
            Step::Certifications => Section::Certifications,
            Step::Languages => Section::Languages,
            Step::Hobbies => Section::Hobbies,
            Step::References => Section::References,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::PersonalDetails => "Personal Details",
            Step::ProfileSummary => "Profile Summary",
            Step::Education => "Education",
            Step::Coursework => "Coursework",
            Step::Experience => "Experience",
            Step::Internship => "Internship",
            Step::Projects => "Projects",
            Step::Skills => "Skills",
            Step::TechnicalSkills => "Technical Skills",
            Step::Extracurricular => "Extracurricular",
            Step::Certifications => "Certifications",
            Step::Languages => "Languages",
            Step::Hobbies => "Hobbies",
            Step::References => "References",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    #[default]
    Standard,
    Student,
}

const STANDARD_STEPS: [Step; 10] = [
    Step::PersonalDetails,
    Step::ProfileSummary,
    Step::Education,
    Step::Experience,
    Step::Projects,
    Step::Skills,
    Step::Certifications,
    Step::Languages,
    Step::Hobbies,
    Step::References,
];

const STUDENT_STEPS: [Step; 8] = [
    Step::PersonalDetails,
    Step::Education,
    Step::Coursework,
    Step::Projects,
    Step::Internship,
    Step::TechnicalSkills,
    Step::Extracurricular,
    Step::Certifications,
];

/// An ordered, non-empty list of steps. Step numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardFlow {
    kind: FlowKind,
    steps: &'static [Step],
}

impl WizardFlow {
    pub fn standard() -> Self {
        Self { kind: FlowKind::Standard, steps: &STANDARD_STEPS }
    }

    pub fn student() -> Self {
        Self { kind: FlowKind::Student, steps: &STUDENT_STEPS }
    }

    pub fn for_kind(kind: FlowKind) -> Self {
        match kind {
            FlowKind::Standard => Self::standard(),
            FlowKind::Student => Self::student(),
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    /// Number of steps, N.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &'static [Step] {
        self.steps
    }

    /// Clamps any step number into `[1, N]`.
    pub fn clamp(&self, n: usize) -> usize {
        n.clamp(1, self.len())
    }

    /// The step at 1-based position `n`, after clamping.
    pub fn step(&self, n: usize) -> Step {
        self.steps[self.clamp(n) - 1]
    }
}

impl Default for WizardFlow {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_lengths() {
        assert_eq!(WizardFlow::standard().len(), 10);
        assert_eq!(WizardFlow::student().len(), 8);
    }

    #[test]
    fn test_step_lookup_clamps() {
        let flow = WizardFlow::standard();
        assert_eq!(flow.step(0), Step::PersonalDetails);
        assert_eq!(flow.step(1), Step::PersonalDetails);
        assert_eq!(flow.step(10), Step::References);
        assert_eq!(flow.step(99), Step::References);
    }

    #[test]
    fn test_student_flow_maps_to_sections() {
        let sections: Vec<Section> = WizardFlow::student()
            .steps()
            .iter()
            .map(|s| s.section())
            .collect();
        assert_eq!(sections[2], Section::Coursework);
        assert_eq!(sections[4], Section::Internships);
        assert_eq!(sections[5], Section::Skills);
    }
}
