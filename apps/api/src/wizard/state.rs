//! Wizard state machine: current step, selected template and the document.
//!
//! Every mutation is synchronous and infallible apart from the gated
//! `next()` and the checked `try_update_section()`, and none of them performs
//! I/O. Persistence reads a
//! [`WizardSnapshot`] taken under the session lock.

use serde::Serialize;

use crate::document::ids::{ensure_unique_ids, ensure_unique_ids_in};
use crate::document::model::{ResumeDocument, Section, SectionValue};
use crate::document::validation::{validate_section, validate_structure, FieldError};
use crate::render::templates::TemplateId;
use crate::wizard::steps::{Step, WizardFlow};

#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    document: ResumeDocument,
    current_step: usize,
    selected_template: TemplateId,
    flow: WizardFlow,
    /// Bumped on every change that persistence cares about.
    revision: u64,
}

/// Owned copy of everything a save writes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardSnapshot {
    pub document: ResumeDocument,
    pub template_id: TemplateId,
    pub step: usize,
    pub revision: u64,
}

impl WizardState {
    pub fn new(flow: WizardFlow) -> Self {
        Self {
            document: ResumeDocument::default(),
            current_step: 1,
            selected_template: TemplateId::default(),
            flow,
            revision: 0,
        }
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn current(&self) -> Step {
        self.flow.step(self.current_step)
    }

    pub fn selected_template(&self) -> TemplateId {
        self.selected_template
    }

    pub fn flow(&self) -> WizardFlow {
        self.flow
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn section(&self, section: Section) -> SectionValue {
        self.document.section(section)
    }

    /// Jumps to step `n`, clamped to `[1, N]`. Returns the new step.
    pub fn go_to_step(&mut self, n: usize) -> usize {
        self.current_step = self.flow.clamp(n);
        self.current_step
    }

    /// Advances one step once the current step's section passes its
    /// required-field rules. On failure the step is unchanged.
    pub fn next(&mut self) -> Result<usize, Vec<FieldError>> {
        let errors = self.current_errors();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(self.force_next())
    }

    /// Advances one step without validation.
    pub fn force_next(&mut self) -> usize {
        self.go_to_step(self.current_step + 1)
    }

    pub fn previous(&mut self) -> usize {
        self.go_to_step(self.current_step.saturating_sub(1))
    }

    /// Field errors for the section edited by the current step.
    pub fn current_errors(&self) -> Vec<FieldError> {
        validate_section(&self.document, self.current().section())
    }

    /// Replaces one section wholesale. Items without a usable id get one;
    /// ids in every other section are left as they are.
    pub fn update_section(&mut self, value: SectionValue) {
        let section = value.section();
        self.document.replace_section(value);
        ensure_unique_ids_in(&mut self.document, section);
        self.revision += 1;
    }

    /// Same as `update_section`, but the resulting document must pass the
    /// structural checks. On failure the state is unchanged.
    pub fn try_update_section(&mut self, value: SectionValue) -> Result<(), Vec<FieldError>> {
        let section = value.section();
        let mut candidate = self.document.clone();
        candidate.replace_section(value);
        ensure_unique_ids_in(&mut candidate, section);
        validate_structure(&candidate)?;
        self.document = candidate;
        self.revision += 1;
        Ok(())
    }

    pub fn select_template(&mut self, template_id: TemplateId) {
        if self.selected_template != template_id {
            self.selected_template = template_id;
            self.revision += 1;
        }
    }

    /// Back to an empty document on step 1 with the default template. The
    /// flow is kept.
    pub fn reset(&mut self) {
        let revision = self.revision + 1;
        *self = Self::new(self.flow);
        self.revision = revision;
    }

    /// Replaces the whole state with persisted data.
    pub fn load(&mut self, mut document: ResumeDocument, template_id: TemplateId, step: usize) {
        ensure_unique_ids(&mut document);
        self.document = document;
        self.selected_template = template_id;
        self.current_step = self.flow.clamp(step);
        self.revision += 1;
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            document: self.document.clone(),
            template_id: self.selected_template,
            step: self.current_step,
            revision: self.revision,
        }
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new(WizardFlow::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{
        EducationItem, ExperienceItem, PersonalDetails, ProfileSummary, ProjectItem,
    };
    use crate::document::ItemId;

    fn valid_personal() -> PersonalDetails {
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
    fn test_go_to_step_round_trips_clamped() {
        let mut state = WizardState::default();
        for n in 0..=12 {
            let landed = state.go_to_step(n);
            assert_eq!(landed, n.clamp(1, 10));
            assert_eq!(state.current_step(), landed);
        }
    }

    #[test]
    fn test_next_is_gated_on_required_fields() {
        let mut state = WizardState::default();
        let errors = state.next().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "personal_details.first_name"));
        assert_eq!(state.current_step(), 1);

        state.update_section(SectionValue::PersonalDetails(valid_personal()));
        assert_eq!(state.next(), Ok(2));
    }

    #[test]
    fn test_force_next_and_previous_clamp_at_edges() {
        let mut state = WizardState::new(WizardFlow::student());
        assert_eq!(state.previous(), 1);
        for _ in 0..20 {
            state.force_next();
        }
        assert_eq!(state.current_step(), 8);
        assert_eq!(state.previous(), 7);
    }

    #[test]
    fn test_update_section_replaces_only_that_section() {
        let mut state = WizardState::default();
        state.update_section(SectionValue::PersonalDetails(valid_personal()));
        let before_personal = state.section(Section::PersonalDetails);

        let education = vec![EducationItem {
            institution: "State University".to_string(),
            ..Default::default()
        }];
        state.update_section(SectionValue::Education(education.clone()));

        assert_eq!(state.section(Section::Education), SectionValue::Education(education));
        assert_eq!(state.section(Section::PersonalDetails), before_personal);
        assert_eq!(state.revision(), 2);
    }

    #[test]
    fn test_update_section_reissues_duplicate_ids() {
        let mut state = WizardState::default();
        let item = EducationItem {
            id: ItemId::from("same"),
            ..Default::default()
        };
        state.update_section(SectionValue::Education(vec![item.clone(), item]));
        let ids: Vec<&ItemId> = state.document().education.iter().map(|e| &e.id).collect();
        assert_ne!(ids[0], ids[1]);
        assert_eq!(ids[0].as_str(), "same");
    }

    #[test]
    fn test_update_section_never_renames_ids_elsewhere() {
        let mut state = WizardState::default();
        state.update_section(SectionValue::Experience(vec![ExperienceItem {
            id: ItemId::from("x"),
            company: "Acme".to_string(),
            ..Default::default()
        }]));
        let experience = state.section(Section::Experience);

        state.update_section(SectionValue::Projects(vec![ProjectItem {
            id: ItemId::from("x"),
            name: "Vitae".to_string(),
            ..Default::default()
        }]));

        assert_eq!(state.section(Section::Experience), experience);
        assert_eq!(state.document().experience[0].id.as_str(), "x");
        assert_ne!(state.document().projects[0].id.as_str(), "x");
    }

    #[test]
    fn test_try_update_section_rejects_oversized_section() {
        let mut state = WizardState::default();
        let before = state.clone();
        let education: Vec<EducationItem> = (0..51).map(|_| EducationItem::default()).collect();

        let errors = state
            .try_update_section(SectionValue::Education(education))
            .unwrap_err();

        assert!(errors.iter().any(|e| e.field == "education"));
        assert_eq!(state, before);

        state
            .try_update_section(SectionValue::Education(vec![EducationItem::default()]))
            .unwrap();
        assert_eq!(state.document().education.len(), 1);
        assert_eq!(state.revision(), 1);
    }

    #[test]
    fn test_select_template_leaves_step_and_data() {
        let mut state = WizardState::default();
        state.update_section(SectionValue::ProfileSummary(ProfileSummary {
            summary: "Hello".to_string(),
        }));
        state.go_to_step(4);
        let document = state.document().clone();

        state.select_template(TemplateId::Creative);
        assert_eq!(state.selected_template(), TemplateId::Creative);
        assert_eq!(state.current_step(), 4);
        assert_eq!(state.document(), &document);
    }

    #[test]
    fn test_reset_and_load() {
        let mut state = WizardState::new(WizardFlow::student());
        state.update_section(SectionValue::PersonalDetails(valid_personal()));
        state.go_to_step(5);
        state.reset();
        assert!(state.document().is_pristine());
        assert_eq!(state.current_step(), 1);
        assert_eq!(state.flow(), WizardFlow::student());

        let mut doc = ResumeDocument::default();
        doc.personal_details = valid_personal();
        state.load(doc.clone(), TemplateId::Minimal, 42);
        assert_eq!(state.current_step(), 8);
        assert_eq!(state.selected_template(), TemplateId::Minimal);
        assert_eq!(state.document(), &doc);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut state = WizardState::default();
        let snapshot = state.snapshot();
        state.update_section(SectionValue::PersonalDetails(valid_personal()));
        assert!(snapshot.document.is_pristine());
        assert_eq!(snapshot.revision, 0);
    }
}
