//! The five résumé templates.
//!
//! Every template renders the same canonical sections in the same fixed order
//! and differs only in typography and per-section arrangement. The shared
//! arrangement lives in the `Template` trait's default methods; a template
//! overrides a section builder only where its layout genuinely differs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::model::{
    non_blank, present, EducationItem, ExperienceItem, ResumeDocument, Section,
};
use crate::render::sample::sample_document;
use crate::render::tree::{
    Align, Color, FontFamily, Length, Node, RenderTree, Tag, A4_WIDTH_MM, PREVIEW_ROOT_ID,
};

// ────────────────────────────────────────────────────────────────────────────
// Template identifiers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Modern,
    Classic,
    Creative,
    Minimal,
    Professional,
}

impl TemplateId {
    pub const ALL: [TemplateId; 5] = [
        TemplateId::Modern,
        TemplateId::Classic,
        TemplateId::Creative,
        TemplateId::Minimal,
        TemplateId::Professional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::Modern => "modern",
            TemplateId::Classic => "classic",
            TemplateId::Creative => "creative",
            TemplateId::Minimal => "minimal",
            TemplateId::Professional => "professional",
        }
    }

    /// Lenient parse used for stored rows: anything unknown falls back to the default.
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTemplate(pub String);

impl fmt::Display for UnknownTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown template '{}'", self.0)
    }
}

impl std::error::Error for UnknownTemplate {}

impl FromStr for TemplateId {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "modern" => Ok(TemplateId::Modern),
            "classic" => Ok(TemplateId::Classic),
            "creative" => Ok(TemplateId::Creative),
            "minimal" => Ok(TemplateId::Minimal),
            "professional" => Ok(TemplateId::Professional),
            _ => Err(UnknownTemplate(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateInfo {
    pub id: TemplateId,
    pub name: &'static str,
    pub description: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Palette
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillsLayout {
    /// One labelled line per category ("Languages: Rust, Go").
    Grouped,
    /// Every skill on one line, joined by the separator.
    Inline(&'static str),
}

/// Typography and arrangement knobs shared by the default section builders.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub font: FontFamily,
    pub base_size_pt: f32,
    pub name_size_pt: f32,
    pub heading_size_pt: f32,
    pub accent: Color,
    pub header_align: Align,
    pub header_rule: bool,
    pub heading_rule: bool,
    pub bold_headings: bool,
    pub uppercase_headings: bool,
    pub date_separator: &'static str,
    pub contact_separator: &'static str,
    pub skills_layout: SkillsLayout,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            font: FontFamily::Helvetica,
            base_size_pt: 10.0,
            name_size_pt: 22.0,
            heading_size_pt: 12.0,
            accent: Color::BLACK,
            header_align: Align::Center,
            header_rule: false,
            heading_rule: true,
            bold_headings: true,
            uppercase_headings: true,
            date_separator: " - ",
            contact_separator: " | ",
            skills_layout: SkillsLayout::Grouped,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Node helpers
// ────────────────────────────────────────────────────────────────────────────

fn heading(p: &Palette, title: &str) -> Node {
    let text = if p.uppercase_headings {
        title.to_uppercase()
    } else {
        title.to_string()
    };
    Node::text(Tag::H2, text).styled(|s| {
        s.size_pt = Some(p.heading_size_pt);
        s.bold = Some(p.bold_headings);
        s.color = Some(p.accent);
        s.margin_top_mm = 3.5;
        s.margin_bottom_mm = 1.5;
        if p.heading_rule {
            s.rule_below = Some(Color::RULE);
        }
    })
}

fn section(id: &str, p: &Palette, title: &str, body: Vec<Node>) -> Node {
    Node::new(Tag::Section)
        .with_id(id)
        .with_class("resume-section")
        .child(heading(p, title))
        .children(body)
}

fn entry() -> Node {
    Node::new(Tag::Div)
        .with_class("entry")
        .styled(|s| s.margin_bottom_mm = 2.0)
}

/// Title on the left, muted text (usually dates) flush right.
fn row(left: Node, right: Option<String>) -> Node {
    let mut node = Node::new(Tag::Div).styled(|s| s.row = true).child(left);
    if let Some(right) = right {
        node = node.child(muted(right));
    }
    node
}

fn strong(tag: Tag, text: impl Into<String>) -> Node {
    Node::text(tag, text).styled(|s| s.bold = Some(true))
}

fn muted(text: impl Into<String>) -> Node {
    Node::text(Tag::Span, text).styled(|s| s.color = Some(Color::MUTED))
}

fn para(text: impl Into<String>) -> Node {
    Node::text(Tag::P, text)
}

fn italic(text: impl Into<String>) -> Node {
    Node::text(Tag::P, text).styled(|s| s.italic = Some(true))
}

fn bullets(items: &[String]) -> Option<Node> {
    let items: Vec<Node> = items
        .iter()
        .filter_map(|i| non_blank(i))
        .map(|i| Node::text(Tag::Li, i))
        .collect();
    if items.is_empty() {
        return None;
    }
    Some(
        Node::new(Tag::Ul)
            .styled(|s| s.indent_mm = 4.0)
            .children(items),
    )
}

/// "start – end", with "Present" for an open end. `None` when there is nothing to show.
pub fn date_range(start: &str, end: Option<&str>, current: bool, sep: &str) -> Option<String> {
    let start = non_blank(start);
    let end = if current {
        Some("Present")
    } else {
        end.map(str::trim).filter(|e| !e.is_empty())
    };
    match (start, end) {
        (None, None) => None,
        (None, Some(end)) => Some(end.to_string()),
        (Some(start), end) => Some(format!("{start}{sep}{}", end.unwrap_or("Present"))),
    }
}

fn display_url(url: &str) -> &str {
    let url = url.trim();
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let url = url.strip_prefix("www.").unwrap_or(url);
    url.trim_end_matches('/')
}

fn degree_line(edu: &EducationItem) -> String {
    let degree = edu.degree.trim();
    match present(&edu.field_of_study) {
        Some(field) if degree.is_empty() => field.to_string(),
        Some(field) => format!("{degree} in {field}"),
        None => degree.to_string(),
    }
}

fn place(city: &Option<String>, country: &Option<String>) -> Option<String> {
    let parts: Vec<&str> = [present(city), present(country)].into_iter().flatten().collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Joins the non-empty parts with `sep` as one paragraph of inline spans.
fn joined_line(parts: Vec<Node>, sep: &str) -> Option<Node> {
    if parts.is_empty() {
        return None;
    }
    let mut line = Node::new(Tag::P);
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            line = line.child(muted(sep));
        }
        line = line.child(part);
    }
    Some(line)
}

// ────────────────────────────────────────────────────────────────────────────
// Template contract
// ────────────────────────────────────────────────────────────────────────────

/// A pure rendering strategy: document in, render tree out.
pub trait Template: Send + Sync {
    fn id(&self) -> TemplateId;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn palette(&self) -> Palette;

    fn heading_for(&self, section: Section) -> &'static str {
        match section {
            Section::PersonalDetails => "Personal Details",
            Section::ProfileSummary => "Professional Summary",
            Section::Education => "Education",
            Section::Coursework => "Relevant Coursework",
            Section::Projects => "Projects",
            Section::Experience => "Experience",
            Section::Internships => "Internship",
            Section::Skills => "Technical Skills",
            Section::Extracurricular => "Extracurricular",
            Section::Certifications => "Certifications",
            Section::Languages => "Languages",
            Section::Hobbies => "Interests & Hobbies",
            Section::References => "References",
        }
    }

    fn header(&self, doc: &ResumeDocument) -> Node {
        let p = self.palette();
        let d = &doc.personal_details;
        let mut header = Node::new(Tag::Header).styled(|s| {
            s.align = Some(p.header_align);
            s.margin_bottom_mm = 3.0;
            if p.header_rule {
                s.rule_below = Some(p.accent);
            }
        });
        if let Some(name) = d.full_name() {
            header = header.child(Node::text(Tag::H1, name).styled(|s| {
                s.size_pt = Some(p.name_size_pt);
                s.bold = Some(true);
                s.color = Some(p.accent);
                s.margin_bottom_mm = 1.0;
            }));
        }
        if let Some(title) = non_blank(&d.title) {
            header = header.child(Node::text(Tag::P, title).styled(|s| {
                s.size_pt = Some(p.base_size_pt + 2.0);
                s.color = Some(Color::SLATE);
                s.margin_bottom_mm = 1.0;
            }));
        }

        let contacts: Vec<Node> = [non_blank(&d.email), non_blank(&d.phone), present(&d.location)]
            .into_iter()
            .flatten()
            .map(|c| Node::text(Tag::Span, c))
            .collect();
        if let Some(line) = joined_line(contacts, p.contact_separator) {
            header = header.child(line);
        }

        let links: Vec<Node> = [&d.linkedin, &d.github, &d.portfolio, &d.website]
            .into_iter()
            .filter_map(present)
            .map(|url| Node::link(display_url(url), url).styled(|s| s.color = Some(Color::LINK)))
            .collect();
        if let Some(line) = joined_line(links, p.contact_separator) {
            header = header.child(line);
        }
        header
    }

    fn education(&self, doc: &ResumeDocument) -> Option<Node> {
        if doc.education.is_empty() {
            return None;
        }
        let p = self.palette();
        let entries = doc.education.iter().map(|edu| {
            let dates = date_range(&edu.start_date, edu.end_date.as_deref(), false, p.date_separator);
            let mut detail = degree_line(edu);
            if let Some(gpa) = present(&edu.gpa) {
                detail = format!("{detail} • GPA: {gpa}");
            }
            let mut e = entry().child(row(strong(Tag::H3, edu.institution.trim()), dates));
            if !detail.trim().is_empty() {
                e = e.child(para(detail));
            }
            if let Some(place) = place(&edu.city, &edu.country) {
                e = e.child(muted(place));
            }
            e
        });
        Some(section(
            "education",
            &p,
            self.heading_for(Section::Education),
            entries.collect(),
        ))
    }

    fn summary(&self, doc: &ResumeDocument) -> Option<Node> {
        let summary = non_blank(&doc.profile_summary.summary)?;
        let p = self.palette();
        Some(section(
            "profile_summary",
            &p,
            self.heading_for(Section::ProfileSummary),
            vec![para(summary)],
        ))
    }

    fn skills(&self, doc: &ResumeDocument) -> Option<Node> {
        if doc.skills.is_empty() && doc.coursework.is_empty() {
            return None;
        }
        let p = self.palette();
        let s = &doc.skills;
        let mut body = Vec::new();
        match p.skills_layout {
            SkillsLayout::Grouped => {
                for (label, items) in [
                    ("Languages", &s.languages),
                    ("Frameworks", &s.frameworks),
                    ("Tools", &s.tools),
                    ("Other", &s.other),
                ] {
                    if !items.is_empty() {
                        body.push(
                            Node::new(Tag::P)
                                .child(strong(Tag::Span, format!("{label}: ")))
                                .child(Node::text(Tag::Span, items.join(", "))),
                        );
                    }
                }
            }
            SkillsLayout::Inline(sep) => {
                if !s.is_empty() {
                    let all: Vec<&str> = s.all().map(String::as_str).collect();
                    body.push(para(all.join(sep)));
                }
            }
        }
        if !doc.coursework.is_empty() {
            body.push(
                Node::new(Tag::P)
                    .child(strong(Tag::Span, format!("{}: ", self.heading_for(Section::Coursework))))
                    .child(Node::text(Tag::Span, doc.coursework.join(", "))),
            );
        }
        Some(section("skills", &p, self.heading_for(Section::Skills), body))
    }

    fn projects(&self, doc: &ResumeDocument) -> Option<Node> {
        if doc.projects.is_empty() {
            return None;
        }
        let p = self.palette();
        let entries = doc.projects.iter().map(|project| {
            let dates = project
                .start_date
                .as_deref()
                .and_then(|start| date_range(start, project.end_date.as_deref(), false, p.date_separator));
            let mut title = Node::new(Tag::H3).child(strong(Tag::Span, project.name.trim()));
            if !project.technologies.is_empty() {
                title = title.child(muted(format!(" | {}", project.technologies.join(", "))));
            }
            let mut e = entry().child(row(title, dates));
            if let Some(link) = present(&project.link) {
                e = e.child(Node::link(display_url(link), link).styled(|s| s.color = Some(Color::LINK)));
            }
            if let Some(description) = non_blank(&project.description) {
                e = e.child(para(description));
            }
            if let Some(list) = bullets(&project.key_points) {
                e = e.child(list);
            }
            e
        });
        Some(section(
            "projects",
            &p,
            self.heading_for(Section::Projects),
            entries.collect(),
        ))
    }

    fn experience_entry(&self, exp: &ExperienceItem) -> Node {
        let p = self.palette();
        let dates = date_range(&exp.start_date, exp.end_date.as_deref(), exp.current, p.date_separator);
        let mut e = entry().child(row(strong(Tag::H3, exp.company.trim()), dates));
        let mut subtitle = exp.role.trim().to_string();
        if let Some(location) = present(&exp.location) {
            subtitle = if subtitle.is_empty() {
                location.to_string()
            } else {
                format!("{subtitle}, {location}")
            };
        }
        if !subtitle.is_empty() {
            e = e.child(italic(subtitle));
        }
        if let Some(description) = present(&exp.description) {
            e = e.child(para(description));
        }
        if let Some(list) = bullets(&exp.highlights) {
            e = e.child(list);
        }
        e
    }

    /// Jobs and internships render as two sections at the same position.
    fn experience(&self, doc: &ResumeDocument) -> Vec<Node> {
        let p = self.palette();
        let (internships, jobs): (Vec<&ExperienceItem>, Vec<&ExperienceItem>) =
            doc.experience.iter().partition(|e| e.internship);
        let mut out = Vec::new();
        if !jobs.is_empty() {
            out.push(section(
                "experience",
                &p,
                self.heading_for(Section::Experience),
                jobs.into_iter().map(|e| self.experience_entry(e)).collect(),
            ));
        }
        if !internships.is_empty() {
            out.push(section(
                "internships",
                &p,
                self.heading_for(Section::Internships),
                internships
                    .into_iter()
                    .map(|e| self.experience_entry(e))
                    .collect(),
            ));
        }
        out
    }

    fn extracurricular(&self, doc: &ResumeDocument) -> Option<Node> {
        if doc.extracurricular.is_empty() {
            return None;
        }
        let p = self.palette();
        let entries = doc.extracurricular.iter().map(|x| {
            let dates = date_range(&x.start_date, x.end_date.as_deref(), false, p.date_separator);
            let mut e = entry().child(row(strong(Tag::H3, x.organization.trim()), dates));
            if let Some(role) = non_blank(&x.role) {
                e = e.child(italic(role));
            }
            if let Some(description) = present(&x.description) {
                e = e.child(para(description));
            }
            e
        });
        Some(section(
            "extracurricular",
            &p,
            self.heading_for(Section::Extracurricular),
            entries.collect(),
        ))
    }

    fn certifications(&self, doc: &ResumeDocument) -> Option<Node> {
        if doc.certifications.is_empty() {
            return None;
        }
        let p = self.palette();
        let entries = doc.certifications.iter().map(|c| {
            let date = match (non_blank(&c.date), present(&c.expiry_date)) {
                (Some(date), Some(expiry)) => Some(format!("{date}{}{expiry}", p.date_separator)),
                (Some(date), None) => Some(date.to_string()),
                (None, expiry) => expiry.map(str::to_string),
            };
            let mut e = entry().child(row(strong(Tag::H3, c.name.trim()), date));
            let mut issuer = c.issuer.trim().to_string();
            if let Some(credential) = present(&c.credential_id) {
                issuer = format!("{issuer} (ID: {credential})");
            }
            if !issuer.is_empty() {
                e = e.child(para(issuer));
            }
            if let Some(url) = present(&c.url) {
                e = e.child(Node::link(display_url(url), url).styled(|s| s.color = Some(Color::LINK)));
            }
            e
        });
        Some(section(
            "certifications",
            &p,
            self.heading_for(Section::Certifications),
            entries.collect(),
        ))
    }

    fn languages(&self, doc: &ResumeDocument) -> Option<Node> {
        if doc.languages.is_empty() {
            return None;
        }
        let p = self.palette();
        let parts: Vec<Node> = doc
            .languages
            .iter()
            .filter_map(|l| {
                let name = non_blank(&l.language)?;
                Some(match l.proficiency {
                    Some(level) => Node::text(Tag::Span, format!("{name} ({})", level.as_str())),
                    None => Node::text(Tag::Span, name),
                })
            })
            .collect();
        let line = joined_line(parts, ", ")?;
        Some(section("languages", &p, self.heading_for(Section::Languages), vec![line]))
    }

    fn hobbies(&self, doc: &ResumeDocument) -> Option<Node> {
        let hobbies: Vec<&str> = doc.hobbies.iter().filter_map(|h| non_blank(h)).collect();
        if hobbies.is_empty() {
            return None;
        }
        let p = self.palette();
        Some(section(
            "hobbies",
            &p,
            self.heading_for(Section::Hobbies),
            vec![para(hobbies.join(", "))],
        ))
    }

    fn references(&self, doc: &ResumeDocument) -> Option<Node> {
        if doc.references.is_empty() {
            return None;
        }
        let p = self.palette();
        let entries = doc.references.iter().map(|r| {
            let mut e = entry().child(strong(Tag::H3, r.name.trim()));
            let role: Vec<&str> = [non_blank(&r.title), non_blank(&r.company)]
                .into_iter()
                .flatten()
                .collect();
            if !role.is_empty() {
                e = e.child(para(role.join(", ")));
            }
            if let Some(relationship) = non_blank(&r.relationship) {
                e = e.child(italic(relationship));
            }
            let contact: Vec<Node> = [non_blank(&r.email), non_blank(&r.phone)]
                .into_iter()
                .flatten()
                .map(|c| Node::text(Tag::Span, c))
                .collect();
            if let Some(line) = joined_line(contact, p.contact_separator) {
                e = e.child(line);
            }
            e
        });
        Some(section(
            "references",
            &p,
            self.heading_for(Section::References),
            entries.collect(),
        ))
    }

    /// Builds the whole tree. Section order is fixed for every template.
    fn render(&self, doc: &ResumeDocument) -> RenderTree {
        let p = self.palette();
        let mut root = Node::new(Tag::Div)
            .with_id(PREVIEW_ROOT_ID)
            .with_class(format!("resume-template template-{}", self.id()))
            .styled(|s| {
                s.font = Some(p.font);
                s.size_pt = Some(p.base_size_pt);
                s.color = Some(Color::BLACK);
                s.align = Some(Align::Left);
                s.width = Some(Length::Mm(A4_WIDTH_MM));
                s.padding_mm = 8.5;
            })
            .child(self.header(doc));

        let sections = [self.education(doc), self.summary(doc), self.skills(doc), self.projects(doc)]
            .into_iter()
            .flatten()
            .chain(self.experience(doc))
            .chain(
                [
                    self.extracurricular(doc),
                    self.certifications(doc),
                    self.languages(doc),
                    self.hobbies(doc),
                    self.references(doc),
                ]
                .into_iter()
                .flatten(),
            );
        root = root.children(sections);
        RenderTree::new(root)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Templates
// ────────────────────────────────────────────────────────────────────────────

/// Single-column, sans-serif, labelled skill groups.
pub struct Modern;

impl Template for Modern {
    fn id(&self) -> TemplateId {
        TemplateId::Modern
    }
    fn name(&self) -> &'static str {
        "Modern"
    }
    fn description(&self) -> &'static str {
        "Clean single-column A4 layout with grouped skills"
    }
    fn palette(&self) -> Palette {
        Palette::default()
    }
}

/// Serif, centred header with a rule, degree-first education entries.
pub struct Classic;

impl Template for Classic {
    fn id(&self) -> TemplateId {
        TemplateId::Classic
    }
    fn name(&self) -> &'static str {
        "Classic"
    }
    fn description(&self) -> &'static str {
        "Traditional serif layout"
    }
    fn palette(&self) -> Palette {
        Palette {
            font: FontFamily::Times,
            base_size_pt: 11.0,
            name_size_pt: 24.0,
            header_rule: true,
            skills_layout: SkillsLayout::Inline(" • "),
            ..Palette::default()
        }
    }

    fn heading_for(&self, section: Section) -> &'static str {
        match section {
            Section::Experience => "Professional Experience",
            other => Modern.heading_for(other),
        }
    }

    fn education(&self, doc: &ResumeDocument) -> Option<Node> {
        if doc.education.is_empty() {
            return None;
        }
        let p = self.palette();
        let entries = doc.education.iter().map(|edu| {
            let dates = date_range(&edu.start_date, edu.end_date.as_deref(), false, p.date_separator);
            let mut e = entry()
                .child(row(strong(Tag::H3, degree_line(edu)), dates))
                .child(para(edu.institution.trim()));
            if let Some(gpa) = present(&edu.gpa) {
                e = e.child(muted(format!("GPA: {gpa}")));
            }
            e
        });
        Some(section(
            "education",
            &p,
            self.heading_for(Section::Education),
            entries.collect(),
        ))
    }

    fn experience_entry(&self, exp: &ExperienceItem) -> Node {
        let p = self.palette();
        let dates = date_range(&exp.start_date, exp.end_date.as_deref(), exp.current, p.date_separator);
        let mut e = entry()
            .child(row(strong(Tag::H3, exp.role.trim()), dates))
            .child(italic(exp.company.trim()));
        if let Some(description) = present(&exp.description) {
            e = e.child(para(description));
        }
        if let Some(list) = bullets(&exp.highlights) {
            e = e.child(list);
        }
        e
    }
}

/// Accent-coloured, left-aligned, title-case headings without rules.
pub struct Creative;

impl Template for Creative {
    fn id(&self) -> TemplateId {
        TemplateId::Creative
    }
    fn name(&self) -> &'static str {
        "Creative"
    }
    fn description(&self) -> &'static str {
        "Bold accent colour with a left-aligned header"
    }
    fn palette(&self) -> Palette {
        Palette {
            accent: Color(0x7c, 0x3a, 0xed),
            header_align: Align::Left,
            heading_rule: false,
            uppercase_headings: false,
            name_size_pt: 26.0,
            heading_size_pt: 13.0,
            contact_separator: "  •  ",
            skills_layout: SkillsLayout::Inline(" · "),
            ..Palette::default()
        }
    }

    fn heading_for(&self, section: Section) -> &'static str {
        match section {
            Section::ProfileSummary => "Profile",
            Section::Skills => "Skills",
            other => Modern.heading_for(other),
        }
    }
}

/// Light weights, thin rules, en-dash date ranges.
pub struct Minimal;

impl Template for Minimal {
    fn id(&self) -> TemplateId {
        TemplateId::Minimal
    }
    fn name(&self) -> &'static str {
        "Minimal"
    }
    fn description(&self) -> &'static str {
        "Understated layout with plenty of white space"
    }
    fn palette(&self) -> Palette {
        Palette {
            accent: Color::SLATE,
            header_align: Align::Left,
            bold_headings: false,
            uppercase_headings: false,
            heading_size_pt: 13.0,
            name_size_pt: 26.0,
            date_separator: " – ",
            contact_separator: "  ·  ",
            skills_layout: SkillsLayout::Inline(" • "),
            ..Palette::default()
        }
    }

    fn heading_for(&self, section: Section) -> &'static str {
        match section {
            Section::ProfileSummary => "About",
            Section::Skills => "Skills",
            other => Modern.heading_for(other),
        }
    }
}

/// Serif body, strong rule under the header, corporate headings.
pub struct Professional;

impl Template for Professional {
    fn id(&self) -> TemplateId {
        TemplateId::Professional
    }
    fn name(&self) -> &'static str {
        "Professional"
    }
    fn description(&self) -> &'static str {
        "Conservative layout for corporate applications"
    }
    fn palette(&self) -> Palette {
        Palette {
            font: FontFamily::Times,
            base_size_pt: 11.0,
            name_size_pt: 26.0,
            accent: Color(0x1e, 0x29, 0x3b),
            header_align: Align::Left,
            header_rule: true,
            ..Palette::default()
        }
    }

    fn heading_for(&self, section: Section) -> &'static str {
        match section {
            Section::ProfileSummary => "Executive Summary",
            Section::Experience => "Professional Experience",
            Section::Skills => "Core Competencies",
            other => Modern.heading_for(other),
        }
    }
}

static MODERN: Modern = Modern;
static CLASSIC: Classic = Classic;
static CREATIVE: Creative = Creative;
static MINIMAL: Minimal = Minimal;
static PROFESSIONAL: Professional = Professional;

pub fn template_for(id: TemplateId) -> &'static dyn Template {
    match id {
        TemplateId::Modern => &MODERN,
        TemplateId::Classic => &CLASSIC,
        TemplateId::Creative => &CREATIVE,
        TemplateId::Minimal => &MINIMAL,
        TemplateId::Professional => &PROFESSIONAL,
    }
}

pub fn list_templates() -> Vec<TemplateInfo> {
    TemplateId::ALL
        .into_iter()
        .map(|id| {
            let t = template_for(id);
            TemplateInfo {
                id,
                name: t.name(),
                description: t.description(),
            }
        })
        .collect()
}

/// Renders `doc` with the chosen template. A pristine document is rendered
/// with sample content instead; partial real data never mixes with samples.
pub fn render_document(doc: &ResumeDocument, template: TemplateId) -> RenderTree {
    let t = template_for(template);
    if doc.is_pristine() {
        let mut tree = t.render(&sample_document());
        if let Some(class) = tree.root.class.as_mut() {
            class.push_str(" sample");
        }
        tree
    } else {
        t.render(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{EducationItem, PersonalDetails, ProfileSummary, Skills};

    fn state_university() -> EducationItem {
        EducationItem {
            institution: "State University".to_string(),
            degree: "B.S.".to_string(),
            start_date: "2020".to_string(),
            end_date: Some("2024".to_string()),
            ..Default::default()
        }
    }

    fn section_ids(tree: &RenderTree) -> Vec<String> {
        tree.root
            .children
            .iter()
            .filter(|n| n.tag == Tag::Section)
            .filter_map(|n| n.id.clone())
            .collect()
    }

    fn entries(node: &Node) -> usize {
        let mut count = 0;
        node.walk(&mut |n| {
            if n.class.as_deref() == Some("entry") {
                count += 1;
            }
        });
        count
    }

    #[test]
    fn test_classic_education_entry_without_gpa() {
        let doc = ResumeDocument {
            education: vec![state_university()],
            ..Default::default()
        };
        let tree = render_document(&doc, TemplateId::Classic);
        let education = tree.find_by_id("education").expect("education section");
        assert_eq!(entries(education), 1);
        let text = education.text_content();
        assert!(text.contains("B.S."));
        assert!(text.contains("State University"));
        assert!(!text.contains("GPA"));
    }

    #[test]
    fn test_classic_education_gpa_line_when_present() {
        let doc = ResumeDocument {
            education: vec![EducationItem {
                gpa: Some("3.9".to_string()),
                ..state_university()
            }],
            ..Default::default()
        };
        let tree = render_document(&doc, TemplateId::Classic);
        assert!(tree.text_content().contains("GPA: 3.9"));
    }

    #[test]
    fn test_rendering_is_pure_for_every_template() {
        let doc = ResumeDocument {
            education: vec![state_university()],
            hobbies: vec!["Chess".to_string()],
            ..Default::default()
        };
        for id in TemplateId::ALL {
            assert_eq!(render_document(&doc, id), render_document(&doc, id), "{id}");
        }
    }

    #[test]
    fn test_root_has_preview_id_for_every_template() {
        let doc = ResumeDocument::default();
        for id in TemplateId::ALL {
            let tree = render_document(&doc, id);
            assert_eq!(tree.root.id.as_deref(), Some(PREVIEW_ROOT_ID));
            assert_eq!(tree.root.style.width, Some(Length::Mm(A4_WIDTH_MM)));
        }
    }

    #[test]
    fn test_empty_list_sections_render_nothing() {
        let doc = ResumeDocument {
            personal_details: PersonalDetails {
                first_name: "Ada".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        for id in TemplateId::ALL {
            let tree = render_document(&doc, id);
            assert!(section_ids(&tree).is_empty(), "{id} rendered {:?}", section_ids(&tree));
            assert!(!tree.text_content().contains("Your Professional Title"));
        }
    }

    #[test]
    fn test_pristine_document_renders_sample() {
        let tree = render_document(&ResumeDocument::default(), TemplateId::Modern);
        assert!(tree.text_content().contains("Your Name"));
        assert!(tree.root.class.as_deref().unwrap_or_default().contains("sample"));
    }

    #[test]
    fn test_canonical_section_order() {
        let doc = ResumeDocument {
            profile_summary: ProfileSummary {
                summary: "Summary text".to_string(),
            },
            education: vec![state_university()],
            skills: Skills {
                languages: vec!["Rust".to_string()],
                ..Default::default()
            },
            experience: vec![
                ExperienceItem {
                    company: "Acme".to_string(),
                    ..Default::default()
                },
                ExperienceItem {
                    company: "Startup".to_string(),
                    internship: true,
                    ..Default::default()
                },
            ],
            hobbies: vec!["Chess".to_string()],
            ..Default::default()
        };
        for id in TemplateId::ALL {
            let tree = render_document(&doc, id);
            assert_eq!(
                section_ids(&tree),
                vec![
                    "education",
                    "profile_summary",
                    "skills",
                    "experience",
                    "internships",
                    "hobbies"
                ],
                "{id}"
            );
        }
    }

    #[test]
    fn test_list_items_render_in_array_order() {
        let doc = ResumeDocument {
            education: vec![
                EducationItem {
                    institution: "First".to_string(),
                    ..Default::default()
                },
                EducationItem {
                    institution: "Second".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let text = render_document(&doc, TemplateId::Modern).text_content();
        let first = text.find("First").unwrap();
        let second = text.find("Second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_rendering_does_not_mutate_document() {
        let doc = ResumeDocument {
            education: vec![state_university()],
            ..Default::default()
        };
        let before = doc.clone();
        for id in TemplateId::ALL {
            let _ = render_document(&doc, id);
        }
        assert_eq!(doc, before);
    }

    #[test]
    fn test_date_range_rules() {
        assert_eq!(date_range("2020", Some("2024"), false, " - ").as_deref(), Some("2020 - 2024"));
        assert_eq!(date_range("2020", None, false, " - ").as_deref(), Some("2020 - Present"));
        assert_eq!(date_range("2020", Some("2021"), true, " - ").as_deref(), Some("2020 - Present"));
        assert_eq!(date_range("", None, false, " - "), None);
    }

    #[test]
    fn test_template_id_parsing() {
        assert_eq!("Classic".parse::<TemplateId>(), Ok(TemplateId::Classic));
        assert!("fancy".parse::<TemplateId>().is_err());
        assert_eq!(TemplateId::parse_or_default("fancy"), TemplateId::Modern);
        assert_eq!(list_templates().len(), 5);
    }
}
