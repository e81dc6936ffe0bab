//! One-time migration of historical résumé JSON into the canonical schema.
//!
//! Older clients stored the same logical field under several keys
//! (`collegeName` / `institutionName` / `institution`), kept internships in a
//! separate list, and occasionally stored the whole document as a JSON string.
//! Everything is folded into the canonical shape here, at the ingestion
//! boundary, so templates only ever see one field name per concept.

use std::collections::HashSet;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::document::ids::ensure_unique_ids;
use crate::document::model::{ResumeDocument, Section, SectionValue};

/// Converts `camelCase` (and `PascalCase`) keys to `snake_case`.
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '-' || c == ' ' {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}

/// Parses raw (possibly legacy-shaped) JSON into a canonical document with
/// unique item ids.
pub fn parse_document(raw: Value) -> Result<ResumeDocument, serde_json::Error> {
    let mut doc: ResumeDocument = serde_json::from_value(normalize_legacy(raw))?;
    ensure_unique_ids(&mut doc);
    Ok(doc)
}

/// Lists whose entries carry an `id`, in document order.
const ID_LISTS: [&str; 7] = [
    "education",
    "projects",
    "experience",
    "extracurricular",
    "certifications",
    "languages",
    "references",
];

/// Parses a stored document. Entries stored without a usable id (missing,
/// blank or repeated) get one derived from `seed` and their position, so every
/// read of the same stored value yields the same ids.
pub fn parse_stored_document(raw: Value, seed: Uuid) -> Result<ResumeDocument, serde_json::Error> {
    let mut canonical = normalize_legacy(raw);
    assign_stable_ids(&mut canonical, seed);
    let mut doc: ResumeDocument = serde_json::from_value(canonical)?;
    ensure_unique_ids(&mut doc);
    Ok(doc)
}

fn assign_stable_ids(doc: &mut Value, seed: Uuid) {
    let mut seen: HashSet<String> = HashSet::new();
    for list in ID_LISTS {
        let Some(Value::Array(items)) = doc.get_mut(list) else {
            continue;
        };
        for (i, item) in items.iter_mut().enumerate() {
            let Value::Object(obj) = item else {
                continue;
            };
            let current = match obj.get("id") {
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            let id = match current {
                Some(id) if seen.insert(id.clone()) => id,
                _ => {
                    let derived = Uuid::new_v5(&seed, format!("{list}/{i}").as_bytes()).to_string();
                    seen.insert(derived.clone());
                    derived
                }
            };
            obj.insert("id".into(), Value::String(id));
        }
    }
}

/// Parses the raw JSON value of a single section.
pub fn parse_section(section: Section, raw: Value) -> Result<SectionValue, serde_json::Error> {
    let raw = unwrap_json_string(raw);
    let value = match section {
        Section::PersonalDetails => {
            SectionValue::PersonalDetails(serde_json::from_value(clean_object(raw))?)
        }
        Section::ProfileSummary => {
            SectionValue::ProfileSummary(serde_json::from_value(normalize_summary(raw))?)
        }
        Section::Education => {
            SectionValue::Education(serde_json::from_value(map_items(raw, education_item))?)
        }
        Section::Coursework => SectionValue::Coursework(string_list(coursework_list(raw))),
        Section::Projects => {
            SectionValue::Projects(serde_json::from_value(map_items(raw, project_item))?)
        }
        Section::Experience => SectionValue::Experience(serde_json::from_value(map_items(
            raw,
            |item| experience_item(item, false),
        ))?),
        Section::Internships => SectionValue::Internships(serde_json::from_value(map_items(
            raw,
            |item| experience_item(item, true),
        ))?),
        Section::Skills => SectionValue::Skills(serde_json::from_value(normalize_skills(raw))?),
        Section::Extracurricular => SectionValue::Extracurricular(serde_json::from_value(
            map_items(raw, extracurricular_item),
        )?),
        Section::Certifications => {
            SectionValue::Certifications(serde_json::from_value(map_items(raw, clean_object))?)
        }
        Section::Languages => {
            SectionValue::Languages(serde_json::from_value(map_items(raw, language_item))?)
        }
        Section::Hobbies => SectionValue::Hobbies(string_list(hobby_list(raw))),
        Section::References => {
            SectionValue::References(serde_json::from_value(map_items(raw, clean_object))?)
        }
    };
    Ok(value)
}

/// Rewrites a raw document value into the canonical key layout.
pub fn normalize_legacy(raw: Value) -> Value {
    let raw = unwrap_json_string(raw);
    let Value::Object(obj) = snake_keys(raw) else {
        return Value::Object(Map::new());
    };
    let mut obj = obj;
    let mut out = Map::new();

    if let Some(v) = obj.remove("personal_details") {
        out.insert("personal_details".into(), clean_object(v));
    }
    if let Some(v) = obj.remove("profile_summary") {
        out.insert("profile_summary".into(), normalize_summary(v));
    }
    if let Some(v) = obj.remove("education") {
        out.insert("education".into(), map_items(v, education_item));
    }

    // coursework: plain list or `courseworkSkills.selectedCourses`
    let mut coursework = obj.remove("coursework").map(coursework_list).unwrap_or_default();
    if let Some(v) = obj.remove("coursework_skills") {
        coursework.extend(coursework_list(v));
    }
    if !coursework.is_empty() {
        out.insert("coursework".into(), Value::Array(dedup_strings(coursework)));
    }

    if let Some(v) = obj.remove("projects") {
        out.insert("projects".into(), map_items(v, project_item));
    }

    // experience: jobs first, then internships, each in their own array order
    let mut experience = Vec::new();
    if let Some(Value::Array(items)) = obj.remove("experience") {
        experience.extend(items.into_iter().map(|i| experience_item(i, false)));
    }
    if let Some(Value::Array(items)) = obj.remove("internships") {
        experience.extend(items.into_iter().map(|i| experience_item(i, true)));
    }
    if !experience.is_empty() {
        out.insert("experience".into(), Value::Array(experience));
    }

    let mut skills = obj.remove("skills").map(normalize_skills);
    if let Some(technical) = obj.remove("technical_skills") {
        let technical = normalize_skills(technical);
        skills = Some(match skills {
            Some(existing) => merge_skills(existing, technical),
            None => technical,
        });
    }
    if let Some(skills) = skills {
        out.insert("skills".into(), skills);
    }

    if let Some(v) = obj.remove("extracurricular") {
        out.insert("extracurricular".into(), map_items(v, extracurricular_item));
    }
    if let Some(v) = obj.remove("certifications") {
        out.insert("certifications".into(), map_items(v, clean_object));
    }
    if let Some(v) = obj.remove("languages") {
        out.insert("languages".into(), map_items(v, language_item));
    }
    if let Some(v) = obj.remove("hobbies") {
        out.insert("hobbies".into(), Value::Array(hobby_list(v)));
    }
    if let Some(v) = obj.remove("references") {
        out.insert("references".into(), map_items(v, clean_object));
    }

    Value::Object(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Per-section helpers
// ────────────────────────────────────────────────────────────────────────────

fn education_item(item: Value) -> Value {
    let mut obj = into_object(clean_object(item));
    rename_first(
        &mut obj,
        &["institution", "institution_name", "college_name", "school"],
        "institution",
    );
    rename_first(&mut obj, &["degree", "degree_name"], "degree");
    rename_first(&mut obj, &["field_of_study", "field", "major"], "field_of_study");
    rename_first(&mut obj, &["gpa", "cgpa"], "gpa");
    if !obj.contains_key("city") {
        rename_first(&mut obj, &["location"], "city");
    }
    Value::Object(obj)
}

fn experience_item(item: Value, internship: bool) -> Value {
    let mut obj = into_object(clean_object(item));
    rename_first(&mut obj, &["company", "company_name", "employer"], "company");
    rename_first(
        &mut obj,
        &["role", "role_name", "job_title", "position", "title"],
        "role",
    );
    rename_first(&mut obj, &["highlights", "achievements", "key_points"], "highlights");
    if !obj.contains_key("location") {
        let city = take_str(&mut obj, "city");
        let country = take_str(&mut obj, "country");
        let joined: Vec<String> = [city, country].into_iter().flatten().collect();
        if !joined.is_empty() {
            obj.insert("location".into(), Value::String(joined.join(", ")));
        }
    }
    if internship {
        obj.insert("internship".into(), Value::Bool(true));
    }
    Value::Object(obj)
}

fn project_item(item: Value) -> Value {
    let mut obj = into_object(clean_object(item));
    rename_first(&mut obj, &["name", "project_name", "title"], "name");
    rename_first(&mut obj, &["technologies", "technology_stack", "tech_stack"], "technologies");
    rename_first(&mut obj, &["link", "download_link", "github_url", "url"], "link");
    if let Some(tech) = obj.remove("technologies") {
        obj.insert("technologies".into(), Value::Array(split_list(tech)));
    }
    Value::Object(obj)
}

fn extracurricular_item(item: Value) -> Value {
    let mut obj = into_object(clean_object(item));
    rename_first(
        &mut obj,
        &["organization", "organization_name", "organisation"],
        "organization",
    );
    rename_first(&mut obj, &["role", "role_name", "position"], "role");
    Value::Object(obj)
}

fn language_item(item: Value) -> Value {
    let mut obj = into_object(clean_object(item));
    rename_first(&mut obj, &["language", "name"], "language");
    if let Some(Value::String(p)) = obj.remove("proficiency") {
        let canonical = match p.trim().to_ascii_lowercase().as_str() {
            "beginner" | "basic" | "elementary" => Some("Beginner"),
            "intermediate" | "conversational" => Some("Intermediate"),
            "advanced" | "fluent" | "professional" => Some("Advanced"),
            "native" | "bilingual" | "mother tongue" => Some("Native"),
            _ => None,
        };
        if let Some(c) = canonical {
            obj.insert("proficiency".into(), Value::String(c.to_string()));
        }
    }
    Value::Object(obj)
}

fn normalize_summary(raw: Value) -> Value {
    match raw {
        Value::String(s) => {
            let mut obj = Map::new();
            obj.insert("summary".into(), Value::String(s));
            Value::Object(obj)
        }
        other => clean_object(other),
    }
}

/// Canonical skills: `{languages, frameworks, tools, other}`.
fn normalize_skills(raw: Value) -> Value {
    let mut obj = into_object(snake_keys(raw));
    let mut languages = Vec::new();
    let mut frameworks = Vec::new();
    let mut tools = Vec::new();
    let mut other = Vec::new();

    for key in ["languages", "technical", "programming_languages"] {
        if let Some(v) = obj.remove(key) {
            languages.extend(split_list(v));
        }
    }
    for key in ["frameworks", "technologies_frameworks", "technologies"] {
        if let Some(v) = obj.remove(key) {
            frameworks.extend(split_list(v));
        }
    }
    for key in ["tools", "developer_tools"] {
        if let Some(v) = obj.remove(key) {
            tools.extend(split_list(v));
        }
    }
    if let Some(v) = obj.remove("other") {
        other.extend(split_list(v));
    }

    let mut out = Map::new();
    out.insert("languages".into(), Value::Array(dedup_strings(languages)));
    out.insert("frameworks".into(), Value::Array(dedup_strings(frameworks)));
    out.insert("tools".into(), Value::Array(dedup_strings(tools)));
    out.insert("other".into(), Value::Array(dedup_strings(other)));
    Value::Object(out)
}

fn merge_skills(a: Value, b: Value) -> Value {
    let mut a = into_object(a);
    let b = into_object(b);
    for (key, value) in b {
        let mut merged = a.remove(&key).map(split_list).unwrap_or_default();
        merged.extend(split_list(value));
        a.insert(key, Value::Array(dedup_strings(merged)));
    }
    Value::Object(a)
}

fn coursework_list(raw: Value) -> Vec<Value> {
    match snake_keys(raw) {
        Value::Object(mut obj) => obj
            .remove("selected_courses")
            .map(split_list)
            .unwrap_or_default(),
        other => split_list(other),
    }
}

fn hobby_list(raw: Value) -> Vec<Value> {
    match snake_keys(raw) {
        Value::Object(mut obj) => {
            let mut hobbies = obj.remove("hobbies").map(split_list).unwrap_or_default();
            if let Some(interests) = obj.remove("interests") {
                hobbies.extend(split_list(interests));
            }
            dedup_strings(hobbies)
        }
        other => dedup_strings(split_list(other)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generic value helpers
// ────────────────────────────────────────────────────────────────────────────

/// Documents stored by the first client version were JSON-encoded twice.
fn unwrap_json_string(raw: Value) -> Value {
    match raw {
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => parsed,
            _ => Value::String(s),
        },
        other => other,
    }
}

fn snake_keys(raw: Value) -> Value {
    match raw {
        Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (to_snake_case(&k), snake_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(snake_keys).collect()),
        other => other,
    }
}

/// Snake-cases keys and drops blank strings and nulls, so that an empty form
/// field deserializes as an absent optional.
fn clean_object(raw: Value) -> Value {
    let obj = into_object(snake_keys(raw));
    Value::Object(
        obj.into_iter()
            .filter(|(_, v)| match v {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            })
            .collect(),
    )
}

fn into_object(raw: Value) -> Map<String, Value> {
    match raw {
        Value::Object(obj) => obj,
        _ => Map::new(),
    }
}

fn map_items(raw: Value, f: impl Fn(Value) -> Value) -> Value {
    match raw {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(Value::is_object)
                .map(f)
                .collect(),
        ),
        _ => Value::Array(Vec::new()),
    }
}

/// Moves the first present alias to `canonical` and drops the rest.
fn rename_first(obj: &mut Map<String, Value>, aliases: &[&str], canonical: &str) {
    let mut chosen = None;
    for alias in aliases {
        if let Some(v) = obj.remove(*alias) {
            if chosen.is_none() {
                chosen = Some(v);
            }
        }
    }
    if let Some(v) = chosen {
        obj.insert(canonical.to_string(), v);
    }
}

fn take_str(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    match obj.remove(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Accepts an array of strings or a comma-separated string.
fn split_list(raw: Value) -> Vec<Value> {
    match raw {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(Value::String(s.trim().into())),
                _ => None,
            })
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

fn string_list(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn dedup_strings(values: Vec<Value>) -> Vec<Value> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| match v {
            Value::String(s) => seen.insert(s.to_lowercase()),
            _ => false,
        })
        .collect()
}
