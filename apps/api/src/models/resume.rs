//! Wire and document types shared by generation and rendering.
//!
//! Everything here is free text. Incoming fields default to empty strings when
//! absent, and AI replies are read leniently: a number or `null` where a string
//! belongs is coerced instead of failing the whole document.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Form fields submitted for resume generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Comma-delimited.
    pub skills: String,
    pub education: String,
    pub experience: String,
    pub projects: String,
    pub target_role: String,
}

impl ResumeRequest {
    pub fn personal_info(&self) -> PersonalInfo {
        PersonalInfo {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Form fields submitted for cover-letter generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoverLetterRequest {
    pub name: String,
    pub target_role: String,
    pub company: String,
    pub skills: String,
    pub experience: String,
}

/// Contact block printed in the PDF header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeDocument {
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub experience: Vec<ExperienceItem>,
    #[serde(deserialize_with = "null_as_empty")]
    pub education: Vec<EducationItem>,
    #[serde(deserialize_with = "null_as_empty")]
    pub projects: Vec<ProjectItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceItem {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub company: String,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationItem {
    #[serde(deserialize_with = "lenient_string")]
    pub degree: String,
    #[serde(deserialize_with = "lenient_string")]
    pub institution: String,
    #[serde(deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(deserialize_with = "lenient_string")]
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectItem {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub technologies: String,
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// `null` reads as an empty section.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

fn lenient_string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(value_to_text).collect(),
        Value::Null => Vec::new(),
        // A bare "a, b, c" string is split the same way form input is.
        Value::String(s) => s.split(',').map(|p| p.trim().to_string()).collect(),
        other => vec![other.to_string()],
    })
}
