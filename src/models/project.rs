use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::Document;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetric {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectImpact {
    #[serde(default)]
    pub metrics: Vec<ImpactMetric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_study: Option<String>,
}

/// Portfolio case study
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<ProjectImpact>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub results: Vec<String>,
    #[serde(default)]
    pub lessons: Vec<String>,
    #[serde(default)]
    pub links: ProjectLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Create/update payload. Absent fields are left untouched on update;
/// `screenshots` are appended rather than replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<ProjectImpact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lessons: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ProjectLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<Vec<String>>,
}

impl Project {
    /// Build a new project; `title` and `slug` are already validated
    pub fn create(title: String, slug: String, input: ProjectInput) -> Self {
        let now = Utc::now();
        let mut project = Self {
            id: super::new_id(),
            title,
            slug,
            summary: String::new(),
            description: String::new(),
            challenge: None,
            solution: None,
            impact: None,
            featured: false,
            tags: Vec::new(),
            tech_stack: Vec::new(),
            role: None,
            timeframe: None,
            key_features: Vec::new(),
            results: Vec::new(),
            lessons: Vec::new(),
            links: ProjectLinks::default(),
            cover_image: None,
            screenshots: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        project.apply(ProjectInput {
            title: None,
            slug: None,
            ..input
        });
        project.updated_at = now;
        project
    }

    pub fn apply(&mut self, input: ProjectInput) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(slug) = input.slug {
            self.slug = slug;
        }
        if let Some(summary) = input.summary {
            self.summary = summary;
        }
        if let Some(description) = input.description {
            self.description = description;
        }
        if input.challenge.is_some() {
            self.challenge = input.challenge;
        }
        if input.solution.is_some() {
            self.solution = input.solution;
        }
        if input.impact.is_some() {
            self.impact = input.impact;
        }
        if let Some(featured) = input.featured {
            self.featured = featured;
        }
        if let Some(tags) = input.tags {
            self.tags = tags;
        }
        if let Some(tech_stack) = input.tech_stack {
            self.tech_stack = tech_stack;
        }
        if input.role.is_some() {
            self.role = input.role;
        }
        if input.timeframe.is_some() {
            self.timeframe = input.timeframe;
        }
        if let Some(key_features) = input.key_features {
            self.key_features = key_features;
        }
        if let Some(results) = input.results {
            self.results = results;
        }
        if let Some(lessons) = input.lessons {
            self.lessons = lessons;
        }
        if let Some(links) = input.links {
            self.links = links;
        }
        if input.cover_image.is_some() {
            self.cover_image = input.cover_image;
        }
        if let Some(screenshots) = input.screenshots {
            self.screenshots.extend(screenshots);
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_keeps_absent_fields_and_appends_screenshots() {
        let mut project = Project::create(
            "Folio".into(),
            "folio".into(),
            ProjectInput {
                summary: Some("A portfolio".into()),
                screenshots: Some(vec!["/uploads/a.png".into()]),
                ..Default::default()
            },
        );

        project.apply(ProjectInput {
            featured: Some(true),
            screenshots: Some(vec!["/uploads/b.png".into()]),
            ..Default::default()
        });

        assert_eq!(project.summary, "A portfolio");
        assert!(project.featured);
        assert_eq!(project.screenshots, vec!["/uploads/a.png", "/uploads/b.png"]);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let project = Project::create("Folio".into(), "folio".into(), ProjectInput::default());
        let value = serde_json::to_value(&project).unwrap();
        assert!(value.get("_id").is_some());
        assert!(value.get("techStack").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("challenge").is_none());
    }
}
