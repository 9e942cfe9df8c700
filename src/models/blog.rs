use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::slug::reading_time;
use super::user::Principal;
use crate::database::Document;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub meta_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Principal>,
    /// Minutes
    #[serde(default)]
    pub reading_time: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Blog {
    const COLLECTION: &'static str = "blogs";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
}

impl Blog {
    /// New post; the slug is already unique
    pub fn create(title: String, slug: String, input: BlogInput, author: Option<Principal>) -> Self {
        let now = Utc::now();
        let published = input.published.unwrap_or(false);
        let content = input.content.unwrap_or_default();

        Self {
            id: super::new_id(),
            title,
            slug,
            reading_time: reading_time(Some(&content)),
            content,
            excerpt: input.excerpt.unwrap_or_default(),
            cover_image: input.cover_image,
            tags: input.tags.unwrap_or_default(),
            categories: input.categories.unwrap_or_default(),
            featured: input.featured.unwrap_or(false),
            published,
            published_at: published.then_some(now),
            author,
            external_link: input.external_link,
            seo: input.seo,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge an update. Title/slug changes are resolved by the caller.
    pub fn apply(&mut self, input: BlogInput) {
        let now = Utc::now();

        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(content) = input.content {
            if content != self.content {
                self.reading_time = reading_time(Some(&content));
            }
            self.content = content;
        }
        if let Some(excerpt) = input.excerpt {
            self.excerpt = excerpt;
        }
        if input.cover_image.is_some() {
            self.cover_image = input.cover_image;
        }
        if let Some(tags) = input.tags {
            self.tags = tags;
        }
        if let Some(categories) = input.categories {
            self.categories = categories;
        }
        if let Some(featured) = input.featured {
            self.featured = featured;
        }
        if let Some(published) = input.published {
            if published && !self.published {
                self.published_at = Some(now);
            }
            self.published = published;
        }
        if input.external_link.is_some() {
            self.external_link = input.external_link;
        }
        if input.seo.is_some() {
            self.seo = input.seo;
        }
        self.updated_at = now;
    }

    /// Flip `published`, stamping `publishedAt` the first time
    pub fn toggle_published(&mut self) {
        self.published = !self.published;
        if self.published && self.published_at.is_none() {
            self.published_at = Some(Utc::now());
        }
        self.updated_at = Utc::now();
    }

    fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.title, &self.content, &self.excerpt]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Filters accepted by `GET /api/blogs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogQuery {
    pub published: Option<bool>,
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub featured: Option<bool>,
    pub page: usize,
    pub limit: usize,
}

impl Default for BlogQuery {
    fn default() -> Self {
        Self {
            published: None,
            search: None,
            tags: Vec::new(),
            categories: Vec::new(),
            featured: None,
            page: 1,
            limit: 10,
        }
    }
}

impl BlogQuery {
    /// Parse a raw query string. Repeated `tags`/`categories` accumulate;
    /// unparseable numbers fall back to the defaults.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        let Some(raw) = raw else {
            return query;
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "published" => query.published = Some(value == "true"),
                "featured" => query.featured = Some(value == "true"),
                "search" if !value.trim().is_empty() => query.search = Some(value.into_owned()),
                "tags" => query.tags.push(value.into_owned()),
                "categories" => query.categories.push(value.into_owned()),
                "page" => query.page = value.parse().ok().filter(|p| *p > 0).unwrap_or(1),
                "limit" => query.limit = value.parse().ok().filter(|l| *l > 0).unwrap_or(10),
                _ => {}
            }
        }
        query
    }

    /// Render back into a query string (client side)
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(published) = self.published {
            serializer.append_pair("published", &published.to_string());
        }
        if let Some(search) = &self.search {
            serializer.append_pair("search", search);
        }
        for tag in &self.tags {
            serializer.append_pair("tags", tag);
        }
        for category in &self.categories {
            serializer.append_pair("categories", category);
        }
        if let Some(featured) = self.featured {
            serializer.append_pair("featured", &featured.to_string());
        }
        serializer.append_pair("page", &self.page.to_string());
        serializer.append_pair("limit", &self.limit.to_string());
        serializer.finish()
    }

    pub fn matches(&self, blog: &Blog) -> bool {
        if let Some(published) = self.published {
            if blog.published != published {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if blog.featured != featured {
                return false;
            }
        }
        if !self.tags.is_empty() && !blog.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        if !self.categories.is_empty() && !blog.categories.iter().any(|c| self.categories.contains(c)) {
            return false;
        }
        match &self.search {
            Some(search) => blog.matches_text(search),
            None => true,
        }
    }

    /// Filter, order newest first and cut out the requested page
    pub fn paginate(&self, blogs: Vec<Blog>) -> BlogPage {
        let mut matching: Vec<Blog> = blogs.into_iter().filter(|b| self.matches(b)).collect();
        matching.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let total = matching.len();
        let skip = (self.page - 1).saturating_mul(self.limit);
        let blogs = matching.into_iter().skip(skip).take(self.limit).collect();

        BlogPage {
            blogs,
            pagination: Pagination {
                page: self.page,
                limit: self.limit,
                total,
                pages: total.div_ceil(self.limit),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

/// `data` of `GET /api/blogs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPage {
    pub blogs: Vec<Blog>,
    pub pagination: Pagination,
}
