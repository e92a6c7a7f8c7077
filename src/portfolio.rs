//! Portfolio content: profile, skills, experience and projects.
//!
//! Loaded once from `portfolio.toml` and never mutated afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::slugify;

/// Personal details shown in the hero banner.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Dialling prefix for the WhatsApp link when `phone` is written locally, e.g. "507"
    #[serde(default)]
    pub country_code: Option<String>,
    /// Identity document line, e.g. "Cédula: 8-830-470"
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cv_url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Profile {
    /// `https://wa.me/` link built from the digits of the phone number,
    /// prefixed with `country_code` unless the number already carries it.
    pub fn whatsapp_url(&self) -> Option<String> {
        let digits = only_digits(self.phone.as_deref()?);
        if digits.is_empty() {
            return None;
        }

        let prefix = self.country_code.as_deref().map(only_digits).unwrap_or_default();
        if digits.starts_with(&prefix) {
            Some(format!("https://wa.me/{}", digits))
        } else {
            Some(format!("https://wa.me/{}{}", prefix, digits))
        }
    }
}

fn only_digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// A skill badge. Plain strings in the data file become unstyled badges.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Skill {
    pub name: String,
    /// Short badge text, e.g. "Ps"
    #[serde(default)]
    pub label: Option<String>,
    /// Brand colour used as the badge background
    #[serde(default)]
    pub color: Option<String>,
    /// Icon path, relative to the public directory
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SkillEntry {
    Name(String),
    Table(Skill),
}

impl From<SkillEntry> for Skill {
    fn from(entry: SkillEntry) -> Self {
        match entry {
            SkillEntry::Name(name) => Skill {
                name,
                label: None,
                color: None,
                icon: None,
            },
            SkillEntry::Table(skill) => skill,
        }
    }
}

/// One position on the experience timeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Job {
    pub title: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub bullets: Vec<String>,
}

/// A showcased project.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub title: String,
    pub tags: Vec<String>,
    pub href: String,
    pub note: String,
    pub images: Vec<String>,
    pub slug: String,
    pub objective: Option<String>,
    pub solution: Option<String>,
    pub result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProject {
    title: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_href")]
    href: String,
    #[serde(default)]
    note: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    objective: Option<String>,
    #[serde(default)]
    solution: Option<String>,
    #[serde(default)]
    result: Option<String>,
}

fn default_href() -> String {
    "#".to_string()
}

impl From<RawProject> for Project {
    fn from(raw: RawProject) -> Self {
        let slug = raw
            .slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&raw.title));

        Self {
            title: raw.title,
            tags: raw.tags,
            href: raw.href,
            note: raw.note,
            images: raw.images,
            slug,
            objective: raw.objective,
            solution: raw.solution,
            result: raw.result,
        }
    }
}

impl Project {
    /// External link, unless it is empty or the `#` placeholder.
    pub fn external_href(&self) -> Option<&str> {
        match self.href.trim() {
            "" | "#" => None,
            href => Some(href),
        }
    }

    /// Site path of the detail page.
    pub fn page_path(&self) -> String {
        format!("/project/{}/", crate::util::url_encode(&self.slug))
    }

    pub fn cover(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Result of looking a project up by slug.
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    Found(&'a Project),
    NotFound,
}

impl<'a> Lookup<'a> {
    pub fn project(self) -> Option<&'a Project> {
        match self {
            Lookup::Found(project) => Some(project),
            Lookup::NotFound => None,
        }
    }

    pub fn is_found(self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

#[derive(Debug, Deserialize)]
struct RawPortfolio {
    profile: Profile,
    #[serde(default)]
    skills: Vec<SkillEntry>,
    #[serde(default)]
    experience: Vec<Job>,
    #[serde(default)]
    projects: Vec<RawProject>,
}

/// Everything rendered on the site.
#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub profile: Profile,
    pub skills: Vec<Skill>,
    pub experience: Vec<Job>,
    pub projects: Vec<Project>,
}

impl Portfolio {
    /// Load and validate a portfolio data file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let portfolio = Self::parse(&content)?;

        if portfolio.projects.is_empty() {
            return Err(Error::NoProjects {
                path: path.to_path_buf(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for project in &portfolio.projects {
            if !seen.insert(project.slug.as_str()) {
                tracing::warn!(
                    slug = %project.slug,
                    title = %project.title,
                    "duplicate project slug, only the first is reachable"
                );
            }
        }

        tracing::debug!(
            projects = portfolio.projects.len(),
            skills = portfolio.skills.len(),
            experience = portfolio.experience.len(),
            "portfolio loaded"
        );

        Ok(portfolio)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawPortfolio = toml::from_str(content)?;

        Ok(Self {
            profile: raw.profile,
            skills: raw.skills.into_iter().map(Skill::from).collect(),
            experience: raw.experience,
            projects: raw.projects.into_iter().map(Project::from).collect(),
        })
    }

    /// Find a project by exact, case-sensitive slug. The first match wins.
    pub fn lookup(&self, slug: &str) -> Lookup<'_> {
        self.projects
            .iter()
            .find(|p| p.slug == slug)
            .map_or(Lookup::NotFound, Lookup::Found)
    }
}
