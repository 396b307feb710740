//! Form catalog
//!
//! Holds named [`FormSchema`]s. The built-in presets live as JSON files under
//! `forms/` and are compiled into the binary; more schemas can be loaded from
//! directories on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use include_dir::{include_dir, Dir, File};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::CatalogConfig;
use crate::error::{FormError, Result};
use crate::form::Form;
use crate::schema::FormSchema;

static PRESETS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/forms");

/// Name, email, address and phone numbers
pub const USER_BASIC: &str = "user-basic";
/// `user-basic` plus the at-least-one-phone rule
pub const USER_PHONES: &str = "user-phones";
/// Adds a password group with a match rule; submits raw values
pub const USER_PASSWORD: &str = "user-password";
/// Personal info, education, experience, references and agreements
pub const JOB_APPLICATION: &str = "job-application";

/// A fuzzy search hit
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub name: String,
    pub title: Option<String>,
    pub score: i64,
}

/// Named form schemas
#[derive(Debug, Clone, Default)]
pub struct FormCatalog {
    schemas: BTreeMap<String, FormSchema>,
}

impl FormCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The presets compiled into the crate
    pub fn builtin() -> Result<Self> {
        Self::from_embedded(&PRESETS)
    }

    /// Load every `*.json` schema from an embedded directory
    pub fn from_embedded(dir: &'static Dir<'static>) -> Result<Self> {
        let mut files = Vec::new();
        collect_embedded(dir, &mut files);

        let mut catalog = Self::new();
        for file in files {
            let path = file.path().display().to_string();
            let content = file.contents_utf8().ok_or_else(|| FormError::SchemaFile {
                path: path.clone(),
                reason: "not valid UTF-8".to_string(),
            })?;
            catalog.insert(parse_schema(&path, content)?);
        }
        Ok(catalog)
    }

    /// Load every `*.json` schema below `dir`
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.load_directory(dir)?;
        Ok(catalog)
    }

    /// Builtin presets (unless disabled) plus the configured schema directories.
    /// Later sources replace earlier ones with the same name.
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let mut catalog = if config.include_builtin {
            Self::builtin()?
        } else {
            Self::new()
        };
        for dir in &config.schema_dirs {
            catalog.load_directory(dir)?;
        }
        Ok(catalog)
    }

    fn load_directory(&mut self, dir: &Path) -> Result<()> {
        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().map(|x| x == "json").unwrap_or(false))
        {
            let content = fs::read_to_string(entry.path())?;
            let schema = parse_schema(&entry.path().display().to_string(), &content)?;
            debug!(form = %schema.name, path = %entry.path().display(), "loaded form schema");
            self.insert(schema);
        }
        Ok(())
    }

    /// Add a schema, replacing any schema with the same name
    pub fn insert(&mut self, schema: FormSchema) -> Option<FormSchema> {
        self.schemas.insert(schema.name.clone(), schema)
    }

    pub fn get(&self, name: &str) -> Option<&FormSchema> {
        self.schemas.get(name)
    }

    /// Like [`get`](Self::get), but an unknown name is an error
    pub fn require(&self, name: &str) -> Result<&FormSchema> {
        self.get(name)
            .ok_or_else(|| FormError::UnknownForm(name.to_string()))
    }

    /// Build a fresh form from the named schema
    pub fn build(&self, name: &str) -> Result<Form> {
        Form::build(self.require(name)?)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormSchema> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Search schemas by name or title (fuzzy), best match first
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        let matcher = SkimMatcherV2::default();
        let mut results: Vec<SearchResult> = self
            .schemas
            .values()
            .filter_map(|schema| {
                let by_name = matcher.fuzzy_match(&schema.name, query);
                let by_title = schema
                    .title
                    .as_deref()
                    .and_then(|title| matcher.fuzzy_match(title, query));
                by_name.max(by_title).map(|score| SearchResult {
                    name: schema.name.clone(),
                    title: schema.title.clone(),
                    score,
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        results.truncate(limit);
        results
    }
}

fn collect_embedded(dir: &'static Dir<'static>, out: &mut Vec<&'static File<'static>>) {
    for file in dir.files() {
        if file.path().extension().map(|x| x == "json").unwrap_or(false) {
            out.push(file);
        }
    }
    for sub in dir.dirs() {
        collect_embedded(sub, out);
    }
}

fn parse_schema(path: &str, content: &str) -> Result<FormSchema> {
    serde_json::from_str(content).map_err(|e| FormError::SchemaFile {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_builtin_presets_load_and_build() {
        let catalog = FormCatalog::builtin().unwrap();
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec![JOB_APPLICATION, USER_BASIC, USER_PASSWORD, USER_PHONES]);

        for schema in catalog.iter() {
            let form = Form::build(schema).unwrap();
            // Every preset starts out with empty required fields
            assert!(!form.is_valid(), "{} should start invalid", schema.name);
        }
    }

    #[test]
    fn test_unknown_form() {
        let catalog = FormCatalog::builtin().unwrap();
        assert!(matches!(catalog.build("nope"), Err(FormError::UnknownForm(name)) if name == "nope"));
    }

    #[test]
    fn test_search() {
        let catalog = FormCatalog::builtin().unwrap();
        let results = catalog.search("job", 3);
        assert_eq!(results[0].name, JOB_APPLICATION);

        assert!(catalog.search("zzzzqqq", 3).is_empty());
        assert!(catalog.search("user", 2).len() <= 2);
    }

    #[test]
    fn test_directory_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("extra");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            nested.join("user-basic.json"),
            r#"{ "name": "user-basic", "title": "Override", "root": { "children": [] } }"#,
        )
        .unwrap();
        fs::write(nested.join("notes.txt"), "not a schema").unwrap();

        let config = CatalogConfig {
            include_builtin: true,
            schema_dirs: vec![PathBuf::from(dir.path())],
        };
        let catalog = FormCatalog::from_config(&config).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.require(USER_BASIC).unwrap().title.as_deref(), Some("Override"));
    }

    #[test]
    fn test_bad_schema_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        match FormCatalog::from_directory(dir.path()) {
            Err(FormError::SchemaFile { path, .. }) => assert!(path.ends_with("broken.json")),
            other => panic!("Expected SchemaFile error, got {:?}", other),
        }
    }
}
