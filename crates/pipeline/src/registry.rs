//! Central registry of the declarative lookup tables.
//!
//! Loads the category table, the (category, item) → flag table, the
//! aggregate composition table and the per-document-type profiles, checks
//! them against each other once, and serves lookups to every stage.

use serde::Deserialize;
use shared_types::{
    Category, DocumentProfile, DocumentType, PipelineError, RegistryAudit, ROLE_FLAGS,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

const CATEGORIES_FILE: &str = "categories.toml";
const FLAG_MAPPINGS_FILE: &str = "flag_mappings.toml";
const AGGREGATES_FILE: &str = "aggregates.toml";
const FORM_OPTIONS_FILE: &str = "form_options.toml";
const PROFILES_DIR: &str = "profiles";

/// Raw text of every table, before parsing.
#[derive(Debug, Clone)]
pub struct TableSources {
    pub categories: String,
    pub flag_mappings: String,
    pub aggregates: String,
    /// Options the intake form offers, listed apart from the flag table.
    pub form_options: String,
    /// (file name, contents) per profile.
    pub profiles: Vec<(String, String)>,
}

impl TableSources {
    /// Tables compiled into the binary from the workspace `config/` directory.
    pub fn embedded() -> Self {
        Self {
            categories: include_str!("../../../config/categories.toml").to_string(),
            flag_mappings: include_str!("../../../config/flag_mappings.toml").to_string(),
            aggregates: include_str!("../../../config/aggregates.toml").to_string(),
            form_options: include_str!("../../../config/form_options.toml").to_string(),
            profiles: vec![
                (
                    "interrogatories.toml".to_string(),
                    include_str!("../../../config/profiles/interrogatories.toml").to_string(),
                ),
                (
                    "production_requests.toml".to_string(),
                    include_str!("../../../config/profiles/production_requests.toml").to_string(),
                ),
                (
                    "admissions.toml".to_string(),
                    include_str!("../../../config/profiles/admissions.toml").to_string(),
                ),
            ],
        }
    }

    /// Read tables from a directory laid out like the workspace `config/`.
    pub fn from_dir(dir: &Path) -> Result<Self, PipelineError> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|e| {
                PipelineError::configuration(format!("Cannot read {}: {}", path.display(), e))
            })
        };

        let profiles_dir = dir.join(PROFILES_DIR);
        let entries = std::fs::read_dir(&profiles_dir).map_err(|e| {
            PipelineError::configuration(format!("Cannot read {}: {}", profiles_dir.display(), e))
        })?;
        let mut profile_paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        profile_paths.sort();

        let mut profiles = Vec::with_capacity(profile_paths.len());
        for path in profile_paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            profiles.push((name, read(&path)?));
        }

        Ok(Self {
            categories: read(&dir.join(CATEGORIES_FILE))?,
            flag_mappings: read(&dir.join(FLAG_MAPPINGS_FILE))?,
            aggregates: read(&dir.join(AGGREGATES_FILE))?,
            form_options: read(&dir.join(FORM_OPTIONS_FILE))?,
            profiles,
        })
    }
}

// ─── File shapes ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CategoriesFile {
    #[serde(default)]
    raw_names: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FormOptionsFile {
    #[serde(default)]
    options: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AggregateEntry {
    category: String,
    flags: Vec<String>,
}

// ─── Lookup types ──────────────────────────────────────────────

/// An aggregate flag and the specific flags it summarizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRule {
    pub name: String,
    pub category: Category,
    pub members: Vec<String>,
}

/// Result of looking up one discovery selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagLookup<'a> {
    Exact(&'a str),
    /// Matched only after case/whitespace folding.
    Folded { label: &'a str, flag: &'a str },
    Unmapped,
}

#[derive(Debug, Default)]
struct CategoryTable {
    /// Labels in table order (sorted by the TOML map).
    labels: Vec<(String, String)>,
    exact: HashMap<String, usize>,
    folded: HashMap<String, usize>,
}

/// Lowercase, trim and collapse inner whitespace.
pub fn fold(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// One form category and the option labels it submits.
#[derive(Debug, Clone)]
struct FormOptions {
    raw_name: String,
    category: Category,
    labels: Vec<String>,
}

/// Validated, cross-checked lookup tables.
#[derive(Debug)]
pub struct Registry {
    raw_categories: HashMap<String, Category>,
    form_options: Vec<FormOptions>,
    tables: BTreeMap<Category, CategoryTable>,
    aggregates: Vec<AggregateRule>,
    profiles: BTreeMap<DocumentType, DocumentProfile>,
    known_flags: BTreeSet<String>,
}

impl Registry {
    /// Registry over the embedded default tables.
    pub fn embedded() -> Result<Self, PipelineError> {
        Self::from_sources(&TableSources::embedded())
    }

    pub fn load_dir(dir: &Path) -> Result<Self, PipelineError> {
        Self::from_sources(&TableSources::from_dir(dir)?)
    }

    pub fn from_sources(sources: &TableSources) -> Result<Self, PipelineError> {
        let raw_categories = parse_categories(&sources.categories)?;
        let tables = parse_flag_mappings(&sources.flag_mappings)?;

        let mut specific_flags: HashMap<&str, Category> = HashMap::new();
        for (category, table) in &tables {
            for (_, flag) in &table.labels {
                if let Some(previous) = specific_flags.insert(flag.as_str(), *category) {
                    return Err(PipelineError::configuration(format!(
                        "Flag '{}' is mapped in both '{}' and '{}'",
                        flag, previous, category
                    )));
                }
            }
        }

        let aggregates = parse_aggregates(&sources.aggregates, &tables, &specific_flags)?;

        let mut profiles = BTreeMap::new();
        for (name, contents) in &sources.profiles {
            let profile = parse_profile(name, contents)?;
            if profiles.contains_key(&profile.document_type) {
                return Err(PipelineError::configuration(format!(
                    "Profile {} defines {} a second time",
                    name, profile.document_type
                )));
            }
            profiles.insert(profile.document_type, profile);
        }

        let mut known_flags: BTreeSet<String> =
            specific_flags.keys().map(|f| f.to_string()).collect();
        for rule in &aggregates {
            if known_flags.contains(&rule.name) {
                return Err(PipelineError::configuration(format!(
                    "Aggregate '{}' reuses a specific flag name",
                    rule.name
                )));
            }
            known_flags.insert(rule.name.clone());
        }

        // Role and general flags are set by the flag processor itself.
        let reserved: BTreeSet<&str> = ROLE_FLAGS
            .iter()
            .copied()
            .chain(profiles.values().map(|p| p.general_flag.as_str()))
            .collect();
        if let Some(flag) = known_flags.iter().find(|f| reserved.contains(f.as_str())) {
            return Err(PipelineError::configuration(format!(
                "Flag '{}' is reserved for a defendant role or document type",
                flag
            )));
        }
        known_flags.extend(reserved.into_iter().map(str::to_string));

        let form_options = parse_form_options(&sources.form_options, &raw_categories)?;

        let registry = Self {
            raw_categories,
            form_options,
            tables,
            aggregates,
            profiles,
            known_flags,
        };

        tracing::debug!(
            flags = registry.known_flags.len(),
            aggregates = registry.aggregates.len(),
            profiles = registry.profiles.len(),
            "Flag registry loaded"
        );
        Ok(registry)
    }

    /// Resolve a raw form category name.
    pub fn category_for_raw(&self, raw_name: &str) -> Option<Category> {
        self.raw_categories.get(&fold(raw_name)).copied()
    }

    /// Look up the specific flag for one selection.
    pub fn lookup(&self, category: Category, item: &str) -> FlagLookup<'_> {
        let Some(table) = self.tables.get(&category) else {
            return FlagLookup::Unmapped;
        };
        if let Some(&idx) = table.exact.get(item.trim()) {
            return FlagLookup::Exact(&table.labels[idx].1);
        }
        match table.folded.get(&fold(item)) {
            Some(&idx) => {
                let (label, flag) = &table.labels[idx];
                FlagLookup::Folded { label, flag }
            }
            None => FlagLookup::Unmapped,
        }
    }

    /// Every option the intake form offers as (form category name,
    /// resolved category, option label).
    pub fn form_options(&self) -> impl Iterator<Item = (&str, Category, &str)> {
        self.form_options.iter().flat_map(|o| {
            o.labels
                .iter()
                .map(move |l| (o.raw_name.as_str(), o.category, l.as_str()))
        })
    }

    /// Every (label, flag) pair of a category.
    pub fn items(&self, category: Category) -> impl Iterator<Item = (&str, &str)> {
        self.tables
            .get(&category)
            .into_iter()
            .flat_map(|t| t.labels.iter().map(|(l, f)| (l.as_str(), f.as_str())))
    }

    pub fn aggregates(&self) -> &[AggregateRule] {
        &self.aggregates
    }

    pub fn aggregate_for(&self, category: Category) -> Option<&AggregateRule> {
        self.aggregates.iter().find(|a| a.category == category)
    }

    pub fn profile(&self, document_type: DocumentType) -> Result<&DocumentProfile, PipelineError> {
        self.profiles.get(&document_type).ok_or_else(|| {
            PipelineError::configuration(format!("No profile configured for {}", document_type))
        })
    }

    pub fn profiles(&self) -> impl Iterator<Item = &DocumentProfile> {
        self.profiles.values()
    }

    /// Always-true flags, one per configured document type.
    pub fn general_flags(&self) -> impl Iterator<Item = &str> {
        self.profiles.values().map(|p| p.general_flag.as_str())
    }

    /// Every flag any stage can set.
    pub fn known_flags(&self) -> &BTreeSet<String> {
        &self.known_flags
    }

    /// Gaps between the flag tables and the profiles. Not fatal.
    pub fn audit(&self) -> RegistryAudit {
        let mut audit = RegistryAudit::default();
        for profile in self.profiles.values() {
            for (flag, _) in &profile.counts {
                if !self.known_flags.contains(flag) {
                    audit
                        .unknown_profile_flags
                        .push((profile.document_type.to_string(), flag.clone()));
                }
            }
        }
        for table in self.tables.values() {
            for (_, flag) in &table.labels {
                let counted = self
                    .profiles
                    .values()
                    .any(|p| p.count_for(flag) > 0);
                if !counted {
                    audit.uncounted_flags.push(flag.clone());
                }
            }
        }
        for options in &self.form_options {
            for label in &options.labels {
                if self.lookup(options.category, label) == FlagLookup::Unmapped {
                    audit
                        .unmapped_form_options
                        .push((options.raw_name.clone(), label.clone()));
                }
            }
        }
        audit
    }
}

// ─── Parsing ───────────────────────────────────────────────────

fn parse_toml<T: serde::de::DeserializeOwned>(name: &str, contents: &str) -> Result<T, PipelineError> {
    toml::from_str(contents)
        .map_err(|e| PipelineError::configuration(format!("Failed to parse {}: {}", name, e)))
}

fn parse_category(name: &str, key: &str) -> Result<Category, PipelineError> {
    Category::try_from(key)
        .map_err(|e| PipelineError::configuration(format!("{}: {}", name, e)))
}

fn parse_categories(contents: &str) -> Result<HashMap<String, Category>, PipelineError> {
    let file: CategoriesFile = parse_toml(CATEGORIES_FILE, contents)?;
    let mut map: HashMap<String, Category> = Category::ALL
        .iter()
        .map(|c| (fold(c.key()), *c))
        .collect();
    for (raw, key) in &file.raw_names {
        let category = parse_category(CATEGORIES_FILE, key)?;
        map.insert(fold(raw), category);
    }
    Ok(map)
}

fn parse_form_options(
    contents: &str,
    raw_categories: &HashMap<String, Category>,
) -> Result<Vec<FormOptions>, PipelineError> {
    let file: FormOptionsFile = parse_toml(FORM_OPTIONS_FILE, contents)?;
    file.options
        .into_iter()
        .map(|(raw_name, labels)| {
            let category = raw_categories.get(&fold(&raw_name)).copied().ok_or_else(|| {
                PipelineError::configuration(format!(
                    "{}: unknown form category '{}'",
                    FORM_OPTIONS_FILE, raw_name
                ))
            })?;
            Ok(FormOptions {
                raw_name,
                category,
                labels,
            })
        })
        .collect()
}

fn parse_flag_mappings(contents: &str) -> Result<BTreeMap<Category, CategoryTable>, PipelineError> {
    let file: BTreeMap<String, BTreeMap<String, String>> = parse_toml(FLAG_MAPPINGS_FILE, contents)?;

    let mut tables = BTreeMap::new();
    for (key, items) in file {
        let category = parse_category(FLAG_MAPPINGS_FILE, &key)?;
        let mut table = CategoryTable::default();
        for (label, flag) in items {
            let label = label.trim().to_string();
            let flag = flag.trim().to_string();
            if label.is_empty() || flag.is_empty() {
                return Err(PipelineError::configuration(format!(
                    "{}: blank label or flag in [{}]",
                    FLAG_MAPPINGS_FILE, key
                )));
            }
            let idx = table.labels.len();
            if table.folded.insert(fold(&label), idx).is_some() {
                return Err(PipelineError::configuration(format!(
                    "{}: labels in [{}] collide when case is ignored: '{}'",
                    FLAG_MAPPINGS_FILE, key, label
                )));
            }
            table.exact.insert(label.clone(), idx);
            table.labels.push((label, flag));
        }
        tables.insert(category, table);
    }

    if let Some(missing) = Category::ALL.iter().find(|c| !tables.contains_key(*c)) {
        return Err(PipelineError::configuration(format!(
            "{}: no items mapped for category '{}'",
            FLAG_MAPPINGS_FILE, missing
        )));
    }
    Ok(tables)
}

fn parse_aggregates(
    contents: &str,
    tables: &BTreeMap<Category, CategoryTable>,
    specific_flags: &HashMap<&str, Category>,
) -> Result<Vec<AggregateRule>, PipelineError> {
    let file: BTreeMap<String, AggregateEntry> = parse_toml(AGGREGATES_FILE, contents)?;

    let mut rules: Vec<AggregateRule> = Vec::with_capacity(file.len());
    for (name, entry) in file {
        let category = parse_category(AGGREGATES_FILE, &entry.category)?;
        if rules.iter().any(|r| r.category == category) {
            return Err(PipelineError::configuration(format!(
                "{}: category '{}' has more than one aggregate",
                AGGREGATES_FILE, category
            )));
        }
        for member in &entry.flags {
            match specific_flags.get(member.as_str()) {
                Some(c) if *c == category => {}
                Some(c) => {
                    return Err(PipelineError::configuration(format!(
                        "{}: '{}' lists '{}', which belongs to '{}'",
                        AGGREGATES_FILE, name, member, c
                    )))
                }
                None => {
                    return Err(PipelineError::configuration(format!(
                        "{}: '{}' lists unknown flag '{}'",
                        AGGREGATES_FILE, name, member
                    )))
                }
            }
        }
        rules.push(AggregateRule {
            name,
            category,
            members: entry.flags,
        });
    }

    // Every specific flag must roll up into its category's aggregate.
    for (category, table) in tables {
        let Some(rule) = rules.iter().find(|r| r.category == *category) else {
            return Err(PipelineError::configuration(format!(
                "{}: no aggregate for category '{}'",
                AGGREGATES_FILE, category
            )));
        };
        if let Some((_, flag)) = table.labels.iter().find(|(_, f)| !rule.members.contains(f)) {
            return Err(PipelineError::configuration(format!(
                "{}: '{}' is missing from aggregate '{}'",
                AGGREGATES_FILE, flag, rule.name
            )));
        }
    }

    rules.sort_by_key(|r| r.category);
    Ok(rules)
}

fn parse_profile(name: &str, contents: &str) -> Result<DocumentProfile, PipelineError> {
    let profile: DocumentProfile = parse_toml(name, contents)?;

    let mut seen = BTreeSet::new();
    for (flag, _) in &profile.counts {
        if !seen.insert(flag.as_str()) {
            return Err(PipelineError::configuration(format!(
                "{}: flag '{}' is counted twice",
                name, flag
            )));
        }
    }
    if !profile.is_first_set_only(&profile.general_flag) {
        return Err(PipelineError::configuration(format!(
            "{}: general flag '{}' must be listed in first_set_only",
            name, profile.general_flag
        )));
    }
    if profile.suffix.trim().is_empty() {
        return Err(PipelineError::configuration(format!("{}: suffix is empty", name)));
    }
    Ok(profile)
}
