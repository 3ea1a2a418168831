//! Tera template engine — loads `.tera` files from template directories.
//!
//! # Template names
//!
//! A file at `<dir>/Articles/index.tera` is registered as `Articles/index.tera`.
//! When several directories provide the same name, the first directory wins.
//!
//! # Lookup prefixes
//!
//! | Source      | Prefix                |
//! |-------------|-----------------------|
//! | Theme       | `themes/<Theme>/`     |
//! | Plugin      | `plugins/<Plugin>/`   |
//! | Application | (none)                |

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tera::Tera;

use crate::error::{io_err, ViewError};
use crate::helpers::{self, Helper};

/// Extension every template file carries.
pub const TEMPLATE_EXT: &str = "tera";

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ViewError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_dir_templates(dir: &Path) -> Result<Vec<(String, String)>, ViewError> {
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "template directory does not exist, skipping");
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    files.sort();
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some(TEMPLATE_EXT) {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera<I>(templates: I) -> Result<Tera, ViewError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut tera = Tera::default();
    tera.autoescape_on(vec![".tera"]);
    tera.add_raw_templates(templates)?;
    Ok(tera)
}

/// `<prefix><base>.tera` for every prefix, most specific first.
pub fn candidate_names(base: &str, theme: Option<&str>, plugin: Option<&str>) -> Vec<String> {
    let base = base.trim_start_matches('/');
    let mut names = Vec::with_capacity(3);
    if let Some(theme) = theme.filter(|t| !t.is_empty()) {
        names.push(format!("themes/{theme}/{base}.{TEMPLATE_EXT}"));
    }
    if let Some(plugin) = plugin.filter(|p| !p.is_empty()) {
        names.push(format!("plugins/{plugin}/{base}.{TEMPLATE_EXT}"));
    }
    names.push(format!("{base}.{TEMPLATE_EXT}"));
    names
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-backed template store shared by every view of an environment.
#[derive(Clone)]
pub struct TemplateEngine {
    tera: Tera,
    dirs: Vec<PathBuf>,
    /// One `Tera` per helper set, keyed by helper names in order.
    with_helpers: Arc<Mutex<HashMap<Vec<String>, Arc<Tera>>>>,
}

impl TemplateEngine {
    /// An engine without templates; only non-template views can render.
    pub fn empty() -> Self {
        Self::with_tera(Tera::default(), Vec::new())
    }

    /// Load every `.tera` file under `dirs`. Earlier directories shadow later ones.
    pub fn from_dirs(dirs: &[PathBuf]) -> Result<Self, ViewError> {
        let mut templates: HashMap<String, String> = HashMap::new();
        for dir in dirs {
            for (name, content) in load_dir_templates(dir)? {
                templates.entry(name).or_insert(content);
            }
        }
        tracing::debug!(count = templates.len(), "loaded templates");
        Ok(Self::with_tera(build_tera(templates)?, dirs.to_vec()))
    }

    /// Build from in-memory `(name, source)` pairs; names must include `.tera`.
    pub fn from_raw<I, N, S>(templates: I) -> Result<Self, ViewError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let items = templates.into_iter().map(|(n, s)| (n.into(), s.into()));
        Ok(Self::with_tera(build_tera(items)?, Vec::new()))
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template(name).is_ok()
    }

    /// All registered template names, sorted.
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tera.get_template_names().map(str::to_owned).collect();
        names.sort();
        names
    }

    /// First of `candidates` that is registered.
    pub fn find<'a>(&self, candidates: &'a [String]) -> Option<&'a str> {
        candidates
            .iter()
            .map(String::as_str)
            .find(|name| self.has_template(name))
    }

    /// Render `name` with `ctx`, with the filters of `helpers` available.
    pub fn render(
        &self,
        name: &str,
        ctx: &tera::Context,
        helpers: &[Arc<Helper>],
    ) -> Result<String, ViewError> {
        if helpers.is_empty() {
            return Ok(self.tera.render(name, ctx)?);
        }
        Ok(self.tera_for(helpers).render(name, ctx)?)
    }

    fn with_tera(tera: Tera, dirs: Vec<PathBuf>) -> Self {
        TemplateEngine { tera, dirs, with_helpers: Arc::default() }
    }

    /// The templates with the filters of `helpers` registered, built once per set.
    fn tera_for(&self, helpers: &[Arc<Helper>]) -> Arc<Tera> {
        let key: Vec<String> = helpers.iter().map(|h| h.name().to_string()).collect();
        let mut cache = self.with_helpers.lock().unwrap_or_else(PoisonError::into_inner);
        let tera = cache.entry(key).or_insert_with(|| {
            let mut tera = self.tera.clone();
            helpers::install(&mut tera, helpers);
            tracing::debug!(helpers = helpers.len(), "registered helper filters");
            Arc::new(tera)
        });
        Arc::clone(tera)
    }

    /// Number of helper sets with a prepared `Tera`.
    pub fn helper_sets(&self) -> usize {
        self.with_helpers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("dirs", &self.dirs)
            .field("templates", &self.template_names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
