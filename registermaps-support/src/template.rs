//! Tera template environment backed by the resource bundle.
//!
//! [`TemplateEnvironment`] owns the single `Tera` instance used for every
//! template lookup. Templates are compiled on first request: the source is
//! read from the same [`ResourceStore`] as every other resource, passed
//! through [`trim_blocks`](crate::whitespace::trim_blocks), and any
//! templates it `extends`, `import`s, or `include`s are loaded first.
//!
//! # Filters
//!
//! | Filter   | Arguments                                        |
//! |----------|--------------------------------------------------|
//! | `reflow` | `width` (78), `justify` (false), `prefix` (`""`) |
//!
//! Autoescaping is disabled: generated files are source code, not HTML.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tera::{Context, Tera, Value};

use registermaps_textfn::{reflow_with, ReflowOptions, DEFAULT_WIDTH};

use crate::error::SupportError;
use crate::resource::{normalize, read_required, ResourceStore};
use crate::whitespace::prepare;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

fn reflow_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("Filter `reflow` was called on a non-string value"))?;

    let mut opts = ReflowOptions::width(DEFAULT_WIDTH);
    if let Some(width) = args.get("width") {
        let width = width
            .as_u64()
            .ok_or_else(|| tera::Error::msg("Filter `reflow`: `width` must be a positive integer"))?;
        opts.width = usize::try_from(width).unwrap_or(usize::MAX);
    }
    if let Some(justify) = args.get("justify") {
        opts.justify = justify
            .as_bool()
            .ok_or_else(|| tera::Error::msg("Filter `reflow`: `justify` must be a boolean"))?;
    }
    if let Some(prefix) = args.get("prefix") {
        opts.prefix = prefix
            .as_str()
            .ok_or_else(|| tera::Error::msg("Filter `reflow`: `prefix` must be a string"))?
            .to_string();
    }

    reflow_with(text, &opts)
        .map(Value::String)
        .map_err(|e| tera::Error::msg(format!("Filter `reflow`: {e}")))
}

fn build_tera() -> Tera {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.register_filter("reflow", reflow_filter);
    tera
}

// ---------------------------------------------------------------------------
// TemplateEnvironment
// ---------------------------------------------------------------------------

/// The templating configuration shared by every template lookup.
///
/// Built once per [`Resources`](crate::resource::Resources) and never
/// reconfigured. Compiled templates stay in the environment for its
/// lifetime; the LRU in `Resources` only bounds the handle cache.
pub struct TemplateEnvironment {
    store: Rc<dyn ResourceStore>,
    tera: Rc<RefCell<Tera>>,
}

impl TemplateEnvironment {
    /// Create an environment whose search root is `store`.
    pub fn new(store: Rc<dyn ResourceStore>) -> Self {
        Self {
            store,
            tera: Rc::new(RefCell::new(build_tera())),
        }
    }

    /// Look up and compile the template `name`.
    ///
    /// `name` follows the resource naming rules, so `"resource/x.tera"` and
    /// `"x.tera"` are the same template. Compilation is all-or-nothing: if
    /// the template or any dependency fails, the environment is unchanged.
    pub fn get_template(&self, name: &str) -> Result<Template, SupportError> {
        let name = normalize(name)?;
        if !self.is_compiled(name) {
            let mut next = self.tera.borrow().clone();
            let mut loading = Vec::new();
            self.load_into(&mut next, name, &mut loading)?;
            *self.tera.borrow_mut() = next;
        }
        Ok(Template {
            name: name.to_string(),
            tera: Rc::clone(&self.tera),
        })
    }

    /// `true` if `name` has already been compiled into the environment.
    pub fn is_compiled(&self, name: &str) -> bool {
        self.tera
            .borrow()
            .get_template_names()
            .any(|compiled| compiled == name)
    }

    fn load_into(
        &self,
        tera: &mut Tera,
        name: &str,
        loading: &mut Vec<String>,
    ) -> Result<(), SupportError> {
        if tera.get_template_names().any(|compiled| compiled == name)
            || loading.iter().any(|l| l == name)
        {
            return Ok(());
        }

        let raw = read_required(self.store.as_ref(), name)?;
        let source = String::from_utf8(raw).map_err(|e| SupportError::Decode {
            name: name.to_string(),
            encoding: "utf-8",
            offset: e.utf8_error().valid_up_to(),
        })?;
        let prepared = prepare(&normalize_newlines(source));

        loading.push(name.to_string());
        for dep in &prepared.dependencies {
            let dep_name = normalize(&dep.name)?;
            match self.load_into(tera, dep_name, loading) {
                Err(err) if dep.optional && err.is_not_found() => {
                    tracing::debug!(template = name, missing = dep_name, "optional include absent");
                }
                other => other?,
            }
        }
        loading.pop();

        tracing::debug!(template = name, "compiling template");
        tera.add_raw_template(name, &prepared.source)
            .map_err(|source| SupportError::Template {
                name: name.to_string(),
                source,
            })
    }
}

impl fmt::Debug for TemplateEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tera = self.tera.borrow();
        let mut compiled: Vec<&str> = tera.get_template_names().collect();
        compiled.sort_unstable();
        f.debug_struct("TemplateEnvironment")
            .field("compiled", &compiled)
            .finish_non_exhaustive()
    }
}

/// Convert `\r\n` and lone `\r` line endings to `\n`.
pub(crate) fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// A compiled template, ready to render.
pub struct Template {
    name: String,
    tera: Rc<RefCell<Tera>>,
}

impl Template {
    /// Normalized template name (no `resource/` prefix).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render with an explicit Tera context.
    pub fn render(&self, ctx: &Context) -> Result<String, SupportError> {
        self.tera
            .borrow()
            .render(&self.name, ctx)
            .map_err(|source| SupportError::Render {
                name: self.name.clone(),
                source,
            })
    }

    /// Render with any serializable value whose fields become template variables.
    pub fn render_data<T: Serialize>(&self, data: &T) -> Result<String, SupportError> {
        let ctx = Context::from_serialize(data).map_err(|source| SupportError::Render {
            name: self.name.clone(),
            source,
        })?;
        self.render(&ctx)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template").field("name", &self.name).finish()
    }
}
