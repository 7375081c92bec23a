//! Output-format registry.
//!
//! Generators declare the name they answer to through [`OutputClass`] and
//! are registered once at startup:
//!
//! ```text
//! let html = outputs.register(HtmlOutput::new());
//! let vhdl = outputs.register(VhdlOutput::new());
//! ```
//!
//! Each output format may ship documentation at
//! `resource/<name>/README.rst`; [`Outputs::docs`] reads it.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::SupportError;
use crate::resource::{Resources, RESOURCE_ROOT};

/// A generator class that can be registered under its declared name.
pub trait OutputClass {
    /// The output-format name, e.g. `"html"`.
    fn output_name(&self) -> &str;
}

/// Name → output class mapping, iterated in registration order.
#[derive(Debug, Clone)]
pub struct Outputs<C> {
    classes: IndexMap<String, C>,
}

impl<C> Default for Outputs<C> {
    fn default() -> Self {
        Self {
            classes: IndexMap::new(),
        }
    }
}

impl<C: OutputClass + Clone> Outputs<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `class` under its declared name and hand it back unchanged.
    ///
    /// Registering a name twice replaces the earlier class; the name keeps
    /// its original position in [`names`](Self::names).
    pub fn register(&mut self, class: C) -> C {
        let name = class.output_name().to_string();
        if self.classes.insert(name.clone(), class.clone()).is_some() {
            tracing::debug!(output = %name, "replaced registered output");
        } else {
            tracing::debug!(output = %name, "registered output");
        }
        class
    }
}

impl<C> Outputs<C> {
    /// The class registered as `name`.
    pub fn output(&self, name: &str) -> Result<&C, SupportError> {
        self.classes
            .get(name)
            .ok_or_else(|| SupportError::OutputNotFound {
                name: name.to_string(),
            })
    }

    /// The documentation text for output format `name`.
    ///
    /// The document is read from `resource/<name>/README.rst` whether or
    /// not `name` is registered.
    pub fn docs(&self, name: &str, resources: &Resources) -> Result<Rc<str>, SupportError> {
        resources.text(&format!("{RESOURCE_ROOT}{name}/README.rst"))
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl<'a, C> IntoIterator for &'a Outputs<C> {
    type Item = &'a str;
    type IntoIter = std::iter::Map<indexmap::map::Keys<'a, String, C>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        let as_str: fn(&'a String) -> &'a str = String::as_str;
        self.classes.keys().map(as_str)
    }
}
