//! The context object a generator run passes around.
//!
//! [`Support`] owns the three pieces of process-wide state: the resource
//! resolver (with its template environment), the output registry, and the
//! diagnostics flag.

use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use crate::config::SupportConfig;
use crate::diagnostics::Diagnostics;
use crate::error::SupportError;
use crate::registry::{OutputClass, Outputs};
use crate::resource::{DirStore, Resources, StoreChain, BUNDLE};
use crate::template::Template;

/// `W` is the diagnostics sink: standard error unless a caller supplies
/// its own through [`Support::with_diagnostics`].
pub struct Support<C, W: Write = io::Stderr> {
    resources: Resources,
    outputs: Outputs<C>,
    diagnostics: Diagnostics<W>,
}

impl<C: OutputClass + Clone> Support<C> {
    /// Build from `config`, with diagnostics on standard error.
    pub fn new(config: &SupportConfig) -> Self {
        Self::with_diagnostics(config, Diagnostics::stderr())
    }

    /// Embedded bundle only, default capacity, verbose off.
    pub fn bundled() -> Self {
        Self::new(&SupportConfig::default())
    }

    pub fn with_resources(resources: Resources, verbose: bool) -> Self {
        let diagnostics = Diagnostics::stderr();
        diagnostics.set_verbose(verbose);
        Self::from_parts(resources, diagnostics)
    }
}

impl<C: OutputClass + Clone, W: Write> Support<C, W> {
    /// Build from `config`, sending verbose messages to `diagnostics`.
    ///
    /// With a `resource_dir`, files in that directory shadow bundled
    /// resources of the same name. Verbose output is on if either `config`
    /// or `diagnostics` enables it.
    pub fn with_diagnostics(config: &SupportConfig, diagnostics: Diagnostics<W>) -> Self {
        let resources = match &config.resource_dir {
            Some(dir) => {
                tracing::debug!(dir = %dir.display(), "resource override directory");
                let chain = StoreChain::new().then(DirStore::new(dir)).then(BUNDLE);
                Resources::with_capacity(chain, config.cache_capacity)
            }
            None => Resources::with_capacity(BUNDLE, config.cache_capacity),
        };
        if config.verbose {
            diagnostics.set_verbose(true);
        }
        Self::from_parts(resources, diagnostics)
    }

    pub fn from_parts(resources: Resources, diagnostics: Diagnostics<W>) -> Self {
        Self {
            resources,
            outputs: Outputs::new(),
            diagnostics,
        }
    }

    /// See [`Outputs::register`].
    pub fn register(&mut self, class: C) -> C {
        self.outputs.register(class)
    }
}

impl<C, W: Write> Support<C, W> {
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn outputs(&self) -> &Outputs<C> {
        &self.outputs
    }

    pub fn diagnostics(&self) -> &Diagnostics<W> {
        &self.diagnostics
    }

    pub fn output(&self, name: &str) -> Result<&C, SupportError> {
        self.outputs.output(name)
    }

    pub fn docs(&self, name: &str) -> Result<Rc<str>, SupportError> {
        self.outputs.docs(name, &self.resources)
    }

    pub fn template(&self, name: &str) -> Result<Rc<Template>, SupportError> {
        self.resources.template(name)
    }

    pub fn set_verbose(&self, verbose: bool) {
        self.diagnostics.set_verbose(verbose);
    }

    pub fn is_verbose(&self) -> bool {
        self.diagnostics.is_verbose()
    }

    pub fn printverbose(&self, args: fmt::Arguments<'_>) {
        self.diagnostics.printverbose(args);
    }

    /// Tear down the context, returning the diagnostics sink.
    pub fn into_diagnostics(self) -> Diagnostics<W> {
        self.diagnostics
    }
}

impl<C, W: Write> fmt::Debug for Support<C, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Support")
            .field("outputs", &self.outputs.names().collect::<Vec<_>>())
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Clone)]
    struct Html;

    impl OutputClass for Html {
        fn output_name(&self) -> &str {
            "html"
        }
    }

    #[test]
    fn override_dir_shadows_bundle() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("common")).unwrap();
        fs::write(dir.path().join("common/banner.tera"), "override {{ title }}").unwrap();
        fs::create_dir_all(dir.path().join("html")).unwrap();
        fs::write(dir.path().join("html/README.rst"), "HTML docs\n").unwrap();

        let config = SupportConfig::default().with_resource_dir(dir.path());
        let mut support: Support<Html> = Support::new(&config);
        support.register(Html);

        let mut ctx = tera::Context::new();
        ctx.insert("title", "regs");
        let out = support.template("common/banner.tera").unwrap().render(&ctx).unwrap();
        assert_eq!(out, "override regs");
        assert_eq!(&*support.docs("html").unwrap(), "HTML docs\n");
        assert!(support.output("html").is_ok());
    }

    #[test]
    fn verbose_comes_from_config() {
        let support: Support<Html> = Support::new(&SupportConfig::default().with_verbose(true));
        assert!(support.diagnostics().is_verbose());
        support.set_verbose(false);
        assert!(!support.diagnostics().is_verbose());
    }

    #[test]
    fn printverbose_reaches_the_supplied_sink() {
        let support: Support<Html, Vec<u8>> =
            Support::with_diagnostics(&SupportConfig::default(), Diagnostics::with_sink(Vec::new()));
        support.printverbose(format_args!("quiet"));
        assert!(support.diagnostics().sink().is_empty());

        support.set_verbose(true);
        support.printverbose(format_args!("compiled {} templates", 3));
        crate::printverbose!(support, "wrote {}", "regs.vhd");

        let sink = support.into_diagnostics().into_sink();
        assert_eq!(String::from_utf8(sink).unwrap(), "compiled 3 templates\nwrote regs.vhd\n");
    }

    #[test]
    fn config_verbose_enables_supplied_diagnostics() {
        let config = SupportConfig::default().with_verbose(true);
        let support: Support<Html, Vec<u8>> =
            Support::with_diagnostics(&config, Diagnostics::with_sink(Vec::new()));
        assert!(support.is_verbose());
        support.printverbose(format_args!("on"));
        assert_eq!(&*support.diagnostics().sink(), b"on\n");
    }

    #[test]
    fn docs_for_unknown_format_is_not_found() {
        let support: Support<Html> = Support::bundled();
        assert!(support.docs("nope").unwrap_err().is_not_found());
    }
}
