use std::rc::Rc;

use registermaps_support::{
    printverbose, Diagnostics, MemoryStore, OutputClass, Outputs, Resources, Support,
    SupportConfig, SupportError,
};
use rstest::rstest;

#[derive(Debug, Clone, PartialEq)]
struct Generator {
    name: &'static str,
    extension: &'static str,
}

impl OutputClass for Generator {
    fn output_name(&self) -> &str {
        self.name
    }
}

fn registered() -> Outputs<Generator> {
    let mut outputs = Outputs::new();
    outputs.register(Generator { name: "html", extension: "html" });
    outputs.register(Generator { name: "vhdl", extension: "vhd" });
    outputs.register(Generator { name: "c", extension: "h" });
    outputs
}

#[test]
fn lookup_returns_registered_class() {
    let outputs = registered();
    assert_eq!(outputs.output("vhdl").unwrap().extension, "vhd");
    assert_eq!(outputs.names().collect::<Vec<_>>(), ["html", "vhdl", "c"]);
}

#[rstest]
#[case("missing")]
#[case("")]
#[case("HTML")]
fn unknown_names_are_not_found(#[case] name: &str) {
    let err = registered().output(name).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), format!("no output registered as '{name}'"));
}

#[test]
fn docs_read_readme_from_resources() {
    let mut store = MemoryStore::new();
    store.insert("resource/html/README.rst", "HTML\n====\r\nOne page per block.\n");
    store.insert("unlisted/README.rst", "present but unregistered\n");
    let resources = Resources::new(store);
    let outputs = registered();

    let docs = outputs.docs("html", &resources).unwrap();
    assert_eq!(&*docs, "HTML\n====\nOne page per block.\n");
    assert!(Rc::ptr_eq(&docs, &outputs.docs("html", &resources).unwrap()));

    assert_eq!(
        &*outputs.docs("unlisted", &resources).unwrap(),
        "present but unregistered\n"
    );
    assert!(matches!(
        outputs.docs("vhdl", &resources).unwrap_err(),
        SupportError::ResourceNotFound { .. }
    ));
}

#[test]
fn support_context_wires_registry_and_diagnostics() {
    let mut support: Support<Generator> = Support::new(&SupportConfig::default());
    let html = support.register(Generator { name: "html", extension: "html" });
    assert_eq!(support.output("html").unwrap(), &html);
    assert_eq!(support.outputs().len(), 1);
    assert!(!support.diagnostics().is_verbose());
    assert!(support.template("common/banner.tera").is_ok());
}

#[test]
fn printverbose_only_when_enabled() {
    let diag = Diagnostics::with_sink(Vec::new());
    printverbose!(diag, "loading {}", "regs.xml");
    assert!(diag.sink().is_empty());

    diag.set_verbose(true);
    printverbose!(diag, "loading {}", "regs.xml");
    diag.printverbose(format_args!("done"));
    assert_eq!(
        String::from_utf8(diag.into_sink()).unwrap(),
        "loading regs.xml\ndone\n"
    );
}
