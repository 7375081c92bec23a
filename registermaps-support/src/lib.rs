//! registermaps support layer: resources, templates, output destinations,
//! and the output-format registry shared by every generator.
//!
//! - [`resource`]: cached lookup of bundled bytes, text, and templates
//! - [`template`]: the Tera environment and its `reflow` filter
//! - [`output`]: where generated text goes ([`Destination`])
//! - [`registry`]: output-format name to generator class
//! - [`diagnostics`]: the verbose flag and [`printverbose!`]
//! - [`config`]: [`SupportConfig`], including environment overrides
//! - [`support`]: [`Support`], which owns all of the above

pub mod config;
pub mod diagnostics;
pub mod encoding;
pub mod error;
pub mod output;
pub mod registry;
pub mod resource;
pub mod support;
pub mod template;
pub mod whitespace;

pub use config::SupportConfig;
pub use diagnostics::Diagnostics;
pub use encoding::{DecodeErrors, Encoding};
pub use error::SupportError;
pub use output::{Destination, DirOutput, OpenMode, StdOutput, StreamOutput, StringOutput};
pub use registry::{OutputClass, Outputs};
pub use resource::{
    strip_resource, CacheStats, DirStore, EmbeddedStore, KindStats, MemoryStore, ResourceStore,
    Resources, StoreChain, BUNDLE, DEFAULT_CACHE_CAPACITY, RESOURCE_ROOT,
};
pub use support::Support;
pub use template::{Template, TemplateEnvironment};
pub use whitespace::trim_blocks;
