//! Template rendering adapters.

mod builtin;

pub use builtin::BuiltinTemplateRenderer;
