/// Loading component definitions from the filesystem.
pub mod definitions;
pub use definitions::{LoadError, load_definition, load_definitions};
