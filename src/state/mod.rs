//! Project file state: the immutable aggregate and its transitions.

mod project_files;
mod transitions;
mod upload;

#[cfg(test)]
mod tests;

pub use project_files::{ProjectFiles, ProjectFilesOverrides};
