//! Template and instance file discovery.
//!
//! Files are classified by name only:
//!
//! - a **template** ends with `.example`, contains `.example.`, or is named
//!   like the configured default template (`.env.example`);
//! - otherwise an **instance** has `.env` somewhere in its name;
//! - anything else is ignored.

use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::options::Options;

const TEMPLATE_SUFFIX: &str = ".example";
const TEMPLATE_INFIX: &str = ".example.";
const INSTANCE_MARKER: &str = ".env";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
  Template,
  Instance,
}

/// Definition files found under a root, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovered {
  pub instances: Vec<PathBuf>,
  pub templates: Vec<PathBuf>,
}

/// Classifies a file name, returning `None` for files that are not definition files.
pub fn classify(file_name: &str, options: &Options) -> Option<FileKind> {
  if file_name.ends_with(TEMPLATE_SUFFIX)
    || file_name.contains(TEMPLATE_INFIX)
    || file_name == options.template_filename
  {
    Some(FileKind::Template)
  } else if file_name.contains(INSTANCE_MARKER) {
    Some(FileKind::Instance)
  } else {
    None
  }
}

/// Recursively collects templates and instances under `root`.
///
/// The first traversal error, including a missing root, aborts the walk.
pub fn discover<P: AsRef<Path>>(root: P, options: &Options) -> Result<Discovered, DiscoverError> {
  let root = root.as_ref();

  #[cfg(feature = "tracing")]
  debug!(?root, "Discovering env files");

  let mut found = Discovered::default();

  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = entry?;

    if !entry.file_type().is_file() {
      continue;
    }

    let kind = classify(&entry.file_name().to_string_lossy(), options);
    match kind {
      Some(FileKind::Template) => {
        #[cfg(feature = "tracing")]
        trace!("Found template: {:?}", entry.path());
        found.templates.push(entry.into_path());
      }
      Some(FileKind::Instance) => {
        #[cfg(feature = "tracing")]
        trace!("Found instance: {:?}", entry.path());
        found.instances.push(entry.into_path());
      }
      None => {}
    }
  }

  #[cfg(feature = "tracing")]
  debug!(
    "Discovered {} templates and {} instances",
    found.templates.len(),
    found.instances.len()
  );

  Ok(found)
}

/// Infers the instance file a template belongs to.
///
/// `.env.example` becomes `.env`, `.env.example.local` becomes `.env.local`,
/// and the default template name maps to the default instance name. A name no
/// rule applies to is returned as is, and so is a bare `.example`, which has
/// nothing left once the suffix is stripped.
pub fn instance_path_for<P: AsRef<Path>>(template: P, options: &Options) -> PathBuf {
  let template = template.as_ref();

  let Some(file_name) = template.file_name().and_then(|name| name.to_str()) else {
    return template.to_path_buf();
  };

  let stripped = file_name
    .strip_suffix(TEMPLATE_SUFFIX)
    .filter(|stripped| !stripped.is_empty());

  let instance_name = if let Some(stripped) = stripped {
    stripped.to_string()
  } else if file_name.contains(TEMPLATE_INFIX) {
    file_name.replacen(TEMPLATE_INFIX, ".", 1)
  } else if file_name == options.template_filename {
    options.instance_filename.clone()
  } else {
    file_name.to_string()
  };

  template.with_file_name(instance_name)
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
  #[error("Failed to walk directory: {0}")]
  Walk(#[from] walkdir::Error),
}
