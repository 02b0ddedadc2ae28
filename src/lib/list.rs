//! Pairing every discovered template with its instance and reporting the diff.

use std::{
  fmt,
  path::{Path, PathBuf},
};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::{
  diff,
  discover::{self, DiscoverError},
  options::Options,
  parse::{EnvFile, ParseError},
};

/// State of one template/instance pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairStatus {
  InSync,
  Missing { keys: Vec<String> },
  Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
  pub template: PathBuf,
  pub instance: PathBuf,
  pub status: PairStatus,
}

impl fmt::Display for Pair {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let (instance, template) = (self.instance.display(), self.template.display());
    match &self.status {
      PairStatus::InSync => writeln!(f, "✓ {} is in sync with {}", instance, template),
      PairStatus::Missing { keys } => {
        writeln!(
          f,
          "⚠ {} is missing {} keys from {}:",
          instance,
          keys.len(),
          template
        )?;
        for key in keys {
          writeln!(f, "  - {}", key)?;
        }
        Ok(())
      }
      PairStatus::Absent => writeln!(
        f,
        "⚠ {} doesn't exist (template available: {})",
        instance, template
      ),
    }
  }
}

/// Everything `list` found under a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListReport {
  pub root: PathBuf,
  pub default_template: String,
  pub instance_count: usize,
  pub pairs: Vec<Pair>,
}

impl fmt::Display for ListReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Listing env files in path: {}", self.root.display())?;
    if self.pairs.is_empty() {
      writeln!(
        f,
        "✗ No example files (like {}) found.",
        self.default_template
      )?;
    }
    writeln!(
      f,
      "Found {} example files and {} env files.",
      self.pairs.len(),
      self.instance_count
    )?;
    writeln!(f)?;

    for pair in &self.pairs {
      write!(f, "{}", pair)?;
      writeln!(f)?;
    }
    Ok(())
  }
}

/// Discovers every template under `root` and diffs it against its instance.
pub fn list<P: AsRef<Path>>(root: P, options: &Options) -> Result<ListReport, ListError> {
  let root = root.as_ref();
  let found = discover::discover(root, options)?;

  #[cfg(feature = "tracing")]
  debug!("Checking {} template pairs", found.templates.len());

  let mut pairs = Vec::with_capacity(found.templates.len());
  for template in found.templates {
    let instance = discover::instance_path_for(&template, options);
    let status = pair_status(&template, &instance)?;

    #[cfg(feature = "tracing")]
    trace!(?template, ?instance, ?status, "Checked pair");

    pairs.push(Pair {
      template,
      instance,
      status,
    });
  }

  Ok(ListReport {
    root: root.to_path_buf(),
    default_template: options.template_filename.clone(),
    instance_count: found.instances.len(),
    pairs,
  })
}

fn pair_status(template: &Path, instance: &Path) -> Result<PairStatus, ParseError> {
  // Only a regular file counts as an instance; a template never pairs with itself.
  if instance == template || !instance.is_file() {
    return Ok(PairStatus::Absent);
  }

  let template_vars = EnvFile::read(template)?;
  let instance_vars = EnvFile::read(instance)?;

  let missing = diff::missing(&template_vars, &instance_vars);
  if missing.is_empty() {
    Ok(PairStatus::InSync)
  } else {
    Ok(PairStatus::Missing {
      keys: missing.into_iter().map(String::from).collect(),
    })
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
  #[error(transparent)]
  Discover(#[from] DiscoverError),
  #[error(transparent)]
  Parse(#[from] ParseError),
}
