//! Creating and updating instance files from a template.
//!
//! # Write Logic
//!
//! - `create` materializes a new instance holding every template entry. It
//!   never overwrites an existing file.
//! - `update` appends the keys the instance is missing, preceded by a
//!   provenance comment when the instance already existed. Existing lines are
//!   never rewritten or reordered.
//!
//! # Examples
//!
//! ```rust,no_run
//! use envcheck::write;
//!
//! let report = write::create("prod/.env", "prod/.env.example").unwrap();
//! println!("{report}");
//! ```

use std::{
  fmt,
  fs::{self, OpenOptions},
  io::{self, Write},
  path::{Path, PathBuf},
};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

use crate::{
  diff,
  parse::{EnvFile, ParseError},
};

const PROVENANCE_PREFIX: &str = "# Added by envcheck from";

/// Outcome of [`create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReport {
  pub instance: PathBuf,
  pub template: PathBuf,
  pub keys: usize,
}

impl fmt::Display for CreateReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "✓ Created {} with {} keys from {}",
      self.instance.display(),
      self.keys,
      self.template.display()
    )
  }
}

/// Outcome of [`update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateReport {
  InSync {
    instance: PathBuf,
    template: PathBuf,
  },
  Added {
    instance: PathBuf,
    template: PathBuf,
    keys: Vec<String>,
  },
}

impl UpdateReport {
  /// Keys appended by the update; empty when already in sync.
  pub fn added(&self) -> &[String] {
    match self {
      UpdateReport::InSync { .. } => &[],
      UpdateReport::Added { keys, .. } => keys,
    }
  }
}

impl fmt::Display for UpdateReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UpdateReport::InSync { instance, template } => writeln!(
        f,
        "✓ {} is in sync with {}",
        instance.display(),
        template.display()
      ),
      UpdateReport::Added { instance, keys, .. } => {
        writeln!(
          f,
          "✓ Added {} missing keys to {}",
          keys.len(),
          instance.display()
        )?;
        for key in keys {
          writeln!(f, "  + {}", key)?;
        }
        Ok(())
      }
    }
  }
}

/// Creates `instance` holding every entry of `template`.
pub fn create<I, T>(instance: I, template: T) -> Result<CreateReport, WriteError>
where
  I: AsRef<Path>,
  T: AsRef<Path>,
{
  let (instance, template) = (instance.as_ref(), template.as_ref());

  #[cfg(feature = "tracing")]
  debug!(?instance, ?template, "Creating env file");

  if !template.exists() {
    return Err(WriteError::TemplateNotFound(template.to_path_buf()));
  }
  if instance.exists() {
    return Err(WriteError::AlreadyExists(instance.to_path_buf()));
  }

  let template_vars = EnvFile::read(template)?;

  create_parent_dirs(instance)?;

  let mut file = OpenOptions::new()
    .write(true)
    .create_new(true)
    .open(instance)
    .map_err(|source| match source.kind() {
      io::ErrorKind::AlreadyExists => WriteError::AlreadyExists(instance.to_path_buf()),
      _ => WriteError::Write {
        path: instance.to_path_buf(),
        source,
      },
    })?;

  file
    .write_all(template_vars.to_string().as_bytes())
    .map_err(|source| WriteError::Write {
      path: instance.to_path_buf(),
      source,
    })?;

  #[cfg(feature = "tracing")]
  info!("Created {:?} with {} keys", instance, template_vars.len());

  Ok(CreateReport {
    instance: instance.to_path_buf(),
    template: template.to_path_buf(),
    keys: template_vars.len(),
  })
}

/// Appends the keys `instance` is missing from `template`.
///
/// The instance is created when absent. Running it twice in a row is a no-op
/// the second time.
pub fn update<I, T>(instance: I, template: T) -> Result<UpdateReport, WriteError>
where
  I: AsRef<Path>,
  T: AsRef<Path>,
{
  let (instance, template) = (instance.as_ref(), template.as_ref());

  #[cfg(feature = "tracing")]
  debug!(?instance, ?template, "Updating env file");

  if !template.exists() {
    return Err(WriteError::TemplateNotFound(template.to_path_buf()));
  }

  let instance_vars = EnvFile::read(instance)?;
  let template_vars = EnvFile::read(template)?;

  let missing = diff::missing(&template_vars, &instance_vars);
  if missing.is_empty() {
    #[cfg(feature = "tracing")]
    info!("{:?} is already in sync", instance);

    return Ok(UpdateReport::InSync {
      instance: instance.to_path_buf(),
      template: template.to_path_buf(),
    });
  }

  let existed = instance.exists();
  create_parent_dirs(instance)?;

  let mut content = String::new();
  if existed {
    content.push_str(&format!("\n{} {}\n", PROVENANCE_PREFIX, template.display()));
  }
  for key in &missing {
    let value = template_vars.get(key).unwrap_or_default();
    content.push_str(&format!("{}={}\n", key, value));
  }

  let write_err = |source: io::Error| WriteError::Write {
    path: instance.to_path_buf(),
    source,
  };

  OpenOptions::new()
    .append(true)
    .create(true)
    .open(instance)
    .and_then(|mut file| file.write_all(content.as_bytes()))
    .map_err(write_err)?;

  #[cfg(feature = "tracing")]
  info!("Appended {} keys to {:?}", missing.len(), instance);

  Ok(UpdateReport::Added {
    instance: instance.to_path_buf(),
    template: template.to_path_buf(),
    keys: missing.into_iter().map(String::from).collect(),
  })
}

fn create_parent_dirs(path: &Path) -> Result<(), WriteError> {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => {
      fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
        path: parent.to_path_buf(),
        source,
      })
    }
    _ => Ok(()),
  }
}

/// Errors that can occur while creating or updating an instance file.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
  /// Template file does not exist
  #[error("Example file {} not found.", .0.display())]
  TemplateNotFound(PathBuf),
  /// Create target already exists
  #[error("{} already exists. Use 'update' instead.", .0.display())]
  AlreadyExists(PathBuf),
  /// Error creating the instance's parent directories
  #[error("Failed to create directory {}: {source}", path.display())]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
  /// Error writing the instance file
  #[error("Failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
  /// Error reading either file
  #[error(transparent)]
  Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn setup(template: &str, instance: Option<&str>) -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let template_path = temp_dir.path().join(".env.example");
    let instance_path = temp_dir.path().join(".env");

    fs::write(&template_path, template).unwrap();
    if let Some(content) = instance {
      fs::write(&instance_path, content).unwrap();
    }

    (temp_dir, instance_path, template_path)
  }

  #[test]
  fn test_create() {
    let (_dir, instance, template) = setup("FOO=1\n# comment\nBAR=2\n", None);

    let report = create(&instance, &template).unwrap();

    assert_eq!(report.keys, 2);
    assert_eq!(fs::read_to_string(&instance).unwrap(), "FOO=1\nBAR=2\n");
  }

  #[test]
  fn test_create_roundtrip() {
    let (_dir, instance, template) = setup("A=1\nB=\"quoted\"\nC=x=y\nA=3", None);

    create(&instance, &template).unwrap();

    assert_eq!(
      EnvFile::read(&instance).unwrap(),
      EnvFile::read(&template).unwrap()
    );
  }

  #[test]
  fn test_create_makes_parent_dirs() {
    let (dir, _, template) = setup("FOO=1", None);
    let instance = dir.path().join("deploy/prod/.env");

    create(&instance, &template).unwrap();

    assert_eq!(fs::read_to_string(&instance).unwrap(), "FOO=1\n");
  }

  #[test]
  fn test_create_never_overwrites() {
    let (_dir, instance, template) = setup("FOO=1", Some("KEEP=me\n"));

    let result = create(&instance, &template);

    match result.unwrap_err() {
      WriteError::AlreadyExists(path) => assert_eq!(path, instance),
      other => panic!("Expected AlreadyExists error, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&instance).unwrap(), "KEEP=me\n");
  }

  #[test]
  fn test_create_template_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("nonexistent.env.example");

    let result = create(temp_dir.path().join(".env"), &template);

    assert!(matches!(result, Err(WriteError::TemplateNotFound(path)) if path == template));
    assert!(!temp_dir.path().join(".env").exists());
  }

  #[test]
  fn test_update_appends_missing_keys() {
    let (_dir, instance, template) = setup("FOO=1\nBAR=2\n", Some("FOO=9\n"));

    let report = update(&instance, &template).unwrap();

    assert_eq!(report.added(), ["BAR".to_string()]);
    assert_eq!(
      fs::read_to_string(&instance).unwrap(),
      format!("FOO=9\n\n# Added by envcheck from {}\nBAR=2\n", template.display())
    );
  }

  #[test]
  fn test_update_in_sync_writes_nothing() {
    let (_dir, instance, template) = setup("FOO=1\nBAR=2\n", Some("BAR=x\nFOO=y"));

    let report = update(&instance, &template).unwrap();

    assert!(matches!(report, UpdateReport::InSync { .. }));
    assert_eq!(fs::read_to_string(&instance).unwrap(), "BAR=x\nFOO=y");
  }

  #[test]
  fn test_update_is_idempotent() {
    let (_dir, instance, template) = setup("FOO=1\nBAR=2\nBAZ=3\n", Some("FOO=9\n"));

    let first = update(&instance, &template).unwrap();
    let after_first = fs::read_to_string(&instance).unwrap();
    let second = update(&instance, &template).unwrap();

    assert_eq!(first.added().len(), 2);
    assert!(second.added().is_empty());
    assert_eq!(fs::read_to_string(&instance).unwrap(), after_first);
  }

  #[test]
  fn test_update_creates_absent_instance_without_provenance() {
    let (dir, _, template) = setup("FOO=1\nBAR=2\n", None);
    let instance = dir.path().join("sub/.env");

    update(&instance, &template).unwrap();

    assert_eq!(fs::read_to_string(&instance).unwrap(), "FOO=1\nBAR=2\n");
  }

  #[test]
  fn test_update_template_not_found() {
    let temp_dir = TempDir::new().unwrap();

    let result = update(
      temp_dir.path().join(".env"),
      temp_dir.path().join(".env.example"),
    );

    assert!(matches!(result, Err(WriteError::TemplateNotFound(_))));
  }

  #[test]
  fn test_update_report_display() {
    let report = UpdateReport::Added {
      instance: PathBuf::from(".env"),
      template: PathBuf::from(".env.example"),
      keys: vec!["A".to_string(), "B".to_string()],
    };

    assert_eq!(
      report.to_string(),
      "✓ Added 2 missing keys to .env\n  + A\n  + B\n"
    );
  }
}
