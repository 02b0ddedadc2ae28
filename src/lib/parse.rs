//! Definition file parsing.
//!
//! A definition file is reduced to an ordered list of `KEY=value` pairs. The
//! value is everything after the first `=` on the trimmed line and is kept
//! verbatim: quotes, escapes and trailing `#` text are not interpreted.
//! Blank lines, comment lines and malformed lines are dropped.

use std::{
  borrow::Cow,
  collections::HashMap,
  fmt, fs, io,
  path::{Path, PathBuf},
};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

const COMMENT_PREFIX: &str = "#";
const ASSIGNMENT_OPERATOR: char = '=';

/// Ordered key to raw value mapping read from a definition file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnvFile<'a> {
  entries: Vec<EnvVariable<'a>>,
  /// Position of each key in `entries`.
  index: HashMap<String, usize>,
}

impl<'a> fmt::Display for EnvFile<'a> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for entry in &self.entries {
      writeln!(f, "{}", entry)?;
    }
    Ok(())
  }
}

impl<'a> From<&'a str> for EnvFile<'a> {
  fn from(s: &'a str) -> Self {
    #[cfg(feature = "tracing")]
    debug!("Parsing env file with {} lines", s.lines().count());

    let mut file = Self::default();

    for line in s.lines() {
      #[cfg(feature = "tracing")]
      trace!("Parsing line: {:?}", line);

      if let Some(var) = EnvVariable::parse_line(line) {
        file.insert(var);
      }
    }

    #[cfg(feature = "tracing")]
    debug!("Parsed {} variables", file.entries.len());

    file
  }
}

impl EnvFile<'static> {
  /// Reads and parses the file at `path`.
  ///
  /// A file that does not exist parses as an empty mapping. Use
  /// [`Path::exists`] when "absent" and "empty" need to be told apart.
  pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
    let path = path.as_ref();

    match fs::read_to_string(path) {
      Ok(content) => Ok(EnvFile::from(content.as_str()).into_owned()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        #[cfg(feature = "tracing")]
        debug!(?path, "File not found, treating as empty");
        Ok(Self::default())
      }
      Err(source) => Err(ParseError::Io {
        path: path.to_path_buf(),
        source,
      }),
    }
  }
}

impl<'a> EnvFile<'a> {
  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .index
      .get(key)
      .map(|&pos| self.entries[pos].value.as_ref())
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.index.contains_key(key)
  }

  /// Keys in the order they first appear in the file.
  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|var| var.key.as_ref())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn into_owned(self) -> EnvFile<'static> {
    EnvFile {
      entries: self
        .entries
        .into_iter()
        .map(EnvVariable::into_owned)
        .collect(),
      index: self.index,
    }
  }

  /// Later duplicates overwrite the value but keep the first position.
  fn insert(&mut self, var: EnvVariable<'a>) {
    if let Some(&pos) = self.index.get(var.key.as_ref()) {
      #[cfg(feature = "tracing")]
      trace!("Overwriting duplicate key: {}", var.key);
      self.entries[pos].value = var.value;
    } else {
      self.index.insert(var.key.to_string(), self.entries.len());
      self.entries.push(var);
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvVariable<'a> {
  pub key: Cow<'a, str>,
  pub value: Cow<'a, str>,
}

impl<'a> fmt::Display for EnvVariable<'a> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}{}", self.key, ASSIGNMENT_OPERATOR, self.value)
  }
}

impl<'a> EnvVariable<'a> {
  /// Parses one line, returning `None` for blank, comment and malformed lines.
  fn parse_line(line: &'a str) -> Option<Self> {
    let trimmed = line.trim();

    if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
      return None;
    }

    let (key, value) = trimmed.split_once(ASSIGNMENT_OPERATOR)?;
    if !is_valid_key(key) {
      #[cfg(feature = "tracing")]
      trace!("Skipping malformed line: {:?}", trimmed);
      return None;
    }

    Some(EnvVariable {
      key: Cow::Borrowed(key),
      value: Cow::Borrowed(value),
    })
  }

  fn into_owned(self) -> EnvVariable<'static> {
    EnvVariable {
      key: Cow::Owned(self.key.into_owned()),
      value: Cow::Owned(self.value.into_owned()),
    }
  }
}

fn is_valid_key(key: &str) -> bool {
  !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
  #[error("Failed to read {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}
