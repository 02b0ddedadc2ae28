//! Scanning text files for tokens that look like environment variable names.
//!
//! A token is any maximal upper-case identifier (`[A-Z_][A-Z0-9_]*`). The lone
//! `_` is dropped, and so is any occurrence directly preceded by a `.`, which
//! filters out most qualified names like `Foo.BAR`. This is a heuristic, not a
//! parser: expect some noise.

use std::{
  collections::BTreeSet,
  fmt,
  fs::{self, File},
  io::{self, Read},
  path::{Path, PathBuf},
  sync::LazyLock,
};

use regex::Regex;
#[cfg(feature = "tracing")]
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::options::Options;

/// Number of leading bytes inspected when deciding whether a file is text.
const SNIFF_LEN: usize = 512;

/// Word boundaries are ASCII-only, so a token next to a non-ASCII letter still counts.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?-u:\b)[A-Z_][A-Z0-9_]*(?-u:\b)").expect("token pattern is valid")
});

/// Env-var-like tokens found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHit {
  pub path: PathBuf,
  pub vars: Vec<String>,
}

impl fmt::Display for ScanHit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "Found {} env vars in {}:",
      self.vars.len(),
      self.path.display()
    )?;
    for var in &self.vars {
      writeln!(f, "  - {}", var)?;
    }
    Ok(())
  }
}

/// Extracts the distinct env-var-like tokens in `content`, sorted.
pub fn find_env_vars(content: &str) -> Vec<String> {
  let bytes = content.as_bytes();

  TOKEN_RE
    .find_iter(content)
    .filter(|m| m.as_str() != "_")
    .filter(|m| m.start() == 0 || bytes[m.start() - 1] != b'.')
    .map(|m| m.as_str())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .map(String::from)
    .collect()
}

/// Walks `root` and scans every text file no larger than `options.max_scan_size`.
///
/// Only files with at least one token are reported. Walk and read errors abort
/// the scan.
pub fn scan<P: AsRef<Path>>(root: P, options: &Options) -> Result<Vec<ScanHit>, ScanError> {
  let root = root.as_ref();

  #[cfg(feature = "tracing")]
  debug!(?root, max_size = options.max_scan_size, "Scanning for env vars");

  let mut hits = Vec::new();

  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = entry?;

    if !entry.file_type().is_file() {
      continue;
    }

    let path = entry.path();
    let size = entry.metadata()?.len();
    if size > options.max_scan_size {
      #[cfg(feature = "tracing")]
      trace!(?path, size, "Skipping large file");
      continue;
    }

    if !is_text_file(path) {
      #[cfg(feature = "tracing")]
      trace!(?path, "Skipping non-text file");
      continue;
    }

    let bytes = fs::read(path).map_err(|source| ScanError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let vars = find_env_vars(&String::from_utf8_lossy(&bytes));

    if !vars.is_empty() {
      #[cfg(feature = "tracing")]
      trace!(?path, count = vars.len(), "Found env vars");

      hits.push(ScanHit {
        path: path.to_path_buf(),
        vars,
      });
    }
  }

  Ok(hits)
}

/// Sniffs the head of a file. Unreadable and empty files count as non-text.
pub fn is_text_file<P: AsRef<Path>>(path: P) -> bool {
  let mut head = Vec::with_capacity(SNIFF_LEN);
  let read = File::open(path).and_then(|file| file.take(SNIFF_LEN as u64).read_to_end(&mut head));

  match read {
    Ok(0) | Err(_) => false,
    Ok(_) => looks_like_text(&head),
  }
}

fn looks_like_text(head: &[u8]) -> bool {
  if head.contains(&0) {
    return false;
  }
  match std::str::from_utf8(head) {
    Ok(_) => true,
    // The sniff window may cut a multi-byte character in half.
    Err(e) => e.error_len().is_none(),
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
  #[error("Failed to walk directory: {0}")]
  Walk(#[from] walkdir::Error),
  #[error("Failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_find_env_vars() {
    let vars = find_env_vars("API_KEY=abc .Foo BAR_BAZ _ x");

    assert_eq!(vars, vec!["API_KEY", "BAR_BAZ"]);
  }

  #[test]
  fn test_tokens_next_to_non_ascii_letters() {
    let vars = find_env_vars("\u{e9}FOO_BAR \u{d7}BAZ na\u{ef}QUX");

    assert_eq!(vars, vec!["BAZ", "FOO_BAR", "QUX"]);
  }

  #[test]
  fn test_find_env_vars_dedups() {
    let vars = find_env_vars("PORT HOST PORT\nHOST=1 PORT");

    assert_eq!(vars, vec!["HOST", "PORT"]);
  }

  #[test]
  fn test_period_prefixed_tokens_are_skipped() {
    assert!(find_env_vars("config.DEBUG self.MAX").is_empty());
    assert_eq!(find_env_vars("config.DEBUG DEBUG"), vec!["DEBUG"]);
  }

  #[test]
  fn test_mixed_case_words_are_not_tokens() {
    assert!(find_env_vars("Hello World camelCase snake_case").is_empty());
    assert_eq!(
      find_env_vars("process.env.NODE_ENV || os.getenv(\"DB_URL\")"),
      vec!["DB_URL"]
    );
  }

  #[test]
  fn test_looks_like_text() {
    assert!(looks_like_text(b"FOO=bar\n"));
    assert!(looks_like_text("caf\u{e9}".as_bytes()));
    assert!(looks_like_text(&"caf\u{e9}".as_bytes()[..4]));
    assert!(!looks_like_text(b"\x7fELF\x02\x01\x00\x00"));
    assert!(!looks_like_text(b"\xff\xfeA\x00"));
  }

  #[test]
  fn test_scan() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("app.py"), "import os\nos.environ[\"SECRET_KEY\"]\n").unwrap();
    fs::write(root.join("blob.bin"), [0u8, 1, 2, b'A', b'B']).unwrap();
    fs::write(root.join("empty.txt"), "").unwrap();
    fs::write(root.join("notes.txt"), "nothing here").unwrap();
    fs::write(root.join("big.txt"), "LARGE_FILE_TOKEN ".repeat(8)).unwrap();

    let options = Options {
      max_scan_size: 64,
      ..Options::default()
    };
    let hits = scan(root, &options).unwrap();

    assert_eq!(
      hits,
      vec![ScanHit {
        path: root.join("app.py"),
        vars: vec!["SECRET_KEY".to_string()],
      }]
    );
  }

  #[test]
  fn test_scan_missing_root() {
    let temp_dir = TempDir::new().unwrap();

    let result = scan(temp_dir.path().join("nope"), &Options::default());
    assert!(matches!(result, Err(ScanError::Walk(_))));
  }
}
