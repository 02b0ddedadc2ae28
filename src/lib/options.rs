//! Explicit configuration shared by the discovery, listing and scanning passes.

pub const DEFAULT_TEMPLATE_FILENAME: &str = ".env.example";
pub const DEFAULT_INSTANCE_FILENAME: &str = ".env";

/// Files larger than this are skipped by the scanner (5 MiB).
pub const DEFAULT_MAX_SCAN_SIZE: u64 = 5 * 1024 * 1024;

/// Names and limits used when classifying and scanning files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
  /// File name treated as a template even without an `.example` suffix or infix.
  pub template_filename: String,
  /// File name the default template maps to.
  pub instance_filename: String,
  /// Size limit in bytes for files considered by `scan`.
  pub max_scan_size: u64,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      template_filename: DEFAULT_TEMPLATE_FILENAME.to_string(),
      instance_filename: DEFAULT_INSTANCE_FILENAME.to_string(),
      max_scan_size: DEFAULT_MAX_SCAN_SIZE,
    }
  }
}
