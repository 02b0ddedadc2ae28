use crate::parse::EnvFile;

/// Keys defined in `template` that `instance` does not define, in template order.
///
/// Only key presence is compared; values are ignored.
pub fn missing<'t>(template: &'t EnvFile<'_>, instance: &EnvFile<'_>) -> Vec<&'t str> {
  template
    .keys()
    .filter(|key| !instance.contains_key(key))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_keys() {
    let template = EnvFile::from("FOO=1\nBAR=2\nBAZ=3");
    let instance = EnvFile::from("FOO=9\nEXTRA=1");

    assert_eq!(missing(&template, &instance), vec!["BAR", "BAZ"]);
  }

  #[test]
  fn test_values_are_irrelevant() {
    let template = EnvFile::from("FOO=1\nBAR=2");
    let instance = EnvFile::from("BAR=\nFOO=something else");

    assert!(missing(&template, &instance).is_empty());
  }

  #[test]
  fn test_empty_instance_misses_everything() {
    let template = EnvFile::from("FOO=1\nBAR=2");

    assert_eq!(missing(&template, &EnvFile::default()), vec!["FOO", "BAR"]);
    assert!(missing(&EnvFile::default(), &template).is_empty());
  }

  #[test]
  fn test_key_match_is_exact() {
    let template = EnvFile::from("api_key=1");
    let instance = EnvFile::from("API_KEY=1");

    assert_eq!(missing(&template, &instance), vec!["api_key"]);
  }
}
