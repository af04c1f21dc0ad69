// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Provider Registry
 * Hosting platform fingerprints with their patterns compiled once per run
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use regex::Regex;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::errors::{ScannerError, ScannerResult};
use crate::types::ProviderFingerprint;

/// A fingerprint plus its compiled patterns
#[derive(Debug)]
pub struct ProviderEntry {
    pub fingerprint: ProviderFingerprint,
    cname_regex: Option<Regex>,
    content_regex: Result<Regex, String>,
}

impl ProviderEntry {
    fn compile(fingerprint: ProviderFingerprint) -> Self {
        let cname_regex = match Regex::new(&fingerprint.cname_pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(
                    "Provider '{}' has an invalid CNAME pattern '{}', it will never match: {}",
                    fingerprint.name, fingerprint.cname_pattern, e
                );
                None
            }
        };

        let content_regex = Regex::new(&fingerprint.content_pattern).map_err(|e| {
            format!(
                "invalid content pattern '{}' for {}: {}",
                fingerprint.content_pattern, fingerprint.name, e
            )
        });

        Self {
            fingerprint,
            cname_regex,
            content_regex,
        }
    }

    pub fn name(&self) -> &str {
        &self.fingerprint.name
    }

    /// Unanchored search, so a pattern may match anywhere in the CNAME
    pub fn matches_cname(&self, cname: &str) -> bool {
        self.cname_regex
            .as_ref()
            .is_some_and(|re| re.is_match(cname))
    }

    /// Compiled content pattern, or the compile error as text
    pub fn content_regex(&self) -> Result<&Regex, &str> {
        self.content_regex.as_ref().map_err(|e| e.as_str())
    }
}

/// Read-only fingerprint table shared by all scan tasks
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    entries: Vec<ProviderEntry>,
}

impl ProviderRegistry {
    pub fn new(fingerprints: Vec<ProviderFingerprint>) -> Self {
        let entries = fingerprints
            .into_iter()
            .map(ProviderEntry::compile)
            .collect::<Vec<_>>();

        debug!("Provider registry loaded with {} fingerprints", entries.len());
        Self { entries }
    }

    /// Load a `name,cname,string,http` provider data file
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> ScannerResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            ScannerError::Registry(format!("cannot open {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> ScannerResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut fingerprints = Vec::new();
        for (index, record) in csv_reader.deserialize::<ProviderFingerprint>().enumerate() {
            let fingerprint = record.map_err(|e| {
                ScannerError::Registry(format!("bad provider record {}: {}", index + 1, e))
            })?;
            fingerprints.push(fingerprint);
        }

        Ok(Self::new(fingerprints))
    }

    /// Every entry whose CNAME pattern matches `cname`, in registry order
    pub fn matching_fingerprints(&self, cname: &str) -> Vec<&ProviderEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.matches_cname(cname))
            .collect()
    }

    pub fn entries(&self) -> &[ProviderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "name,cname,string,http
github,github\\.io$,There isn't a GitHub Pages site here,false
heroku,herokuapp,no-such-app.html,TRUE
pages,github,Site not found,
";

    #[test]
    fn test_parse_csv() {
        let registry = ProviderRegistry::from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(registry.len(), 3);
        let heroku = &registry.entries()[1];
        assert_eq!(heroku.name(), "heroku");
        assert!(heroku.fingerprint.use_http);
        assert!(!registry.entries()[2].fingerprint.use_http);
    }

    #[test]
    fn test_matching_is_substring_search() {
        let registry = ProviderRegistry::from_reader(SAMPLE.as_bytes()).unwrap();

        let names: Vec<&str> = registry
            .matching_fingerprints("foo.github.io")
            .iter()
            .map(|e| e.name())
            .collect();
        assert_eq!(names, vec!["github", "pages"]);

        assert_eq!(
            registry.matching_fingerprints("shiny-app.herokuapp.com").len(),
            1
        );
        assert!(registry.matching_fingerprints("example.net").is_empty());
    }

    #[test]
    fn test_matching_is_stable() {
        let registry = ProviderRegistry::from_reader(SAMPLE.as_bytes()).unwrap();

        let first: Vec<&str> = registry
            .matching_fingerprints("foo.github.io")
            .iter()
            .map(|e| e.name())
            .collect();
        let second: Vec<&str> = registry
            .matching_fingerprints("foo.github.io")
            .iter()
            .map(|e| e.name())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_patterns() {
        let registry = ProviderRegistry::new(vec![
            ProviderFingerprint::new("broken-cname", "([a-z", "x", false),
            ProviderFingerprint::new("broken-body", "example", "(unclosed", false),
        ]);

        let matches = registry.matching_fingerprints("www.example.com");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name(), "broken-body");
        assert!(matches[0].content_regex().is_err());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = ProviderRegistry::from_csv_path("/nonexistent/providers.csv").unwrap_err();
        assert!(matches!(err, ScannerError::Registry(_)));
    }

    #[test]
    fn test_malformed_csv_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,cname,string,http").unwrap();
        writeln!(file, "only-one-column").unwrap();
        file.flush().unwrap();

        assert!(ProviderRegistry::from_csv_path(file.path()).is_err());
    }
}
