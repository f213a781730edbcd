//! Caller-owned cache of parse results
//!
//! Entries are keyed by the file's identity (canonical path, modification
//! time, length) together with the parser configuration, so editing the file
//! or changing any setting leads to a fresh parse. A miss evicts entries
//! left behind by an older version of the same file.

use crate::config::ParserConfig;
use crate::parser::{LogParser, ParseOutcome};
use crate::progress::{CancelFlag, ProgressReporter};
use crate::types::{ParseError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identity of a file's contents at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileFingerprint {
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
    pub len: u64,
}

impl FileFingerprint {
    /// Fingerprint the file at `path`
    pub fn of(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ParseError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            path: path.canonicalize()?,
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            len: metadata.len(),
        })
    }
}

/// Hit/miss counters of a [`ParseCache`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

/// Cache of finished parses
#[derive(Debug, Default)]
pub struct ParseCache {
    entries: HashMap<(FileFingerprint, ParserConfig), Arc<ParseOutcome>>,
    hits: usize,
    misses: usize,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached outcome for this file and configuration, parsing on a miss
    ///
    /// Failed or cancelled parses are not cached.
    pub fn get_or_parse(
        &mut self,
        parser: &LogParser,
        path: &Path,
        progress: &mut dyn ProgressReporter,
        cancel: &CancelFlag,
    ) -> Result<Arc<ParseOutcome>> {
        let key = (FileFingerprint::of(path)?, parser.config().clone());

        if let Some(outcome) = self.entries.get(&key) {
            log::debug!("Parse cache hit for {:?}", path);
            self.hits += 1;
            return Ok(Arc::clone(outcome));
        }

        log::debug!("Parse cache miss for {:?}", path);
        self.misses += 1;
        self.evict_stale(&key.0);
        let outcome = Arc::new(parser.parse_file(path, progress, cancel)?);
        self.entries.insert(key, Arc::clone(&outcome));
        Ok(outcome)
    }

    /// Drop entries for the same file recorded under an older fingerprint
    fn evict_stale(&mut self, current: &FileFingerprint) {
        let before = self.entries.len();
        self.entries
            .retain(|(fingerprint, _), _| fingerprint.path != current.path || fingerprint == current);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::debug!("Evicted {} stale cache entries for {:?}", evicted, current.path);
        }
    }

    /// Drop every entry for `path`, whatever its fingerprint or configuration
    pub fn invalidate(&mut self, path: &Path) {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.entries.retain(|(fingerprint, _), _| fingerprint.path != canonical);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReshapeMode;
    use crate::progress::NoProgress;
    use std::io::Write;

    fn write_trace(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_second_lookup_is_a_hit() {
        let file = write_trace("0.1s A  x\n0.2s B  y\n");
        let parser = LogParser::new(ParserConfig::new()).unwrap();
        let mut cache = ParseCache::new();

        let first = cache
            .get_or_parse(&parser, file.path(), &mut NoProgress, &CancelFlag::new())
            .unwrap();
        let second = cache
            .get_or_parse(&parser, file.path(), &mut NoProgress, &CancelFlag::new())
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn test_configuration_is_part_of_the_key() {
        let file = write_trace("0.1s A  x\n0.2s B  y\n");
        let raw = LogParser::new(ParserConfig::new()).unwrap();
        let single =
            LogParser::new(ParserConfig::new().with_reshape_mode(ReshapeMode::SingleRow)).unwrap();
        let mut cache = ParseCache::new();

        cache
            .get_or_parse(&raw, file.path(), &mut NoProgress, &CancelFlag::new())
            .unwrap();
        cache
            .get_or_parse(&single, file.path(), &mut NoProgress, &CancelFlag::new())
            .unwrap();

        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.stats().entries, 2);

        cache.invalidate(file.path());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_changed_file_is_parsed_again() {
        let mut file = write_trace("0.1s A  x\n");
        let parser = LogParser::new(ParserConfig::new()).unwrap();
        let mut cache = ParseCache::new();

        let before = cache
            .get_or_parse(&parser, file.path(), &mut NoProgress, &CancelFlag::new())
            .unwrap();
        assert_eq!(before.table.len(), 1);

        file.write_all(b"0.2s B  y\n").unwrap();
        file.flush().unwrap();

        let after = cache
            .get_or_parse(&parser, file.path(), &mut NoProgress, &CancelFlag::new())
            .unwrap();
        assert_eq!(after.table.len(), 2);
        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn test_stale_entries_are_evicted_for_every_configuration() {
        let mut edited = write_trace("0.1s A  x\n");
        let other = write_trace("0.1s C  z\n");
        let raw = LogParser::new(ParserConfig::new()).unwrap();
        let single =
            LogParser::new(ParserConfig::new().with_reshape_mode(ReshapeMode::SingleRow)).unwrap();
        let mut cache = ParseCache::new();
        let cancel = CancelFlag::new();

        cache.get_or_parse(&raw, edited.path(), &mut NoProgress, &cancel).unwrap();
        cache.get_or_parse(&single, edited.path(), &mut NoProgress, &cancel).unwrap();
        cache.get_or_parse(&raw, other.path(), &mut NoProgress, &cancel).unwrap();
        assert_eq!(cache.stats().entries, 3);

        edited.write_all(b"0.2s B  y\n").unwrap();
        edited.flush().unwrap();

        cache.get_or_parse(&raw, edited.path(), &mut NoProgress, &cancel).unwrap();
        assert_eq!(cache.stats().entries, 2);

        let hit = cache.get_or_parse(&raw, other.path(), &mut NoProgress, &cancel).unwrap();
        assert_eq!(hit.table.len(), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_missing_file() {
        let parser = LogParser::new(ParserConfig::new()).unwrap();
        let mut cache = ParseCache::new();
        let result = cache.get_or_parse(
            &parser,
            Path::new("no_such_trace.txt"),
            &mut NoProgress,
            &CancelFlag::new(),
        );
        assert!(matches!(result, Err(ParseError::FileNotFound(_))));
        assert_eq!(cache.stats().entries, 0);
    }
}
