// Preference file - a flat TOML table of control values
use crate::application::preferences::PreferenceBackend;
use crate::error::PreferenceError;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

type Entries = BTreeMap<String, String>;

/// Reads the file on every lookup and rewrites it whole on change, so
/// edits made between sessions are picked up.
pub struct PreferenceFile {
    path: PathBuf,
    // serialises read-modify-write cycles
    lock: Mutex<()>,
}

impl PreferenceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<Entries, PreferenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, entries: &Entries) -> Result<(), PreferenceError> {
        let text = toml::to_string(entries)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    fn modify(&self, change: impl FnOnce(&mut Entries)) -> Result<(), PreferenceError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entries = self.read()?;
        change(&mut entries);
        self.write(&entries)?;
        tracing::debug!("Wrote {} preferences to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl PreferenceBackend for PreferenceFile {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(self.read()?.remove(key))
    }

    fn put(&self, entries: &[(String, String)]) -> Result<(), PreferenceError> {
        self.modify(|stored| stored.extend(entries.iter().cloned()))
    }

    fn remove(&self, keys: &[String]) -> Result<(), PreferenceError> {
        self.modify(|stored| {
            for key in keys {
                stored.remove(key);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = PreferenceFile::new(dir.path().join("prefs.toml"));
        assert_eq!(file.get("figure-background-colour").unwrap(), None);
    }

    #[test]
    fn test_put_and_remove_persist_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        let file = PreferenceFile::new(&path);
        file.put(&[
            ("figure-x-axis-grid".into(), "false".into()),
            ("data-PE-colour-map".into(), "Viridis".into()),
        ])
        .unwrap();

        let reopened = PreferenceFile::new(&path);
        assert_eq!(reopened.get("figure-x-axis-grid").unwrap().as_deref(), Some("false"));

        reopened.remove(&["figure-x-axis-grid".into()]).unwrap();
        assert_eq!(file.get("figure-x-axis-grid").unwrap(), None);
        assert_eq!(file.get("data-PE-colour-map").unwrap().as_deref(), Some("Viridis"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("data-PE-colour-map = \"Viridis\""));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        let file = PreferenceFile::new(&path);
        assert!(matches!(file.get("x"), Err(PreferenceError::Parse(_))));
    }
}
