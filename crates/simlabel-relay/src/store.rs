use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use simlabel_io::{
    records::{MetaRecord, META_FILE_NAME},
    FileSaver, IoError,
};

/// Saves label sessions into per-day folders and tracks the latest one.
///
/// A session received at `2024-03-05 07:15:02` is written to
/// `root/2024-03-05/071502.<ext>`, then `root/meta.<ext>` is rewritten to
/// point at it.
#[derive(Debug, Clone)]
pub struct LabelStore {
    saver: FileSaver,
}

impl LabelStore {
    /// Create a store writing through `saver`.
    pub fn new(saver: FileSaver) -> Self {
        Self { saver }
    }

    /// Path of the meta file.
    pub fn meta_path(&self) -> PathBuf {
        self.saver.path_for(META_FILE_NAME)
    }

    /// Save a session stamped with the local time.
    pub fn save(&self, payload: &serde_json::Value) -> Result<PathBuf, IoError> {
        self.save_at(payload, Local::now().naive_local())
    }

    /// Save a session stamped with `now` and return its path.
    ///
    /// Two sessions received within the same second overwrite each other.
    pub fn save_at(
        &self,
        payload: &serde_json::Value,
        now: NaiveDateTime,
    ) -> Result<PathBuf, IoError> {
        let folder = now.format("%Y-%m-%d").to_string();
        let file = now.format("%H%M%S").to_string();

        self.saver.create_dir(&folder)?;
        let path = self.saver.save(&format!("{folder}/{file}"), payload)?;

        self.saver.save(
            META_FILE_NAME,
            &MetaRecord {
                latest_file: path.clone(),
            },
        )?;

        log::info!("saved label session to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use simlabel_io::{
        records::LabelSession,
        saver::{read_json, read_yaml},
        FileFormat,
    };

    fn stamp(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .unwrap()
    }

    #[test]
    fn saves_into_day_folder() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let store = LabelStore::new(FileSaver::new(tmp_dir.path(), FileFormat::Yaml)?);

        let payload = json!({"cube": {"pos": [1.0, 2.0, 3.0], "rot": [0.0, 0.0, 0.0, 1.0], "scale": [1.0, 1.0, 1.0]}});
        let path = store.save_at(&payload, stamp(7, 15, 2))?;
        assert_eq!(path, tmp_dir.path().join("2024-03-05").join("071502.yaml"));

        let session: LabelSession = read_yaml(&path)?;
        assert_eq!(session.labels["cube"].pos, vec![1.0, 2.0, 3.0]);

        let meta: MetaRecord = read_yaml(store.meta_path())?;
        assert_eq!(meta.latest_file, path);
        Ok(())
    }

    #[test]
    fn meta_tracks_latest_save() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let store = LabelStore::new(FileSaver::new(tmp_dir.path(), FileFormat::Json)?);

        store.save_at(&json!({}), stamp(9, 0, 0))?;
        let second = store.save_at(&json!({}), stamp(9, 0, 1))?;

        let meta: MetaRecord = read_json(store.meta_path())?;
        assert_eq!(meta.latest_file, second);
        assert!(tmp_dir.path().join("2024-03-05/090000.json").exists());
        Ok(())
    }
}
