//! Snapshot files: JSON by default, YAML for `.yaml`/`.yml`.

use std::path::Path;

use paramstore_core::namespace::Snapshot;


fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}


/// Read a snapshot. A missing file is an empty store.
pub fn load(path: &Path) -> Result<Snapshot, String> {
    if !path.exists() {
        return Ok(Snapshot::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    if content.trim().is_empty() {
        return Ok(Snapshot::default());
    }
    if is_yaml(path) {
        serde_yaml::from_str(&content)
            .map_err(|e| format!("cannot parse {}: {}", path.display(), e))
    } else {
        serde_json::from_str(&content)
            .map_err(|e| format!("cannot parse {}: {}", path.display(), e))
    }
}


/// Write a snapshot, creating parent directories as needed.
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create {}: {}", parent.display(), e))?;
        }
    }
    let content = if is_yaml(path) {
        serde_yaml::to_string(snapshot).map_err(|e| format!("cannot encode snapshot: {}", e))?
    } else {
        serde_json::to_string_pretty(snapshot)
            .map_err(|e| format!("cannot encode snapshot: {}", e))?
    };
    std::fs::write(path, content).map_err(|e| format!("cannot write {}: {}", path.display(), e))
}


#[cfg(test)]
mod tests {
    use super::*;
    use paramstore_core::namespace::{KeyPath, Param, ParameterStore};
    use serde_json::json;

    fn sample() -> Snapshot {
        let mut store = ParameterStore::new();
        store
            .set(&KeyPath::single("grid"), Param::from(json!({"nx": 10, "ny": 12})))
            .unwrap();
        store
            .set_attr(&KeyPath::single("grid"), "units", json!("m"))
            .unwrap();
        store.snapshot()
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snap = load(&dir.path().join("none.json")).unwrap();
        assert!(snap.is_empty());
    }

    #[test]
    fn json_and_yaml_files_reload() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["s.json", "nested/s.yaml"] {
            let path = dir.path().join(name);
            save(&path, &sample()).unwrap();
            assert_eq!(load(&path).unwrap(), sample());
        }
    }

    #[test]
    fn hand_edited_files_load() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("s.json");
        std::fs::write(
            &json_path,
            r#"{"grid": {"value": {"nx": {"value": 10}, "ny": {"value": 12}}, "attrs": {"units": "m"}}}"#,
        )
        .unwrap();
        assert_eq!(load(&json_path).unwrap(), sample());

        let yaml_path = dir.path().join("s.yaml");
        std::fs::write(
            &yaml_path,
            "grid:\n  value:\n    nx: 10\n    ny: 12\n  attrs:\n    units: m\n",
        )
        .unwrap();
        assert_eq!(load(&yaml_path).unwrap(), sample());
    }

    #[test]
    fn garbage_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load(&path).unwrap_err().contains("cannot parse"));
    }
}
