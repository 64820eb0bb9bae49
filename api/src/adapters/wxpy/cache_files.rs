//! File-backed IdentitySource
//!
//! The pickles reference classes from the bridge's Python package, so the
//! bridge's extraction step dumps them to JSON next to the originals
//! (`wxpy.pkl` -> `wxpy_extracted.json`). Either path may be configured.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::entities::{CachedAccount, IdentityTables};
use crate::domain::ports::IdentitySource;
use crate::error::DomainError;

/// `wxpy.pkl`: `{"storage": {"mpList": [...]}}`
#[derive(Deserialize)]
struct AccountCacheFile {
    storage: AccountStorage,
}

#[derive(Deserialize)]
struct AccountStorage {
    #[serde(rename = "mpList", default)]
    mp_list: Vec<CachedAccount>,
}

/// `wxpy_puid.pkl`, either as the pickled TwoWayDict or a flat map
#[derive(Deserialize)]
#[serde(untagged)]
enum PuidCacheFile {
    Pickled(Vec<PickledTwoWayDict>),
    Flat { puid_map: HashMap<String, String> },
}

#[derive(Deserialize)]
struct PickledTwoWayDict {
    #[serde(rename = "__dict__")]
    state: TwoWayDictState,
}

#[derive(Deserialize)]
struct TwoWayDictState {
    #[serde(default)]
    data: HashMap<String, String>,
}

impl From<PuidCacheFile> for HashMap<String, String> {
    fn from(file: PuidCacheFile) -> Self {
        match file {
            PuidCacheFile::Pickled(objects) => objects
                .into_iter()
                .next()
                .map(|object| object.state.data)
                .unwrap_or_default(),
            PuidCacheFile::Flat { puid_map } => puid_map,
        }
    }
}

/// Loads the account and puid caches from disk on every `load`
pub struct WxpyCacheFiles {
    account_cache: PathBuf,
    puid_cache: PathBuf,
}

impl WxpyCacheFiles {
    pub fn new(account_cache: impl AsRef<Path>, puid_cache: impl AsRef<Path>) -> Self {
        Self {
            account_cache: extracted_path(account_cache.as_ref()),
            puid_cache: extracted_path(puid_cache.as_ref()),
        }
    }

    pub fn account_cache(&self) -> &Path {
        &self.account_cache
    }

    pub fn puid_cache(&self) -> &Path {
        &self.puid_cache
    }
}

impl IdentitySource for WxpyCacheFiles {
    fn load(&self) -> Result<IdentityTables, DomainError> {
        let accounts: AccountCacheFile = read_json(&self.account_cache)?;
        let puids: PuidCacheFile = read_json(&self.puid_cache)?;

        Ok(IdentityTables {
            accounts: accounts.storage.mp_list,
            puids: puids.into(),
        })
    }
}

/// Map `foo.pkl` to its extracted sibling `foo_extracted.json`
fn extracted_path(path: &Path) -> PathBuf {
    if path.extension().and_then(|ext| ext.to_str()) != Some("pkl") {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}_extracted.json", stem))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DomainError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| DomainError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| DomainError::Load(format!("{}: unexpected format: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    const ACCOUNTS: &str = r#"{
        "storage": {
            "mpList": [
                {"UserName": "@abc", "NickName": "Rust Weekly", "Signature": "News", "HeadImgUrl": "/img/abc", "Province": "x"},
                {"UserName": "@def", "NickName": "No Puid"}
            ]
        }
    }"#;

    #[test]
    fn pkl_paths_map_to_extracted_json() {
        assert_eq!(
            extracted_path(Path::new("/data/wxpy.pkl")),
            PathBuf::from("/data/wxpy_extracted.json")
        );
        assert_eq!(
            extracted_path(Path::new("/data/wxpy_puid.pkl")),
            PathBuf::from("/data/wxpy_puid_extracted.json")
        );
        assert_eq!(
            extracted_path(Path::new("/data/custom.json")),
            PathBuf::from("/data/custom.json")
        );
    }

    #[test]
    fn loads_pickled_two_way_dict() {
        let dir = TempDir::new().unwrap();
        let accounts = write(&dir, "wxpy_extracted.json", ACCOUNTS);
        let puids = write(
            &dir,
            "wxpy_puid_extracted.json",
            r#"[{"__type__": "TwoWayDict", "__dict__": {"data": {"@abc": "2a44d45d"}}}]"#,
        );

        let tables = WxpyCacheFiles::new(accounts, puids).load().unwrap();

        assert_eq!(tables.accounts.len(), 2);
        assert_eq!(tables.accounts[0].nick_name, "Rust Weekly");
        assert_eq!(tables.accounts[1].signature, "");
        assert_eq!(tables.puids.get("@abc").map(String::as_str), Some("2a44d45d"));
    }

    #[test]
    fn loads_flat_puid_map() {
        let dir = TempDir::new().unwrap();
        let accounts = write(&dir, "accounts.json", ACCOUNTS);
        let puids = write(&dir, "puids.json", r#"{"puid_map": {"@def": "99"}}"#);

        let tables = WxpyCacheFiles::new(accounts, puids).load().unwrap();

        assert_eq!(tables.puids.len(), 1);
    }

    #[test]
    fn resolves_pkl_config_to_sibling_json() {
        let dir = TempDir::new().unwrap();
        write(&dir, "wxpy_extracted.json", ACCOUNTS);
        write(&dir, "wxpy_puid_extracted.json", r#"{"puid_map": {}}"#);

        let source = WxpyCacheFiles::new(dir.path().join("wxpy.pkl"), dir.path().join("wxpy_puid.pkl"));

        assert!(source.load().is_ok());
    }

    #[test]
    fn missing_file_is_load_error() {
        let dir = TempDir::new().unwrap();
        let source = WxpyCacheFiles::new(dir.path().join("a.json"), dir.path().join("b.json"));

        assert!(matches!(source.load(), Err(DomainError::Load(_))));
    }

    #[test]
    fn schema_mismatch_is_load_error() {
        let dir = TempDir::new().unwrap();
        let accounts = write(&dir, "accounts.json", r#"{"mpList": []}"#);
        let puids = write(&dir, "puids.json", r#"{"puid_map": {}}"#);

        let result = WxpyCacheFiles::new(accounts, puids).load();

        assert!(matches!(result, Err(DomainError::Load(_))));
    }

    #[test]
    fn corrupt_puid_cache_is_load_error() {
        let dir = TempDir::new().unwrap();
        let accounts = write(&dir, "accounts.json", ACCOUNTS);
        let puids = write(&dir, "puids.json", "\u{80}not json");

        let result = WxpyCacheFiles::new(accounts, puids).load();

        assert!(matches!(result, Err(DomainError::Load(_))));
    }
}
