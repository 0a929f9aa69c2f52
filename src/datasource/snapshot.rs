use crate::datasource::Result;
use crate::resource::tld::TldMap;
use std::path::Path;
use tokio::fs;

/// Reads a TLD to nameserver mapping written by a previous run.
pub async fn load(path: &Path) -> Result<TldMap> {
    let text = fs::read_to_string(path).await?;
    Ok(serde_yaml::from_str(&text)?)
}

pub async fn save(path: &Path, map: &TldMap) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, serde_yaml::to_string(map)?).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache").join("tld_dict.yaml");
        let mut map = TldMap::new();
        map.insert("example", vec!["ns1.example.".into(), "ns2.example.".into()]);
        save(&path, &map).await.unwrap();
        assert_eq!(load(&path).await.unwrap(), map);
    }

    #[tokio::test]
    async fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join("nope.yaml")).await.is_err());
    }

    #[tokio::test]
    async fn test_load_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tld_dict.yaml");
        std::fs::write(&path, "- just\n- a list\n").unwrap();
        assert!(load(&path).await.is_err());
    }
}
