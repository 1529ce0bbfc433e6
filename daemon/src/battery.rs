use std::path::PathBuf;

use facebox::battery::is_charging;

/// Reads the battery's power-supply sysfs attributes.
pub struct Battery {
    status_path: PathBuf,
    capacity_path: PathBuf,
}

impl Battery {
    pub fn new(status_path: PathBuf, capacity_path: PathBuf) -> Self {
        Self {
            status_path,
            capacity_path,
        }
    }

    pub async fn status(&self) -> std::io::Result<String> {
        Ok(tokio::fs::read_to_string(&self.status_path)
            .await?
            .trim()
            .to_string())
    }

    pub async fn capacity(&self) -> std::io::Result<String> {
        Ok(tokio::fs::read_to_string(&self.capacity_path)
            .await?
            .trim()
            .to_string())
    }

    pub async fn is_charging(&self) -> std::io::Result<bool> {
        Ok(is_charging(&self.status().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_sysfs_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("status"), "Charging\n").unwrap();
        std::fs::write(dir.path().join("capacity"), "64\n").unwrap();
        let battery = Battery::new(dir.path().join("status"), dir.path().join("capacity"));

        assert_eq!(battery.status().await.unwrap(), "Charging");
        assert_eq!(battery.capacity().await.unwrap(), "64");
        assert!(battery.is_charging().await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let battery = Battery::new(dir.path().join("status"), dir.path().join("capacity"));
        assert!(battery.status().await.is_err());
        assert!(battery.is_charging().await.is_err());
    }
}
