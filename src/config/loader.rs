use crate::config::types::Config;
use crate::{ChainpostError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 已加载的配置及其所在文件
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: Config,

    /// 保存时写入的路径（文件可能尚不存在）
    pub path: PathBuf,
}

impl ConfigFile {
    /// 把当前配置写回文件
    pub fn save(&self) -> Result<()> {
        ConfigLoader::save_to_path(&self.config, &self.path)
    }
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 默认配置文件名
    pub const CONFIG_FILE: &'static str = "chainpost.toml";

    /// 配置文件名，指定 bundle 时为 `<bundle>.toml`
    pub fn file_name(bundle: Option<&str>) -> String {
        match bundle {
            Some(name) if !name.is_empty() => format!("{}.toml", name),
            _ => Self::CONFIG_FILE.to_string(),
        }
    }

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ChainpostError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            ChainpostError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// 写入配置文件
    pub fn save_to_path<P: AsRef<Path>>(config: &Config, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(config)
            .map_err(|e| ChainpostError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;

        tracing::debug!("Config saved to {}", path.display());
        Ok(())
    }

    /// 加载配置
    ///
    /// 显式指定的路径必须存在；否则按查找顺序加载，
    /// 找不到时返回空配置，保存路径为当前目录下的配置文件
    pub fn load(explicit: Option<&Path>, bundle: Option<&str>) -> Result<ConfigFile> {
        if let Some(path) = explicit {
            return Ok(ConfigFile {
                config: Self::load_from_path(path)?,
                path: path.to_path_buf(),
            });
        }

        let file_name = Self::file_name(bundle);
        match Self::find(&file_name) {
            Some(path) => {
                tracing::debug!("Using config file {}", path.display());
                Ok(ConfigFile {
                    config: Self::load_from_path(&path)?,
                    path,
                })
            }
            None => {
                tracing::debug!("No config file found, starting with an empty config");
                Ok(ConfigFile {
                    config: Config::default(),
                    path: PathBuf::from(file_name),
                })
            }
        }
    }

    /// 查找配置文件
    /// 查找顺序：
    /// 1. 当前目录
    /// 2. 父目录递归查找
    /// 3. 用户配置目录 ~/.config/chainpost/
    pub fn find(file_name: &str) -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_upwards(&current, file_name).or_else(|| Self::find_in_user_dir(file_name))
    }

    /// 从 start 开始向上逐级查找
    pub fn find_upwards(start: &Path, file_name: &str) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let config_path = current.join(file_name);
            if config_path.is_file() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    fn find_in_user_dir(file_name: &str) -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("chainpost").join(file_name);

        config_path.is_file().then_some(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RequestTemplate;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_from_path() {
        let config_content = r#"
base_url = "http://localhost:8080"

[requests.ping]
url = "/ping"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = ConfigLoader::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
        assert!(config.requests.contains_key("ping"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"base_url = ").unwrap();
        temp_file.flush().unwrap();

        let err = ConfigLoader::load_from_path(temp_file.path()).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(ConfigLoader::file_name(None), "chainpost.toml");
        assert_eq!(ConfigLoader::file_name(Some("staging")), "staging.toml");
        assert_eq!(ConfigLoader::file_name(Some("")), "chainpost.toml");
    }

    #[test]
    fn test_find_upwards() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join("chainpost.toml"), "").unwrap();

        let found = ConfigLoader::find_upwards(&nested, "chainpost.toml").unwrap();
        assert_eq!(found, temp_dir.path().join("chainpost.toml"));

        assert!(ConfigLoader::find_upwards(&nested, "missing-bundle.toml").is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("chainpost.toml");

        let mut config = Config::default();
        config.save_request(
            "login",
            RequestTemplate::new("POST", "/login").with_header("Content-Type: application/json"),
        );
        let file = ConfigFile {
            config,
            path: path.clone(),
        };
        file.save().unwrap();

        let reloaded = ConfigLoader::load(Some(&path), None).unwrap();
        assert_eq!(reloaded.config, file.config);
        assert_eq!(reloaded.path, path);
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");
        assert!(ConfigLoader::load(Some(&path), None).is_err());
    }
}
