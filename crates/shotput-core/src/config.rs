//! Configuration module
//!
//! Repository, CDN and push settings come from a TOML file (`config.toml` by default,
//! overridable with `SHOTPUT_CONFIG`). Server settings come from the environment.
//!
//! Resolution of the file never fails: a missing file is replaced by a template and the
//! defaults are used, a malformed file falls back to the defaults entirely, and an unsafe
//! `image_sub_dir` is replaced by the default. Every such event is recorded as a
//! [`ConfigDiagnostic`] and logged.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_PATH_ENV, CONFIG_TEMPLATE_TITLE, DEFAULT_CDN_BRANCH, DEFAULT_CDN_HOST,
    DEFAULT_CDN_REPO, DEFAULT_CDN_USER, DEFAULT_CONFIG_FILE, DEFAULT_GIT_AUTO_PUSH,
    DEFAULT_GIT_REMOTE, DEFAULT_IMAGES_REPO_PATH, DEFAULT_IMAGE_SUB_DIR,
    DEFAULT_MAX_UPLOAD_SIZE_MB, DEFAULT_PUSH_TIMEOUT_SECS, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT,
};

/// Identity of the GitHub repository served through the CDN.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CdnIdentity {
    pub host: String,
    pub user: String,
    pub repo: String,
    pub branch: String,
}

impl Default for CdnIdentity {
    fn default() -> Self {
        Self {
            host: DEFAULT_CDN_HOST.to_string(),
            user: DEFAULT_CDN_USER.to_string(),
            repo: DEFAULT_CDN_REPO.to_string(),
            branch: DEFAULT_CDN_BRANCH.to_string(),
        }
    }
}

/// Durable settings for the working copy the images are committed to.
///
/// Built once at startup and shared read-only for the life of the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Root of the local working copy.
    pub images_repo_path: PathBuf,
    /// Single path component below the root where artifacts are written.
    pub image_sub_dir: String,
    pub git_auto_push: bool,
    pub git_remote: String,
    pub push_timeout: Duration,
    pub cdn: CdnIdentity,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            images_repo_path: PathBuf::from(DEFAULT_IMAGES_REPO_PATH),
            image_sub_dir: DEFAULT_IMAGE_SUB_DIR.to_string(),
            git_auto_push: DEFAULT_GIT_AUTO_PUSH,
            git_remote: DEFAULT_GIT_REMOTE.to_string(),
            push_timeout: Duration::from_secs(DEFAULT_PUSH_TIMEOUT_SECS),
            cdn: CdnIdentity::default(),
        }
    }
}

impl RepositoryConfig {
    /// Directory artifacts are written to: `images_repo_path / image_sub_dir`.
    pub fn image_dir(&self) -> PathBuf {
        self.images_repo_path.join(&self.image_sub_dir)
    }

    pub fn uses_default_repo_path(&self) -> bool {
        self.images_repo_path == Path::new(DEFAULT_IMAGES_REPO_PATH)
    }

    pub fn uses_placeholder_cdn_user(&self) -> bool {
        self.cdn.user == DEFAULT_CDN_USER
    }

    /// Parse a configuration document and merge it over the defaults key by key.
    ///
    /// Returns the diagnostics produced by value validation. A document that is not valid
    /// TOML, or whose values have the wrong type, is an error; callers fall back to
    /// [`RepositoryConfig::default`] in that case.
    pub fn from_toml_str(
        contents: &str,
    ) -> Result<(Self, Vec<ConfigDiagnostic>), toml::de::Error> {
        let raw: RawConfigFile = toml::from_str(contents)?;
        let mut diagnostics = Vec::new();
        let mut config = Self::default();

        let repository = raw.repository.unwrap_or_default();
        if let Some(path) = repository.images_repo_path {
            config.images_repo_path = PathBuf::from(path);
        }
        if let Some(sub_dir) = repository.image_sub_dir {
            if is_safe_sub_dir(&sub_dir) {
                config.image_sub_dir = sub_dir;
            } else {
                diagnostics.push(ConfigDiagnostic::InvalidSubDir { value: sub_dir });
            }
        }
        if let Some(auto_push) = repository.git_auto_push {
            config.git_auto_push = auto_push;
        }
        if let Some(remote) = repository.git_remote {
            if remote.trim().is_empty() {
                diagnostics.push(ConfigDiagnostic::InvalidRemote);
            } else {
                config.git_remote = remote;
            }
        }
        match repository.push_timeout_secs {
            Some(0) => diagnostics.push(ConfigDiagnostic::InvalidPushTimeout),
            Some(secs) => config.push_timeout = Duration::from_secs(secs),
            None => {}
        }

        let cdn = raw.static_cdn.unwrap_or_default();
        if let Some(host) = cdn.host {
            config.cdn.host = host;
        }
        if let Some(user) = cdn.user {
            config.cdn.user = user;
        }
        if let Some(repo) = cdn.repo {
            config.cdn.repo = repo;
        }
        if let Some(branch) = cdn.branch {
            config.cdn.branch = branch;
        }

        Ok((config, diagnostics))
    }

    /// TOML template holding every recognized key with its default value.
    pub fn template_toml() -> String {
        let defaults = Self::default();
        let template = TemplateFile {
            title: CONFIG_TEMPLATE_TITLE,
            repository: TemplateRepository {
                images_repo_path: DEFAULT_IMAGES_REPO_PATH,
                image_sub_dir: DEFAULT_IMAGE_SUB_DIR,
                git_auto_push: defaults.git_auto_push,
                git_remote: DEFAULT_GIT_REMOTE,
                push_timeout_secs: defaults.push_timeout.as_secs(),
            },
            static_cdn: TemplateCdn {
                host: DEFAULT_CDN_HOST,
                user: DEFAULT_CDN_USER,
                repo: DEFAULT_CDN_REPO,
                branch: DEFAULT_CDN_BRANCH,
            },
        };
        // Serializing plain strings, bools and integers cannot fail.
        toml::to_string_pretty(&template).unwrap_or_default()
    }
}

/// A sub-directory is safe when it is a single, non-empty path component.
pub fn is_safe_sub_dir(value: &str) -> bool {
    !value.trim().is_empty()
        && !value.contains('/')
        && !value.contains('\\')
        && !value.contains("..")
}

#[derive(Debug, Default, Deserialize)]
struct RawConfigFile {
    #[serde(default)]
    repository: Option<RawRepository>,
    #[serde(default)]
    static_cdn: Option<RawCdn>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRepository {
    images_repo_path: Option<String>,
    image_sub_dir: Option<String>,
    git_auto_push: Option<bool>,
    git_remote: Option<String>,
    push_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCdn {
    host: Option<String>,
    user: Option<String>,
    repo: Option<String>,
    branch: Option<String>,
}

#[derive(Serialize)]
struct TemplateFile {
    title: &'static str,
    repository: TemplateRepository,
    static_cdn: TemplateCdn,
}

#[derive(Serialize)]
struct TemplateRepository {
    images_repo_path: &'static str,
    image_sub_dir: &'static str,
    git_auto_push: bool,
    git_remote: &'static str,
    push_timeout_secs: u64,
}

#[derive(Serialize)]
struct TemplateCdn {
    host: &'static str,
    user: &'static str,
    repo: &'static str,
    branch: &'static str,
}

/// Where the effective repository configuration came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The file did not exist; defaults are in use.
    DefaultsMissingFile(PathBuf),
    /// The file could not be read or parsed; defaults are in use.
    DefaultsInvalidFile(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::DefaultsMissingFile(path) => {
                write!(f, "defaults ({} not found)", path.display())
            }
            ConfigSource::DefaultsInvalidFile(path) => {
                write!(f, "defaults ({} is invalid)", path.display())
            }
        }
    }
}

/// Non-fatal events raised while resolving the configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigDiagnostic {
    TemplateCreated { path: PathBuf },
    TemplateWriteFailed { path: PathBuf, error: String },
    Unreadable { path: PathBuf, error: String },
    Malformed { path: PathBuf, error: String },
    InvalidSubDir { value: String },
    InvalidRemote,
    InvalidPushTimeout,
}

impl ConfigDiagnostic {
    fn log(&self) {
        match self {
            ConfigDiagnostic::TemplateCreated { path } => tracing::info!(
                path = %path.display(),
                "Created a template config file, review and update it"
            ),
            ConfigDiagnostic::TemplateWriteFailed { .. }
            | ConfigDiagnostic::Unreadable { .. }
            | ConfigDiagnostic::Malformed { .. } => tracing::error!("{}", self),
            ConfigDiagnostic::InvalidSubDir { .. }
            | ConfigDiagnostic::InvalidRemote
            | ConfigDiagnostic::InvalidPushTimeout => tracing::warn!("{}", self),
        }
    }
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigDiagnostic::TemplateCreated { path } => {
                write!(f, "created template config file at {}", path.display())
            }
            ConfigDiagnostic::TemplateWriteFailed { path, error } => write!(
                f,
                "could not create template config file {}: {}",
                path.display(),
                error
            ),
            ConfigDiagnostic::Unreadable { path, error } => write!(
                f,
                "could not read {}: {}. Using default configuration",
                path.display(),
                error
            ),
            ConfigDiagnostic::Malformed { path, error } => write!(
                f,
                "error decoding {}: {}. Using default configuration",
                path.display(),
                error
            ),
            ConfigDiagnostic::InvalidSubDir { value } => write!(
                f,
                "invalid image_sub_dir '{}', using default '{}'",
                value, DEFAULT_IMAGE_SUB_DIR
            ),
            ConfigDiagnostic::InvalidRemote => write!(
                f,
                "git_remote must not be empty, using default '{}'",
                DEFAULT_GIT_REMOTE
            ),
            ConfigDiagnostic::InvalidPushTimeout => write!(
                f,
                "push_timeout_secs must be positive, using default {}s",
                DEFAULT_PUSH_TIMEOUT_SECS
            ),
        }
    }
}

/// Outcome of [`ConfigResolver::resolve`].
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub config: RepositoryConfig,
    pub source: ConfigSource,
    pub diagnostics: Vec<ConfigDiagnostic>,
}

/// Loads the repository configuration file, falling back to defaults on any problem.
#[derive(Clone, Debug)]
pub struct ConfigResolver {
    path: PathBuf,
}

impl ConfigResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolver for `$SHOTPUT_CONFIG`, or `config.toml` when unset.
    pub fn from_env() -> Self {
        let path = env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve the configuration. Never fails.
    pub fn resolve(&self) -> ResolvedConfig {
        let path = self.path.clone();
        let mut diagnostics = Vec::new();

        let (config, source) = match fs::read_to_string(&path) {
            Ok(contents) => match RepositoryConfig::from_toml_str(&contents) {
                Ok((config, value_diagnostics)) => {
                    diagnostics.extend(value_diagnostics);
                    (config, ConfigSource::File(path.clone()))
                }
                Err(e) => {
                    diagnostics.push(ConfigDiagnostic::Malformed {
                        path: path.clone(),
                        error: e.message().to_string(),
                    });
                    (
                        RepositoryConfig::default(),
                        ConfigSource::DefaultsInvalidFile(path.clone()),
                    )
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.display(),
                    "Config file not found, using defaults and creating a template"
                );
                match fs::write(&path, RepositoryConfig::template_toml()) {
                    Ok(()) => diagnostics.push(ConfigDiagnostic::TemplateCreated {
                        path: path.clone(),
                    }),
                    Err(e) => diagnostics.push(ConfigDiagnostic::TemplateWriteFailed {
                        path: path.clone(),
                        error: e.to_string(),
                    }),
                }
                (
                    RepositoryConfig::default(),
                    ConfigSource::DefaultsMissingFile(path.clone()),
                )
            }
            Err(e) => {
                diagnostics.push(ConfigDiagnostic::Unreadable {
                    path: path.clone(),
                    error: e.to_string(),
                });
                (
                    RepositoryConfig::default(),
                    ConfigSource::DefaultsInvalidFile(path.clone()),
                )
            }
        };

        for diagnostic in &diagnostics {
            diagnostic.log();
        }

        ResolvedConfig {
            config,
            source,
            diagnostics,
        }
    }
}

/// HTTP server settings, read from the environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            environment: "development".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let host = env::var("SHOTPUT_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string());

        let port = match env::var("SHOTPUT_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("SHOTPUT_PORT must be a valid port: {}", e))?,
            Err(_) => DEFAULT_SERVER_PORT,
        };

        let max_upload_mb = match env::var("MAX_UPLOAD_SIZE_MB") {
            Ok(value) => value
                .parse::<usize>()
                .map_err(|e| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be a number: {}", e))?,
            Err(_) => DEFAULT_MAX_UPLOAD_SIZE_MB,
        };
        if max_upload_mb == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB cannot be 0"));
        }

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        Ok(Self {
            host,
            port,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            environment,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub repository: RepositoryConfig,
    pub source: ConfigSource,
}

impl Config {
    /// Load `.env`, the server settings and the repository configuration file.
    ///
    /// Only malformed server environment variables are errors; the repository file
    /// always resolves.
    pub fn load() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let server = ServerConfig::from_env()?;
        let resolved = ConfigResolver::from_env().resolve();

        Ok(Self {
            server,
            repository: resolved.config,
            source: resolved.source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = RepositoryConfig::default();
        assert_eq!(config.images_repo_path, PathBuf::from("."));
        assert_eq!(config.image_sub_dir, "blog-media");
        assert!(!config.git_auto_push);
        assert_eq!(config.git_remote, "origin");
        assert_eq!(config.push_timeout, Duration::from_secs(30));
        assert_eq!(config.cdn.branch, "main");
        assert!(config.uses_default_repo_path());
        assert!(config.uses_placeholder_cdn_user());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let (config, diagnostics) = RepositoryConfig::from_toml_str(
            r#"
            [static_cdn]
            user = "octocat"
            "#,
        )
        .unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(config.cdn.user, "octocat");
        assert_eq!(config.cdn.repo, "your_images_repo_name");
        assert_eq!(config.image_sub_dir, "blog-media");
    }

    #[test]
    fn test_full_file() {
        let (config, diagnostics) = RepositoryConfig::from_toml_str(
            r#"
            title = "Shotput Configuration"

            [repository]
            images_repo_path = "/srv/images"
            image_sub_dir = "shots"
            git_auto_push = true
            git_remote = "upstream"
            push_timeout_secs = 5

            [static_cdn]
            host = "cdn.example.com"
            user = "octocat"
            repo = "pics"
            branch = "gh-pages"
            "#,
        )
        .unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(config.images_repo_path, PathBuf::from("/srv/images"));
        assert_eq!(config.image_dir(), PathBuf::from("/srv/images/shots"));
        assert!(config.git_auto_push);
        assert_eq!(config.git_remote, "upstream");
        assert_eq!(config.push_timeout, Duration::from_secs(5));
        assert_eq!(config.cdn.host, "cdn.example.com");
        assert_eq!(config.cdn.branch, "gh-pages");
    }

    #[test]
    fn test_unsafe_sub_dir_replaced_by_default() {
        for value in ["", "a/b", "a\\b", "..", "../escape", "  "] {
            let doc = format!("[repository]\nimage_sub_dir = {:?}\n", value);
            let (config, diagnostics) = RepositoryConfig::from_toml_str(&doc).unwrap();
            assert_eq!(config.image_sub_dir, "blog-media", "value {:?}", value);
            assert_eq!(
                diagnostics,
                vec![ConfigDiagnostic::InvalidSubDir {
                    value: value.to_string()
                }]
            );
        }
    }

    #[test]
    fn test_zero_push_timeout_rejected() {
        let (config, diagnostics) =
            RepositoryConfig::from_toml_str("[repository]\npush_timeout_secs = 0\n").unwrap();
        assert_eq!(config.push_timeout, Duration::from_secs(30));
        assert_eq!(diagnostics, vec![ConfigDiagnostic::InvalidPushTimeout]);
    }

    #[test]
    fn test_wrong_value_type_is_malformed() {
        let result = RepositoryConfig::from_toml_str("[repository]\ngit_auto_push = \"yes\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_missing_file_writes_template() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let resolved = ConfigResolver::new(&path).resolve();

        assert_eq!(resolved.config, RepositoryConfig::default());
        assert_eq!(resolved.source, ConfigSource::DefaultsMissingFile(path.clone()));
        assert_eq!(
            resolved.diagnostics,
            vec![ConfigDiagnostic::TemplateCreated { path: path.clone() }]
        );

        // The generated template parses back to the defaults.
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("title = \"Shotput Configuration\""));
        let (reparsed, diagnostics) = RepositoryConfig::from_toml_str(&written).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(reparsed, RepositoryConfig::default());
    }

    #[test]
    fn test_resolve_template_write_failure_still_returns_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("config.toml");

        let resolved = ConfigResolver::new(&path).resolve();

        assert_eq!(resolved.config, RepositoryConfig::default());
        assert!(matches!(
            resolved.diagnostics.as_slice(),
            [ConfigDiagnostic::TemplateWriteFailed { .. }]
        ));
    }

    #[test]
    fn test_resolve_malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[repository\nimage_sub_dir = ").unwrap();

        let resolved = ConfigResolver::new(&path).resolve();

        assert_eq!(resolved.config, RepositoryConfig::default());
        assert_eq!(resolved.source, ConfigSource::DefaultsInvalidFile(path.clone()));
        assert!(matches!(
            resolved.diagnostics.as_slice(),
            [ConfigDiagnostic::Malformed { .. }]
        ));
        // A malformed file is left untouched.
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[repository\nimage_sub_dir = "
        );
    }

    #[test]
    fn test_resolve_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[repository]\nimage_sub_dir = \"shots\"\n").unwrap();

        let resolved = ConfigResolver::new(&path).resolve();

        assert_eq!(resolved.source, ConfigSource::File(path));
        assert_eq!(resolved.config.image_sub_dir, "shots");
        assert!(resolved.diagnostics.is_empty());
    }

    #[test]
    fn test_server_is_production() {
        let mut server = ServerConfig::default();
        assert!(!server.is_production());
        server.environment = "PROD".to_string();
        assert!(server.is_production());
        assert_eq!(ServerConfig::default().bind_address(), "0.0.0.0:8000");
    }
}
