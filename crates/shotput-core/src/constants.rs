//! Compiled-in defaults used when the configuration file is missing, malformed, or silent.

/// Default configuration file, relative to the process working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "SHOTPUT_CONFIG";

pub const DEFAULT_IMAGES_REPO_PATH: &str = ".";
pub const DEFAULT_IMAGE_SUB_DIR: &str = "blog-media";
pub const DEFAULT_GIT_AUTO_PUSH: bool = false;
pub const DEFAULT_GIT_REMOTE: &str = "origin";
pub const DEFAULT_PUSH_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_CDN_HOST: &str = "cdn.statically.io";
/// Placeholder values; a deployment is expected to replace them.
pub const DEFAULT_CDN_USER: &str = "your_github_username";
pub const DEFAULT_CDN_REPO: &str = "your_images_repo_name";
pub const DEFAULT_CDN_BRANCH: &str = "main";

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8000;
pub const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 25;

/// Title written into a freshly generated configuration template.
pub const CONFIG_TEMPLATE_TITLE: &str = "Shotput Configuration";

/// Commit author used when the working copy has no `user.name`/`user.email`.
pub const FALLBACK_AUTHOR_NAME: &str = "Shotput";
pub const FALLBACK_AUTHOR_EMAIL: &str = "shotput@localhost";
