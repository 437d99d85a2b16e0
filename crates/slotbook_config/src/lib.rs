use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

pub mod models;
pub use models::*;

/// Marker value replaced by the environment variable named after its key path.
pub const SECRET_FROM_ENV: &str = "secret_from_env";

/// Loads the configuration for the current process.
///
/// Sources, later ones winning:
/// 1. `<config dir>/default.{toml,yaml,json}`
/// 2. `<config dir>/<RUN_ENV>.{toml,yaml,json}` (`RUN_ENV` defaults to `debug`)
/// 3. `SLOTBOOK_<SECTION>__<KEY>` environment variables
///
/// The config dir is `SLOTBOOK_CONFIG_DIR` or `./config`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("SLOTBOOK_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    load_config_from(&config_dir, &run_env)
}

/// Same as [`load_config`] with an explicit directory and run environment.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, ConfigError> {
    let default_path = config_dir.join("default");
    let env_path = config_dir.join(run_env);

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix("SLOTBOOK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Replaces every "secret_from_env" string with the environment variable named
/// after its key path. Returns the variables that were not set.
fn inject_env_secrets(value: &mut Value) -> Vec<String> {
    fn walk(path: Vec<String>, obj: &mut Value, missing: &mut Vec<String>) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v, missing);
                }
            }
            Value::String(s) if s == SECRET_FROM_ENV => {
                let env_key = path.join("_").to_uppercase();
                match env::var(&env_key) {
                    Ok(env_val) => *obj = Value::String(env_val),
                    Err(_) => {
                        warn!("env var {} not found for secret_from_env", env_key);
                        missing.push(env_key);
                    }
                }
            }
            _ => {}
        }
    }

    let mut missing = Vec::new();
    walk(vec![], value, &mut missing);
    missing
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config.
///
/// A marker whose variable is unset is an error; the marker never survives as a value.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    let missing = inject_env_secrets(&mut json);
    if !missing.is_empty() {
        return Err(ConfigError::Message(format!(
            "secret_from_env needs these environment variables: {}",
            missing.join(", ")
        )));
    }
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to restore config: {err}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process.
///
/// The path is `DOTENV_OVERRIDE`, else a first CLI argument starting with `.env`,
/// else `.env`. Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_config_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("slotbook-config-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults_apply_without_any_file() {
        let dir = temp_config_dir("empty");
        let config = load_config_from(&dir, "nothing-here").unwrap();

        assert_eq!(config.campaign.opens_at, "10:00");
        assert_eq!(config.campaign.closes_at, "16:00");
        assert_eq!(config.campaign.slot_minutes, 4);
        assert!(config.campaign.include_closing_slot);
        assert_eq!(config.admin.username, "admin");
        assert!(config.database.is_none());
    }

    #[test]
    fn run_env_file_overrides_default_file() {
        let dir = temp_config_dir("layered");
        fs::write(
            dir.join("default.toml"),
            "[server]\nhost = \"0.0.0.0\"\nport = 9000\n\n[campaign]\nslot_minutes = 5\n",
        )
        .unwrap();
        fs::write(dir.join("prod.toml"), "[server]\nhost = \"0.0.0.0\"\nport = 9100\n").unwrap();

        let config = load_config_from(&dir, "prod").unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.campaign.slot_minutes, 5);
    }

    #[test]
    fn secret_marker_is_replaced_from_environment() {
        env::set_var("ADMIN_USERNAME", "from-the-env");
        let mut config = AppConfig::default();
        config.admin.username = SECRET_FROM_ENV.to_string();

        let config = apply_env_overrides_from_marker(config).unwrap();
        assert_eq!(config.admin.username, "from-the-env");
        env::remove_var("ADMIN_USERNAME");
    }

    #[test]
    fn missing_secret_is_reported() {
        let mut value = serde_json::json!({ "nested": { "never_set_anywhere": SECRET_FROM_ENV } });
        let missing = inject_env_secrets(&mut value);
        assert_eq!(missing, vec!["NESTED_NEVER_SET_ANYWHERE".to_string()]);
    }

    #[test]
    fn unresolved_admin_password_fails_loading() {
        let dir = temp_config_dir("unresolved");
        fs::write(
            dir.join("prod.toml"),
            "[admin]\nusername = \"admin\"\npassword = \"secret_from_env\"\n",
        )
        .unwrap();
        env::remove_var("ADMIN_PASSWORD");

        let err = load_config_from(&dir, "prod").unwrap_err();
        assert!(err.to_string().contains("ADMIN_PASSWORD"));

        let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config");
        let err = load_config_from(&shipped, "prod").unwrap_err();
        assert!(err.to_string().contains("ADMIN_PASSWORD"));
    }
}
