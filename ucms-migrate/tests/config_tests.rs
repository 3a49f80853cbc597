//! Service settings resolution
//!
//! Uses serial_test: these tests set and clear `UCMS_*` environment variables.

use serial_test::serial;
use std::path::PathBuf;
use tempfile::TempDir;
use ucms_migrate::config::{
    CliOverrides, MigrateConfig, ServiceSettings, DATABASE_FILE_NAME, DEFAULT_BIND,
    DEFAULT_SOURCE_REPO_URL, ENV_ADMIN_TOKEN, ENV_DATA_FOLDER, ENV_SOURCE_REPO_URL,
    ENV_STORAGE_TOKEN,
};

fn clear_env() {
    for name in [
        ENV_ADMIN_TOKEN,
        ENV_DATA_FOLDER,
        ENV_SOURCE_REPO_URL,
        ENV_STORAGE_TOKEN,
    ] {
        std::env::remove_var(name);
    }
}

fn parse(toml_text: &str) -> MigrateConfig {
    toml::from_str(toml_text).unwrap()
}

#[test]
#[serial]
fn test_defaults_without_config() {
    clear_env();
    let settings = ServiceSettings::resolve(MigrateConfig::default(), &CliOverrides::default());

    assert_eq!(settings.bind, DEFAULT_BIND);
    assert_eq!(settings.source_repo_url, DEFAULT_SOURCE_REPO_URL);
    assert_eq!(settings.admin_token, None);
    assert_eq!(settings.max_dimension, 1920);
    assert_eq!(settings.log_level, "info");
    assert_eq!(settings.temp_root, std::env::temp_dir());
    assert!(settings.database_path.ends_with(DATABASE_FILE_NAME));
    assert!(!settings.storage.is_configured());
}

#[test]
#[serial]
fn test_toml_values_are_used() {
    clear_env();
    let config = parse(
        r#"
        bind = "0.0.0.0:8080"
        database_path = "/srv/ucms/content.db"
        source_repo_url = "https://git.example/site.git"
        admin_token = "from-file"

        [storage]
        endpoint = "https://s3.example.com/"
        bucket = "media"

        [images]
        max_dimension = 800

        [logging]
        level = "debug"
        "#,
    );

    let settings = ServiceSettings::resolve(config, &CliOverrides::default());

    assert_eq!(settings.bind, "0.0.0.0:8080");
    assert_eq!(settings.database_path, PathBuf::from("/srv/ucms/content.db"));
    assert_eq!(settings.source_repo_url, "https://git.example/site.git");
    assert_eq!(settings.admin_token.as_deref(), Some("from-file"));
    assert_eq!(settings.max_dimension, 800);
    assert_eq!(settings.log_level, "debug");
    // Public URL derived from endpoint and bucket
    assert_eq!(settings.storage.public_url, "https://s3.example.com/media");
    assert!(settings.storage.is_configured());
}

#[test]
#[serial]
fn test_public_url_alone_is_not_configured() {
    clear_env();
    let config = parse(
        r#"
        [storage]
        public_url = "https://cdn.example.com/media"
        "#,
    );

    let settings = ServiceSettings::resolve(config, &CliOverrides::default());

    assert_eq!(settings.storage.public_url, "https://cdn.example.com/media");
    assert!(!settings.storage.is_configured());
}

#[test]
#[serial]
fn test_cli_beats_file() {
    clear_env();
    let config = parse(
        r#"
        bind = "0.0.0.0:8080"
        database_path = "/srv/ucms/content.db"
        "#,
    );
    let cli = CliOverrides {
        bind: Some("127.0.0.1:9999".to_string()),
        database: Some(PathBuf::from("/tmp/cli.db")),
    };

    let settings = ServiceSettings::resolve(config, &cli);

    assert_eq!(settings.bind, "127.0.0.1:9999");
    assert_eq!(settings.database_path, PathBuf::from("/tmp/cli.db"));
}

#[test]
#[serial]
fn test_environment_beats_file() {
    clear_env();
    let data = TempDir::new().unwrap();
    std::env::set_var(ENV_DATA_FOLDER, data.path());
    std::env::set_var(ENV_ADMIN_TOKEN, "from-env");
    std::env::set_var(ENV_SOURCE_REPO_URL, "https://env.example/site.git");
    std::env::set_var(ENV_STORAGE_TOKEN, "storage-secret");

    let config = parse(
        r#"
        database_path = "/srv/ucms/content.db"
        admin_token = "from-file"
        source_repo_url = "https://git.example/site.git"
        "#,
    );
    let settings = ServiceSettings::resolve(config, &CliOverrides::default());
    clear_env();

    assert_eq!(settings.database_path, data.path().join(DATABASE_FILE_NAME));
    assert_eq!(settings.admin_token.as_deref(), Some("from-env"));
    assert_eq!(settings.source_repo_url, "https://env.example/site.git");
    assert_eq!(settings.storage.access_token.as_deref(), Some("storage-secret"));
}

#[test]
#[serial]
fn test_blank_admin_token_disables_auth() {
    clear_env();
    let config = parse(r#"admin_token = "   ""#);

    let settings = ServiceSettings::resolve(config, &CliOverrides::default());

    assert_eq!(settings.admin_token, None);
}

#[test]
#[serial]
fn test_load_reads_file_and_rejects_bad_toml() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("ucms-migrate.toml");
    std::fs::write(&good, "bind = \"127.0.0.1:7000\"\n").unwrap();

    let settings = ServiceSettings::load(Some(&good), &CliOverrides::default()).unwrap();
    assert_eq!(settings.bind, "127.0.0.1:7000");

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "bind = [unterminated\n").unwrap();
    assert!(ServiceSettings::load(Some(&bad), &CliOverrides::default()).is_err());

    let missing = dir.path().join("missing.toml");
    assert!(ServiceSettings::load(Some(&missing), &CliOverrides::default()).is_err());
}
