pub mod error;
pub mod routes;

use file_vault::{Vault, VaultConfig};
use rocket::data::{ByteUnit, Limits};
use rocket::figment::Figment;
use rocket::{catchers, routes, Build, Rocket};
use tracing::warn;

/// Room for the non-file multipart fields on top of the file itself.
const FORM_OVERHEAD: u64 = 1024 * 1024;

/// Vault settings live under the `vault` key of the Rocket configuration
/// (`Rocket.toml` or `ROCKET_VAULT={...}`); missing keys keep their defaults.
pub fn vault_config(figment: &Figment) -> VaultConfig {
    if !figment.contains("vault") {
        return VaultConfig::default();
    }
    match figment.extract_inner::<VaultConfig>("vault") {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "invalid vault configuration, using defaults");
            VaultConfig::default()
        }
    }
}

pub fn build(config: VaultConfig) -> Rocket<Build> {
    build_with(rocket::Config::figment(), config)
}

/// Rocket instance with a fresh in-memory vault. Uploads above
/// `config.max_upload_bytes` are cut off while the body is still streaming.
pub fn build_with(figment: Figment, config: VaultConfig) -> Rocket<Build> {
    let limits = Limits::default()
        .limit("file", ByteUnit::from(config.max_upload_bytes))
        .limit("data-form", ByteUnit::from(config.max_upload_bytes + FORM_OVERHEAD));
    let figment = figment.merge(("limits", limits));

    let vault = Vault::in_memory(&config);

    rocket::custom(figment)
        .manage(vault)
        .manage(config)
        .mount(
            "/api",
            routes![
                routes::list_files,
                routes::file_stats,
                routes::upload_file,
                routes::verify_file,
                routes::delete_file,
                routes::file_content,
            ],
        )
        .register("/", catchers![error::default_catcher])
}
