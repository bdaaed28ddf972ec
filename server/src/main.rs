use tracing::info;
use tracing_subscriber::EnvFilter;

#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let figment = rocket::Config::figment();
    let config = vault_server::vault_config(&figment);
    info!(owner = %config.owner_id, max_upload_bytes = config.max_upload_bytes, "vault server starting");

    vault_server::build_with(figment, config).launch().await?;
    Ok(())
}
