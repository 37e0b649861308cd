use linkvault::api::configs::{config_provider, Config};
use linkvault::utils::logging::setup_logging;

#[rocket::main]
#[cfg(not(tarpaulin_include))]
async fn main() -> anyhow::Result<()> {
    let figment = config_provider();
    let config: Config = figment.extract()?;
    let _guard = setup_logging(config.log_dir.as_deref());

    let _ = linkvault::rocket(figment).await?.launch().await?;
    Ok(())
}
