use mediashim_core::UploadConfig;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = UploadConfig::from_env()?;

    let (_state, router) = mediashim_api::setup::initialize_app(config.clone())?;

    mediashim_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
