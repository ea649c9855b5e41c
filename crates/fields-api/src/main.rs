mod api_doc;
mod auth;
mod constants;
mod error;
mod handlers;
mod response;
mod setup;
mod spreadsheet;
mod state;
mod telemetry;
mod validation;

use fields_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let (_state, router) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router).await?;

    Ok(())
}
