use switchyard::config::Config;
use switchyard::handlers;
use switchyard::server::{RequestServer, SecurityMaterial, ServerOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let env = &cfg.environment;
    let options = ServerOptions {
        body_timeout: env.request_timeout(),
    };

    let http = RequestServer::create(handlers::http_routes(), None)?.with_options(options);

    // no HTTPS listener without valid key material
    let security = SecurityMaterial::load(&env.https.key, &env.https.cert)?;
    let https =
        RequestServer::create(handlers::https_routes(), Some(security))?.with_options(options);

    tokio::select! {
        res = http.listen(env.port, &env.env) => {
            res?;
        }

        res = https.listen(env.https.port, &env.env) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
