use clap::Parser;
use ggb_translate::utils::error::ErrorSeverity;
use ggb_translate::utils::{logger, validation::Validate};
use ggb_translate::{router, ServerConfig, Translator};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🚀 Starting ggb-translate server");

    let config = match config.load_overrides().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            let exit_code = match e.severity() {
                ErrorSeverity::Critical => 3,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    };

    let translator = Translator::from_config(config.translator_config())?;
    tracing::info!(
        "🔧 Mode: {:?} (model: {}, raw output: {})",
        translator.mode(),
        config.model.model,
        config.debug_raw
    );

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("📡 Listening on http://{}", address);

    axum::serve(listener, router(translator, config.debug_raw)).await?;
    Ok(())
}
