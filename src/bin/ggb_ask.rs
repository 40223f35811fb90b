use clap::Parser;
use ggb_translate::config::toml_config::TomlConfig;
use ggb_translate::config::ModelArgs;
use ggb_translate::domain::model::TranslateResponse;
use ggb_translate::utils::error::ErrorSeverity;
use ggb_translate::utils::{logger, validation::Validate};
use ggb_translate::{TranslateError, TranslationClient, Translator};

#[derive(Parser)]
#[command(name = "ggb-ask")]
#[command(about = "Translate one geometry request into GeoGebra commands")]
struct Args {
    /// Natural-language description of the construction
    text: String,

    /// Ask a running ggb-translate server instead of translating locally
    #[arg(long)]
    server: Option<String>,

    /// Include the raw model reply (local mode only)
    #[arg(long)]
    raw: bool,

    #[command(flatten)]
    model: ModelArgs,

    /// Optional TOML configuration file ([model] section is used)
    #[arg(long)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

async fn run(args: &Args) -> Result<TranslateResponse, TranslateError> {
    match &args.server {
        Some(server) => {
            tracing::info!("📡 Asking server at {}", server);
            TranslationClient::new(server).translate(&args.text, &[]).await
        }
        None => {
            let mut model = args.model.clone();
            if let Some(path) = &args.config {
                TomlConfig::from_file(path)?.apply_model_to(&mut model);
            }
            let config = model.translator_config();
            config.validate()?;
            let translator = Translator::from_config(config)?;
            tracing::info!("🔧 Translating locally in {:?} mode", translator.mode());
            let result = translator.translate(&args.text, None).await?;
            Ok(TranslateResponse::from_result(result, args.raw))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    match run(&args).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Err(e) => {
            tracing::error!(
                "❌ Translation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
