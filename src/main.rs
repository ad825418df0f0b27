use card_ocr::adapters::{self, TesseractCli};
use card_ocr::app::{self, AppState};
use card_ocr::utils::{logger, validation::Validate};
use card_ocr::{AppConfig, CliArgs, ExtractionStrategy, RequestPipeline};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_logger(args.verbose, args.json_logs);

    tracing::info!("Starting card-ocr");

    let config = match AppConfig::resolve(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    if args.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let ocr = Arc::new(TesseractCli::new(config.ocr_command.clone(), config.ocr_timeout()));
    let annotator = match config.extraction_strategy {
        ExtractionStrategy::Ner => Some(adapters::annotator_from_config(&config.ner)?),
        ExtractionStrategy::Heuristic => None,
    };

    let bind_address = config.bind_address();
    let pipeline = RequestPipeline::new(config, ocr, annotator)?;
    let router = app::build_router(Arc::new(AppState::new(pipeline)));

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("🟢 OCR API listening on http://{}", listener.local_addr()?);

    app::serve(listener, router).await?;
    Ok(())
}
