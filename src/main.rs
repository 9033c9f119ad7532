use clap::Parser;
use futures::StreamExt;
use ocpi_cli::utils::error::{ErrorSeverity, Result};
use ocpi_cli::utils::{logger, validation::Validate};
use ocpi_cli::{CliConfig, Command, HttpTransport, OcpiClient, OcpiResponse, SessionFile};
use std::io::Write;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ OCPI request failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 依錯誤嚴重程度決定退出碼
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

async fn run(config: &CliConfig) -> Result<()> {
    let session = SessionFile::from_file(&config.session)?.into_session()?;
    tracing::info!(
        "🔌 Loaded session for {} (OCPI {}, {} endpoints)",
        session.party_id,
        session.version,
        session.endpoints.len()
    );

    let transport = match config.timeout_seconds {
        Some(seconds) => HttpTransport::with_timeout(Duration::from_secs(seconds))?,
        None => HttpTransport::new(),
    };
    let client = OcpiClient::with_transport(session, transport);
    let routing = config.routing();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &config.command {
        Command::List { module, limit, max } => {
            let mut items = Box::pin(client.stream(*module, routing).into_items(*limit));
            let mut count = 0usize;

            while !max.is_some_and(|max| count >= max) {
                let Some(item) = items.next().await else {
                    break;
                };
                writeln!(out, "{}", serde_json::to_string(&item?)?)?;
                count += 1;
            }

            tracing::info!("✅ Fetched {} {} objects", count, module);
        }
        Command::Get { module, path } => {
            let response = client.get_object(*module, path, &routing).await?;
            print_response(&mut out, &response)?;
        }
        Command::Put { module, path, .. } | Command::Post { module, path, .. } => {
            let body = config.payload()?.unwrap_or_default();
            let response = match &config.command {
                Command::Put { .. } => client.put_object(*module, path, body, &routing).await?,
                _ => client.post_object(*module, path, body, &routing).await?,
            };
            print_response(&mut out, &response)?;
        }
        Command::Delete { module, path } => {
            let response = client.delete_object(*module, path, &routing).await?;
            print_response(&mut out, &response)?;
        }
        Command::Endpoints => {
            for endpoint in &client.session().endpoints {
                let role = match endpoint.role {
                    Some(role) => format!("{:?}", role).to_uppercase(),
                    None => "-".to_string(),
                };
                writeln!(out, "{}\t{}\t{}", endpoint.identifier, role, endpoint.url)?;
            }
        }
    }

    Ok(())
}

fn print_response(out: &mut impl Write, response: &OcpiResponse) -> Result<()> {
    if !response.data.is_null() {
        writeln!(out, "{}", serde_json::to_string_pretty(&response.data)?)?;
    }
    tracing::info!(
        "✅ OCPI status {}{}",
        response.status_code,
        response
            .status_message
            .as_deref()
            .map(|message| format!(" ({})", message))
            .unwrap_or_default()
    );
    Ok(())
}
