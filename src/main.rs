use std::process::ExitCode;
use tracing::{error, info};
use whois_check::{is_valid_domain, CheckResult, Config, WhoisClient, WhoisError};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // stdout carries the JSON result, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "whois_check=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = run(&args);

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to serialize result: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::from(exit_status(&result))
}

fn exit_status(result: &CheckResult) -> u8 {
    if result.is_success() {
        0
    } else {
        1
    }
}

fn run(args: &[String]) -> CheckResult {
    let [domain] = args else {
        return WhoisError::InvalidArguments(args.len()).into();
    };

    // Bad input is reported as such, whatever state the configuration is in
    if !is_valid_domain(domain.as_str()) {
        return WhoisError::InvalidDomain(domain.clone()).into();
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => return WhoisError::from(e).into(),
    };
    info!("Configuration loaded, cache at {}", config.cache_dir.display());

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => return WhoisError::System(format!("failed to start async runtime: {}", e)).into(),
    };

    let client = match WhoisClient::new(config) {
        Ok(client) => client,
        Err(e) => return e.into(),
    };

    runtime.block_on(client.resolve(domain))
}
