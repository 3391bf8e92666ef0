use std::sync::Arc;
use std::time::Duration;

use tracedeck::{
    arguments,
    auth::SharedSecretValidator,
    broker::{Broker, MemoryBroker},
    config::{Config, CONFIG_FILE_PATH},
    logger::{self, LogTag},
    publisher::EventPublisher,
    telemetry::LogRecord,
    webserver::{self, ws::ChannelRouter, AppState},
    ConnectionRegistry,
};

/// Main entry point for the tracedeck telemetry server
///
/// Wires the in-process broker, the channel router, and the websocket
/// gateway together, then blocks on the webserver until shutdown.
#[tokio::main]
async fn main() {
    arguments::set_cmd_args(std::env::args().collect());
    logger::init();

    logger::info(LogTag::Server, "tracedeck starting up");

    let config_path = arguments::config_path_override()
        .unwrap_or_else(|| CONFIG_FILE_PATH.to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            logger::error(LogTag::Config, &format!("failed to load config: {:#}", e));
            std::process::exit(1);
        }
    };

    let broker: Arc<dyn Broker> = Arc::new(MemoryBroker::new());
    let registry = ConnectionRegistry::new();
    let validator = Arc::new(SharedSecretValidator::new(
        config.auth.shared_secret.clone(),
    ));

    // Both pattern subscriptions must be live before any session connects;
    // a broker that cannot subscribe leaves every session dark
    if let Err(e) = ChannelRouter::start(Arc::clone(&broker), Arc::clone(&registry)).await {
        logger::error(LogTag::Router, &format!("failed to start router: {}", e));
        std::process::exit(1);
    }

    if arguments::is_demo_enabled() {
        spawn_demo_generator(Arc::clone(&broker), &validator);
    }

    let state = AppState::new(Arc::clone(&config), registry, validator);

    if let Err(e) = ctrlc::set_handler(|| {
        println!();
        webserver::shutdown();
    }) {
        logger::warning(
            LogTag::Server,
            &format!("failed to install Ctrl+C handler: {}", e),
        );
    }

    if let Err(e) = webserver::start_server(state).await {
        logger::error(LogTag::Server, &format!("{:#}", e));
        std::process::exit(1);
    }

    logger::info(LogTag::Server, "tracedeck stopped");
}

/// Publish synthetic telemetry for the demo user every two seconds
///
/// Prints a ready-to-use connection token so a browser client can attach
/// to the stream immediately.
fn spawn_demo_generator(broker: Arc<dyn Broker>, validator: &SharedSecretValidator) {
    let token = validator.mint_token("demo-user", "demo@example.com");
    logger::info(
        LogTag::Publisher,
        &format!("demo mode: connect with ws://<host>/ws/logs?token={}", token),
    );

    let publisher = EventPublisher::new(broker);
    tokio::spawn(async move {
        let levels = ["info", "warn", "error", "debug"];
        let mut seq: u64 = 0;
        loop {
            seq += 1;
            let record = LogRecord {
                timestamp: chrono::Utc::now(),
                level: levels[(seq % levels.len() as u64) as usize].to_string(),
                message: format!("demo log event #{}", seq),
                metadata: Some(serde_json::json!({ "seq": seq, "source": "demo" })),
            };
            if let Err(e) = publisher.publish_log("demo-user", &record).await {
                logger::warning(
                    LogTag::Publisher,
                    &format!("demo publish failed: {}", e),
                );
            }

            // Interleave a small trace every fifth tick
            if seq % 5 == 0 {
                let now = chrono::Utc::now().timestamp_millis() as f64;
                let trace = serde_json::json!({
                    "traceId": format!("demo-trace-{}", seq),
                    "spans": [
                        {
                            "spanId": format!("s{}-root", seq),
                            "parentSpanId": null,
                            "name": "handle_request",
                            "startTime": now,
                            "endTime": now + 42.0,
                        },
                        {
                            "spanId": format!("s{}-db", seq),
                            "parentSpanId": format!("s{}-root", seq),
                            "name": "db_query",
                            "startTime": now + 5.0,
                            "endTime": now + 30.0,
                        },
                    ],
                });
                if let Err(e) = publisher.publish_trace("demo-user", trace).await {
                    logger::warning(
                        LogTag::Publisher,
                        &format!("demo publish failed: {}", e),
                    );
                }
            }

            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    });
}
