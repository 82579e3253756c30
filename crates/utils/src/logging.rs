use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const WORKSPACE_TARGETS: &[&str] = &[
    "server",
    "services",
    "db",
    "deployment",
    "local_deployment",
    "utils",
];

/// Builds the filter directive: third-party crates at `warn`, workspace crates at `level`.
pub fn filter_directive(level: &str) -> String {
    let mut directive = String::from("warn");
    for target in WORKSPACE_TARGETS {
        directive.push_str(&format!(",{target}={level}"));
    }
    directive
}

/// Installs the global subscriber. `RUST_LOG` picks the workspace level (default `info`).
pub fn init() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_new(filter_directive(&log_level))
        .unwrap_or_else(|_| EnvFilter::new(filter_directive("info")));

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .try_init();
}
