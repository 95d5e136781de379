use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. Stdout belongs to the menu-bar host, so nothing is logged there.
pub fn init(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
