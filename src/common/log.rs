use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Safe to call more than once; only
/// the first call has any effect.
pub fn init_logging() {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init();
    });
}
