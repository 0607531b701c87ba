// Version information for the AI gateway

/// Semantic version number
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upstream providers this build can proxy
pub const PROVIDERS: &[&str] = &["openai", "stability"];

/// Get version string with provider list
pub fn version_string() -> String {
    format!("ai-gateway v{} ({})", VERSION, PROVIDERS.join(", "))
}
