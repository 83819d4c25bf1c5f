const FLEETWATCH_CONFIG: &str = "FLEETWATCH_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "./fleetwatch.json";

/// Config file path: explicit argument, then `FLEETWATCH_CONFIG`, then the default
pub fn get_config_path(explicit: Option<String>) -> String {
    explicit
        .or_else(|| std::env::var(FLEETWATCH_CONFIG).ok())
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

const FLEETWATCH_CONCURRENCY: &str = "FLEETWATCH_CONCURRENCY";

/// Overrides the configured sweep concurrency when set to a positive number
pub fn get_concurrency_override() -> Option<usize> {
    std::env::var(FLEETWATCH_CONCURRENCY)
        .ok()
        .and_then(|value| value.parse().ok())
        .filter(|value| *value > 0)
}
