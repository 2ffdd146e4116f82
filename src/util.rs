const MUNIN_HOST: &str = "MUNIN_HOST";

const DEFAULT_MUNIN_HOST: &str = "localhost";

pub fn get_munin_host() -> String {
    std::env::var(MUNIN_HOST).unwrap_or_else(|_| DEFAULT_MUNIN_HOST.to_string())
}

const MUNIN_PORT: &str = "MUNIN_PORT";

const DEFAULT_MUNIN_PORT: u16 = 4949;

pub fn get_munin_port() -> u16 {
    let port_from_env = std::env::var(MUNIN_PORT);
    port_from_env.map_or(DEFAULT_MUNIN_PORT, |res| {
        res.parse().unwrap_or(DEFAULT_MUNIN_PORT)
    })
}

const DEFAULT_CARBON_HOST: &str = "localhost";

pub fn get_carbon_host() -> String {
    DEFAULT_CARBON_HOST.to_string()
}

const CARBON_PORT: &str = "CARBON_PORT";

const DEFAULT_CARBON_PORT: u16 = 2003;

pub fn get_carbon_port() -> u16 {
    let port_from_env = std::env::var(CARBON_PORT);
    port_from_env.map_or(DEFAULT_CARBON_PORT, |res| {
        res.parse().unwrap_or(DEFAULT_CARBON_PORT)
    })
}

const BRIDGE_INTERVAL: &str = "BRIDGE_INTERVAL";

const DEFAULT_INTERVAL: u64 = 5 * 60;

pub fn get_interval() -> u64 {
    let interval_from_env = std::env::var(BRIDGE_INTERVAL);
    interval_from_env.map_or(DEFAULT_INTERVAL, |res| {
        res.parse().unwrap_or(DEFAULT_INTERVAL)
    })
}

const DEFAULT_TIMEOUT: u64 = 30;

pub fn get_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

const DEFAULT_PREFIX: &str = "servers";

pub fn get_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}
