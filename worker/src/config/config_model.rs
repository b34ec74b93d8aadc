#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub internal: Internal,
    pub expiry: Expiry,
    pub audit: Audit,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Internal {
    /// Bearer token guarding the internal trigger routes. Routes answer 503
    /// when unset.
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Expiry {
    pub run_interval_secs: u64,
    pub notify: bool,
    pub reminder_webhook_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Audit {
    pub default_lookback_hours: i64,
}
