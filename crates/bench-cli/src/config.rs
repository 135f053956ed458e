//! Configuración de la CLI desde variables de entorno (y `.env`).

use std::env;

use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv(); // ignora error si no existe .env
});

pub static CONFIG: Lazy<CliConfig> = Lazy::new(CliConfig::from_env);

#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Filtro de logs (sintaxis de `EnvFilter`), `BENCHFLOW_LOG`.
    pub log_filter: String,
    /// JSON indentado en stdout, `BENCHFLOW_PRETTY`.
    pub pretty: bool,
}

impl CliConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let log_filter = env::var("BENCHFLOW_LOG").unwrap_or_else(|_| "info".to_string());
        let pretty = env::var("BENCHFLOW_PRETTY").ok()
                                                 .and_then(|v| parse_flag(&v))
                                                 .unwrap_or(true);
        Self { log_filter, pretty }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
