//! Configuração do `fulfillment` carregada a partir de `fulfillment.toml`.
//!
//! A struct [`AppConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `FULFILLMENT_LOG_LEVEL` tem precedência sobre o arquivo.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::monitor::TimelinessMonitorConfig;

/// Nome do arquivo procurado no diretório atual.
pub const CONFIG_FILE: &str = "fulfillment.toml";

/// Configuração de nível superior carregada de `fulfillment.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Filtro de log no formato do `EnvFilter` (ex.: `info`, `fulfillment_sla=debug`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emite logs em JSON em vez do formato compacto.
    #[serde(default)]
    pub log_json: bool,

    /// Arquivo JSON de registros usado quando `--file` não é informado.
    #[serde(default)]
    pub records_file: Option<PathBuf>,

    /// Limiares e canais do monitor de prazos.
    #[serde(default)]
    pub monitor: TimelinessMonitorConfig,
}

// Valor padrão para o nível de log: "info".
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            records_file: None,
            monitor: TimelinessMonitorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Carrega a configuração de `fulfillment.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Carrega a configuração de um caminho explícito.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str::<AppConfig>(&contents)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo para o nível de log.
        if let Ok(level) = std::env::var("FULFILLMENT_LOG_LEVEL")
            && !level.is_empty()
        {
            config.log_level = level;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert!(config.records_file.is_none());
        assert_eq!(config.monitor, TimelinessMonitorConfig::default());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            log_json = true
            records_file = "records.json"

            [monitor]
            warning_threshold_hours = 6.0
            enable_email_notification = true
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.log_json);
        assert_eq!(config.records_file, Some(PathBuf::from("records.json")));
        assert_eq!(config.monitor.warning_threshold_hours, 6.0);
        assert!(config.monitor.enable_email_notification);
        assert_eq!(config.monitor.critical_threshold_hours, 24.0);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[monitor]\ncheck_interval_minutes = 5").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.monitor.check_interval_minutes, 5);
    }

    #[test]
    fn load_reports_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[monitor\nbroken").unwrap();

        assert!(AppConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.monitor.check_interval_minutes, 30);
    }

    #[test]
    fn log_level_env_overrides_file_unless_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"warn\"").unwrap();

        // SAFETY: nenhum outro teste altera esta variável nem verifica `log_level`.
        unsafe { std::env::set_var("FULFILLMENT_LOG_LEVEL", "") };
        assert_eq!(AppConfig::load_from(file.path()).unwrap().log_level, "warn");

        unsafe { std::env::set_var("FULFILLMENT_LOG_LEVEL", "trace") };
        assert_eq!(AppConfig::load_from(file.path()).unwrap().log_level, "trace");

        unsafe { std::env::remove_var("FULFILLMENT_LOG_LEVEL") };
    }
}
