//! Interface de linha de comando do `fulfillment` baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (validate, next, sla,
//! transition, check, watch) e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Motor de status e monitor de prazos (SLA) para fulfillments de influenciadores.
#[derive(Debug, Parser)]
#[command(name = "fulfillment", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./fulfillment.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Valida se um status pode avançar para outro.
    Validate {
        /// Status de origem (ex.: pending_sample).
        from: String,
        /// Status de destino.
        to: String,
        /// Ignora o grafo e as regras de negócio (correção administrativa).
        #[arg(long)]
        force: bool,
    },

    /// Lista os próximos status permitidos.
    Next {
        status: String,
    },

    /// Mostra a tabela de SLA (todos os status ou apenas um).
    Sla {
        status: Option<String>,
    },

    /// Aplica uma transição a um registro de um arquivo JSON.
    Transition {
        /// Arquivo JSON com a lista de registros.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Id do registro.
        #[arg(long)]
        id: String,

        /// Status de destino.
        #[arg(long)]
        to: String,

        #[arg(long)]
        force: bool,

        /// Motivo da mudança, gravado no log de status.
        #[arg(long)]
        reason: Option<String>,

        /// Operador responsável pela mudança.
        #[arg(long)]
        operator: Option<String>,

        /// Campos exigidos pela transição, no formato chave=valor.
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,

        /// Regrava o arquivo com o registro atualizado.
        #[arg(long)]
        write: bool,
    },

    /// Verifica atrasos, gera avisos e um relatório.
    Check {
        #[arg(long)]
        file: Option<PathBuf>,

        /// Instante de referência em segundos epoch (padrão: agora).
        #[arg(long)]
        now: Option<i64>,

        /// Sobrescreve o limiar de aviso (horas).
        #[arg(long)]
        warning_threshold: Option<f64>,

        /// Sobrescreve o limiar crítico (horas).
        #[arg(long)]
        critical_threshold: Option<f64>,

        /// Imprime o resultado em JSON.
        #[arg(long)]
        json: bool,

        /// Regrava o arquivo com os flags de atraso atualizados.
        #[arg(long)]
        write: bool,
    },

    /// Repete `check` a cada `check_interval_minutes`.
    Watch {
        #[arg(long)]
        file: Option<PathBuf>,

        /// Intervalo em minutos (padrão: valor da configuração).
        #[arg(long)]
        interval: Option<u64>,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_validate_subcommand() {
        let cli = Cli::parse_from(["fulfillment", "validate", "pending_sample", "sample_sent"]);
        match cli.command {
            Command::Validate { from, to, force } => {
                assert_eq!(from, "pending_sample");
                assert_eq!(to, "sample_sent");
                assert!(!force);
            }
            _ => panic!("expected Validate command"),
        }
    }

    #[test]
    fn cli_parses_transition_fields() {
        let cli = Cli::parse_from([
            "fulfillment",
            "transition",
            "--id",
            "f-1",
            "--to",
            "content_approved",
            "--field",
            "videoUrl=https://example.com/v?a=1",
            "--field",
            "videoTitle=Launch",
        ]);
        match cli.command {
            Command::Transition { id, to, fields, .. } => {
                assert_eq!(id, "f-1");
                assert_eq!(to, "content_approved");
                assert_eq!(
                    fields,
                    vec![
                        ("videoUrl".to_string(), "https://example.com/v?a=1".to_string()),
                        ("videoTitle".to_string(), "Launch".to_string()),
                    ]
                );
            }
            _ => panic!("expected Transition command"),
        }
    }

    #[test]
    fn cli_rejects_malformed_field() {
        let parsed = Cli::try_parse_from([
            "fulfillment",
            "transition",
            "--id",
            "f-1",
            "--to",
            "cancelled",
            "--field",
            "novalue",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "fulfillment",
            "--config",
            "custom.toml",
            "--verbose",
            "check",
            "--now",
            "1700000000",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Command::Check { now: Some(1_700_000_000), .. }));
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
