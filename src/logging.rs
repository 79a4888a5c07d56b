//! Inicialização do sistema de logs com `tracing` e `tracing-subscriber`.
//!
//! `RUST_LOG` tem precedência sobre o nível configurado; filtros inválidos
//! caem para `info`.

use tracing_subscriber::{EnvFilter, fmt};

/// Monta o filtro: `RUST_LOG` se definido, senão o nível configurado.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Instala o subscriber global. Chamado uma vez em `main`.
///
/// Logs vão para stderr para não misturar com a saída JSON dos comandos.
pub fn init(level: &str, json: bool) {
    let filter = build_filter(level);

    if json {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .with_target(false)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    }
}

/// Subscriber para testes, com nível debug. Pode ser chamado várias vezes.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_falls_back() {
        // Não deve entrar em pânico com um filtro malformado.
        let _ = build_filter("this is [not a filter");
    }

    #[test]
    fn init_test_is_idempotent() {
        init_test();
        init_test();
        tracing::debug!("logging ready");
    }
}
