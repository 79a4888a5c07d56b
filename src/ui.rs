//! Interface de terminal do `fulfillment` — spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner entre varreduras e `console` para
//! estilização com cores. O [`SweepProgress`] acompanha visualmente o modo
//! `watch`; as funções `print_*` formatam resultados de verificação.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::monitor::{OverdueDetectionResult, OverdueReport, WarningLevel, format_duration};
use crate::state_machine::{StatusTransitionEngine, TransitionValidation};

/// Estilo associado a cada nível de aviso.
pub fn level_style(level: WarningLevel) -> Style {
    match level {
        WarningLevel::Normal => Style::new().green(),
        WarningLevel::Warning => Style::new().yellow(),
        WarningLevel::Critical => Style::new().red().bold(),
        WarningLevel::Expired => Style::new().magenta().bold(),
    }
}

/// Indicador visual entre varreduras do modo `watch`.
pub struct SweepProgress {
    // Spinner do indicatif.
    pb: ProgressBar,
}

impl SweepProgress {
    /// Inicia o spinner com a mensagem de espera.
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    /// Imprime uma linha acima do spinner sem interrompê-lo.
    pub fn println(&self, line: &str) {
        self.pb.println(line);
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

/// Imprime o resultado de uma validação de transição.
pub fn print_validation(validation: &TransitionValidation) {
    let green = Style::new().green().bold();
    let red = Style::new().red().bold();

    if validation.can_transition {
        println!("  {} transition allowed", green.apply_to("✓"));
    } else {
        println!("  {} transition rejected", red.apply_to("✗"));
    }
    for error in &validation.errors {
        println!("    error: {error}");
    }
    for warning in &validation.warnings {
        println!("    warning: {warning}");
    }
    if !validation.required_fields.is_empty() {
        let fields: Vec<_> = validation.required_fields.iter().map(|f| f.as_str()).collect();
        println!("    required fields: {}", fields.join(", "));
    }
    let next: Vec<_> = validation
        .suggested_next_statuses
        .iter()
        .map(|s| s.as_str())
        .collect();
    println!("    next options: {}", next.join(", "));
}

/// Uma linha por registro, colorida pelo nível de aviso.
pub fn print_results(results: &[OverdueDetectionResult]) {
    for result in results {
        let style = level_style(result.warning_level);
        println!(
            "  {:<10} {:<20} {:<24} {}",
            style.apply_to(result.warning_level),
            result.fulfillment_record_id,
            StatusTransitionEngine::status_display_name(result.current_status),
            if result.is_overdue {
                format!("{} overdue", format_duration(result.overdue_hours))
            } else {
                "on time".to_string()
            }
        );
    }
}

/// Imprime o resumo da varredura.
pub fn print_report(report: &OverdueReport) {
    let header = Style::new().cyan().bold();
    println!();
    println!("{}", header.apply_to("─── Overdue Report ───"));
    println!(
        "  {} records, {} overdue (warning {}, critical {}, expired {})",
        report.total_records,
        report.overdue_records,
        report.by_level.warning,
        report.by_level.critical,
        report.by_level.expired
    );
    if let Some(id) = &report.most_overdue_record_id {
        println!(
            "  average {}, worst {} ({id})",
            format_duration(report.average_overdue_hours),
            format_duration(report.max_overdue_hours)
        );
    }
}
