//! Plain-text rendering.

use std::fmt::Write;

use ecotachos_ai_client::AiHealth;
use ecotachos_detect::{Presentation, ResultView};
use ecotachos_models::{DetectionStats, Tacho, Usuario};

pub fn render_presentation(presentation: &Presentation) -> String {
    match presentation {
        Presentation::Result(view) => render_result(view),
        Presentation::Error(view) => {
            let mut out = format!("{}\n  {}\n", view.title(), view.message);
            if !view.suggestions.is_empty() {
                out.push_str("Sugerencias:\n");
                for s in &view.suggestions {
                    let _ = writeln!(out, "  - {}", s);
                }
            }
            out
        }
    }
}

fn render_result(view: &ResultView) -> String {
    let mut out = format!(
        "[{}] {} ({})\n  {}\n  Ejemplos: {}\n",
        view.info.icon, view.info.label, view.confidence_label, view.info.description, view.info.examples
    );
    if !view.alternatives.is_empty() {
        out.push_str("Alternativas:\n");
        for alt in &view.alternatives {
            let _ = writeln!(out, "  {} {}", alt.info.label, alt.confidence_label);
        }
    }
    out
}

pub fn render_user(user: &Usuario) -> String {
    format!("{} <{}> rol={:?}", user.nombre, user.email, user.rol)
}

pub fn render_health(health: &AiHealth) -> String {
    let mut out = format!("Motor: {}", health.engine_label());
    if let Some(message) = &health.message {
        let _ = write!(out, "\n  {}", message);
    }
    if health.missing_weights() {
        out.push_str("\n  Pesos del modelo no encontrados (AI_WEIGHTS)");
    }
    out
}

pub fn render_tachos(tachos: &[Tacho]) -> String {
    if tachos.is_empty() {
        return "No hay tachos registrados\n".to_string();
    }
    let mut out = String::new();
    for t in tachos {
        let _ = writeln!(
            out,
            "{:>5}  {:<12} {:<24} {}{}",
            t.id,
            t.codigo,
            t.nombre,
            t.estado,
            if t.activo { "" } else { " (inactivo)" }
        );
    }
    out
}

pub fn render_detection_stats(stats: &DetectionStats) -> String {
    let mut out = format!(
        "Total: {}\nConfianza promedio: {:.1}%\n",
        stats.total, stats.confianza_promedio
    );
    for (clasificacion, count) in &stats.por_clasificacion {
        let _ = writeln!(out, "  {:<12} {}", clasificacion, count);
    }
    out
}
