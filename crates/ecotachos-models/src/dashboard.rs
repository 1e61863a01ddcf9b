//! Admin dashboard counters.

use serde::{Deserialize, Serialize};

/// Totals shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_tachos: usize,
    pub total_detecciones: usize,
    pub total_usuarios: usize,
    /// Number of cantons
    pub total_ubicaciones: usize,
}

impl std::fmt::Display for DashboardStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tachos={} detecciones={} usuarios={} ubicaciones={}",
            self.total_tachos, self.total_detecciones, self.total_usuarios, self.total_ubicaciones
        )
    }
}
