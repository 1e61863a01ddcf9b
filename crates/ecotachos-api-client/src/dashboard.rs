//! Dashboard aggregation over fetched collections.

use ecotachos_models::tacho::sort_by_name;
use ecotachos_models::{DashboardStats, Deteccion, DetectionStats, Tacho, Usuario};

use crate::client::ApiClient;
use crate::error::ApiResult;

impl ApiClient {
    /// Admin dashboard totals. The four collections are fetched concurrently.
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        let (tachos, detecciones, usuarios, cantones) = tokio::try_join!(
            self.list_tachos(),
            self.list_detecciones(),
            self.list_usuarios(),
            self.list_cantones(),
        )?;

        Ok(DashboardStats {
            total_tachos: tachos.len(),
            total_detecciones: detecciones.len(),
            total_usuarios: usuarios.len(),
            total_ubicaciones: cantones.len(),
        })
    }

    /// Bins owned by `user`, sorted by name.
    pub async fn user_tachos(&self, user: &Usuario) -> ApiResult<Vec<Tacho>> {
        let tachos = self.list_tachos().await?;
        Ok(owned_by(tachos, user.id))
    }

    /// Detections recorded on bins owned by `user`.
    pub async fn user_detecciones(&self, user: &Usuario) -> ApiResult<Vec<Deteccion>> {
        let (tachos, detecciones) = tokio::try_join!(self.list_tachos(), self.list_detecciones())?;
        let owned: Vec<i64> = owned_by(tachos, user.id).iter().map(|t| t.id).collect();
        Ok(detecciones
            .into_iter()
            .filter(|d| d.tacho.is_some_and(|id| owned.contains(&id)))
            .collect())
    }

    /// Statistics over every detection visible to the session.
    pub async fn detection_stats(&self) -> ApiResult<DetectionStats> {
        let detecciones = self.list_detecciones().await?;
        Ok(DetectionStats::from_detections(&detecciones))
    }
}

fn owned_by(tachos: Vec<Tacho>, user_id: i64) -> Vec<Tacho> {
    let mut owned: Vec<Tacho> = tachos.into_iter().filter(|t| t.belongs_to(user_id)).collect();
    sort_by_name(&mut owned);
    owned
}
