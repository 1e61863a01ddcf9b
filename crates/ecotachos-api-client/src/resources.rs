//! Bins, users, locations and detections.

use ecotachos_models::ubicacion::{capitalize, find_by_name};
use ecotachos_models::{
    Canton, CantonInput, Ciudad, Deteccion, NewCiudad, NewDeteccion, NewProvincia, Provincia, Tacho,
    TachoInput, Usuario, UsuarioInput, WasteCategory,
};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};

pub mod endpoints {
    pub const TACHOS: &str = "/tachos/";
    pub const USUARIOS: &str = "/usuarios/";
    pub const DETECCIONES: &str = "/detecciones/";
    pub const PROVINCIAS: &str = "/ubicacion/provincias/";
    pub const CIUDADES: &str = "/ubicacion/ciudades/";
    pub const CANTONES: &str = "/ubicacion/cantones/";
    pub const IOT_DETECT: &str = "/iot/esp32/detect/";
}

fn item(collection: &str, id: i64) -> String {
    format!("{}{}/", collection, id)
}

/// Image attached to a new detection record.
#[derive(Debug, Clone)]
pub struct DetectionImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct IotNotification<'a> {
    tacho_id: i64,
    clasificacion: &'a str,
}

#[derive(Debug, Serialize)]
struct Deactivate {
    activo: bool,
}

/// Names typed into the location form.
#[derive(Debug, Clone)]
pub struct CantonForm {
    pub provincia: String,
    pub ciudad: String,
    pub canton: String,
}

impl ApiClient {
    // =========================================================================
    // Tachos
    // =========================================================================

    pub async fn list_tachos(&self) -> ApiResult<Vec<Tacho>> {
        self.get_list("list_tachos", endpoints::TACHOS).await
    }

    pub async fn get_tacho(&self, id: i64) -> ApiResult<Tacho> {
        self.get("get_tacho", &item(endpoints::TACHOS, id)).await
    }

    pub async fn create_tacho(&self, input: TachoInput) -> ApiResult<Tacho> {
        self.post("create_tacho", endpoints::TACHOS, &input.normalized())
            .await
    }

    pub async fn update_tacho(&self, id: i64, input: TachoInput) -> ApiResult<Tacho> {
        self.put("update_tacho", &item(endpoints::TACHOS, id), &input.normalized())
            .await
    }

    /// Soft delete: the bin stays but is marked inactive.
    pub async fn deactivate_tacho(&self, id: i64) -> ApiResult<Tacho> {
        self.patch(
            "deactivate_tacho",
            &item(endpoints::TACHOS, id),
            &Deactivate { activo: false },
        )
        .await
    }

    pub async fn delete_tacho(&self, id: i64) -> ApiResult<()> {
        self.delete("delete_tacho", &item(endpoints::TACHOS, id)).await
    }

    // =========================================================================
    // Usuarios
    // =========================================================================

    pub async fn list_usuarios(&self) -> ApiResult<Vec<Usuario>> {
        self.get_list("list_usuarios", endpoints::USUARIOS).await
    }

    pub async fn get_usuario(&self, id: i64) -> ApiResult<Usuario> {
        self.get("get_usuario", &item(endpoints::USUARIOS, id)).await
    }

    pub async fn create_usuario(&self, input: UsuarioInput) -> ApiResult<Usuario> {
        let input = input.normalized();
        if input.password.is_none() {
            return Err(ApiError::Validation("La contraseña es requerida".into()));
        }
        self.post("create_usuario", endpoints::USUARIOS, &input).await
    }

    /// Replace a user. A blank password keeps the current one.
    pub async fn update_usuario(&self, id: i64, input: UsuarioInput) -> ApiResult<Usuario> {
        self.put("update_usuario", &item(endpoints::USUARIOS, id), &input.normalized())
            .await
    }

    pub async fn delete_usuario(&self, id: i64) -> ApiResult<()> {
        self.delete("delete_usuario", &item(endpoints::USUARIOS, id))
            .await
    }

    // =========================================================================
    // Detecciones
    // =========================================================================

    pub async fn list_detecciones(&self) -> ApiResult<Vec<Deteccion>> {
        self.get_list("list_detecciones", endpoints::DETECCIONES).await
    }

    pub async fn get_deteccion(&self, id: i64) -> ApiResult<Deteccion> {
        self.get("get_deteccion", &item(endpoints::DETECCIONES, id))
            .await
    }

    /// Post a new detection as multipart, with the image as field `imagen`.
    pub async fn create_deteccion(
        &self,
        record: &NewDeteccion,
        image: DetectionImage,
    ) -> ApiResult<Deteccion> {
        let mut form = Form::new();
        for (name, value) in record.form_fields() {
            form = form.text(name, value);
        }
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime)?;
        form = form.part("imagen", part);

        debug!(tacho = ?record.tacho, clasificacion = %record.clasificacion, "Creating detection");
        self.post_multipart("create_deteccion", endpoints::DETECCIONES, form)
            .await
    }

    pub async fn delete_deteccion(&self, id: i64) -> ApiResult<()> {
        self.delete("delete_deteccion", &item(endpoints::DETECCIONES, id))
            .await
    }

    /// Tell the bin's controller which compartment to open.
    pub async fn notify_iot(&self, tacho_id: i64, clasificacion: WasteCategory) -> ApiResult<()> {
        let _: serde_json::Value = self
            .post(
                "notify_iot",
                endpoints::IOT_DETECT,
                &IotNotification {
                    tacho_id,
                    clasificacion: clasificacion.as_str(),
                },
            )
            .await?;
        info!(tacho_id, clasificacion = %clasificacion, "IoT hook notified");
        Ok(())
    }

    // =========================================================================
    // Ubicaciones
    // =========================================================================

    pub async fn list_provincias(&self) -> ApiResult<Vec<Provincia>> {
        self.get_list("list_provincias", endpoints::PROVINCIAS).await
    }

    pub async fn create_provincia(&self, nombre: &str) -> ApiResult<Provincia> {
        let body = NewProvincia {
            nombre: capitalize(nombre.trim()),
        };
        self.post("create_provincia", endpoints::PROVINCIAS, &body).await
    }

    pub async fn delete_provincia(&self, id: i64) -> ApiResult<()> {
        self.delete("delete_provincia", &item(endpoints::PROVINCIAS, id))
            .await
    }

    pub async fn list_ciudades(&self) -> ApiResult<Vec<Ciudad>> {
        self.get_list("list_ciudades", endpoints::CIUDADES).await
    }

    pub async fn create_ciudad(&self, nombre: &str, provincia: i64) -> ApiResult<Ciudad> {
        let body = NewCiudad {
            nombre: capitalize(nombre.trim()),
            provincia,
        };
        self.post("create_ciudad", endpoints::CIUDADES, &body).await
    }

    pub async fn delete_ciudad(&self, id: i64) -> ApiResult<()> {
        self.delete("delete_ciudad", &item(endpoints::CIUDADES, id))
            .await
    }

    pub async fn list_cantones(&self) -> ApiResult<Vec<Canton>> {
        self.get_list("list_cantones", endpoints::CANTONES).await
    }

    pub async fn get_canton(&self, id: i64) -> ApiResult<Canton> {
        self.get("get_canton", &item(endpoints::CANTONES, id)).await
    }

    pub async fn create_canton(&self, input: &CantonInput) -> ApiResult<Canton> {
        self.post("create_canton", endpoints::CANTONES, input).await
    }

    pub async fn update_canton(&self, id: i64, input: &CantonInput) -> ApiResult<Canton> {
        self.put("update_canton", &item(endpoints::CANTONES, id), input)
            .await
    }

    pub async fn delete_canton(&self, id: i64) -> ApiResult<()> {
        self.delete("delete_canton", &item(endpoints::CANTONES, id))
            .await
    }

    /// Save a canton, creating its provincia and ciudad when no existing
    /// one matches by name (case-insensitive). New provincia and ciudad
    /// names are capitalized.
    ///
    /// Updates canton `id` when given, otherwise creates a new one.
    pub async fn save_canton_with_hierarchy(&self, form: &CantonForm, id: Option<i64>) -> ApiResult<Canton> {
        let (provincias, ciudades) =
            tokio::try_join!(self.list_provincias(), self.list_ciudades())?;

        let provincia = match find_by_name(&provincias, &form.provincia, |p| &p.nombre) {
            Some(existing) => existing.id,
            None => {
                info!(nombre = %form.provincia, "Creating provincia");
                self.create_provincia(&form.provincia).await?.id
            }
        };

        // A ciudad only matches within its provincia.
        let in_provincia: Vec<Ciudad> = ciudades
            .into_iter()
            .filter(|c| c.provincia == provincia)
            .collect();
        let ciudad = match find_by_name(&in_provincia, &form.ciudad, |c| &c.nombre) {
            Some(existing) => existing.id,
            None => {
                info!(nombre = %form.ciudad, provincia, "Creating ciudad");
                self.create_ciudad(&form.ciudad, provincia).await?.id
            }
        };

        let input = CantonInput {
            nombre: form.canton.trim().to_string(),
            ciudad,
        };
        match id {
            Some(id) => self.update_canton(id, &input).await,
            None => self.create_canton(&input).await,
        }
    }
}
