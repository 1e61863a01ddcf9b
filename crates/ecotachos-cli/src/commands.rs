//! Command handlers.

use std::sync::Arc;

use anyhow::{bail, Context as _};
use ecotachos_ai_client::{AiClient, AiClientConfig, DetectionEvent, RetryPolicy, ServerlessClient};
use ecotachos_api_client::{ApiClient, ApiConfig, Session, TokenStore};
use ecotachos_capture::{SelectedFile, UploadPolicy};
use ecotachos_detect::{DetectError, DetectionWorkflow};
use ecotachos_models::{LoginRequest, Usuario};
use tracing::{info, warn};

use crate::cli::{ClassifyArgs, Command};
use crate::output;

/// Clients shared by every command.
pub struct Context {
    pub api: ApiClient,
    pub ai: AiClient,
}

impl Context {
    /// Build clients from the environment. `api_url` overrides the base URL
    /// of both the backend and the AI routes.
    pub fn from_env(api_url: Option<&str>) -> anyhow::Result<Self> {
        let mut api_config = ApiConfig::from_env();
        let mut ai_config = AiClientConfig::from_env();
        if let Some(url) = api_url {
            api_config = api_config.with_base_url(url);
            ai_config = ai_config.with_base_url(url);
        }

        let session = Arc::new(Session::open(TokenStore::new(&api_config.session_file)));
        let api = ApiClient::new(api_config, session.clone())?;
        let ai = AiClient::new(ai_config)?.with_token_provider(session);
        Ok(Self { api, ai })
    }

    async fn require_user(&self) -> anyhow::Result<Usuario> {
        match self.api.restore_session().await {
            Some(user) => Ok(user),
            None => bail!("No hay sesión activa. Ejecuta `ecotachos login` primero."),
        }
    }
}

/// Run one command.
///
/// Returns `false` when the command completed but produced no usable
/// result, e.g. a classification that ended in an error view.
pub async fn run(command: Command, ctx: &Context) -> anyhow::Result<bool> {
    match command {
        Command::Login { email, password } => {
            let user = ctx.api.login(&LoginRequest { email, password }).await?;
            println!("Sesión iniciada: {}", output::render_user(&user));
        }
        Command::GoogleLogin { id_token } => {
            let user = ctx.api.google_login(&id_token).await?;
            println!("Sesión iniciada: {}", output::render_user(&user));
        }
        Command::Logout => {
            ctx.api.logout().await?;
            println!("Sesión cerrada");
        }
        Command::Whoami => match ctx.api.restore_session().await {
            Some(user) => println!("{}", output::render_user(&user)),
            None => println!("No hay sesión activa"),
        },
        Command::Classify(args) => return classify(args, ctx).await,
        Command::AiHealth => {
            let health = ctx.ai.health_check().await?;
            println!("{}", output::render_health(&health));
        }
        Command::Tachos { json } => {
            let user = ctx.require_user().await?;
            let tachos = if user.rol.is_admin() {
                ctx.api.list_tachos().await?
            } else {
                ctx.api.user_tachos(&user).await?
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&tachos)?);
            } else {
                print!("{}", output::render_tachos(&tachos));
            }
        }
        Command::Stats => {
            ctx.require_user().await?;
            let stats = ctx.api.dashboard_stats().await?;
            println!("{}", stats);
        }
        Command::DetectionsStats => {
            ctx.require_user().await?;
            let stats = ctx.api.detection_stats().await?;
            print!("{}", output::render_detection_stats(&stats));
        }
        Command::ServerlessHealth => {
            let client = ServerlessClient::from_env()?;
            match client.health().await {
                Some(health) => println!(
                    "{}: {}",
                    health.status,
                    health.message.unwrap_or_default()
                ),
                None => {
                    println!("Servicio serverless no disponible en {}", client.base_url());
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}

async fn classify(args: ClassifyArgs, ctx: &Context) -> anyhow::Result<bool> {
    let file = SelectedFile::from_path(&args.path)
        .await
        .with_context(|| format!("No se pudo leer {}", args.path.display()))?;

    let mut workflow = DetectionWorkflow::new();
    match ctx.ai.health_check().await {
        Ok(health) => workflow.set_health(health),
        Err(e) => warn!(error = %e, "AI health check failed, classifying anyway"),
    }

    let retry = args
        .retries
        .map(|n| RetryPolicy::from_env("detect").with_max_attempts(n));

    let classified = match workflow.load_file(&file, &UploadPolicy::from_env()) {
        Ok(()) => workflow.classify(&ctx.ai, retry.as_ref()).await.map(|_| ()),
        Err(e) => Err(e),
    };
    match classified {
        Ok(()) | Err(DetectError::NoImage | DetectError::MissingWeights | DetectError::Capture(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let Some(presentation) = workflow.presentation() else {
        bail!("La detección no produjo resultado");
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(presentation)?);
    } else {
        print!("{}", output::render_presentation(presentation));
    }

    let Some(result) = workflow.result() else {
        return Ok(false);
    };

    if args.save {
        let user = ctx.require_user().await?;
        let tacho = match args.tacho {
            Some(id) => Some(ctx.api.get_tacho(id).await?),
            None => None,
        };
        let saved = workflow.save(&ctx.api, tacho.as_ref()).await?;
        info!(deteccion_id = saved.id, "Detection saved");
        println!("Detección guardada (id {})", saved.id);

        if args.log_serverless {
            let event = DetectionEvent {
                tacho_id: args.tacho.map(|id| id.to_string()),
                confidence: Some(result.confidence_fraction()),
                user_id: Some(user.id.to_string()),
                location_lat: tacho.as_ref().and_then(|t| t.ubicacion_lat),
                location_lon: tacho.as_ref().and_then(|t| t.ubicacion_lon),
                ..DetectionEvent::new(result.category().as_str())
            };
            log_serverless(&event).await;
        }
    } else if args.log_serverless {
        let event = DetectionEvent {
            confidence: Some(result.confidence_fraction()),
            ..DetectionEvent::new(result.category().as_str())
        };
        log_serverless(&event).await;
    }

    Ok(true)
}

/// Best effort: failures are logged, not returned.
async fn log_serverless(event: &DetectionEvent) {
    let client = match ServerlessClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Serverless client unavailable");
            return;
        }
    };
    let policy = RetryPolicy::from_env("serverless_detect");
    match client.send_detection_with_retry(event, &policy).await {
        Ok(_) => info!(classification = %event.classification, "Detection logged to serverless"),
        Err(e) => warn!(error = %e, "Serverless logging failed"),
    }
}
