use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use log::{info, warn};
use shared::api::{HEALTH_PATH, REMOVAL_PATH};
use shared::{TestResponse, IMAGE_FIELD};
use uuid::Uuid;

use crate::config::Config;
use crate::error::GatewayError;
use crate::upstream::{ImageUpload, RemovalClient};

const FALLBACK_FILE_NAME: &str = "image";

#[derive(Clone)]
pub struct Gateway {
    client: Option<RemovalClient>,
    max_upload_bytes: usize,
}

impl Gateway {
    pub fn new(client: Option<RemovalClient>, max_upload_bytes: usize) -> Self {
        Self {
            client,
            max_upload_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let client = match &config.removal_service_url {
            Some(url) => Some(RemovalClient::new(url.clone(), config.removal_timeout)?),
            None => None,
        };
        Ok(Self::new(client, config.max_upload_bytes))
    }

    pub fn upstream(&self) -> Option<&RemovalClient> {
        self.client.as_ref()
    }
}

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(HEALTH_PATH).route(web::get().to(health)))
        .service(web::resource(REMOVAL_PATH).route(web::post().to(remove_watermark)));
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    configure_api(cfg);
    cfg.service(Files::new("/", frontend_dir).index_file("index.html"));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(TestResponse {
        message: "Test API is working".into(),
    })
}

async fn remove_watermark(
    gateway: web::Data<Gateway>,
    payload: Multipart,
) -> Result<HttpResponse, GatewayError> {
    let request_id = Uuid::new_v4();
    let upload = read_image_field(payload, gateway.max_upload_bytes).await?;
    info!(
        "[{}] Received {} ({} bytes, {})",
        request_id,
        upload.file_name,
        upload.bytes.len(),
        upload.content_type
    );

    let client = gateway.client.as_ref().ok_or_else(|| {
        warn!("[{}] Rejecting request, no removal service configured", request_id);
        GatewayError::NotConfigured
    })?;

    let reply = client.forward(upload).await.map_err(|e| {
        warn!("[{}] Forwarding to {} failed: {}", request_id, client.url(), e);
        e
    })?;
    info!("[{}] Removal service answered {}", request_id, reply.status);

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = reply
        .content_type
        .unwrap_or_else(|| "application/json".to_string());

    Ok(HttpResponse::build(status)
        .content_type(content_type)
        .body(reply.body))
}

/// Pulls the `image` field out of the upload, draining everything else.
async fn read_image_field(
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<ImageUpload, GatewayError> {
    let mut upload = None;

    while let Some(mut field) = payload.try_next().await? {
        let is_image = upload.is_none() && field.name() == Some(IMAGE_FIELD);
        if !is_image {
            while field.try_next().await?.is_some() {}
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_FILE_NAME)
            .to_string();
        let declared_type = field.content_type().map(|mime| mime.essence_str().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(GatewayError::PayloadTooLarge(max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        upload = Some((file_name, declared_type, bytes));
    }

    let (file_name, declared_type, bytes) = upload.ok_or(GatewayError::MissingImage)?;

    let format = image::guess_format(&bytes).map_err(|_| GatewayError::UnreadableImage)?;
    let content_type = declared_type
        .filter(|mime| shared::is_image_media_type(mime))
        .unwrap_or_else(|| format.to_mime_type().to_string());

    Ok(ImageUpload {
        file_name,
        content_type,
        bytes,
    })
}
