use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use shared::IMAGE_FIELD;
use url::Url;

use crate::error::GatewayError;

/// An image pulled out of the client's multipart upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Raw answer from the removal service, relayed to the client untouched.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Clone)]
pub struct RemovalClient {
    http: HttpClient,
    url: Url,
}

impl RemovalClient {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, GatewayError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn forward(&self, upload: ImageUpload) -> Result<UpstreamReply, GatewayError> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self.http.post(self.url.clone()).multipart(form).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }
}
