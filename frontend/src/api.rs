use gloo_file::File as GlooFile;
use gloo_net::http::Request;
use shared::api::read_reply;
use shared::{RemovalReply, ServiceEndpoint, TransportError, IMAGE_FIELD};
use wasm_bindgen::JsValue;
use web_sys::FormData;

fn js_error(err: JsValue) -> TransportError {
    TransportError::network(err.as_string(), || format!("{:?}", err))
}

/// Sends the staged image to the removal service and interprets the answer.
pub async fn request_removal(
    endpoint: &ServiceEndpoint,
    file: &GlooFile,
) -> Result<RemovalReply, TransportError> {
    let form_data = FormData::new().map_err(js_error)?;
    form_data
        .append_with_blob_and_filename(IMAGE_FIELD, file.as_ref(), &file.name())
        .map_err(js_error)?;

    let response = Request::post(endpoint.url())
        .body(form_data)
        .map_err(|e| TransportError::Network(e.to_string()))?
        .send()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Decode(e.to_string()))?;

    read_reply(status, &body)
}
