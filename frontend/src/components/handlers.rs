use super::super::{Model, Msg};
use super::utils::{extract_image_files, StagedImage};
use crate::api::request_removal;
use gloo_file::{Blob, File as GlooFile, ObjectUrl};
use gloo_timers::callback::Timeout;
use shared::{Download, RemovalReply, ServiceEndpoint, SubmitTicket, TransportError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent, FileList, HtmlAnchorElement};
use yew::prelude::*;

pub fn handle_files_added(model: &mut Model, files: Vec<GlooFile>) -> bool {
    model.session.stage(files.into_iter().map(StagedImage::from))
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(data_transfer) = event.data_transfer() {
        if let Some(file_list) = data_transfer.files() {
            process_file_list(ctx, file_list);
        }
    }

    true
}

pub fn handle_paste(ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if let Some(data_transfer) = event.clipboard_data() {
        if let Some(file_list) = data_transfer.files() {
            if file_list.length() > 0 {
                event.prevent_default();
                process_file_list(ctx, file_list);
            }
        }
    }
    false
}

pub fn process_file_list(ctx: &Context<Model>, file_list: FileList) {
    let files = extract_image_files(&file_list);
    if !files.is_empty() {
        ctx.link().send_message(Msg::FilesAdded(files));
    }
}

pub fn handle_submit(model: &mut Model, ctx: &Context<Model>) -> bool {
    let Some(file) = model.session.candidate().map(|c| c.file().file.clone()) else {
        return false;
    };
    let Some(ticket) = model.session.begin_submit() else {
        log::debug!("Submission already in flight, ignoring");
        return false;
    };

    send_removal_request(ctx, model.endpoint.clone(), ticket, file);
    true
}

pub fn handle_submit_finished(
    model: &mut Model,
    ticket: SubmitTicket,
    outcome: Result<RemovalReply, TransportError>,
) -> bool {
    model.session.complete_submit(ticket, outcome);
    true
}

pub fn send_removal_request(
    ctx: &Context<Model>,
    endpoint: ServiceEndpoint,
    ticket: SubmitTicket,
    file: GlooFile,
) {
    spawn_local({
        let link = ctx.link().clone();

        async move {
            let outcome = request_removal(&endpoint, &file).await;
            if let Err(e) = &outcome {
                gloo_console::error!(format!("Removal request failed: {}", e));
            }
            link.send_message(Msg::SubmitFinished(ticket, outcome));
        }
    });
}

pub fn handle_download(model: &Model) -> bool {
    if let Some(download) = model.session.download() {
        if let Err(e) = save_download(&download) {
            log::error!("Failed to save {}: {:?}", download.file_name, e);
        }
    }
    false
}

fn save_download(download: &Download<'_>) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;

    let blob = Blob::new_with_options(download.bytes, Some(download.mime_type));
    let url = ObjectUrl::from(blob);

    let link: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    link.set_href(&url);
    link.set_download(&download.file_name);
    body.append_child(&link)?;
    link.click();
    body.remove_child(&link)?;

    // Revoke once the click has been dispatched.
    Timeout::new(0, move || drop(url)).forget();
    Ok(())
}

pub fn handle_reset(model: &mut Model) -> bool {
    model.session.reset();
    model.is_dragging = false;
    true
}
