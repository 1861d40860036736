use super::super::Model;
use super::super::Msg;
use super::utils::{debounce, extract_image_files};
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

/// Left pane: drop zone while empty, preview of the candidate once staged.
pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    let candidate = model.session.candidate();

    html! {
        <section class="pane input-pane">
            <h2>{"输入图像"}<span class="pane-subtitle">{"Input Image"}</span></h2>
            { render_file_input_area(model, ctx) }
            {
                if let Some(candidate) = candidate {
                    html! { <p class="uploaded-name">{ format!("已上传 | Uploaded: {}", candidate.name()) }</p> }
                } else {
                    html! {}
                }
            }
        </section>
    }
}

fn render_file_input_area(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let handle_change = link.batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let files = input.files();
        let files_to_process = files.as_ref().map(extract_image_files).unwrap_or_default();

        input.set_value("");

        if files_to_process.is_empty() {
            log::warn!("No valid image files selected.");
            None
        } else {
            Some(Msg::FilesAdded(files_to_process))
        }
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);
    let trigger_file_input = Callback::from(|_| {
        let input = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id("file-input"));
        if let Some(input) = input {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });

    let preview = model
        .session
        .candidate()
        .map(|candidate| candidate.file().preview_url.to_string());

    html! {
        <>
            <input
                type="file"
                id="file-input"
                accept="image/*"
                style="display: none;"
                onchange={handle_change}
            />

            <div
                id="drop-zone"
                class={classes!(
                    "upload-area",
                    model.is_dragging.then_some("drag-over"),
                    preview.is_some().then_some("has-image")
                )}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, {
                    let trigger_file_input = trigger_file_input.clone();
                    move || trigger_file_input.emit(())
                })}
            >
                {
                    match preview {
                        Some(url) => html! {
                            <img id="input-preview" src={url} alt="Uploaded" />
                        },
                        None => html! {
                            <div class="upload-placeholder">
                                <i class="fa-solid fa-cloud-arrow-up"></i>
                                <p>{"点击或拖拽图片到此处 | Click, drag & drop, or paste an image"}</p>
                                <p class="file-types">{"支持 JPG、PNG、WEBP 等格式 | JPG, PNG, WEBP and more"}</p>
                            </div>
                        },
                    }
                }
            </div>
        </>
    }
}
