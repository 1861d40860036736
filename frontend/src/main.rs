mod api;
mod components;

use components::handlers;
use components::header::render_header;
use components::results::{render_actions, render_results};
use components::upload_section::render_upload_section;
use components::utils::{render_error_message, StagedImage};
use gloo_events::EventListener;
use gloo_file::File as GlooFile;
use shared::{RemovalReply, ServiceEndpoint, SubmitTicket, TransportError, UploadSession};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

// Yew msg components
pub enum Msg {
    // File operations
    FilesAdded(Vec<GlooFile>),
    Reset,

    // Removal operations
    Submit,
    SubmitFinished(SubmitTicket, Result<RemovalReply, TransportError>),
    Download,

    // UI states
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub endpoint: ServiceEndpoint,
}

// Main component
pub struct Model {
    session: UploadSession<StagedImage>,
    endpoint: ServiceEndpoint,
    is_dragging: bool,
    paste_listener: Option<EventListener>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = AppProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut model = Self {
            session: UploadSession::new(),
            endpoint: ctx.props().endpoint.clone(),
            is_dragging: false,
            paste_listener: None,
        };

        if let Some(window) = web_sys::window() {
            let link = ctx.link().clone();
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        }

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::FilesAdded(files) => handlers::handle_files_added(self, files),
            Msg::Reset => handlers::handle_reset(self),

            Msg::Submit => handlers::handle_submit(self, ctx),
            Msg::SubmitFinished(ticket, outcome) => {
                handlers::handle_submit_finished(self, ticket, outcome)
            }
            Msg::Download => handlers::handle_download(self),

            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { render_header() }

                <main class="main-content">
                    <div class="panes">
                        { render_upload_section(self, ctx) }
                        { render_results(self) }
                    </div>
                    { render_error_message(self) }
                    { render_actions(self, ctx) }
                </main>

                <footer class="app-footer">
                    <p>{"© 2026 水印移除工具 | Watermark Remover"}</p>
                    <p>{"基于 EasyOCR 和 Inpaint 模型 | Powered by EasyOCR and Inpaint Model"}</p>
                </footer>
            </div>
        }
    }
}

fn resolve_endpoint() -> ServiceEndpoint {
    let hostname = web_sys::window()
        .and_then(|window| window.location().hostname().ok())
        .unwrap_or_default();
    ServiceEndpoint::resolve(option_env!("REMOVAL_API_URL"), &hostname)
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    let endpoint = resolve_endpoint();
    log::info!("App starting, removal endpoint: {}", endpoint.url());
    yew::Renderer::<Model>::with_props(AppProps { endpoint }).render();
}
