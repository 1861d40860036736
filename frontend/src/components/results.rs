use super::super::{Model, Msg};
use super::utils::debounce;
use yew::prelude::*;

/// Right pane: the processed image, or a placeholder.
pub fn render_results(model: &Model) -> Html {
    let body = match model.session.result() {
        Some(result) => html! {
            <img id="result-preview" src={result.data_url().to_string()} alt="Processed" />
        },
        None if model.session.is_processing() => html! {
            <div class="result-placeholder">
                <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                <p>{"处理中... | Processing..."}</p>
            </div>
        },
        None => html! {
            <div class="result-placeholder">
                <i class="fa-solid fa-image"></i>
                <p>{"处理结果将显示在这里 | The result will appear here"}</p>
            </div>
        },
    };

    html! {
        <section class="pane result-pane">
            <h2>{"处理结果"}<span class="pane-subtitle">{"Result"}</span></h2>
            <div class="result-area">{ body }</div>
        </section>
    }
}

pub fn render_actions(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link().clone();
    let session = &model.session;

    let submit = if session.candidate().is_some() {
        html! {
            <button
                class="action-btn"
                onclick={link.callback(|_| Msg::Submit)}
                disabled={!session.can_submit()}
            >
                {
                    if session.is_processing() {
                        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" 处理中... | Processing..."}</> }
                    } else {
                        html! { <><i class="fa-solid fa-eraser"></i>{" 移除水印 | Remove Watermark"}</> }
                    }
                }
            </button>
        }
    } else {
        html! {}
    };

    let download = if session.result().is_some() {
        html! {
            <button class="action-btn" onclick={link.callback(|_| Msg::Download)}>
                <i class="fa-solid fa-download"></i>{" 下载结果 | Download"}
            </button>
        }
    } else {
        html! {}
    };

    let reset = if session.candidate().is_some() || session.result().is_some() {
        html! {
            <button
                class="action-btn"
                onclick={debounce(300, {
                    let link = link.clone();
                    move || link.send_message(Msg::Reset)
                })}
            >
                <i class="fa-solid fa-rotate-left"></i>{" 上传新图片 | Upload New"}
            </button>
        }
    } else {
        html! {}
    };

    html! {
        <div class="button-container">
            { submit }
            { download }
            { reset }
        </div>
    }
}
