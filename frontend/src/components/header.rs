use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-wand-magic-sparkles"></i> {" 水印移除工具"}</h1>
            <h2>{"Watermark Remover"}</h2>
            <p class="subtitle">
                {"智能检测并移除图像中的水印 | Intelligently detect and remove watermarks from images"}
            </p>
        </header>
    }
}
