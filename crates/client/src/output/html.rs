//! HTML for embedding a generated component.

use askama::Template;
use shaper_core::frame::{frame_src, AutoResize, Presentation, FRAME_ALLOW, FRAME_SANDBOX};

use crate::error::Result;

const PLACEHOLDER_CLASS: &str =
    "mx-auto flex h-full min-h-96 w-full max-w-sm animate-pulse rounded-md border";

const FRAME_CLASS: &str = "h-full w-full";

/// Attributes of the embedding element.
#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    pub class_name: Option<String>,
    pub auto_resize: AutoResize,
    pub await_init: bool,
}

/// Neutral placeholder shown while nothing can be embedded.
#[derive(Template)]
#[template(path = "embed/pending.html")]
struct PendingTemplate {
    class_name: String,
}

/// Placeholder carrying the failure message for diagnostics.
#[derive(Template)]
#[template(path = "embed/failed.html")]
struct FailedTemplate<'a> {
    class_name: String,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "embed/frame.html")]
struct FrameTemplate {
    src: String,
    class_name: String,
    sandbox: &'static str,
    allow: &'static str,
    auto_resize: &'static str,
}

/// Render the placeholder or frame markup for a presentation.
pub fn render(presentation: &Presentation<'_>, options: &EmbedOptions) -> Result<String> {
    let extra = options.class_name.as_deref();

    let html = match presentation {
        Presentation::Pending => PendingTemplate {
            class_name: classes(PLACEHOLDER_CLASS, extra),
        }
        .render()?,
        Presentation::Failed { message } => FailedTemplate {
            class_name: classes(PLACEHOLDER_CLASS, extra),
            message: *message,
        }
        .render()?,
        Presentation::Frame { url } => FrameTemplate {
            src: frame_src(url, options.await_init),
            class_name: match extra {
                Some(extra) => classes(extra, Some(FRAME_CLASS)),
                None => FRAME_CLASS.to_string(),
            },
            sandbox: FRAME_SANDBOX,
            allow: FRAME_ALLOW,
            auto_resize: options.auto_resize.as_str(),
        }
        .render()?,
    };
    Ok(html)
}

fn classes(base: &str, extra: Option<&str>) -> String {
    std::iter::once(base)
        .chain(extra.map(str::trim).filter(|c| !c.is_empty()))
        .collect::<Vec<_>>()
        .join(" ")
}
