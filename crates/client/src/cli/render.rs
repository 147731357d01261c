//! Render CLI command.

use clap::{Parser, ValueEnum};
use shaper_core::frame::AutoResize;

use super::generate::GenerationArgs;

/// CLI resize mode (with clap ValueEnum).
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ResizeMode {
    Vertical,
    Horizontal,
    #[default]
    Both,
    None,
}

impl From<ResizeMode> for AutoResize {
    fn from(mode: ResizeMode) -> Self {
        match mode {
            ResizeMode::Vertical => AutoResize::Vertical,
            ResizeMode::Horizontal => AutoResize::Horizontal,
            ResizeMode::Both => AutoResize::Both,
            ResizeMode::None => AutoResize::None,
        }
    }
}

/// Render command.
#[derive(Debug, Parser)]
pub struct RenderCommand {
    #[command(flatten)]
    pub params: GenerationArgs,
    /// Class attribute of the embedding element.
    #[arg(long)]
    pub class_name: Option<String>,
    /// Axis along which the frame follows its content.
    #[arg(long, default_value = "both")]
    pub auto_resize: ResizeMode,
    /// Tell the frame to wait for INIT before rendering.
    #[arg(long)]
    pub await_init: bool,
}
