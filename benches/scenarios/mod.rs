//! Whole-block scenarios through the renderer.

mod render;

pub use render::bench_render;
