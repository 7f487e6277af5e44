//! GPU presentation for the loading screen.
//!
//! The composition surface lives on the CPU; this crate owns the path from
//! composed texels to the screen:
//!
//! ```text
//!   compositor pixels ──▶ Queue::write_texture ──▶ textured-quad draw ──▶ present
//! ```
//!
//! [`BlitPresenter`] compiles a fixed textured-quad shader, allocates one
//! interleaved vertex buffer (two triangles covering clip space) and one
//! linear/clamp-to-edge texture sized to the composition surface, and
//! re-uploads the full composition on every update. [`BlitPresenter::release`]
//! tears all of that down and leaves the swapchain cleared to black so the
//! engine runtime that inherits the surface starts from a neutral state.

mod blit;
mod context;

pub use blit::BlitPresenter;

/// Seam between the loading screen and the GPU. The production implementation
/// is [`BlitPresenter`]; tests substitute a recording fake.
pub trait FramePresenter {
    /// Uploads a full composition buffer (RGBA8, rows top to bottom) and
    /// draws it to the screen.
    fn present(&mut self, pixels: &[u8]) -> anyhow::Result<()>;

    /// Releases every GPU object and restores the surface to a neutral
    /// state. Subsequent calls are no-ops.
    fn release(&mut self);
}
