//! Keeps the splash window serviced while the loader blocks.
//!
//! Winit windows are only mapped and kept responsive while their event loop
//! is dispatched; on Wayland the initial surface configure arrives through
//! the loop as well. The loader never spins a continuous loop, so the
//! presenter is wrapped to drain pending events with a zero timeout around
//! every frame.

use std::time::Duration;

use anyhow::Result;
use presenter::FramePresenter;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::pump_events::EventLoopExtPumpEvents;
use winit::window::Window;

/// Drains pending window-system events. Returns `true` while the window
/// should stay up, `false` once the user asked to close it.
pub trait EventPump {
    fn pump(&mut self) -> bool;
}

/// Winit-backed pump over the splash window's event loop.
pub struct WinitPump {
    event_loop: EventLoop<()>,
    close_requested: bool,
}

impl WinitPump {
    pub fn new(event_loop: EventLoop<()>) -> Self {
        Self {
            event_loop,
            close_requested: false,
        }
    }
}

impl EventPump for WinitPump {
    fn pump(&mut self) -> bool {
        let Self {
            event_loop,
            close_requested,
        } = self;
        let _ = event_loop.pump_events(Some(Duration::ZERO), |event, _target| {
            if let Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } = event
            {
                *close_requested = true;
            }
            // Redraw requests are satisfied by the next present.
        });
        !*close_requested
    }
}

/// Presenter decorator that pumps the event queue before and after each
/// frame, so the surface is mapped before the first upload and stays live
/// through long downloads. A close request fails the next present, which
/// aborts the load.
pub struct PumpedPresenter<P: FramePresenter, E: EventPump> {
    inner: P,
    // Field order matters: the inner presenter's surface is dropped before
    // the window it was created from.
    _window: Option<Window>,
    pump: E,
}

impl<P: FramePresenter, E: EventPump> PumpedPresenter<P, E> {
    pub fn new(inner: P, window: Option<Window>, mut pump: E) -> Self {
        // Let the window system finish mapping the freshly-built window.
        pump.pump();
        Self {
            inner,
            _window: window,
            pump,
        }
    }
}

impl<P: FramePresenter, E: EventPump> FramePresenter for PumpedPresenter<P, E> {
    fn present(&mut self, pixels: &[u8]) -> Result<()> {
        anyhow::ensure!(self.pump.pump(), "window closed during loading");
        self.inner.present(pixels)?;
        self.pump.pump();
        Ok(())
    }

    fn release(&mut self) {
        self.inner.release();
        self.pump.pump();
    }
}
