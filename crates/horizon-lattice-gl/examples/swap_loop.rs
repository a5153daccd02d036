//! Open a native OpenGL window and present frames until it is closed.
//!
//! Prints the window geometry whenever it moves or is resized, and the
//! average frame time once the window closes.
//!
//! Run with: cargo run -p horizon-lattice-gl --example swap_loop
//!
//! Set `RUST_LOG=horizon_lattice_gl=debug` to see context negotiation.

use horizon_lattice_gl::{
    ContextRequest, Window, WindowConfig, now, ticks_to_duration,
};

/// Shared state kept in the window's user data slot.
#[derive(Default)]
struct LoopState {
    close_requested: bool,
    frames: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "horizon_lattice_gl=info".into()),
        )
        .init();

    let config = WindowConfig::new("Horizon Lattice GL")
        .with_size(960, 540)
        .with_context(ContextRequest::new(3, 3))
        .with_visible(true);
    let mut window = Window::from_config(&config)?;
    window.set_user_data(LoopState::default());

    println!("Context: {:?}", window.context_kind());
    println!(
        "Outer rectangle: {:?}, client area: {:?}",
        window.outer_rect(),
        window.client_size()
    );

    window.set_on_move(Some(Box::new(|w: &mut Window| {
        println!("Moved to ({}, {})", w.x(), w.y());
    })));
    window.set_on_resize(Some(Box::new(|w: &mut Window| {
        println!("Resized to {}x{} (client {:?})", w.width(), w.height(), w.client_size());
    })));
    window.set_on_close(Some(Box::new(|w: &mut Window| {
        if let Some(state) = w.user_data_mut::<LoopState>() {
            state.close_requested = true;
        }
    })));

    let start = now();
    loop {
        window.dequeue_events();
        let Some(state) = window.user_data_mut::<LoopState>() else {
            break;
        };
        if state.close_requested {
            break;
        }
        state.frames += 1;
        window.swap_buffers(1);
    }

    let frames = window
        .user_data::<LoopState>()
        .map_or(0, |state| state.frames);
    let elapsed = ticks_to_duration(now() - start);
    if frames > 0 {
        println!(
            "{frames} frames in {:.2}s ({:.2} ms/frame)",
            elapsed.as_secs_f64(),
            elapsed.as_secs_f64() * 1000.0 / frames as f64
        );
    }

    window.close();
    Ok(())
}
