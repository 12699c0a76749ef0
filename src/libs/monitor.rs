use super::day::EventKind;
use super::engine::Engine;
use super::messages::Message;
use crate::msg_error;
use rdev::{listen, Button, Event, EventType};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Maps a raw rdev event to the kind of event we count.
///
/// Only presses count: releases, movement and wheel events are ignored.
/// Auto-repeated key presses count like physical ones.
pub fn classify(event_type: &EventType) -> Option<EventKind> {
    match event_type {
        EventType::KeyPress(_) => Some(EventKind::KeyboardPress),
        EventType::ButtonPress(Button::Left) => Some(EventKind::LeftClick),
        EventType::ButtonPress(Button::Right) => Some(EventKind::RightClick),
        _ => None,
    }
}

/// Capture adapter: forwards system-wide input events to the engine.
pub struct Monitor {
    engine: Arc<Engine>,
}

impl Monitor {
    pub fn new(engine: Arc<Engine>) -> Self {
        Monitor { engine }
    }

    /// Starts the rdev listener on a dedicated thread.
    ///
    /// `rdev::listen` blocks for the life of the hook, so the thread is never
    /// joined; it ends with the process. The listener is restarted if the
    /// hook fails.
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || loop {
            let engine = Arc::clone(&self.engine);
            match listen(move |event: Event| {
                if let Some(kind) = classify(&event.event_type) {
                    engine.on_input_event(kind);
                }
            }) {
                Ok(()) => break,
                Err(e) => {
                    msg_error!(Message::ErrorInRdevListener(format!("{:?}", e)));
                    thread::sleep(LISTENER_RETRY_DELAY);
                }
            }
        })
    }
}
