//! Real-time driver mapping the virtual clock onto tokio time.
//!
//! The controller itself stays synchronous. The driver waits on whichever
//! comes first, the next input event or the next timer deadline, and syncs
//! the virtual clock to wall time before applying an input so timers that
//! were already due fire first.
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use crate::controller::ProgressionController;
use crate::input::InputEvent;
use crate::sink::{ForwardSink, Notification, PresentationSink};

/// Why [`run_realtime`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    GameOver,
    InputClosed,
}

/// Sink forwarding notifications over an unbounded channel. Notifications
/// sent after the receiver is dropped are discarded.
#[must_use]
pub fn channel_sink() -> (
    ForwardSink<impl FnMut(Notification) + Send + 'static>,
    mpsc::UnboundedReceiver<Notification>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = ForwardSink(move |notification: Notification| {
        let _ = tx.send(notification);
    });
    (sink, rx)
}

fn elapsed_ms(origin: Instant) -> u64 {
    u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Drive `controller` in real time until the game ends or the input source
/// hangs up.
pub async fn run_realtime<S: PresentationSink>(
    controller: &mut ProgressionController<S>,
    events: &mut mpsc::UnboundedReceiver<InputEvent>,
) -> DriverExit {
    let now = Instant::now();
    let origin = now
        .checked_sub(Duration::from_millis(controller.now_ms()))
        .unwrap_or(now);
    loop {
        if controller.session().phase().is_terminal() {
            return DriverExit::GameOver;
        }
        let deadline = controller.next_deadline();
        let wake = deadline.map(|ms| origin + Duration::from_millis(ms));
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    return DriverExit::InputClosed;
                };
                controller.advance_to(elapsed_ms(origin));
                controller.handle(event);
            }
            () = sleep_until(wake.unwrap_or(origin)), if wake.is_some() => {
                if let Some(due) = deadline {
                    controller.advance_to(due);
                }
            }
        }
    }
}
