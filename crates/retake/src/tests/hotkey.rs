use crate::AppCommand;

use retake_core::{DeviceState, TakeSession, ToggleEffect};
use tokio::sync::mpsc;

/// WHAT: Session stays untouched when the command channel is closed
/// WHY: A dropped app loop must not leave a half-applied toggle behind
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_closed_channel_when_toggle_sent_then_session_unchanged() {
    // Given: A closed command channel and a ready, idle session
    let (command_tx, command_rx) = mpsc::channel(1);
    drop(command_rx);
    let mut session = TakeSession::new();
    session.device_ready();

    // When: Attempting to forward a toggle press
    let result = command_tx.send(AppCommand::ToggleCapture).await;

    // Then: Send fails and the session never saw the toggle
    assert!(result.is_err());
    assert_eq!(session.device_state(), DeviceState::Idle);
    assert!(!session.is_recording());
}

/// WHAT: A delivered toggle command starts a capture on a ready session
/// WHY: The hotkey press and the tray click must drive the same transition
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_ready_session_when_toggle_delivered_then_recording_starts() {
    // Given: An open command channel and a ready, idle session
    let (command_tx, mut command_rx) = mpsc::channel(32);
    let mut session = TakeSession::new();
    session.device_ready();

    // When: A toggle press is forwarded and dispatched
    command_tx.send(AppCommand::ToggleCapture).await.unwrap();
    let cmd = command_rx.recv().await.unwrap();
    assert!(matches!(cmd, AppCommand::ToggleCapture));
    let effect = session.toggle();

    // Then: The session asks for a capture start and is recording
    assert_eq!(effect, ToggleEffect::StartCapture);
    assert!(session.is_recording());
}

/// WHAT: A delivered toggle is ignored while the device is not ready
/// WHY: The trigger path never overrides the session's readiness gate
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_not_ready_session_when_toggle_delivered_then_ignored() {
    // Given: An open command channel and a session without a device
    let (command_tx, mut command_rx) = mpsc::channel(32);
    let mut session = TakeSession::new();

    // When: A toggle press is forwarded and dispatched
    command_tx.send(AppCommand::ToggleCapture).await.unwrap();
    let cmd = command_rx.recv().await.unwrap();
    assert!(matches!(cmd, AppCommand::ToggleCapture));
    let effect = session.toggle();

    // Then: The session refuses the toggle and stays not-ready
    assert_eq!(effect, ToggleEffect::Ignored);
    assert_eq!(session.device_state(), DeviceState::NotReady);
}

/// WHAT: A quit request travels the command channel as Shutdown
/// WHY: Tray quit and every other exit trigger share one shutdown path
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_quit_request_when_forwarded_then_shutdown_delivered() {
    // Given: An open command channel
    let (command_tx, mut command_rx) = mpsc::channel(32);

    // When: The quit request is forwarded as a command
    command_tx.try_send(AppCommand::Shutdown).unwrap();

    // Then: The app loop receives the Shutdown command
    let cmd = command_rx.recv().await.unwrap();
    assert!(matches!(cmd, AppCommand::Shutdown));
}

/// WHAT: A full toggle cycle returns the session to idle
/// WHY: The same trigger starts and stops a take; no separate stop path exists
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recording_session_when_toggle_delivered_then_capture_stops() {
    // Given: A session mid-recording
    let (command_tx, mut command_rx) = mpsc::channel(32);
    let mut session = TakeSession::new();
    session.device_ready();
    assert_eq!(session.toggle(), ToggleEffect::StartCapture);

    // When: A second toggle press is forwarded and dispatched
    command_tx.send(AppCommand::ToggleCapture).await.unwrap();
    let cmd = command_rx.recv().await.unwrap();
    assert!(matches!(cmd, AppCommand::ToggleCapture));
    let effect = session.toggle();

    // Then: The session asks for a capture stop and is idle again
    assert_eq!(effect, ToggleEffect::StopCapture);
    assert_eq!(session.device_state(), DeviceState::Idle);
}
