use crate::{ClipStore, DeviceState, TICK_SECS, TakeSession, ToggleEffect};

/// Drive the session clock for a number of ticks.
fn run_ticks(session: &mut TakeSession, ticks: u64) {
    for _ in 0..ticks {
        session.tick();
    }
}

/// WHAT: A new session is not ready and holds one empty placeholder
/// WHY: Controls stay disabled until the device is acquired
#[test]
fn given_new_session_when_created_then_not_ready_with_empty_placeholder() {
    // Given/When: A fresh session
    let session = TakeSession::new();

    // Then: Not ready, no finished takes, the placeholder slot is empty
    assert_eq!(session.device_state(), DeviceState::NotReady);
    assert!(session.takes().is_empty());
    assert!(session.pending_clip().is_none());
}

/// WHAT: Toggling before device acquisition is ignored
/// WHY: The control is disabled entirely while not-ready
#[test]
fn given_not_ready_session_when_toggled_then_ignored() {
    // Given: A session whose device never resolved
    let mut session = TakeSession::new();

    // When: The control is activated
    let effect = session.toggle();

    // Then: Nothing happens, clock stays at zero
    assert_eq!(effect, ToggleEffect::Ignored);
    assert_eq!(session.device_state(), DeviceState::NotReady);
    assert_eq!(session.elapsed_seconds(), 0.0);
}

/// WHAT: Device acquisition enables the session
/// WHY: not-ready -> idle is the only way out of the disabled state
#[test]
fn given_not_ready_session_when_device_ready_then_idle() {
    // Given: A fresh session
    let mut session = TakeSession::new();

    // When: Acquisition completes
    session.device_ready();

    // Then: Idle, control enabled
    assert_eq!(session.device_state(), DeviceState::Idle);
}

/// WHAT: Acquisition failure leaves the session permanently not-ready
/// WHY: Errors degrade to a disabled control, never a crash or retry
#[test]
fn given_acquisition_failure_when_reported_then_still_not_ready() {
    // Given: A fresh session
    let mut session = TakeSession::new();

    // When: Acquisition fails
    session.device_failed("no microphone");

    // Then: Still not ready, toggle still ignored
    assert_eq!(session.device_state(), DeviceState::NotReady);
    assert_eq!(session.toggle(), ToggleEffect::Ignored);
}

/// WHAT: The full record-stop-deliver cycle produces one finished take
/// WHY: This is the core coordination the whole system exists for
#[test]
fn given_idle_session_when_recording_250_ticks_then_take_has_duration_2_50() {
    // Given: A ready session and a clip store
    let mut session = TakeSession::new();
    let mut store = ClipStore::new();
    session.device_ready();

    // When: Toggling on, waiting 2.5s of ticks, toggling off
    assert_eq!(session.toggle(), ToggleEffect::StartCapture);
    assert!(session.is_recording());
    run_ticks(&mut session, 250);
    assert_eq!(session.toggle(), ToggleEffect::StopCapture);

    // Then: Back to idle, clock reset for the next take
    assert_eq!(session.device_state(), DeviceState::Idle);
    assert_eq!(session.elapsed_seconds(), 0.0);

    // When: Captured data arrives
    let clip = store.insert(vec![0.1; 4800], 48_000);
    let replaced = session.data_available(clip);

    // Then: One finished take with the duration fixed at the stop, and a
    // fresh empty placeholder
    assert!(replaced.is_none());
    assert_eq!(session.takes().len(), 1);
    assert!((session.takes()[0].duration_secs - 2.5).abs() < TICK_SECS);
    assert_eq!(session.takes()[0].clip, clip);
    assert!(session.pending_clip().is_none());
}

/// WHAT: The duration snapshot is taken at stop, not at data arrival
/// WHY: A delay between stop and dataavailable must not affect duration
#[test]
fn given_stopped_capture_when_data_arrives_late_then_duration_unchanged() {
    // Given: A stop after 100 ticks
    let mut session = TakeSession::new();
    let mut store = ClipStore::new();
    session.device_ready();
    session.toggle();
    run_ticks(&mut session, 100);
    session.toggle();

    // When: Ticks keep arriving before the data shows up
    run_ticks(&mut session, 500);
    let clip = store.insert(vec![0.0; 100], 48_000);
    session.data_available(clip);

    // Then: The take's duration is the stop-time snapshot
    assert!((session.takes()[0].duration_secs - 1.0).abs() < TICK_SECS);
}

/// WHAT: Each stop appends exactly one take, in insertion order
/// WHY: The take list is append-only (except deletions) and ordered
#[test]
fn given_three_recordings_when_completed_then_three_takes_in_order() {
    // Given: A ready session
    let mut session = TakeSession::new();
    let mut store = ClipStore::new();
    session.device_ready();

    // When: Three record/stop/data cycles of increasing length
    for i in 1..=3u64 {
        session.toggle();
        run_ticks(&mut session, i * 100);
        session.toggle();
        let clip = store.insert(vec![0.0; 10], 48_000);
        session.data_available(clip);
    }

    // Then: Three takes, durations in recording order
    assert_eq!(session.takes().len(), 3);
    for (i, take) in session.takes().iter().enumerate() {
        let expected = (i as f64 + 1.0) * 1.0;
        assert!((take.duration_secs - expected).abs() < TICK_SECS);
    }
    // And: The placeholder is empty again
    assert!(session.pending_clip().is_none());
}

/// WHAT: Deleting a take removes it and reports its clip exactly once
/// WHY: Audio handles must be revoked exactly once, on explicit deletion
#[test]
fn given_finished_takes_when_deleting_one_then_clip_reported_once() {
    // Given: Two finished takes
    let mut session = TakeSession::new();
    let mut store = ClipStore::new();
    session.device_ready();
    for _ in 0..2 {
        session.toggle();
        run_ticks(&mut session, 50);
        session.toggle();
        let clip = store.insert(vec![0.0; 10], 48_000);
        session.data_available(clip);
    }
    let first = session.takes()[0];
    let second = session.takes()[1];

    // When: Deleting the first take
    let revoked = session.delete_take(first.id);

    // Then: Its clip comes back for revocation, the list shrinks, the
    // other take is untouched
    assert_eq!(revoked, Some(first.clip));
    assert!(store.revoke(first.clip));
    assert_eq!(session.takes().len(), 1);
    assert_eq!(session.takes()[0].id, second.id);

    // And: Deleting it again reports nothing
    assert!(session.delete_take(first.id).is_none());
}

/// WHAT: Double data delivery after a stop is last-write-wins
/// WHY: A duplicate dataavailable must not create a duplicate take, and
///      the superseded clip must be reported for revocation
#[test]
fn given_duplicate_data_after_stop_when_delivered_then_last_write_wins() {
    // Given: A stopped capture
    let mut session = TakeSession::new();
    let mut store = ClipStore::new();
    session.device_ready();
    session.toggle();
    run_ticks(&mut session, 100);
    session.toggle();

    // When: Data arrives twice before the next start
    let first = store.insert(vec![0.1; 10], 48_000);
    let second = store.insert(vec![0.2; 10], 48_000);
    let replaced_by_first = session.data_available(first);
    let replaced_by_second = session.data_available(second);

    // Then: One take, holding the most recent clip; the first clip is
    // reported for revocation; no duplicate placeholder appeared
    assert!(replaced_by_first.is_none());
    assert_eq!(replaced_by_second, Some(first));
    assert_eq!(session.takes().len(), 1);
    assert_eq!(session.takes()[0].clip, second);
    assert!(session.pending_clip().is_none());
}

/// WHAT: Data staged mid-capture is superseded by later deliveries
/// WHY: Only the most recent dataavailable before a stop determines the
///      finalized take's clip
#[test]
fn given_data_during_recording_when_stopping_then_latest_clip_finalizes() {
    // Given: An active capture with two interim data deliveries
    let mut session = TakeSession::new();
    let mut store = ClipStore::new();
    session.device_ready();
    session.toggle();
    run_ticks(&mut session, 30);

    let first = store.insert(vec![0.1; 10], 48_000);
    let second = store.insert(vec![0.2; 10], 48_000);
    assert!(session.data_available(first).is_none());
    assert_eq!(session.data_available(second), Some(first));
    // Still recording: nothing finalized yet
    assert!(session.takes().is_empty());
    assert_eq!(session.pending_clip(), Some(second));

    // When: The capture stops
    session.toggle();

    // Then: The staged clip finalizes immediately
    assert_eq!(session.takes().len(), 1);
    assert_eq!(session.takes()[0].clip, second);
    assert!(session.pending_clip().is_none());
}

/// WHAT: A capture fault leaves the session recording
/// WHY: Capture errors are diagnostic only; recording is not auto-stopped
#[test]
fn given_recording_session_when_capture_fault_then_still_recording() {
    // Given: An active capture
    let mut session = TakeSession::new();
    session.device_ready();
    session.toggle();
    run_ticks(&mut session, 10);

    // When: The device reports an error
    session.capture_fault("buffer overrun");

    // Then: Still recording, clock still advancing
    assert!(session.is_recording());
    let before = session.elapsed_seconds();
    session.tick();
    assert!(session.elapsed_seconds() > before);
}

/// WHAT: A stop that never received data does not pollute the next take
/// WHY: A failed capture leaves a stale duration snapshot that must be
///      cleared when recording restarts
#[test]
fn given_dataless_stop_when_next_recording_completes_then_duration_is_fresh() {
    // Given: A stop with no data delivery
    let mut session = TakeSession::new();
    let mut store = ClipStore::new();
    session.device_ready();
    session.toggle();
    run_ticks(&mut session, 500);
    session.toggle();
    assert!(session.takes().is_empty());

    // When: A second, shorter recording completes normally
    session.toggle();
    run_ticks(&mut session, 100);
    session.toggle();
    let clip = store.insert(vec![0.0; 10], 48_000);
    session.data_available(clip);

    // Then: The take reflects only the second recording
    assert_eq!(session.takes().len(), 1);
    assert!((session.takes()[0].duration_secs - 1.0).abs() < TICK_SECS);
}
