//! Property-based tests for transcript trimming
//!
//! Trimming must cap retained history, anchor the system message, and keep
//! the most recent messages untouched, for any history shape.

use super::transcript::{ChatMessage, Role, Transcript};
use proptest::prelude::*;

fn arb_content() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?]{0,60}"
}

fn arb_history_message() -> impl Strategy<Value = ChatMessage> {
    (any::<bool>(), arb_content()).prop_map(|(is_user, content)| {
        if is_user {
            ChatMessage::user(content)
        } else {
            ChatMessage::assistant(content)
        }
    })
}

/// A seeded transcript with an arbitrary amount of follow-on history,
/// paired with its window size
fn arb_seeded_transcript() -> impl Strategy<Value = (Transcript, usize)> {
    (
        1usize..10,
        arb_content(),
        arb_content(),
        proptest::collection::vec(arb_history_message(), 0..30),
    )
        .prop_map(|(window, system, first_user, history)| {
            let mut transcript = Transcript::new(window);
            transcript.seed(system, first_user);
            for message in history {
                match message.role {
                    Role::User => transcript.push_user(message.content),
                    Role::Assistant => transcript.push_assistant(message.content),
                    Role::System => unreachable!("history generator emits no system messages"),
                }
            }
            (transcript, window)
        })
}

proptest! {
    /// After trimming, length never exceeds window + 1
    #[test]
    fn prop_trim_caps_length((mut transcript, window) in arb_seeded_transcript()) {
        transcript.trim();
        prop_assert!(transcript.len() <= window + 1);
    }

    /// Trimming an already-trimmed transcript changes nothing
    #[test]
    fn prop_trim_is_idempotent((mut transcript, _window) in arb_seeded_transcript()) {
        transcript.trim();
        let once = transcript.clone();
        transcript.trim();
        prop_assert_eq!(transcript, once);
    }

    /// The system anchor at index 0 survives every trim
    #[test]
    fn prop_trim_keeps_system_anchor((mut transcript, _window) in arb_seeded_transcript()) {
        let anchor = transcript.messages()[0].clone();
        transcript.trim();
        prop_assert_eq!(transcript.messages()[0].clone(), anchor);
        prop_assert_eq!(transcript.messages()[0].role, Role::System);
    }

    /// The retained tail is the most recent messages, order preserved
    #[test]
    fn prop_trim_preserves_recent_suffix((mut transcript, _window) in arb_seeded_transcript()) {
        let before: Vec<ChatMessage> = transcript.messages().to_vec();
        transcript.trim();
        let after = transcript.messages();

        let tail_len = after.len() - 1;
        let expected: Vec<ChatMessage> =
            before.iter().rev().take(tail_len).rev().cloned().collect();
        prop_assert_eq!(&after[1..], expected.as_slice());
    }
}
