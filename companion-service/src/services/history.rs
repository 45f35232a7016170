//! Rolling conversation window.

use crate::models::Message;

/// Keep at most the `max_turns` most recent turns (`2 * max_turns` messages),
/// dropping the oldest first.
pub fn trim_history(mut history: Vec<Message>, max_turns: usize) -> Vec<Message> {
    let limit = max_turns.saturating_mul(2);
    if history.len() > limit {
        history.drain(..history.len() - limit);
    }
    history
}
