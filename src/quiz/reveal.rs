//! Reveal staging
//!
//! Once a round's answer is revealed, the result is shown in
//! [`REVEAL_STAGES`](crate::constants::timing::REVEAL_STAGES) steps spaced
//! by `reveal_step`, followed by a trailing pause before control returns to
//! the sequencer. All delays are measured from the moment of the reveal.

use web_time::Duration;

use crate::{config::Timing, constants::timing::REVEAL_STAGES};

/// Delays of every reveal stage, measured from the reveal
///
/// # Returns
///
/// An iterator of `(stage, delay)` pairs for stages `1..=REVEAL_STAGES`
pub fn stage_delays(timing: &Timing) -> impl Iterator<Item = (u8, Duration)> + use<> {
    let step = timing.reveal_step;
    (1..=REVEAL_STAGES).map(move |stage| (stage, step * u32::from(stage)))
}

/// Delay between the reveal and the hand-off to the sequencer
pub fn finish_delay(timing: &Timing) -> Duration {
    timing.reveal_step * u32::from(REVEAL_STAGES) + timing.reveal_trailing
}
