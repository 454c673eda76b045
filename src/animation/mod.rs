//! Tween-based animation of the mesh and camera.

pub mod easing;
pub mod sequencer;
pub mod tween;

pub use easing::Easing;
pub use sequencer::{AnimationSequencer, Sequence, SequenceTarget, SequencerTick};
pub use tween::{Animatable, Channel, Interpolation, Tween, TweenEvent, TweenGroup, TweenId};
