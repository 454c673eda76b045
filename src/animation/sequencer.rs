//! The two canned animations offered by the animation folder.
//!
//! Both sequences live in one [`TweenGroup`] for the lifetime of the mesh
//! they animate:
//!
//! - **Fade + spin** (cyclic): opacity to 1 over 500 ms, a full turn around
//!   Y over 1500 ms, opacity to 0 over 500 ms, then back to the start.
//! - **Bounce + flythrough**: the mesh bounces on Y for as long as the
//!   camera flies once around it along two Bezier arcs.

use std::f32::consts::TAU;

use log::{debug, info};

use super::easing::Easing;
use super::tween::{Animatable, Channel, Interpolation, Tween, TweenEvent, TweenGroup, TweenId};

/// Which canned animation to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    /// Fade in, spin around Y, fade out, repeat.
    FadeSpin,
    /// Bounce the mesh while the camera flies around it once.
    BounceFlythrough,
}

/// Target of the sequences: the mesh and camera plus the material's
/// transparency switch.
pub trait SequenceTarget: Animatable {
    /// Switches the material's transparency before a fade starts.
    fn set_transparent(&mut self, transparent: bool);
}

/// Result of advancing the sequencer by one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequencerTick {
    /// Some tween wrote into the target.
    pub animated: bool,
    /// A flythrough step is running; the camera should be re-aimed.
    pub camera_moving: bool,
}

struct Steps {
    fade: [TweenId; 3],
    bounce: [TweenId; 2],
    flythrough: [TweenId; 4],
}

impl Steps {
    /// Adds every step of both sequences to `group` and chains them.
    fn build(group: &mut TweenGroup) -> Self {
        let fade = [
            group.add(Tween::to(&[(Channel::Opacity, 1.0)]).duration(500.0)),
            group.add(
                Tween::to(&[(Channel::MeshRotation(1), TAU)])
                    .duration(1500.0)
                    .easing(Easing::QuadraticInOut),
            ),
            group.add(Tween::to(&[(Channel::Opacity, 0.0)]).duration(500.0)),
        ];
        group.chain(fade[0], fade[1]);
        group.chain(fade[1], fade[2]);
        group.chain(fade[2], fade[0]);

        let bounce = [
            group.add(Tween::to(&[(Channel::MeshPosition(1), 15.0)]).easing(Easing::BounceIn)),
            group.add(Tween::to(&[(Channel::MeshPosition(1), 0.0)]).easing(Easing::BounceOut)),
        ];
        group.chain(bounce[0], bounce[1]);
        group.chain(bounce[1], bounce[0]);

        let flythrough = [
            group.add(
                Tween::to(&[(Channel::CameraPosition(2), 16.0)])
                    .duration(1000.0)
                    .easing(Easing::QuadraticOut),
            ),
            group.add(
                Tween::through(vec![
                    (Channel::CameraPosition(0), vec![-16.0, 0.0]),
                    (Channel::CameraPosition(2), vec![0.0, -16.0]),
                ])
                .duration(6000.0)
                .easing(Easing::CubicInOut)
                .interpolation(Interpolation::Bezier),
            ),
            group.add(
                Tween::through(vec![
                    (Channel::CameraPosition(0), vec![16.0, 0.0]),
                    (Channel::CameraPosition(2), vec![0.0, 16.0]),
                ])
                .duration(6000.0)
                .easing(Easing::QuinticInOut)
                .interpolation(Interpolation::Bezier),
            ),
            group.add(
                Tween::to(&[(Channel::CameraPosition(2), 3.0)])
                    .duration(1000.0)
                    .easing(Easing::QuadraticIn),
            ),
        ];
        group.chain(flythrough[0], flythrough[1]);
        group.chain(flythrough[1], flythrough[2]);
        group.chain(flythrough[2], flythrough[3]);

        Self {
            fade,
            bounce,
            flythrough,
        }
    }

    fn of(&self, sequence: Sequence) -> Vec<TweenId> {
        match sequence {
            Sequence::FadeSpin => self.fade.to_vec(),
            Sequence::BounceFlythrough => {
                self.bounce.iter().chain(&self.flythrough).copied().collect()
            }
        }
    }

    fn heads(&self) -> [TweenId; 3] {
        [self.fade[0], self.bounce[0], self.flythrough[0]]
    }
}

/// Plays at most one of the two sequences at a time.
pub struct AnimationSequencer {
    group: TweenGroup,
    steps: Steps,
    playing: bool,
}

impl Default for AnimationSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationSequencer {
    /// Creates a sequencer with both sequences built and idle.
    pub fn new() -> Self {
        let mut group = TweenGroup::new();
        let steps = Steps::build(&mut group);
        Self {
            group,
            steps,
            playing: false,
        }
    }

    /// True from play until stop or the end of the flythrough, paused or not.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// The underlying tweens, for inspection
    pub fn group(&self) -> &TweenGroup {
        &self.group
    }

    /// Discards all tweens and builds fresh sequences, as after the mesh
    /// they animated was replaced.
    pub fn rebuild(&mut self) {
        self.group.remove_all();
        self.steps = Steps::build(&mut self.group);
    }

    /// Starts `sequence`, or resumes its paused steps when something is
    /// already playing.
    ///
    /// Starting the fade sequence zeroes the opacity first so the fade-in
    /// is visible.
    ///
    /// # Arguments
    /// * `sequence` - Which sequence to start
    /// * `time` - Current time in milliseconds
    /// * `target` - Receives the start values of the first steps
    pub fn play(&mut self, sequence: Sequence, time: f64, target: &mut dyn SequenceTarget) {
        if self.playing {
            for id in self.steps.of(sequence) {
                if self.group.is_paused(id) {
                    self.group.resume(id, time);
                }
            }
            debug!("Resumed {sequence:?}");
            return;
        }

        self.playing = true;
        match sequence {
            Sequence::FadeSpin => {
                target.write(Channel::Opacity, 0.0);
                self.group.start(self.steps.fade[0], time, &*target);
            }
            Sequence::BounceFlythrough => {
                self.group.start(self.steps.bounce[0], time, &*target);
                self.group.start(self.steps.flythrough[0], time, &*target);
            }
        }
        info!("Playing {sequence:?}");
    }

    /// Pauses every running step. The sequence still counts as playing,
    /// so [`AnimationSequencer::play`] resumes it.
    pub fn pause(&mut self, time: f64) {
        self.group.pause_all(time);
    }

    /// Stops every chain of both sequences.
    pub fn stop(&mut self) {
        for head in self.steps.heads() {
            self.group.stop(head);
        }
        self.playing = false;
        info!("Animation stopped");
    }

    /// Advances every running step to `time` and writes the results.
    ///
    /// The fade step makes the material transparent as it starts. The end
    /// of the flythrough stops the bounce and ends the sequence.
    ///
    /// # Arguments
    /// * `time` - Current time in milliseconds
    /// * `target` - Mesh, camera and material to write into
    ///
    /// # Returns
    /// What changed this frame, see [`SequencerTick`]
    pub fn update(&mut self, time: f64, target: &mut dyn SequenceTarget) -> SequencerTick {
        let animated = !self.group.active().is_empty();
        let events = self.group.update(time, target);

        for event in events {
            match event {
                TweenEvent::Started(id) if id == self.steps.fade[0] => target.set_transparent(true),
                TweenEvent::Completed(id) if id == self.steps.flythrough[3] => {
                    self.group.stop_chained(self.steps.bounce[0]);
                    self.playing = false;
                    debug!("Flythrough finished");
                }
                _ => {}
            }
        }

        SequencerTick {
            animated,
            camera_moving: self.steps.flythrough.iter().any(|&id| self.group.is_playing(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Stage {
        opacity: f32,
        transparent: bool,
        mesh_position: [f32; 3],
        mesh_rotation: [f32; 3],
        camera: [f32; 3],
    }

    impl Animatable for Stage {
        fn read(&self, channel: Channel) -> f32 {
            match channel {
                Channel::Opacity => self.opacity,
                Channel::MeshPosition(i) => self.mesh_position[i],
                Channel::MeshRotation(i) => self.mesh_rotation[i],
                Channel::CameraPosition(i) => self.camera[i],
            }
        }

        fn write(&mut self, channel: Channel, value: f32) {
            match channel {
                Channel::Opacity => self.opacity = value,
                Channel::MeshPosition(i) => self.mesh_position[i] = value,
                Channel::MeshRotation(i) => self.mesh_rotation[i] = value,
                Channel::CameraPosition(i) => self.camera[i] = value,
            }
        }
    }

    impl SequenceTarget for Stage {
        fn set_transparent(&mut self, transparent: bool) {
            self.transparent = transparent;
        }
    }

    fn stage() -> Stage {
        Stage {
            opacity: 1.0,
            camera: [0.0, 2.0, 3.0],
            ..Default::default()
        }
    }

    #[test]
    fn test_fade_spin_fades_in_then_spins() {
        let mut seq = AnimationSequencer::new();
        let mut stage = stage();

        seq.play(Sequence::FadeSpin, 0.0, &mut stage);
        assert!(seq.is_playing());
        assert_eq!(stage.opacity, 0.0);

        seq.update(0.0, &mut stage);
        assert!(stage.transparent);

        seq.update(500.0, &mut stage);
        assert_eq!(stage.opacity, 1.0);

        seq.update(1250.0, &mut stage);
        assert!((stage.mesh_rotation[1] - std::f32::consts::PI).abs() < 1e-3);

        seq.update(2000.0, &mut stage);
        assert!((stage.mesh_rotation[1] - TAU).abs() < 1e-4);
        seq.update(2500.0, &mut stage);
        assert_eq!(stage.opacity, 0.0);
        assert!(seq.is_playing());
    }

    #[test]
    fn test_play_while_playing_resumes_instead_of_restarting() {
        let mut seq = AnimationSequencer::new();
        let mut stage = stage();

        seq.play(Sequence::FadeSpin, 0.0, &mut stage);
        seq.update(250.0, &mut stage);
        seq.pause(250.0);
        let paused_opacity = stage.opacity;

        seq.play(Sequence::FadeSpin, 1000.0, &mut stage);
        assert_eq!(stage.opacity, paused_opacity);
        seq.update(1100.0, &mut stage);
        assert!((stage.opacity - 0.7).abs() < 1e-4);
    }

    #[test]
    fn test_other_sequence_does_not_start_while_playing() {
        let mut seq = AnimationSequencer::new();
        let mut stage = stage();

        seq.play(Sequence::FadeSpin, 0.0, &mut stage);
        seq.play(Sequence::BounceFlythrough, 0.0, &mut stage);
        seq.update(500.0, &mut stage);
        assert_eq!(stage.mesh_position[1], 0.0);
        assert_eq!(stage.camera, [0.0, 2.0, 3.0]);
    }

    #[test]
    fn test_flythrough_returns_camera_and_clears_flag() {
        let mut seq = AnimationSequencer::new();
        let mut stage = stage();

        seq.play(Sequence::BounceFlythrough, 0.0, &mut stage);
        let tick = seq.update(500.0, &mut stage);
        assert!(tick.camera_moving);
        assert!(stage.mesh_position[1] > 0.0);

        seq.update(1000.0, &mut stage);
        assert!((stage.camera[2] - 16.0).abs() < 1e-4);
        seq.update(7000.0, &mut stage);
        assert!((stage.camera[2] + 16.0).abs() < 1e-3);
        assert!(stage.camera[0].abs() < 1e-3);

        let mut t = 7000.0;
        while t <= 14000.0 {
            t += 100.0;
            seq.update(t, &mut stage);
        }
        assert!(!seq.is_playing());
        assert!((stage.camera[2] - 3.0).abs() < 1e-4);
        assert!(seq.group().active().is_empty());
        assert!(!seq.update(t + 100.0, &mut stage).camera_moving);
    }

    #[test]
    fn test_stop_halts_every_chain() {
        let mut seq = AnimationSequencer::new();
        let mut stage = stage();

        seq.play(Sequence::BounceFlythrough, 0.0, &mut stage);
        seq.update(3000.0, &mut stage);
        seq.stop();
        assert!(!seq.is_playing());
        assert!(seq.group().active().is_empty());

        let camera = stage.camera;
        seq.update(5000.0, &mut stage);
        assert_eq!(stage.camera, camera);
    }

    #[test]
    fn test_rebuild_discards_running_tweens() {
        let mut seq = AnimationSequencer::new();
        let mut stage = stage();
        seq.play(Sequence::FadeSpin, 0.0, &mut stage);
        seq.stop();
        seq.rebuild();
        assert!(seq.group().active().is_empty());

        seq.play(Sequence::FadeSpin, 0.0, &mut stage);
        seq.update(250.0, &mut stage);
        assert!((stage.opacity - 0.5).abs() < 1e-6);
    }
}
