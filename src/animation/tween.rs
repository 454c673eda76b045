//! Property tweens and the group that drives them.
//!
//! A [`Tween`] animates one or more [`Channel`]s of an [`Animatable`] target
//! towards end values over a fixed duration. Tweens live in a [`TweenGroup`]
//! arena and refer to each other by [`TweenId`], so chains may be cyclic.
//! Hooks are reported as [`TweenEvent`]s from [`TweenGroup::update`] rather
//! than stored as callbacks.

use log::debug;

use super::easing::Easing;

pub type TweenId = usize;

pub const DEFAULT_DURATION_MS: f64 = 1000.0;

/// Upper bound on update passes per frame. Tweens started by a completing
/// chain are updated in the same frame, one pass per link.
const MAX_UPDATE_PASSES: usize = 64;

/// A scalar property a tween can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Opacity of the active material
    Opacity,
    /// One axis (0..3) of the mesh position
    MeshPosition(usize),
    /// One euler angle (0..3) of the mesh, in radians
    MeshRotation(usize),
    /// One axis (0..3) of the camera position
    CameraPosition(usize),
}

/// Anything a tween group can animate.
pub trait Animatable {
    /// Current value of `channel`, captured when a tween starts
    fn read(&self, channel: Channel) -> f32;

    /// Stores an interpolated value
    fn write(&mut self, channel: Channel, value: f32);
}

/// How multi-point targets are traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Bezier,
}

impl Interpolation {
    /// Samples the path `points` at progress `k`.
    ///
    /// Linear paths extrapolate from the first or last segment when `k`
    /// leaves `[0, 1]`, as eased progress may overshoot.
    ///
    /// # Arguments
    /// * `points` - Start value followed by the waypoints
    /// * `k` - Eased progress, nominally in `[0, 1]`
    ///
    /// # Returns
    /// The interpolated value; 0 for an empty path
    pub fn sample(self, points: &[f32], k: f32) -> f32 {
        match points {
            [] => 0.0,
            [only] => *only,
            _ => match self {
                Interpolation::Linear => linear_path(points, k),
                Interpolation::Bezier => bezier_path(points, k),
            },
        }
    }
}

fn lerp(p0: f32, p1: f32, t: f32) -> f32 {
    (p1 - p0) * t + p0
}

fn linear_path(v: &[f32], k: f32) -> f32 {
    let m = v.len() - 1;
    let f = m as f32 * k;
    if k < 0.0 {
        return lerp(v[0], v[1], f);
    }
    if k > 1.0 {
        return lerp(v[m], v[m - 1], m as f32 - f);
    }
    let i = (f.floor() as usize).min(m);
    lerp(v[i], v[(i + 1).min(m)], f - i as f32)
}

fn bezier_path(v: &[f32], k: f32) -> f32 {
    let n = v.len() - 1;
    v.iter()
        .enumerate()
        .map(|(i, p)| {
            (1.0 - k).powi((n - i) as i32) * k.powi(i as i32) * p * binomial(n, i)
        })
        .sum()
}

fn binomial(n: usize, i: usize) -> f32 {
    let factorial = |x: usize| (1..=x).map(|v| v as f32).product::<f32>();
    factorial(n) / factorial(i) / factorial(n - i)
}

/// Lifecycle notifications produced while updating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenEvent {
    Started(TweenId),
    Completed(TweenId),
}

/// One animation step: end values per channel, a duration, an easing and
/// the steps it starts when it completes.
///
/// Built with [`Tween::to`] or [`Tween::through`] and the builder methods,
/// then added to a [`TweenGroup`] which owns its runtime state.
#[derive(Debug, Clone)]
pub struct Tween {
    targets: Vec<(Channel, Vec<f32>)>,
    start_values: Vec<f32>,
    duration_ms: f64,
    easing: Easing,
    interpolation: Interpolation,
    chained: Vec<TweenId>,
    start_time: f64,
    pause_start: f64,
    playing: bool,
    paused: bool,
    start_fired: bool,
    chain_stopped: bool,
}

impl Tween {
    /// Tween to a single end value per channel.
    pub fn to(targets: &[(Channel, f32)]) -> Self {
        Self::through(targets.iter().map(|(c, v)| (*c, vec![*v])).collect())
    }

    /// Tween along a list of waypoints per channel, starting from the value
    /// the channel holds when the tween starts.
    pub fn through(targets: Vec<(Channel, Vec<f32>)>) -> Self {
        Self {
            targets,
            start_values: Vec::new(),
            duration_ms: DEFAULT_DURATION_MS,
            easing: Easing::Linear,
            interpolation: Interpolation::Linear,
            chained: Vec::new(),
            start_time: 0.0,
            pause_start: 0.0,
            playing: false,
            paused: false,
            start_fired: false,
            chain_stopped: false,
        }
    }

    /// Sets the duration in milliseconds; zero completes on the first update.
    pub fn duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Playing includes paused.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Paused tweens keep their progress until resumed.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Steps started when this one completes
    pub fn chained(&self) -> &[TweenId] {
        &self.chained
    }

    fn begin<T: Animatable + ?Sized>(&mut self, time: f64, target: &T) {
        self.playing = true;
        self.paused = false;
        self.start_fired = false;
        self.chain_stopped = false;
        self.start_time = time;
        self.start_values = self.targets.iter().map(|(c, _)| target.read(*c)).collect();
    }

    fn progress(&self, time: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            ((time - self.start_time) / self.duration_ms).clamp(0.0, 1.0) as f32
        }
    }

    fn apply<T: Animatable + ?Sized>(&self, eased: f32, target: &mut T) {
        for ((channel, ends), start) in self.targets.iter().zip(&self.start_values) {
            let value = if ends.len() == 1 {
                start + (ends[0] - start) * eased
            } else {
                let mut path = Vec::with_capacity(ends.len() + 1);
                path.push(*start);
                path.extend_from_slice(ends);
                self.interpolation.sample(&path, eased)
            };
            target.write(*channel, value);
        }
    }
}

/// Arena of tweens plus the set of currently active ones.
#[derive(Debug, Default)]
pub struct TweenGroup {
    tweens: Vec<Tween>,
    active: Vec<TweenId>,
}

impl TweenGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an idle tween.
    ///
    /// # Returns
    /// The id used to start, chain and query it
    pub fn add(&mut self, tween: Tween) -> TweenId {
        self.tweens.push(tween);
        self.tweens.len() - 1
    }

    /// Starts `next` when `id` completes.
    ///
    /// Chains may loop back to an earlier step; such a sequence runs until
    /// it is stopped.
    pub fn chain(&mut self, id: TweenId, next: TweenId) {
        if let Some(tween) = self.tweens.get_mut(id) {
            tween.chained.push(next);
        }
    }

    pub fn get(&self, id: TweenId) -> Option<&Tween> {
        self.tweens.get(id)
    }

    pub fn is_playing(&self, id: TweenId) -> bool {
        self.get(id).is_some_and(Tween::is_playing)
    }

    pub fn is_paused(&self, id: TweenId) -> bool {
        self.get(id).is_some_and(Tween::is_paused)
    }

    /// Tweens currently advanced by [`update`](Self::update).
    pub fn active(&self) -> &[TweenId] {
        &self.active
    }

    /// Starts a tween, capturing the target's current values as its origin.
    ///
    /// Restarting a running tween recaptures its origin and restarts the
    /// clock. Unknown ids are ignored.
    ///
    /// # Arguments
    /// * `id` - Tween to start
    /// * `time` - Start time in milliseconds
    /// * `target` - Read for the start values
    pub fn start<T: Animatable + ?Sized>(&mut self, id: TweenId, time: f64, target: &T) {
        let Some(tween) = self.tweens.get_mut(id) else {
            return;
        };
        tween.begin(time, target);
        if !self.active.contains(&id) {
            self.active.push(id);
        }
    }

    /// Stops a tween and, once per stop, everything chained after it.
    ///
    /// The once-per-stop guard lets a cyclic chain terminate. Values written
    /// so far are left in place.
    pub fn stop(&mut self, id: TweenId) {
        let Some(tween) = self.tweens.get_mut(id) else {
            return;
        };
        let chained = if tween.chain_stopped {
            Vec::new()
        } else {
            tween.chain_stopped = true;
            tween.chained.clone()
        };
        let was_playing = tween.playing;
        tween.playing = false;
        tween.paused = false;
        if was_playing {
            self.active.retain(|&a| a != id);
        }
        for next in chained {
            self.stop(next);
        }
    }

    /// Stops everything chained after `id` but not `id` itself, used to
    /// end an open-ended chain from one of its completion events.
    pub fn stop_chained(&mut self, id: TweenId) {
        let chained = self.get(id).map(|t| t.chained.clone()).unwrap_or_default();
        for next in chained {
            self.stop(next);
        }
    }

    /// Pauses a playing tween and takes it out of the active set.
    ///
    /// # Arguments
    /// * `id` - Tween to pause; ignored if idle or already paused
    /// * `time` - Pause time, used to shift the clock on resume
    pub fn pause(&mut self, id: TweenId, time: f64) {
        let Some(tween) = self.tweens.get_mut(id) else {
            return;
        };
        if tween.paused || !tween.playing {
            return;
        }
        tween.paused = true;
        tween.pause_start = time;
        self.active.retain(|&a| a != id);
    }

    /// Pauses every active tween at `time`
    pub fn pause_all(&mut self, time: f64) {
        for id in self.active.clone() {
            self.pause(id, time);
        }
    }

    /// Resumes a paused tween, shifting its start by the paused interval.
    pub fn resume(&mut self, id: TweenId, time: f64) {
        let Some(tween) = self.tweens.get_mut(id) else {
            return;
        };
        if !tween.paused || !tween.playing {
            return;
        }
        tween.paused = false;
        tween.start_time += time - tween.pause_start;
        self.active.push(id);
    }

    /// Drops every tween. Outstanding ids become dangling and are ignored.
    pub fn remove_all(&mut self) {
        self.tweens.clear();
        self.active.clear();
    }

    /// Advances every active tween to `time`, writing into `target`.
    ///
    /// A completed tween starts its chained steps at its own end time, and
    /// those are advanced in the same call so no frame is lost between
    /// links. Tweens whose start lies in the future are skipped.
    ///
    /// # Arguments
    /// * `time` - Current time in milliseconds
    /// * `target` - Values are read at start and written every update
    ///
    /// # Returns
    /// Start and completion events in the order they happened
    pub fn update<T: Animatable + ?Sized>(&mut self, time: f64, target: &mut T) -> Vec<TweenEvent> {
        let mut events = Vec::new();
        let mut pending = self.active.clone();
        let mut passes = 0;

        while !pending.is_empty() && passes < MAX_UPDATE_PASSES {
            passes += 1;
            let mut started = Vec::new();

            for id in pending {
                if !self.active.contains(&id) {
                    continue;
                }
                let tween = &mut self.tweens[id];
                if time < tween.start_time {
                    continue;
                }
                if !tween.start_fired {
                    tween.start_fired = true;
                    events.push(TweenEvent::Started(id));
                }
                let progress = tween.progress(time);
                tween.apply(tween.easing.apply(progress), target);

                if progress >= 1.0 {
                    tween.playing = false;
                    let end = tween.start_time + tween.duration_ms;
                    let chained = tween.chained.clone();
                    self.active.retain(|&a| a != id);
                    events.push(TweenEvent::Completed(id));
                    debug!("Tween {id} completed");

                    for next in chained {
                        self.start(next, end, &*target);
                        started.push(next);
                    }
                }
            }
            pending = started;
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Props {
        opacity: f32,
        position: [f32; 3],
    }

    impl Animatable for Props {
        fn read(&self, channel: Channel) -> f32 {
            match channel {
                Channel::Opacity => self.opacity,
                Channel::MeshPosition(i) => self.position[i],
                _ => 0.0,
            }
        }

        fn write(&mut self, channel: Channel, value: f32) {
            match channel {
                Channel::Opacity => self.opacity = value,
                Channel::MeshPosition(i) => self.position[i] = value,
                _ => {}
            }
        }
    }

    #[test]
    fn test_single_tween_reaches_target() {
        let mut group = TweenGroup::new();
        let mut props = Props::default();
        let id = group.add(Tween::to(&[(Channel::Opacity, 1.0)]).duration(500.0));

        group.start(id, 0.0, &props);
        let events = group.update(250.0, &mut props);
        assert_eq!(events, vec![TweenEvent::Started(id)]);
        assert!((props.opacity - 0.5).abs() < 1e-6);

        let events = group.update(600.0, &mut props);
        assert_eq!(events, vec![TweenEvent::Completed(id)]);
        assert_eq!(props.opacity, 1.0);
        assert!(!group.is_playing(id));
        assert!(group.active().is_empty());
    }

    #[test]
    fn test_chain_starts_next_at_previous_end() {
        let mut group = TweenGroup::new();
        let mut props = Props::default();
        let a = group.add(Tween::to(&[(Channel::MeshPosition(1), 10.0)]).duration(100.0));
        let b = group.add(Tween::to(&[(Channel::MeshPosition(1), 0.0)]).duration(100.0));
        group.chain(a, b);

        group.start(a, 0.0, &props);
        let events = group.update(150.0, &mut props);

        assert!(events.contains(&TweenEvent::Completed(a)));
        assert!(events.contains(&TweenEvent::Started(b)));
        assert!(group.is_playing(b));
        // b started at t=100 from y=10 and is half way back
        assert!((props.position[1] - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_cyclic_chain_keeps_running_and_stops() {
        let mut group = TweenGroup::new();
        let mut props = Props::default();
        let up = group.add(Tween::to(&[(Channel::MeshPosition(1), 1.0)]).duration(10.0));
        let down = group.add(Tween::to(&[(Channel::MeshPosition(1), 0.0)]).duration(10.0));
        group.chain(up, down);
        group.chain(down, up);

        group.start(up, 0.0, &props);
        for step in 1..=20 {
            group.update(step as f64 * 7.0, &mut props);
        }
        assert_eq!(group.active().len(), 1);

        group.stop_chained(up);
        assert!(group.active().is_empty());
        assert!(!group.is_playing(up));
        assert!(!group.is_playing(down));
    }

    #[test]
    fn test_pause_and_resume_shift_the_timeline() {
        let mut group = TweenGroup::new();
        let mut props = Props::default();
        let id = group.add(Tween::to(&[(Channel::Opacity, 1.0)]).duration(100.0));

        group.start(id, 0.0, &props);
        group.update(50.0, &mut props);
        group.pause(id, 50.0);
        assert!(group.is_paused(id));
        assert!(group.is_playing(id));

        group.update(500.0, &mut props);
        assert!((props.opacity - 0.5).abs() < 1e-6);

        group.resume(id, 1000.0);
        group.update(1025.0, &mut props);
        assert!((props.opacity - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_bezier_passes_through_endpoints() {
        let path = [16.0, 0.0, -16.0];
        assert_eq!(Interpolation::Bezier.sample(&path, 0.0), 16.0);
        assert_eq!(Interpolation::Bezier.sample(&path, 1.0), -16.0);
        assert!((Interpolation::Bezier.sample(&path, 0.5)).abs() < 1e-6);
        assert!((Interpolation::Linear.sample(&[0.0, 10.0, 0.0], 0.25) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_waypoints_start_from_current_value() {
        let mut group = TweenGroup::new();
        let mut props = Props::default();
        props.position[0] = 4.0;
        let id = group.add(
            Tween::through(vec![(Channel::MeshPosition(0), vec![-4.0, 0.0])])
                .duration(100.0)
                .interpolation(Interpolation::Bezier),
        );
        group.start(id, 0.0, &props);
        group.update(0.0, &mut props);
        assert_eq!(props.position[0], 4.0);
        group.update(100.0, &mut props);
        assert_eq!(props.position[0], 0.0);
    }

    #[test]
    fn test_remove_all_ignores_stale_ids() {
        let mut group = TweenGroup::new();
        let mut props = Props::default();
        let id = group.add(Tween::to(&[(Channel::Opacity, 1.0)]));
        group.start(id, 0.0, &props);
        group.remove_all();
        group.stop(id);
        group.resume(id, 10.0);
        assert!(group.update(10.0, &mut props).is_empty());
    }
}
