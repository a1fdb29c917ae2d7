use uuid::Uuid;

use super::clip::Clip;

/// Ordered clips belonging to one user take.
///
/// Owned by the coordinator. The `generation` is stamped on every
/// asynchronous request so completions from an earlier session can be
/// recognised and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: Uuid,
    generation: u64,
    clips: Vec<Clip>,
    clip_open: bool,
    open_clip_secs: f64,
    recording_attempted: bool,
}

impl Session {
    pub fn new(generation: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            generation,
            clips: Vec::new(),
            clip_open: false,
            open_clip_secs: 0.0,
            recording_attempted: false,
        }
    }

    /// Fresh empty session with the next generation number.
    pub fn next(&self) -> Self {
        Self::new(self.generation.wrapping_add(1))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty() && !self.clip_open
    }

    pub fn is_clip_open(&self) -> bool {
        self.clip_open
    }

    pub fn recording_attempted(&self) -> bool {
        self.recording_attempted
    }

    pub fn last_clip(&self) -> Option<&Clip> {
        self.clips.last()
    }

    /// Duration of all closed clips plus the live duration of the open clip.
    pub fn cumulative_duration(&self) -> f64 {
        let closed: f64 = self.clips.iter().map(|c| c.duration_secs).sum();
        if self.clip_open {
            closed + self.open_clip_secs
        } else {
            closed
        }
    }

    /// Fraction of `max_duration_secs` used so far, clamped to `[0, 1]`.
    pub fn progress(&self, max_duration_secs: f64) -> f64 {
        if max_duration_secs <= 0.0 {
            return 1.0;
        }
        (self.cumulative_duration() / max_duration_secs).clamp(0.0, 1.0)
    }

    pub(crate) fn open_clip(&mut self) {
        self.clip_open = true;
        self.open_clip_secs = 0.0;
        self.recording_attempted = true;
    }

    /// Record engine progress. `cumulative_secs` covers the whole session.
    pub(crate) fn update_progress(&mut self, cumulative_secs: f64) {
        if !self.clip_open {
            return;
        }
        let closed: f64 = self.clips.iter().map(|c| c.duration_secs).sum();
        self.open_clip_secs = (cumulative_secs - closed).max(0.0);
    }

    /// Append a closed clip. Closes the open clip, if any.
    pub(crate) fn append(&mut self, clip: Clip) {
        self.clip_open = false;
        self.open_clip_secs = 0.0;
        self.clips.push(clip);
    }

    /// Drop the open clip without appending anything.
    pub(crate) fn abandon_open_clip(&mut self) {
        self.clip_open = false;
        self.open_clip_secs = 0.0;
    }

    pub(crate) fn clear_clips(&mut self) {
        self.clips.clear();
        self.abandon_open_clip();
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use approx::assert_relative_eq;

    use super::*;

    fn clip(secs: f64) -> Clip {
        Clip::new(PathBuf::from(format!("clip_{}.mov", secs)), secs)
    }

    #[test]
    fn cumulative_includes_open_clip() {
        let mut session = Session::new(0);
        session.open_clip();
        session.update_progress(1.5);
        session.append(clip(2.0));
        session.open_clip();
        session.update_progress(3.25);

        assert_relative_eq!(session.cumulative_duration(), 3.25);
        assert_eq!(session.clip_count(), 1);
        assert!(session.is_clip_open());
    }

    #[test]
    fn progress_is_clamped() {
        let mut session = Session::new(0);
        session.open_clip();
        session.append(clip(9.0));
        session.open_clip();
        session.append(clip(6.0));

        assert_relative_eq!(session.progress(12.0), 1.0);
        assert_relative_eq!(Session::new(0).progress(12.0), 0.0);
    }

    #[test]
    fn next_bumps_generation_and_clears() {
        let mut session = Session::new(7);
        session.open_clip();
        session.append(clip(1.0));

        let fresh = session.next();
        assert_eq!(fresh.generation(), 8);
        assert_eq!(fresh.clip_count(), 0);
        assert!(!fresh.recording_attempted());
        assert_ne!(fresh.id(), session.id());
    }

    #[test]
    fn progress_ignored_when_no_clip_open() {
        let mut session = Session::new(0);
        session.update_progress(4.0);
        assert_relative_eq!(session.cumulative_duration(), 0.0);
    }
}
