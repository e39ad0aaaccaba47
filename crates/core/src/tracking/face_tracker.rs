//! Face id issuer for one continuous detection run.
//!
//! Two-stage association: confident observations are matched to present
//! faces first, then weak observations may only extend faces that are
//! still unmatched. Weak observations never start a face, so a spurious
//! detection cannot consume an id.
//!
//! Ids start at 1, increase monotonically, and are never reissued, even
//! after [`FaceTracker::end_run`].
use crate::metadata::domain::face_object::{FaceId, FaceObject};
use crate::metadata::domain::metadata_error::MetadataError;
use crate::metadata::domain::metadata_object::MetadataBase;
use crate::metadata::domain::object_type::ObjectType;
use crate::shared::geometry::Rect;
use crate::shared::media_time::MediaTime;

/// Frames a face may go undetected before it counts as having left.
/// Zero: missing from one processed frame means the face left.
pub const DEFAULT_MAX_LOST: usize = 0;

const HIGH_THRESH: f64 = 0.5;
const MATCH_THRESH: f64 = 0.3;

/// One face found by the detector in one frame, not yet identified.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceObservation {
    pub bounds: Rect,
    pub score: f64,
    pub time: MediaTime,
    pub duration: MediaTime,
    pub roll_angle: Option<f64>,
    pub yaw_angle: Option<f64>,
}

impl FaceObservation {
    pub fn new(bounds: Rect, score: f64) -> Self {
        Self {
            bounds,
            score,
            time: MediaTime::INVALID,
            duration: MediaTime::INVALID,
            roll_angle: None,
            yaw_angle: None,
        }
    }

    fn is_confident(&self) -> bool {
        self.score >= HIGH_THRESH
    }
}

#[derive(Clone, Debug)]
struct Track {
    id: FaceId,
    bounds: Rect,
    frames_lost: usize,
    /// Seen in the frame being processed (or the last one, between updates).
    present: bool,
}

pub struct FaceTracker {
    tracks: Vec<Track>,
    next_id: u64,
    issued: u64,
    max_lost: usize,
}

impl FaceTracker {
    pub fn new(max_lost: usize) -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 1,
            issued: 0,
            max_lost,
        }
    }

    /// Identifies the faces of one processed frame, in observation order.
    ///
    /// Weak observations that extend no present face are dropped.
    pub fn update(
        &mut self,
        observations: &[FaceObservation],
    ) -> Result<Vec<FaceObject>, MetadataError> {
        Ok(self.identify(observations)?.into_iter().flatten().collect())
    }

    /// Like [`update`](Self::update), but aligned with `observations`:
    /// entry `i` is the face for observation `i`, or `None` when it was
    /// dropped.
    ///
    /// Observations are validated before any tracking state changes, so an
    /// invalid frame leaves the run untouched.
    pub fn identify(
        &mut self,
        observations: &[FaceObservation],
    ) -> Result<Vec<Option<FaceObject>>, MetadataError> {
        let pending = observations
            .iter()
            .map(unidentified_face)
            .collect::<Result<Vec<_>, _>>()?;

        for track in &mut self.tracks {
            track.present = false;
        }

        let (confident, weak): (Vec<usize>, Vec<usize>) =
            (0..observations.len()).partition(|&i| observations[i].is_confident());
        let mut assigned: Vec<Option<FaceId>> = vec![None; observations.len()];

        for candidates in [&confident, &weak] {
            for (t, o) in pair_by_overlap(&self.tracks, observations, candidates) {
                let track = &mut self.tracks[t];
                track.bounds = observations[o].bounds;
                track.frames_lost = 0;
                track.present = true;
                assigned[o] = Some(track.id);
            }
        }

        for &o in &confident {
            if assigned[o].is_none() {
                assigned[o] = Some(self.open_track(observations[o].bounds));
            }
        }
        self.forget_departed();

        Ok(assigned
            .into_iter()
            .zip(pending)
            .map(|(id, face)| id.map(|id| face.with_face_id(id)))
            .collect())
    }

    /// Ids of faces detected in the most recent frame.
    pub fn present_ids(&self) -> Vec<FaceId> {
        self.tracks
            .iter()
            .filter(|t| t.present)
            .map(|t| t.id)
            .collect()
    }

    /// Number of ids handed out so far in this tracker's lifetime.
    pub fn issued_count(&self) -> u64 {
        self.issued
    }

    /// Keeps `id` and every id below it out of this tracker's issue
    /// sequence, for runs where some faces arrive already identified.
    pub fn reserve_through(&mut self, id: FaceId) {
        self.next_id = self.next_id.max(id.0.saturating_add(1));
    }

    /// Every face leaves. The id counter is not rewound.
    pub fn end_run(&mut self) {
        log::debug!("ending detection run with {} tracked faces", self.tracks.len());
        self.tracks.clear();
    }

    fn open_track(&mut self, bounds: Rect) -> FaceId {
        let id = FaceId(self.next_id);
        self.next_id += 1;
        self.issued += 1;
        log::debug!("face {id} entered");
        self.tracks.push(Track {
            id,
            bounds,
            frames_lost: 0,
            present: true,
        });
        id
    }

    fn forget_departed(&mut self) {
        let max_lost = self.max_lost;
        self.tracks.retain_mut(|track| {
            if track.present {
                return true;
            }
            track.frames_lost += 1;
            let stays = track.frames_lost <= max_lost;
            if !stays {
                log::debug!("face {} left", track.id);
            }
            stays
        });
    }
}

impl Default for FaceTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOST)
    }
}

/// Placeholder id 0 is never issued; it is replaced once the track is known.
fn unidentified_face(obs: &FaceObservation) -> Result<FaceObject, MetadataError> {
    let base = MetadataBase::new(obs.time, obs.duration, obs.bounds, ObjectType::Face)?;
    FaceObject::new(base, FaceId(0), obs.roll_angle, obs.yaw_angle)
}

/// Pairs tracks not yet seen this frame with candidate observations,
/// highest overlap first. Each side is used at most once and pairs below
/// `MATCH_THRESH` are never formed.
fn pair_by_overlap(
    tracks: &[Track],
    observations: &[FaceObservation],
    candidates: &[usize],
) -> Vec<(usize, usize)> {
    let mut scored: Vec<(f64, usize, usize)> = tracks
        .iter()
        .enumerate()
        .filter(|(_, track)| !track.present)
        .flat_map(move |(t, track)| {
            candidates
                .iter()
                .map(move |&o| (track.bounds.iou(&observations[o].bounds), t, o))
        })
        .filter(|&(overlap, _, _)| overlap >= MATCH_THRESH)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut track_taken = vec![false; tracks.len()];
    let mut obs_taken = vec![false; observations.len()];
    let mut pairs = Vec::new();
    for (_, t, o) in scored {
        if !track_taken[t] && !obs_taken[o] {
            track_taken[t] = true;
            obs_taken[o] = true;
            pairs.push((t, o));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn obs(x: f64, y: f64, w: f64, h: f64, score: f64) -> FaceObservation {
        FaceObservation::new(Rect::new(x, y, w, h), score)
    }

    fn ids(faces: &[FaceObject]) -> Vec<FaceId> {
        faces.iter().map(FaceObject::face_id).collect()
    }

    #[test]
    fn test_new_faces_get_unique_ids() {
        let mut tracker = FaceTracker::default();
        let faces = tracker
            .update(&[obs(0.0, 0.0, 50.0, 50.0, 0.9), obs(100.0, 100.0, 50.0, 50.0, 0.8)])
            .unwrap();
        assert_eq!(faces.len(), 2);
        assert_ne!(faces[0].face_id(), faces[1].face_id());
    }

    #[test]
    fn test_ids_start_at_one() {
        let mut tracker = FaceTracker::default();
        let faces = tracker.update(&[obs(0.0, 0.0, 50.0, 50.0, 0.9)]).unwrap();
        assert_eq!(faces[0].face_id(), FaceId(1));
        assert_eq!(tracker.issued_count(), 1);
    }

    #[test]
    fn test_consistent_id_across_frames() {
        let mut tracker = FaceTracker::default();
        let first = tracker.update(&[obs(10.0, 10.0, 50.0, 50.0, 0.9)]).unwrap();
        let second = tracker.update(&[obs(12.0, 12.0, 50.0, 50.0, 0.9)]).unwrap();
        assert_eq!(ids(&second), ids(&first));
    }

    #[test]
    fn test_face_leaves_and_new_face_gets_fresh_id() {
        // Face A in frames 1-2, gone in frame 3 where face B appears
        let mut tracker = FaceTracker::default();
        let a = obs(10.0, 10.0, 50.0, 50.0, 0.9);
        let f1 = tracker.update(std::slice::from_ref(&a)).unwrap();
        let f2 = tracker.update(std::slice::from_ref(&a)).unwrap();
        assert_eq!(ids(&f1), vec![FaceId(1)]);
        assert_eq!(ids(&f2), vec![FaceId(1)]);

        let f3 = tracker.update(&[obs(300.0, 200.0, 60.0, 60.0, 0.9)]).unwrap();
        assert_eq!(ids(&f3), vec![FaceId(2)]);
    }

    #[test]
    fn test_reentering_face_gets_new_id() {
        let mut tracker = FaceTracker::default();
        let a = obs(10.0, 10.0, 50.0, 50.0, 0.9);
        tracker.update(std::slice::from_ref(&a)).unwrap();
        tracker.update(&[]).unwrap();
        let back = tracker.update(std::slice::from_ref(&a)).unwrap();
        assert_eq!(ids(&back), vec![FaceId(2)]);
    }

    #[test]
    fn test_grace_frames_bridge_detection_dropouts() {
        let mut tracker = FaceTracker::new(2);
        let a = obs(10.0, 10.0, 50.0, 50.0, 0.9);
        tracker.update(std::slice::from_ref(&a)).unwrap();
        assert!(tracker.update(&[]).unwrap().is_empty());
        assert!(tracker.present_ids().is_empty());
        let back = tracker.update(std::slice::from_ref(&a)).unwrap();
        assert_eq!(ids(&back), vec![FaceId(1)]);
    }

    #[test]
    fn test_lost_track_removed_after_grace() {
        let mut tracker = FaceTracker::new(1);
        let a = obs(10.0, 10.0, 50.0, 50.0, 0.9);
        tracker.update(std::slice::from_ref(&a)).unwrap();
        tracker.update(&[]).unwrap();
        tracker.update(&[]).unwrap();
        let back = tracker.update(std::slice::from_ref(&a)).unwrap();
        assert_eq!(ids(&back), vec![FaceId(2)]);
    }

    #[test]
    fn test_low_confidence_never_starts_a_face() {
        let mut tracker = FaceTracker::default();
        assert!(tracker.update(&[obs(0.0, 0.0, 50.0, 50.0, 0.2)]).unwrap().is_empty());
        assert_eq!(tracker.issued_count(), 0);
    }

    #[test]
    fn test_low_confidence_extends_present_face() {
        let mut tracker = FaceTracker::default();
        tracker.update(&[obs(10.0, 10.0, 50.0, 50.0, 0.9)]).unwrap();
        let faces = tracker.update(&[obs(11.0, 11.0, 50.0, 50.0, 0.2)]).unwrap();
        assert_eq!(ids(&faces), vec![FaceId(1)]);
    }

    #[test]
    fn test_concurrent_faces_never_share_ids() {
        let mut tracker = FaceTracker::default();
        for frame in 0..10 {
            let shift = frame as f64;
            let observations: Vec<_> = (0..5)
                .map(|i| obs(i as f64 * 100.0 + shift, 0.0, 50.0, 50.0, 0.9))
                .collect();
            let faces = tracker.update(&observations).unwrap();
            let unique: HashSet<_> = ids(&faces).into_iter().collect();
            assert_eq!(unique.len(), faces.len());
        }
        assert_eq!(tracker.issued_count(), 5);
    }

    #[test]
    fn test_ids_never_reissued_across_turnover() {
        let mut tracker = FaceTracker::default();
        let mut seen = HashSet::new();
        for frame in 0..6 {
            // A brand-new face each frame at a disjoint location
            let x = frame as f64 * 200.0;
            let faces = tracker.update(&[obs(x, 0.0, 50.0, 50.0, 0.9)]).unwrap();
            for id in ids(&faces) {
                assert!(seen.insert(id), "id {id} reissued");
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_end_run_keeps_counter() {
        let mut tracker = FaceTracker::default();
        tracker.update(&[obs(10.0, 10.0, 50.0, 50.0, 0.9)]).unwrap();
        tracker.end_run();
        assert!(tracker.present_ids().is_empty());
        let faces = tracker.update(&[obs(10.0, 10.0, 50.0, 50.0, 0.9)]).unwrap();
        assert_eq!(ids(&faces), vec![FaceId(2)]);
    }

    #[test]
    fn test_output_carries_observation_attributes() {
        let mut tracker = FaceTracker::default();
        let observation = FaceObservation {
            roll_angle: Some(-8.0),
            time: MediaTime::new(2, 30),
            ..obs(10.0, 10.0, 50.0, 50.0, 0.9)
        };
        let faces = tracker.update(&[observation]).unwrap();
        assert_relative_eq!(faces[0].try_roll_angle().unwrap(), -8.0);
        assert!(faces[0].try_yaw_angle().is_err());
        assert_eq!(faces[0].base().time(), MediaTime::new(2, 30));
        assert_eq!(faces[0].base().bounds(), Rect::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn test_invalid_observation_leaves_run_untouched() {
        let mut tracker = FaceTracker::default();
        tracker.update(&[obs(10.0, 10.0, 50.0, 50.0, 0.9)]).unwrap();
        let bad = FaceObservation {
            yaw_angle: Some(f64::NAN),
            ..obs(10.0, 10.0, 50.0, 50.0, 0.9)
        };
        assert!(tracker.update(&[bad]).is_err());
        assert_eq!(tracker.present_ids(), vec![FaceId(1)]);
        assert_eq!(tracker.issued_count(), 1);
    }

    #[test]
    fn test_faces_follow_observation_order() {
        let mut tracker = FaceTracker::default();
        tracker.update(&[obs(300.0, 0.0, 50.0, 50.0, 0.9)]).unwrap();
        // The known face is listed second; the new face first
        let faces = tracker
            .update(&[obs(0.0, 0.0, 50.0, 50.0, 0.9), obs(302.0, 0.0, 50.0, 50.0, 0.9)])
            .unwrap();
        assert_eq!(ids(&faces), vec![FaceId(2), FaceId(1)]);
    }

    #[test]
    fn test_identify_aligns_with_observations() {
        let mut tracker = FaceTracker::default();
        let faces = tracker
            .identify(&[obs(0.0, 0.0, 50.0, 50.0, 0.1), obs(100.0, 0.0, 50.0, 50.0, 0.9)])
            .unwrap();
        assert_eq!(faces.len(), 2);
        assert!(faces[0].is_none());
        assert_eq!(faces[1].as_ref().map(FaceObject::face_id), Some(FaceId(1)));
    }

    #[test]
    fn test_reserved_ids_are_skipped() {
        let mut tracker = FaceTracker::default();
        tracker.reserve_through(FaceId(7));
        let faces = tracker.update(&[obs(0.0, 0.0, 50.0, 50.0, 0.9)]).unwrap();
        assert_eq!(ids(&faces), vec![FaceId(8)]);
        assert_eq!(tracker.issued_count(), 1);
    }

    #[test]
    fn test_reserving_below_counter_is_a_no_op() {
        let mut tracker = FaceTracker::default();
        tracker.update(&[obs(0.0, 0.0, 50.0, 50.0, 0.9)]).unwrap();
        tracker.update(&[obs(200.0, 0.0, 50.0, 50.0, 0.9)]).unwrap();
        tracker.reserve_through(FaceId(1));
        let faces = tracker.update(&[obs(400.0, 0.0, 50.0, 50.0, 0.9)]).unwrap();
        assert_eq!(ids(&faces), vec![FaceId(3)]);
    }
}
