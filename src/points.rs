//! Tracked points and their per-family touch rows.
//!
//! Each point owns its row of "was inside last evaluation" flags, one per
//! family. Inserting or removing a point therefore adds or drops its row in
//! the same operation; there is no second collection to keep in step.

use glam::DVec2;

use crate::grid::FamilyId;
use crate::log::debug;

/// Stable identity of a tracked point. Never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub u64);

/// A point marker plus its touch bookkeeping.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedPoint {
    id: PointId,
    position: DVec2,
    touching: Box<[bool]>,
}

impl TrackedPoint {
    pub fn id(&self) -> PointId {
        self.id
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Whether the point was inside `family`'s band at the last evaluation.
    pub fn is_touching(&self, family: FamilyId) -> bool {
        self.touching.get(family.0).copied().unwrap_or(false)
    }

    /// Record the new state, returning the previous one.
    pub(crate) fn swap_touching(&mut self, family: usize, inside: bool) -> bool {
        std::mem::replace(&mut self.touching[family], inside)
    }

    pub(crate) fn touch_row(&self) -> &[bool] {
        &self.touching
    }
}

/// Insertion-ordered set of tracked points.
#[derive(Clone, Debug)]
pub struct PointSet {
    family_count: usize,
    points: Vec<TrackedPoint>,
    next_id: u64,
}

impl PointSet {
    /// An empty set for a scene with `family_count` families.
    pub fn new(family_count: usize) -> Self {
        PointSet {
            family_count,
            points: Vec::new(),
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn family_count(&self) -> usize {
        self.family_count
    }

    /// Append a point. Its touch row starts all-`false`, so a point placed
    /// inside a band triggers on the next evaluation.
    pub fn insert(&mut self, position: DVec2) -> PointId {
        let id = PointId(self.next_id);
        self.next_id += 1;
        self.points.push(TrackedPoint {
            id,
            position,
            touching: vec![false; self.family_count].into_boxed_slice(),
        });
        debug!(id = id.0, x = position.x, y = position.y, "point inserted");
        id
    }

    /// Remove the point at `index` (insertion order).
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`. Callers check bounds first.
    pub fn remove_at(&mut self, index: usize) -> TrackedPoint {
        let removed = self.points.remove(index);
        debug!(id = removed.id.0, index, "point removed");
        removed
    }

    /// Remove the point with `id`, if it still exists.
    pub fn remove(&mut self, id: PointId) -> Option<TrackedPoint> {
        let index = self.index_of(id)?;
        Some(self.remove_at(index))
    }

    pub fn index_of(&self, id: PointId) -> Option<usize> {
        self.points.iter().position(|p| p.id == id)
    }

    pub fn get(&self, id: PointId) -> Option<&TrackedPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackedPoint> {
        self.points.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, TrackedPoint> {
        self.points.iter_mut()
    }

    /// The closest point within `radius` of `cursor`. Ties go to the later
    /// point.
    pub fn nearest_within(&self, cursor: DVec2, radius: f64) -> Option<PointId> {
        let mut best: Option<(PointId, f64)> = None;
        for p in &self.points {
            let d = p.position.distance(cursor);
            if d > radius {
                continue;
            }
            if best.is_none_or(|(_, bd)| d <= bd) {
                best = Some((p.id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    /// `(families, points)`: the dimensions of the touch table.
    pub fn touch_shape(&self) -> (usize, usize) {
        (self.family_count, self.points.len())
    }

    /// Whether every row has exactly one entry per family.
    pub fn rows_consistent(&self) -> bool {
        self.points
            .iter()
            .all(|p| p.touch_row().len() == self.family_count)
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a TrackedPoint;
    type IntoIter = std::slice::Iter<'a, TrackedPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn insert_appends_false_row() {
        let mut set = PointSet::new(3);
        let id = set.insert(dvec2(1.0, 2.0));
        let p = set.get(id).unwrap();
        assert_eq!(p.touch_row(), &[false, false, false]);
        assert_eq!(set.touch_shape(), (3, 1));
    }

    #[test]
    fn ids_are_never_reused() {
        let mut set = PointSet::new(1);
        let a = set.insert(dvec2(0.0, 0.0));
        set.remove(a);
        let b = set.insert(dvec2(0.0, 0.0));
        assert_ne!(a, b);
    }

    #[test]
    fn remove_by_id_and_index() {
        let mut set = PointSet::new(2);
        let a = set.insert(dvec2(0.0, 0.0));
        let b = set.insert(dvec2(1.0, 0.0));
        let c = set.insert(dvec2(2.0, 0.0));

        assert_eq!(set.remove_at(1).id(), b);
        assert_eq!(set.index_of(c), Some(1));
        assert_eq!(set.remove(a).map(|p| p.id()), Some(a));
        assert!(set.remove(a).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    #[should_panic]
    fn remove_at_out_of_range_panics() {
        let mut set = PointSet::new(1);
        set.insert(dvec2(0.0, 0.0));
        set.remove_at(1);
    }

    #[test]
    fn removal_keeps_other_rows_intact() {
        let mut set = PointSet::new(2);
        let a = set.insert(dvec2(0.0, 0.0));
        let b = set.insert(dvec2(1.0, 0.0));
        for p in set.iter_mut() {
            if p.id() == b {
                p.swap_touching(1, true);
            }
        }
        set.remove(a);
        let b_point = set.get(b).unwrap();
        assert!(!b_point.is_touching(FamilyId(0)));
        assert!(b_point.is_touching(FamilyId(1)));
    }

    #[test]
    fn shape_tracks_arbitrary_mutation_sequences() {
        let mut set = PointSet::new(4);
        // Deterministic pseudo-random walk of inserts and removals
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        for step in 0..500 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            if set.is_empty() || state % 3 != 0 {
                set.insert(dvec2(step as f64, 0.0));
            } else {
                let index = (state as usize / 3) % set.len();
                set.remove_at(index);
            }
            assert_eq!(set.touch_shape(), (4, set.len()));
            assert!(set.rows_consistent());
        }
    }

    #[test]
    fn nearest_within_picks_closest_in_radius() {
        let mut set = PointSet::new(1);
        let _far = set.insert(dvec2(100.0, 100.0));
        let near = set.insert(dvec2(3.0, 4.0));
        let nearer = set.insert(dvec2(1.0, 1.0));

        assert_eq!(set.nearest_within(dvec2(0.0, 0.0), 10.0), Some(nearer));
        assert_eq!(set.nearest_within(dvec2(3.0, 5.0), 10.0), Some(near));
        assert_eq!(set.nearest_within(dvec2(50.0, 50.0), 10.0), None);
    }

    #[test]
    fn nearest_within_radius_is_inclusive_and_ties_go_to_the_later_point() {
        let mut set = PointSet::new(1);
        let first = set.insert(dvec2(10.0, 0.0));
        let second = set.insert(dvec2(-10.0, 0.0));
        assert_eq!(set.nearest_within(dvec2(0.0, 0.0), 10.0), Some(second));

        // A closer point still wins regardless of order
        let third = set.insert(dvec2(0.0, 9.0));
        assert_eq!(set.nearest_within(dvec2(0.0, 0.0), 10.0), Some(third));
        set.remove(third);
        set.remove(second);
        assert_eq!(set.nearest_within(dvec2(0.0, 0.0), 10.0), Some(first));
    }
}
