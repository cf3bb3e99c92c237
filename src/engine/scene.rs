//! Scene range tracker
//!
//! Scenes do not own entities. They own `[start, end)` slot intervals over
//! the shared attribute pool, one interval per category, recorded while the
//! scene is being declared. Update/draw traversal then walks only the
//! active scene's intervals.
//!
//! A scene moves through three states:
//! - Building: opened by `add_scene`; every interval's start is the
//!   category's current row count. Rows declared now extend the open end.
//! - Finalized: `scene_end_point` snapshots current counts into the ends.
//! - Active: `change_scene` marks the range consulted by traversal.
//!
//! A finalized scene can still grow at runtime: when a row is declared
//! while no scene is Building and this scene is Active, `notify_add_object`
//! advances its end to the new row count.

use super::diag::{DiagKind, DiagLog};
use super::keymap::NameRegistry;
use super::pool::{Category, CategoryCounts};

#[derive(Clone)]
pub struct SceneRange {
    start: CategoryCounts,
    end: CategoryCounts,
    camera: Option<usize>,
    finalized: bool,
}

impl SceneRange {
    fn open_at(counts: CategoryCounts) -> Self {
        Self {
            start: counts,
            end: counts,
            camera: None,
            finalized: false,
        }
    }

    /// The `[start, end)` slot interval for one category.
    pub fn range(&self, cat: Category) -> (usize, usize) {
        (self.start[cat.index()], self.end[cat.index()])
    }

    /// Camera row bound to this scene, if any.
    pub fn camera(&self) -> Option<usize> {
        self.camera
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

pub struct SceneTracker {
    names: NameRegistry,
    ranges: Vec<SceneRange>,
    /// Scene consulted by update/draw traversal.
    current: Option<usize>,
    /// Scene still collecting rows, if any.
    building: Option<usize>,
}

impl SceneTracker {
    pub fn new() -> Self {
        Self {
            names: NameRegistry::new(),
            ranges: Vec::new(),
            current: None,
            building: None,
        }
    }

    pub fn scene_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn scene_index(&self, name: &str) -> Option<usize> {
        self.names.get_index(name)
    }

    pub fn range_at(&self, index: usize) -> Option<&SceneRange> {
        self.ranges.get(index)
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_range(&self) -> Option<&SceneRange> {
        self.current.and_then(|i| self.ranges.get(i))
    }

    pub fn current_scene_name(&self) -> Option<&str> {
        self.current.and_then(|i| self.names.get_key(i))
    }

    /// Open a new scene whose intervals start at the current pool counts.
    ///
    /// A scene still Building is force-finalized first; that is a silent
    /// fallback for a missing `scene_end_point`, logged but not an error.
    /// A duplicate scene name rejects the whole call.
    pub fn add_scene(&mut self, name: &str, counts: CategoryCounts, diag: &mut DiagLog) {
        if self.names.get_index(name).is_some() {
            diag.push(
                DiagKind::DuplicateName,
                format!("scene '{}' already exists", name),
            );
            return;
        }
        if let Some(open) = self.building.take() {
            let open_name = self.names.get_key(open).unwrap_or("?").to_string();
            self.finalize(open, counts);
            diag.push(
                DiagKind::Info,
                format!("scene '{}' force-finalized by add_scene('{}')", open_name, name),
            );
        }
        // Name was checked above, add cannot fail here.
        self.names.add(name, diag);
        self.ranges.push(SceneRange::open_at(counts));
        self.building = Some(self.ranges.len() - 1);
    }

    /// Freeze the Building scene's intervals at the current pool counts.
    /// Without an open scene this is a no-op.
    pub fn scene_end_point(&mut self, counts: CategoryCounts) {
        if let Some(open) = self.building.take() {
            self.finalize(open, counts);
        }
    }

    fn finalize(&mut self, index: usize, counts: CategoryCounts) {
        let range = &mut self.ranges[index];
        range.end = counts;
        range.finalized = true;
    }

    /// Make a scene the one consulted by per-frame traversal.
    /// Does not re-open it for building.
    pub fn change_scene(&mut self, name: &str, diag: &mut DiagLog) -> bool {
        let Some(index) = self.names.get_index(name) else {
            diag.push(DiagKind::NotFound, format!("change_scene: no scene '{}'", name));
            return false;
        };
        if let Some(prev) = self.current_scene_name() {
            diag.push(DiagKind::Info, format!("exiting scene '{}'", prev));
        }
        self.current = Some(index);
        true
    }

    /// Bind a camera row to a scene. The binding overrides the global
    /// default camera during that scene's traversal.
    pub fn set_scene_camera(&mut self, scene: &str, camera_row: usize, diag: &mut DiagLog) {
        let Some(index) = self.names.get_index(scene) else {
            diag.push(
                DiagKind::NotFound,
                format!("set_scene_camera: no scene '{}'", scene),
            );
            return;
        };
        self.ranges[index].camera = Some(camera_row);
    }

    /// A row was just pushed to `cat`, bringing it to `new_count` rows.
    /// While a scene is Building the open end covers it; otherwise the
    /// Active scene (if any) absorbs the row by advancing its end.
    pub fn notify_add_object(&mut self, cat: Category, new_count: usize) {
        if self.building.is_some() {
            return;
        }
        let Some(current) = self.current else { return };
        let end = &mut self.ranges[current].end[cat.index()];
        if *end < new_count {
            *end = new_count;
        }
    }

    /// Drop a scene and renumber every other scene's intervals as if the
    /// deleted scene's rows never existed. Camera bindings are rows too:
    /// bindings past the removed camera span shift down with their rows,
    /// bindings into the span are cleared. Returns the removed range so the
    /// caller can compact the pool and instance slots to match.
    pub fn delete(&mut self, index: usize) -> SceneRange {
        let removed = self.ranges.remove(index);
        self.names.remove_range(index, index + 1);
        let (cam_start, cam_end) = removed.range(Category::Camera);
        for range in &mut self.ranges {
            for cat in Category::ALL {
                let c = cat.index();
                let span = removed.end[c] - removed.start[c];
                if range.start[c] >= removed.end[c] {
                    range.start[c] -= span;
                    range.end[c] -= span;
                }
            }
            range.camera = shift_row(range.camera, cam_start, cam_end);
        }
        self.current = shift_index(self.current, index);
        self.building = shift_index(self.building, index);
        removed
    }

    /// Register an already-built range (scene copy).
    pub fn push_scene(&mut self, name: &str, range: SceneRange, diag: &mut DiagLog) -> bool {
        if self.names.add(name, diag).is_none() {
            return false;
        }
        self.ranges.push(range);
        true
    }

    /// A finalized range covering `[start_counts, end_counts)`, camera
    /// binding carried over from a source scene.
    pub fn finalized_range(
        start: CategoryCounts,
        end: CategoryCounts,
        camera: Option<usize>,
    ) -> SceneRange {
        SceneRange {
            start,
            end,
            camera,
            finalized: true,
        }
    }

    pub fn release(&mut self) {
        self.names.free();
        self.ranges.clear();
        self.current = None;
        self.building = None;
    }
}

impl Default for SceneTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn shift_index(slot: Option<usize>, removed: usize) -> Option<usize> {
    match slot {
        Some(i) if i == removed => None,
        Some(i) if i > removed => Some(i - 1),
        other => other,
    }
}

/// Adjust a row reference after rows `[start, end)` were compacted away.
/// References into the removed span dangle, so they are cleared.
pub(crate) fn shift_row(row: Option<usize>, start: usize, end: usize) -> Option<usize> {
    match row {
        Some(r) if r >= end => Some(r - (end - start)),
        Some(r) if r >= start => None,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: CategoryCounts = [0; Category::COUNT];

    fn counts(cat: Category, n: usize) -> CategoryCounts {
        let mut c = NONE;
        c[cat.index()] = n;
        c
    }

    #[test]
    fn test_build_and_finalize_range() {
        let mut diag = DiagLog::new();
        let mut scenes = SceneTracker::new();

        scenes.add_scene("S1", NONE, &mut diag);
        scenes.scene_end_point(counts(Category::GridBox, 1));

        let range = scenes.range_at(0).unwrap();
        assert_eq!(range.range(Category::GridBox), (0, 1));
        assert_eq!(range.range(Category::Camera), (0, 0));
        assert!(range.is_finalized());
    }

    #[test]
    fn test_second_scene_starts_where_pool_stands() {
        let mut diag = DiagLog::new();
        let mut scenes = SceneTracker::new();

        scenes.add_scene("S1", NONE, &mut diag);
        scenes.scene_end_point(counts(Category::GridBox, 2));
        scenes.add_scene("S2", counts(Category::GridBox, 2), &mut diag);
        scenes.scene_end_point(counts(Category::GridBox, 3));

        assert_eq!(scenes.range_at(1).unwrap().range(Category::GridBox), (2, 3));
    }

    #[test]
    fn test_force_finalize_open_scene() {
        let mut diag = DiagLog::new();
        let mut scenes = SceneTracker::new();

        scenes.add_scene("S1", NONE, &mut diag);
        // No scene_end_point; the next add_scene closes S1 at the counts
        // it is handed.
        scenes.add_scene("S2", counts(Category::GridBox, 2), &mut diag);

        let s1 = scenes.range_at(0).unwrap();
        assert!(s1.is_finalized());
        assert_eq!(s1.range(Category::GridBox), (0, 2));
        assert_eq!(diag.count_of(DiagKind::Info), 1);
    }

    #[test]
    fn test_duplicate_scene_rejected() {
        let mut diag = DiagLog::new();
        let mut scenes = SceneTracker::new();

        scenes.add_scene("S1", NONE, &mut diag);
        scenes.scene_end_point(counts(Category::GridBox, 1));
        scenes.add_scene("S1", counts(Category::GridBox, 1), &mut diag);

        assert_eq!(scenes.scene_count(), 1);
        assert_eq!(diag.count_of(DiagKind::DuplicateName), 1);
        // The existing range kept its interval.
        assert_eq!(scenes.range_at(0).unwrap().range(Category::GridBox), (0, 1));
    }

    #[test]
    fn test_active_scene_extension() {
        let mut diag = DiagLog::new();
        let mut scenes = SceneTracker::new();

        scenes.add_scene("S1", NONE, &mut diag);
        scenes.scene_end_point(counts(Category::GridBox, 1));
        assert!(scenes.change_scene("S1", &mut diag));

        // A row added while S1 is active and nothing is building.
        scenes.notify_add_object(Category::GridBox, 2);
        assert_eq!(scenes.range_at(0).unwrap().range(Category::GridBox), (0, 2));
    }

    #[test]
    fn test_no_extension_while_building() {
        let mut diag = DiagLog::new();
        let mut scenes = SceneTracker::new();

        scenes.add_scene("S1", NONE, &mut diag);
        scenes.scene_end_point(counts(Category::GridBox, 1));
        scenes.change_scene("S1", &mut diag);
        scenes.add_scene("S2", counts(Category::GridBox, 1), &mut diag);

        // Rows declared now belong to the building S2, not the active S1.
        scenes.notify_add_object(Category::GridBox, 2);
        scenes.scene_end_point(counts(Category::GridBox, 2));

        assert_eq!(scenes.range_at(0).unwrap().range(Category::GridBox), (0, 1));
        assert_eq!(scenes.range_at(1).unwrap().range(Category::GridBox), (1, 2));
    }

    #[test]
    fn test_change_scene_miss() {
        let mut diag = DiagLog::new();
        let mut scenes = SceneTracker::new();
        assert!(!scenes.change_scene("ghost", &mut diag));
        assert_eq!(scenes.current(), None);
        assert_eq!(diag.count_of(DiagKind::NotFound), 1);
    }

    #[test]
    fn test_delete_renumbers_later_scenes() {
        let mut diag = DiagLog::new();
        let mut scenes = SceneTracker::new();

        scenes.add_scene("S1", NONE, &mut diag);
        scenes.scene_end_point(counts(Category::GridBox, 2));
        scenes.add_scene("S2", counts(Category::GridBox, 2), &mut diag);
        scenes.scene_end_point(counts(Category::GridBox, 5));
        scenes.change_scene("S2", &mut diag);

        let removed = scenes.delete(0);
        assert_eq!(removed.range(Category::GridBox), (0, 2));

        assert_eq!(scenes.scene_count(), 1);
        assert_eq!(scenes.scene_index("S2"), Some(0));
        assert_eq!(scenes.range_at(0).unwrap().range(Category::GridBox), (0, 3));
        // The active scene followed its range down.
        assert_eq!(scenes.current(), Some(0));
    }

    #[test]
    fn test_delete_renumbers_camera_bindings() {
        let mut diag = DiagLog::new();
        let mut scenes = SceneTracker::new();

        // S1 owns camera rows [0, 2), S2 owns row 2 and binds it.
        scenes.add_scene("S1", NONE, &mut diag);
        scenes.scene_end_point(counts(Category::Camera, 2));
        scenes.set_scene_camera("S1", 0, &mut diag);
        scenes.add_scene("S2", counts(Category::Camera, 2), &mut diag);
        scenes.scene_end_point(counts(Category::Camera, 3));
        scenes.set_scene_camera("S2", 2, &mut diag);

        scenes.delete(0);

        // S2's camera row moved down with its range.
        let s2 = scenes.range_at(0).unwrap();
        assert_eq!(s2.range(Category::Camera), (0, 1));
        assert_eq!(s2.camera(), Some(0));
    }

    #[test]
    fn test_delete_clears_binding_into_removed_span() {
        let mut diag = DiagLog::new();
        let mut scenes = SceneTracker::new();

        scenes.add_scene("S1", NONE, &mut diag);
        scenes.scene_end_point(counts(Category::Camera, 1));
        scenes.add_scene("S2", counts(Category::Camera, 1), &mut diag);
        scenes.scene_end_point(counts(Category::Camera, 1));
        // S2 borrows S1's camera; deleting S1 takes the row with it.
        scenes.set_scene_camera("S2", 0, &mut diag);

        scenes.delete(0);
        assert_eq!(scenes.range_at(0).unwrap().camera(), None);
    }

    #[test]
    fn test_delete_active_scene_clears_current() {
        let mut diag = DiagLog::new();
        let mut scenes = SceneTracker::new();
        scenes.add_scene("S1", NONE, &mut diag);
        scenes.scene_end_point(counts(Category::GridBox, 1));
        scenes.change_scene("S1", &mut diag);

        scenes.delete(0);
        assert_eq!(scenes.current(), None);
        assert_eq!(scenes.current_scene_name(), None);
    }
}
