//! Nine-zone partitioning of candidate rects relative to a reference rect.

use crate::rect::Rect;

/// Default overlap threshold used by [`partition`] when a section doesn't
/// override `straightOverlapThreshold`.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Nine buckets laid out left-to-right, top-to-bottom as a 3x3 grid.
/// Index 4 is the "inside" bucket — same position as the reference rect.
pub type Groups<Id> = [Vec<Rect<Id>>; 9];

fn empty_groups<Id>() -> Groups<Id> {
    std::array::from_fn(|_| Vec::new())
}

/// Assign every rect in `rects` to its primary zone relative to `reference`,
/// then spill corner-zone rects into the adjacent middle zone they overlap
/// by at least `threshold` of the reference's width/height.
///
/// Every input rect appears in exactly one primary group, and in a spill
/// group only if it started in a corner group and meets the edge threshold.
pub fn partition<Id: Copy>(rects: &[Rect<Id>], reference: Rect<Id>, threshold: f32) -> Groups<Id> {
    let mut groups = empty_groups();

    let left_edge = reference.left as f32 + reference.width as f32 * threshold;
    let right_edge = reference.right as f32 - reference.width as f32 * threshold;
    let top_edge = reference.top as f32 + reference.height as f32 * threshold;
    let bottom_edge = reference.bottom as f32 - reference.height as f32 * threshold;

    for &candidate in rects {
        let col = if candidate.center.x < reference.left {
            0
        } else if candidate.center.x <= reference.right {
            1
        } else {
            2
        };
        let row = if candidate.center.y < reference.top {
            0
        } else if candidate.center.y <= reference.bottom {
            1
        } else {
            2
        };
        let group = row * 3 + col;
        groups[group].push(candidate);

        match group {
            2 if candidate.left as f32 <= right_edge => groups[1].push(candidate),
            8 if candidate.left as f32 <= right_edge => groups[7].push(candidate),
            0 if candidate.right as f32 >= left_edge => groups[1].push(candidate),
            6 if candidate.right as f32 >= left_edge => groups[7].push(candidate),
            _ => {}
        }
        match group {
            6 if candidate.top as f32 <= bottom_edge => groups[3].push(candidate),
            8 if candidate.top as f32 <= bottom_edge => groups[5].push(candidate),
            0 if candidate.bottom as f32 >= top_edge => groups[3].push(candidate),
            2 if candidate.bottom as f32 >= top_edge => groups[5].push(candidate),
            _ => {}
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(id: u32, left: i32, top: i32, w: i32, h: i32) -> Rect<u32> {
        Rect::new(id, left, top, w, h)
    }

    #[test]
    fn every_rect_assigned_to_exactly_one_primary_group() {
        let reference = r(0, 100, 100, 50, 50);
        let candidates = [
            r(1, 0, 0, 10, 10),
            r(2, 120, 0, 10, 10),
            r(3, 300, 300, 10, 10),
            r(4, 110, 110, 10, 10),
        ];
        let groups = partition(&candidates, reference, DEFAULT_THRESHOLD);
        for c in &candidates {
            let primary_count = groups.iter().filter(|g| g.contains(c)).count();
            assert!(primary_count >= 1);
        }
        let total: usize = groups.iter().map(|g| g.len()).sum();
        assert!(total <= candidates.len() * 3);
    }

    #[test]
    fn inside_group_is_index_4() {
        let reference = r(0, 100, 100, 50, 50);
        let inside = r(1, 110, 110, 10, 10);
        let groups = partition(&[inside], reference, DEFAULT_THRESHOLD);
        assert!(groups[4].contains(&inside));
    }

    #[test]
    fn corner_spills_into_adjacent_middle_when_overlap_large_enough() {
        // reference at x,y in [100, 150]; candidate's center is in the
        // upper-left corner zone (group 0), but it's large enough to
        // overlap the reference's band by more than the 0.5 threshold on
        // both axes: left_edge = right_edge = top_edge = bottom_edge = 125.
        let reference = r(0, 100, 100, 50, 50);
        let candidate = r(1, 40, 40, 90, 90); // right = 130, bottom = 130, center = (85, 85)
        let groups = partition(&[candidate], reference, DEFAULT_THRESHOLD);
        assert!(groups[0].contains(&candidate));
        assert!(groups[1].contains(&candidate));
        assert!(groups[3].contains(&candidate));
    }

    #[test]
    fn corner_does_not_spill_below_threshold() {
        let reference = r(0, 100, 100, 50, 50);
        let candidate = r(1, 0, 50, 10, 40); // right = 10, bottom = 90, far short of the 125 edges
        let groups = partition(&[candidate], reference, DEFAULT_THRESHOLD);
        assert!(groups[0].contains(&candidate));
        assert!(!groups[1].contains(&candidate));
        assert!(!groups[3].contains(&candidate));
    }
}
