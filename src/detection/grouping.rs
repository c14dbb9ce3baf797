use tracing::debug;

use crate::config::{Closure, GroupingConfig, GroupingPolicy};
use crate::models::{BoundingBox, Group};

/// Merge contours whose boxes are near or overlapping into logical shapes.
///
/// With [`Closure::Seed`] each unassigned contour, in index order, seeds a
/// group and absorbs every later unassigned contour that merges with the
/// seed itself. Members are never compared with each other, so a chain
/// `A ~ B ~ C` where `A` and `C` do not merge yields two groups.
/// [`Closure::Transitive`] returns connected components instead.
pub fn group(boxes: &[BoundingBox], config: &GroupingConfig) -> Vec<Group> {
    let groups = match config.policy {
        GroupingPolicy::None => (0..boxes.len()).map(Group::singleton).collect(),
        _ => match config.closure {
            Closure::Seed => seed_sweep(boxes, |a, b| merges(a, b, config)),
            Closure::Transitive => connected_components(boxes, |a, b| merges(a, b, config)),
        },
    };
    debug!(
        contours = boxes.len(),
        groups = groups.len(),
        policy = ?config.policy,
        closure = ?config.closure,
        "grouped contours"
    );
    groups
}

/// Merge predicate for the configured policy.
pub fn merges(a: &BoundingBox, b: &BoundingBox, config: &GroupingConfig) -> bool {
    match config.policy {
        GroupingPolicy::None => false,
        GroupingPolicy::Proximity => a.expanded_overlaps(b, config.margin),
        GroupingPolicy::Iou => a.iou(b) > config.iou_threshold,
    }
}

fn seed_sweep<F>(boxes: &[BoundingBox], merge: F) -> Vec<Group>
where
    F: Fn(&BoundingBox, &BoundingBox) -> bool,
{
    let mut assigned = vec![false; boxes.len()];
    let mut groups = Vec::new();

    for seed in 0..boxes.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut members = vec![seed];
        for candidate in seed + 1..boxes.len() {
            if !assigned[candidate] && merge(&boxes[seed], &boxes[candidate]) {
                assigned[candidate] = true;
                members.push(candidate);
            }
        }
        groups.push(Group { members, representative: seed });
    }

    groups
}

fn connected_components<F>(boxes: &[BoundingBox], merge: F) -> Vec<Group>
where
    F: Fn(&BoundingBox, &BoundingBox) -> bool,
{
    let mut parent: Vec<usize> = (0..boxes.len()).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..boxes.len() {
        for j in i + 1..boxes.len() {
            if merge(&boxes[i], &boxes[j]) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    // Keep the lowest index as root so it becomes the representative.
                    parent[ri.max(rj)] = ri.min(rj);
                }
            }
        }
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut slot_of_root = vec![usize::MAX; boxes.len()];
    for i in 0..boxes.len() {
        let root = find(&mut parent, i);
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = groups.len();
            groups.push(Group { members: Vec::new(), representative: root });
        }
        groups[slot_of_root[root]].members.push(i);
    }
    groups
}
