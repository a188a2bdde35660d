use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::graph::Waynet;

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f32,
    g: f32,
    h: f32,
    index: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    // Reversed so the max-heap pops the lowest (f, g, h, index) first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.g.total_cmp(&self.g))
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Shortest waypoint route from `start` to `goal`, both inclusive.
///
/// Returns `[start]` when `start == goal`, and an empty route when either index is out of
/// range or the goal is unreachable. The heuristic is the straight-line distance, scaled
/// down when edge weights undercut it, so the route is always a least-cost one. Ties are
/// broken deterministically by `(f, g, h, index)`. On a symmetric graph the search always
/// runs from the lower index, so `find_route(b, a)` is `find_route(a, b)` reversed.
pub fn find_route(net: &Waynet, start: usize, goal: usize) -> Vec<usize> {
    let len = net.len();
    if start >= len || goal >= len {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }
    if start > goal && net.is_symmetric() {
        let mut route = search(net, goal, start);
        route.reverse();
        return route;
    }
    search(net, start, goal)
}

fn search(net: &Waynet, start: usize, goal: usize) -> Vec<usize> {
    let len = net.len();

    let Some(goal_pos) = net.waypoint(goal).map(|w| w.position) else {
        return Vec::new();
    };
    let scale = net.heuristic_scale();
    let heuristic = |i: usize| {
        net.waypoint(i)
            .map_or(0.0, |w| (w.position - goal_pos).norm() * scale)
    };

    let mut g_score = vec![f32::INFINITY; len];
    let mut came_from: Vec<Option<usize>> = vec![None; len];
    let mut closed = vec![false; len];
    let mut open = BinaryHeap::new();

    g_score[start] = 0.0;
    let h = heuristic(start);
    open.push(OpenEntry {
        f: h,
        g: 0.0,
        h,
        index: start,
    });

    while let Some(current) = open.pop() {
        if closed[current.index] {
            continue;
        }
        if current.index == goal {
            return reconstruct(&came_from, goal);
        }
        closed[current.index] = true;

        for &(next, weight) in net.neighbors(current.index) {
            if closed[next] {
                continue;
            }
            let tentative = current.g + weight;
            if tentative < g_score[next] {
                g_score[next] = tentative;
                came_from[next] = Some(current.index);
                let h = heuristic(next);
                open.push(OpenEntry {
                    f: tentative + h,
                    g: tentative,
                    h,
                    index: next,
                });
            }
        }
    }

    log::debug!("no waynet route from {start} to {goal}");
    Vec::new()
}

fn reconstruct(came_from: &[Option<usize>], goal: usize) -> Vec<usize> {
    let mut route = vec![goal];
    let mut cursor = goal;
    while let Some(prev) = came_from[cursor] {
        route.push(prev);
        cursor = prev;
    }
    route.reverse();
    route
}

impl Waynet {
    /// See [`find_route`].
    #[inline]
    pub fn find_route(&self, start: usize, goal: usize) -> Vec<usize> {
        find_route(self, start, goal)
    }
}
