//! Route planning: waynet A* plus the start-skip rule and synthetic goal points.

use shared::utils::{planar_distance_sq, to_planar};
use shared::{Vec3, Waynet};

/// What a move is heading for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveGoal<'a> {
    Waypoint(&'a str),
    Position(Vec3),
    Freepoint(&'a str),
}

/// Ordered points to walk through. Consumed front to back by the executor.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    points: Vec<Vec3>,
    /// Waynet index per point; `None` for the synthetic trailing point.
    nodes: Vec<Option<usize>>,
    /// Facing to adopt on arrival, taken from the goal's direction.
    final_direction: Option<Vec3>,
}

impl Route {
    #[inline]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn point(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    #[inline]
    pub fn node(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).copied().flatten()
    }

    #[inline]
    pub fn is_final(&self, index: usize) -> bool {
        index + 1 >= self.points.len()
    }

    #[inline]
    pub fn final_direction(&self) -> Option<Vec3> {
        self.final_direction
    }
}

/// Plan a route from `from` to `goal` over `net`.
///
/// The route starts at the waypoint nearest to `from`. Off-graph goals (positions and
/// freepoints) route to their nearest waypoint and append the goal itself as a synthetic
/// trailing point. Returns `None` when the goal is unknown or unreachable.
pub fn plan_route(net: &Waynet, from: Vec3, goal: MoveGoal<'_>) -> Option<Route> {
    let (goal_node, tail, final_direction) = match goal {
        MoveGoal::Waypoint(name) => {
            let index = net.index_of(name)?;
            (index, None, net.waypoint(index)?.direction)
        }
        MoveGoal::Position(target) => (net.nearest_node(target)?, Some(target), None),
        MoveGoal::Freepoint(name) => {
            let fp = net.freepoint(name)?;
            (net.nearest_node(fp.position)?, Some(fp.position), fp.direction)
        }
    };
    let start_node = net.nearest_node(from)?;

    let mut indices = net.find_route(start_node, goal_node);
    if indices.is_empty() {
        return None;
    }
    skip_passed_start(net, from, &mut indices);

    let mut points = Vec::with_capacity(indices.len() + 1);
    let mut nodes = Vec::with_capacity(indices.len() + 1);
    for &i in &indices {
        points.push(net.waypoint(i)?.position);
        nodes.push(Some(i));
    }
    if let Some(target) = tail {
        points.push(target);
        nodes.push(None);
    }

    Some(Route {
        points,
        nodes,
        final_direction,
    })
}

/// Drop the first node when the mover is already closer to the second one than the first
/// node is, so it doesn't walk back.
fn skip_passed_start(net: &Waynet, from: Vec3, indices: &mut Vec<usize>) {
    if indices.len() < 2 {
        return;
    }
    let (Some(first), Some(second)) = (net.waypoint(indices[0]), net.waypoint(indices[1])) else {
        return;
    };
    let here = to_planar(&from);
    let a = to_planar(&first.position);
    let b = to_planar(&second.position);
    if planar_distance_sq(here, b) < planar_distance_sq(a, b) {
        log::trace!("route start skips passed waypoint {}", first.name);
        indices.remove(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Edge, Waypoint};

    /// L --- M --- R, plus a freepoint next to R.
    fn line() -> Waynet {
        Waynet::build(
            vec![
                Waypoint::new("L", Vec3::new(-400.0, 0.0, 0.0)),
                Waypoint::new("M", Vec3::new(0.0, 0.0, 0.0)),
                Waypoint::new("R", Vec3::new(400.0, 0.0, 0.0))
                    .with_direction(Vec3::new(0.0, 0.0, -1.0)),
            ],
            vec![Edge::undirected(0, 1), Edge::undirected(1, 2)],
            vec![Waypoint::new("FP", Vec3::new(450.0, 0.0, 50.0))],
        )
        .expect("net")
    }

    #[test]
    fn waypoint_route_keeps_start_when_not_passed() {
        let route = plan_route(&line(), Vec3::new(-420.0, 0.0, 0.0), MoveGoal::Waypoint("R"))
            .expect("route");
        assert_eq!(route.len(), 3);
        assert_eq!(route.node(0), Some(0));
        assert_eq!(route.final_direction(), Some(Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn skips_first_node_when_already_past_it() {
        let route = plan_route(&line(), Vec3::new(-250.0, 0.0, 0.0), MoveGoal::Waypoint("R"))
            .expect("route");
        assert_eq!(route.node(0), Some(1));
        assert_eq!(route.len(), 2);
    }

    #[test]
    fn position_goal_appends_synthetic_point() {
        let target = Vec3::new(380.0, 0.0, 90.0);
        let route = plan_route(&line(), Vec3::new(-400.0, 0.0, 0.0), MoveGoal::Position(target))
            .expect("route");
        assert_eq!(route.points().last(), Some(&target));
        assert_eq!(route.node(route.len() - 1), None);
        assert!(route.is_final(route.len() - 1));
    }

    #[test]
    fn freepoint_goal_uses_its_position() {
        let route = plan_route(&line(), Vec3::new(400.0, 0.0, 0.0), MoveGoal::Freepoint("FP"))
            .expect("route");
        assert_eq!(route.points(), &[Vec3::new(400.0, 0.0, 0.0), Vec3::new(450.0, 0.0, 50.0)]);
    }

    #[test]
    fn unknown_or_unreachable_goals_fail() {
        let net = line();
        assert!(plan_route(&net, Vec3::zeros(), MoveGoal::Waypoint("NOPE")).is_none());
        assert!(plan_route(&net, Vec3::zeros(), MoveGoal::Freepoint("NOPE")).is_none());

        let split = Waynet::build(
            vec![
                Waypoint::new("A", Vec3::zeros()),
                Waypoint::new("B", Vec3::new(1000.0, 0.0, 0.0)),
            ],
            Vec::new(),
            Vec::new(),
        )
        .expect("net");
        assert!(plan_route(&split, Vec3::zeros(), MoveGoal::Waypoint("B")).is_none());
    }
}
