use std::collections::HashMap;

use serde::Deserialize;

use crate::collision::types::Vec3;
use crate::error::WaynetError;

/// A named graph node.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub name: String,
    pub position: Vec3,
    /// Facing to adopt on arrival, if any.
    pub direction: Option<Vec3>,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            direction: None,
        }
    }

    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// A named off-graph spot. Same shape as a waypoint but never part of the adjacency.
pub type Freepoint = Waypoint;

/// Raw edge record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    /// Overrides the Euclidean length.
    pub weight: Option<f32>,
    pub directed: bool,
}

impl Edge {
    pub fn undirected(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            weight: None,
            directed: false,
        }
    }

    pub fn directed(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            weight: None,
            directed: true,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// Waypoint graph. Built once, never mutated; rebuild when the world changes.
#[derive(Clone, Debug, Default)]
pub struct Waynet {
    waypoints: Vec<Waypoint>,
    adjacency: Vec<Vec<(usize, f32)>>,
    by_name: HashMap<String, usize>,
    freepoints: Vec<Freepoint>,
    freepoint_by_name: HashMap<String, usize>,
    /// Largest factor keeping the Euclidean heuristic admissible under weight overrides.
    heuristic_scale: f32,
    /// Every arc has a reverse arc of the same weight.
    symmetric: bool,
}

impl Waynet {
    /// Validate raw records and build the adjacency lists.
    pub fn build(
        waypoints: Vec<Waypoint>,
        edges: Vec<Edge>,
        freepoints: Vec<Freepoint>,
    ) -> Result<Self, WaynetError> {
        let by_name = index_names(&waypoints)?;
        let freepoint_by_name = index_names(&freepoints)?;

        let len = waypoints.len();
        let mut adjacency = vec![Vec::new(); len];
        let mut heuristic_scale: f32 = 1.0;

        for (i, edge) in edges.iter().enumerate() {
            for index in [edge.from, edge.to] {
                if index >= len {
                    return Err(WaynetError::BadEdgeIndex { edge: i, index, len });
                }
            }

            let length = (waypoints[edge.to].position - waypoints[edge.from].position).norm();
            let weight = edge.weight.unwrap_or(length);
            if !weight.is_finite() || weight < 0.0 {
                return Err(WaynetError::InvalidWeight { edge: i, weight });
            }
            if length > f32::EPSILON {
                heuristic_scale = heuristic_scale.min(weight / length);
            }

            adjacency[edge.from].push((edge.to, weight));
            if !edge.directed {
                adjacency[edge.to].push((edge.from, weight));
            }
        }

        let symmetric = adjacency.iter().enumerate().all(|(from, arcs)| {
            arcs.iter()
                .all(|&(to, weight)| adjacency[to].contains(&(from, weight)))
        });

        log::info!(
            "built waynet: {} waypoints, {} edges, {} freepoints",
            len,
            edges.len(),
            freepoints.len()
        );

        Ok(Self {
            waypoints,
            adjacency,
            by_name,
            freepoints,
            freepoint_by_name,
            heuristic_scale: heuristic_scale.max(0.0),
            symmetric,
        })
    }

    /// Load a serialized waynet.
    ///
    /// Edge endpoints may be given either as waypoint indices or as waypoint names.
    pub fn from_json_str(json: &str) -> Result<Self, WaynetError> {
        let def: WaynetDef = serde_json::from_str(json)?;

        let waypoints: Vec<Waypoint> = def.waypoints.into_iter().map(Into::into).collect();
        let freepoints: Vec<Freepoint> = def.freepoints.into_iter().map(Into::into).collect();
        let names = index_names(&waypoints)?;

        let edges = def
            .edges
            .into_iter()
            .enumerate()
            .map(|(i, e)| {
                Ok(Edge {
                    from: e.from.resolve(i, &names)?,
                    to: e.to.resolve(i, &names)?,
                    weight: e.weight,
                    directed: e.directed,
                })
            })
            .collect::<Result<Vec<_>, WaynetError>>()?;

        Self::build(waypoints, edges, freepoints)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    #[inline]
    pub fn waypoint(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    #[inline]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Outgoing `(neighbor, weight)` pairs.
    #[inline]
    pub fn neighbors(&self, index: usize) -> &[(usize, f32)] {
        self.adjacency.get(index).map_or(&[], Vec::as_slice)
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn freepoint(&self, name: &str) -> Option<&Freepoint> {
        self.freepoint_by_name
            .get(name)
            .and_then(|&i| self.freepoints.get(i))
    }

    #[inline]
    pub fn freepoints(&self) -> &[Freepoint] {
        &self.freepoints
    }

    #[inline]
    pub(crate) fn heuristic_scale(&self) -> f32 {
        self.heuristic_scale
    }

    #[inline]
    pub(crate) fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Closest waypoint to `point` (3D distance); ties go to the lowest index.
    pub fn nearest_node(&self, point: Vec3) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, wp) in self.waypoints.iter().enumerate() {
            let d = (wp.position - point).norm_squared();
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }
}

fn index_names(points: &[Waypoint]) -> Result<HashMap<String, usize>, WaynetError> {
    let mut names = HashMap::with_capacity(points.len());
    for (i, wp) in points.iter().enumerate() {
        if !wp.position.iter().all(|v| v.is_finite()) {
            return Err(WaynetError::NonFinitePosition(wp.name.clone()));
        }
        if names.insert(wp.name.clone(), i).is_some() {
            return Err(WaynetError::DuplicateName(wp.name.clone()));
        }
    }
    Ok(names)
}

#[derive(Debug, Deserialize)]
struct WaynetDef {
    waypoints: Vec<WaypointDef>,
    #[serde(default)]
    edges: Vec<EdgeDef>,
    #[serde(default)]
    freepoints: Vec<WaypointDef>,
}

#[derive(Debug, Deserialize)]
struct WaypointDef {
    name: String,
    position: [f32; 3],
    #[serde(default)]
    direction: Option<[f32; 3]>,
}

impl From<WaypointDef> for Waypoint {
    fn from(def: WaypointDef) -> Self {
        Self {
            name: def.name,
            position: Vec3::from(def.position),
            direction: def.direction.map(Vec3::from),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EdgeDef {
    from: WaypointRef,
    to: WaypointRef,
    #[serde(default)]
    weight: Option<f32>,
    #[serde(default)]
    directed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WaypointRef {
    Index(usize),
    Name(String),
}

impl WaypointRef {
    fn resolve(self, edge: usize, names: &HashMap<String, usize>) -> Result<usize, WaynetError> {
        match self {
            WaypointRef::Index(i) => Ok(i),
            WaypointRef::Name(name) => names
                .get(&name)
                .copied()
                .ok_or(WaynetError::UnknownWaypoint { edge, name }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_nodes() -> Vec<Waypoint> {
        vec![
            Waypoint::new("A", Vec3::new(0.0, 0.0, 0.0)),
            Waypoint::new("B", Vec3::new(100.0, 0.0, 0.0)),
        ]
    }

    #[test]
    fn undirected_edge_links_both_ways_with_euclidean_weight() {
        let net = Waynet::build(two_nodes(), vec![Edge::undirected(0, 1)], Vec::new()).expect("net");
        assert_eq!(net.neighbors(0), &[(1, 100.0)]);
        assert_eq!(net.neighbors(1), &[(0, 100.0)]);
    }

    #[test]
    fn directed_edge_links_one_way() {
        let net = Waynet::build(two_nodes(), vec![Edge::directed(0, 1)], Vec::new()).expect("net");
        assert_eq!(net.neighbors(0).len(), 1);
        assert!(net.neighbors(1).is_empty());
    }

    #[test]
    fn rejects_bad_edge_index() {
        let err = Waynet::build(two_nodes(), vec![Edge::undirected(0, 2)], Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            WaynetError::BadEdgeIndex {
                edge: 0,
                index: 2,
                len: 2
            }
        ));
    }

    #[test]
    fn rejects_duplicate_names_and_bad_weights() {
        let mut dup = two_nodes();
        dup[1].name = "A".into();
        assert!(matches!(
            Waynet::build(dup, Vec::new(), Vec::new()),
            Err(WaynetError::DuplicateName(name)) if name == "A"
        ));

        let negative = Edge::undirected(0, 1).with_weight(-1.0);
        assert!(matches!(
            Waynet::build(two_nodes(), vec![negative], Vec::new()),
            Err(WaynetError::InvalidWeight { edge: 0, .. })
        ));
    }

    #[test]
    fn nearest_node_breaks_ties_by_lowest_index() {
        let net = Waynet::build(two_nodes(), Vec::new(), Vec::new()).expect("net");
        assert_eq!(net.nearest_node(Vec3::new(50.0, 0.0, 0.0)), Some(0));
        assert_eq!(net.nearest_node(Vec3::new(60.0, 0.0, 0.0)), Some(1));
        let empty = Waynet::build(Vec::new(), Vec::new(), Vec::new()).expect("net");
        assert_eq!(empty.nearest_node(Vec3::zeros()), None);
    }

    #[test]
    fn loads_json_with_named_edges_and_freepoints() {
        let json = r#"{
            "waypoints": [
                { "name": "GATE", "position": [0, 0, 0] },
                { "name": "MARKET", "position": [300, 0, 400], "direction": [0, 0, -1] }
            ],
            "edges": [ { "from": "GATE", "to": 1 } ],
            "freepoints": [ { "name": "FP_SMITH", "position": [320, 0, 420] } ]
        }"#;
        let net = Waynet::from_json_str(json).expect("net");
        assert_eq!(net.index_of("MARKET"), Some(1));
        assert_eq!(net.neighbors(0), &[(1, 500.0)]);
        assert_eq!(
            net.waypoint(1).and_then(|w| w.direction),
            Some(Vec3::new(0.0, 0.0, -1.0))
        );
        assert_eq!(
            net.freepoint("FP_SMITH").map(|f| f.position),
            Some(Vec3::new(320.0, 0.0, 420.0))
        );
    }

    #[test]
    fn json_with_unknown_edge_name_fails() {
        let json = r#"{ "waypoints": [ { "name": "A", "position": [0, 0, 0] } ],
                        "edges": [ { "from": "A", "to": "NOWHERE" } ] }"#;
        assert!(matches!(
            Waynet::from_json_str(json),
            Err(WaynetError::UnknownWaypoint { edge: 0, .. })
        ));
    }
}
