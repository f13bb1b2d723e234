//! Network - form finding model container

use crate::analysis::{
    ConstrainedOptions, ConstrainedSolver, LinearFdSolver, NfdOptions, NfdSolver,
};
use crate::constraints::{Constraint, ConstraintRegistry, Geometry};
use crate::elements::{EdgeGoal, NaturalEdge, NaturalFace, StressGoal};
use crate::error::{check_index, FDError, FDResult};
use crate::loads::{FaceLoad, LoadAssembler, SelfWeight};
use crate::numdata::{rows_to_mat, NumericalState};
use crate::results::FormResult;

/// A cable net or membrane under construction
///
/// Nodes, edges and faces are numbered in insertion order. Every solve
/// writes the new node positions back, so solves can be chained.
#[derive(Debug)]
pub struct Network {
    nodes: Vec<[f64; 3]>,
    anchors: Vec<usize>,
    edges: Vec<(usize, usize)>,
    edge_goals: Vec<Option<EdgeGoal>>,
    faces: Vec<Vec<usize>>,
    stress_goals: Vec<StressGoal>,
    node_loads: Vec<[f64; 3]>,
    face_loads: Vec<(usize, FaceLoad)>,
    constraints: Vec<Option<Constraint>>,
    registry: ConstraintRegistry,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    /// Create an empty network with the built-in constraint kinds
    pub fn new() -> Self {
        Self::with_registry(ConstraintRegistry::default())
    }

    /// Create an empty network with a custom constraint registry
    pub fn with_registry(registry: ConstraintRegistry) -> Self {
        Self {
            nodes: Vec::new(),
            anchors: Vec::new(),
            edges: Vec::new(),
            edge_goals: Vec::new(),
            faces: Vec::new(),
            stress_goals: Vec::new(),
            node_loads: Vec::new(),
            face_loads: Vec::new(),
            constraints: Vec::new(),
            registry,
        }
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a free node, returning its index
    pub fn add_node(&mut self, xyz: [f64; 3]) -> usize {
        self.nodes.push(xyz);
        self.node_loads.push([0.0; 3]);
        self.constraints.push(None);
        self.nodes.len() - 1
    }

    /// Add a fixed node, returning its index
    pub fn add_anchor(&mut self, xyz: [f64; 3]) -> usize {
        let node = self.add_node(xyz);
        self.anchors.push(node);
        node
    }

    /// Fix an existing node
    pub fn fix(&mut self, node: usize) -> FDResult<()> {
        check_index("nodes", node, self.nodes.len())?;
        if !self.anchors.contains(&node) {
            self.anchors.push(node);
        }
        Ok(())
    }

    /// Add an edge, returning its index
    ///
    /// An edge without goal is kept for output but carries no force.
    pub fn add_edge(&mut self, u: usize, v: usize, goal: Option<EdgeGoal>) -> FDResult<usize> {
        check_index("nodes", u, self.nodes.len())?;
        check_index("nodes", v, self.nodes.len())?;
        if u == v {
            return Err(FDError::InvalidInput(format!(
                "edge ({u}, {v}) connects a node to itself"
            )));
        }
        self.edges.push((u, v));
        self.edge_goals.push(goal);
        Ok(self.edges.len() - 1)
    }

    /// Add a membrane face over 3 or 4 nodes, returning its index
    pub fn add_face(&mut self, nodes: &[usize], goal: StressGoal) -> FDResult<usize> {
        let index = self.faces.len();
        if !(3..=4).contains(&nodes.len()) {
            return Err(FDError::InvalidFace(index));
        }
        for &v in nodes {
            check_index("nodes", v, self.nodes.len())?;
        }
        self.faces.push(nodes.to_vec());
        self.stress_goals.push(goal);
        Ok(index)
    }

    /// Add a load to a node; loads on the same node accumulate
    pub fn add_node_load(&mut self, node: usize, load: [f64; 3]) -> FDResult<()> {
        check_index("nodes", node, self.nodes.len())?;
        for (acc, l) in self.node_loads[node].iter_mut().zip(load) {
            *acc += l;
        }
        Ok(())
    }

    /// Add a distributed load to a face
    pub fn add_face_load(&mut self, face: usize, load: FaceLoad) -> FDResult<()> {
        check_index("faces", face, self.faces.len())?;
        self.face_loads.push((face, load));
        Ok(())
    }

    /// Constrain a node to a geometry
    ///
    /// Fails with [`FDError::UnsupportedGeometry`] when the registry has no
    /// builder for the geometry kind.
    pub fn constrain(&mut self, node: usize, geometry: Geometry) -> FDResult<()> {
        check_index("nodes", node, self.nodes.len())?;
        self.constraints[node] = Some(self.registry.build(geometry)?);
        Ok(())
    }

    // ========================
    // Accessors
    // ========================

    pub fn nodes(&self) -> &[[f64; 3]] {
        &self.nodes
    }

    pub fn anchors(&self) -> &[usize] {
        &self.anchors
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_constrained(&self, node: usize) -> bool {
        matches!(self.constraints.get(node), Some(Some(_)))
    }

    /// Force densities of the edges at the current geometry
    ///
    /// Force goals are divided by the current edge length; edges without
    /// goal get zero.
    pub fn force_densities(&self) -> FDResult<Vec<f64>> {
        self.edges
            .iter()
            .zip(&self.edge_goals)
            .enumerate()
            .map(|(i, (&(u, v), goal))| match goal {
                Some(EdgeGoal::ForceDensity(q)) => Ok(*q),
                Some(EdgeGoal::Force(f)) => {
                    let length = distance(&self.nodes[u], &self.nodes[v]);
                    if length <= f64::EPSILON {
                        return Err(FDError::InvalidInput(format!(
                            "edge {i} has a force goal but zero length"
                        )));
                    }
                    Ok(f / length)
                }
                None => Ok(0.0),
            })
            .collect()
    }

    /// Numerical state for the current geometry
    pub fn numerical_state(&self) -> FDResult<NumericalState> {
        NumericalState::new(
            &self.nodes,
            &self.anchors,
            &self.edges,
            &self.force_densities()?,
            Some(self.node_loads.as_slice()),
        )
    }

    // ========================
    // Analysis Methods
    // ========================

    /// Single linear force density solve
    pub fn solve_linear(&mut self) -> FDResult<FormResult> {
        log::info!(
            "Linear force density solve: {} nodes, {} anchors, {} edges",
            self.node_count(),
            self.anchors.len(),
            self.edge_count()
        );
        let mut state = self.numerical_state()?;
        let result = LinearFdSolver::new().solve(&mut state)?;
        self.nodes.clone_from(&result.positions);
        Ok(result)
    }

    /// Iterative solve sliding constrained nodes along their geometry
    pub fn solve_constrained(
        &mut self,
        options: ConstrainedOptions,
        selfweight: Option<&dyn SelfWeight>,
    ) -> FDResult<FormResult> {
        log::info!(
            "Constrained force density solve: {} nodes, {} constrained",
            self.node_count(),
            self.constraints.iter().flatten().count()
        );
        let mut state = self.numerical_state()?;
        let result =
            ConstrainedSolver::new(options).solve(&mut state, &mut self.constraints, selfweight)?;
        self.nodes.clone_from(&result.positions);
        Ok(result)
    }

    /// Natural force density solve of faces and edges
    ///
    /// Result forces and lengths are ordered like the network edges.
    pub fn solve_nfd(&mut self, options: NfdOptions) -> FDResult<FormResult> {
        log::info!(
            "Natural force density solve: {} nodes, {} faces, {} edges",
            self.node_count(),
            self.face_count(),
            self.edge_count()
        );
        let positions = rows_to_mat(&self.nodes);
        let mut faces = NaturalFace::from_mesh(&self.faces, &self.stress_goals, &positions)?;
        let mut edges = self
            .edges
            .iter()
            .zip(&self.edge_goals)
            .enumerate()
            .map(|(i, (&nodes, &goal))| NaturalEdge::new(i, nodes, goal, &positions))
            .collect::<FDResult<Vec<_>>>()?;
        let mut loads = LoadAssembler::new(rows_to_mat(&self.node_loads), self.face_loads.clone())?;

        // natural stiffness replaces the edge force densities
        let mut state = NumericalState::new(
            &self.nodes,
            &self.anchors,
            &self.edges,
            &vec![0.0; self.edges.len()],
            Some(self.node_loads.as_slice()),
        )?;
        let result = NfdSolver::new(options).solve(&mut state, &mut faces, &mut edges, &mut loads)?;
        self.nodes.clone_from(&result.positions);
        Ok(result)
    }
}

fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::GeometryKind;
    use crate::geometry::Plane;
    use crate::math::Vec3;
    use approx::assert_relative_eq;

    #[test]
    fn test_force_goal_becomes_force_density() {
        let mut net = Network::new();
        let a = net.add_anchor([0.0, 0.0, 0.0]);
        let b = net.add_node([4.0, 0.0, 0.0]);
        net.add_edge(a, b, Some(EdgeGoal::Force(8.0))).unwrap();
        net.add_edge(a, b, None).unwrap();
        assert_eq!(net.force_densities().unwrap(), vec![2.0, 0.0]);
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let mut net = Network::new();
        let a = net.add_node([0.0; 3]);
        let b = net.add_node([1.0, 0.0, 0.0]);
        assert!(matches!(net.add_edge(a, a, None), Err(FDError::InvalidInput(_))));
        assert!(matches!(
            net.add_edge(a, 9, None),
            Err(FDError::IndexOutOfRange { what: "nodes", .. })
        ));
        assert!(matches!(
            net.add_face(&[a, b], StressGoal::default()),
            Err(FDError::InvalidFace(0))
        ));
        assert!(net.add_face_load(0, FaceLoad::Normal(1.0)).is_err());
    }

    #[test]
    fn test_empty_registry_rejects_constraints() {
        let mut net = Network::with_registry(ConstraintRegistry::empty());
        let a = net.add_node([0.0; 3]);
        let plane = Plane::new(Vec3::zeros(), Vec3::z()).unwrap();
        let result = net.constrain(a, Geometry::Plane(plane));
        assert!(matches!(
            result,
            Err(FDError::UnsupportedGeometry(GeometryKind::Plane))
        ));
        assert!(!net.is_constrained(a));
    }

    #[test]
    fn test_solves_write_back_positions() {
        let mut net = Network::new();
        let a = net.add_anchor([0.0, 0.0, 0.0]);
        let m = net.add_node([1.0, 0.0, 3.0]);
        let b = net.add_anchor([2.0, 0.0, 0.0]);
        net.add_edge(a, m, Some(EdgeGoal::ForceDensity(1.0))).unwrap();
        net.add_edge(m, b, Some(EdgeGoal::ForceDensity(1.0))).unwrap();
        net.add_node_load(m, [0.0, 0.0, -1.0]).unwrap();
        net.add_node_load(m, [0.0, 0.0, -1.0]).unwrap();

        let result = net.solve_linear().unwrap();
        assert_relative_eq!(result.positions[m][2], -1.0, epsilon = 1e-12);
        assert_relative_eq!(net.nodes()[m][2], -1.0, epsilon = 1e-12);
    }
}
