use approx::assert_relative_eq;
use fd_solver::constraints::PlaneConstraint;
use fd_solver::math::{Mat, Vec3};
use fd_solver::prelude::*;

/// Fixed anchor, free middle node and an anchor sliding on z = 0
fn sliding_anchor() -> (Network, usize) {
    let mut net = Network::new();
    let a = net.add_anchor([0.0, 0.0, 1.0]);
    let b = net.add_node([0.5, 0.0, 0.5]);
    let c = net.add_anchor([1.0, 0.0, 0.0]);
    net.add_edge(a, b, Some(EdgeGoal::ForceDensity(1.0))).unwrap();
    net.add_edge(b, c, Some(EdgeGoal::ForceDensity(1.0))).unwrap();
    let plane = Plane::new(Vec3::zeros(), Vec3::z()).unwrap();
    net.constrain(c, Geometry::Plane(plane)).unwrap();
    (net, c)
}

#[test]
fn damped_tangent_residual_strictly_decreases() {
    for damping in [0.1, 0.5, 0.9] {
        let (mut net, _) = sliding_anchor();
        let options = ConstrainedOptions::default()
            .with_damping(damping)
            .with_max_iter(20)
            .with_tolerances(0.0, 0.0);
        let result = net.solve_constrained(options, None).unwrap();

        let history = &result.convergence.unwrap().history;
        assert_eq!(history.len(), 20);
        for pair in history.windows(2) {
            assert!(pair[1].residual < pair[0].residual);
        }
    }
}

#[test]
fn sliding_anchor_settles_below_fixed_anchor() {
    let (mut net, c) = sliding_anchor();
    let result = net
        .solve_constrained(ConstrainedOptions::default().with_damping(0.5), None)
        .unwrap();

    assert!(result.converged());
    assert_relative_eq!(result.positions[c][0], 0.0, epsilon = 1e-2);
    assert_relative_eq!(result.positions[c][2], 0.0, epsilon = 1e-12);
    // written back to the network
    assert_relative_eq!(net.nodes()[c][0], result.positions[c][0]);
}

#[test]
fn line_constraint_stays_collinear_after_update() {
    let registry = ConstraintRegistry::default();
    let line = Line::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 0.0));
    let mut constraint = registry.build(Geometry::Line(line)).unwrap();

    constraint.set_location(Vec3::new(1.5, 0.5, 0.3));
    constraint.set_residual(Vec3::new(0.4, -0.1, 2.0));
    constraint.update(0.5);

    let p = constraint.location();
    let along = p - line.start;
    assert!(along.cross(&line.direction()).norm() < 1e-9);
    assert!(along.norm() <= line.length() + 1e-9);
}

#[test]
fn circle_anchor_turns_towards_pull() {
    let mut net = Network::new();
    let a = net.add_anchor([2.0, 0.0, 0.0]);
    let b = net.add_node([1.0, 0.5, 0.0]);
    let c = net.add_anchor([0.0, 1.0, 0.0]);
    net.add_edge(a, b, Some(EdgeGoal::ForceDensity(1.0))).unwrap();
    net.add_edge(b, c, Some(EdgeGoal::ForceDensity(1.0))).unwrap();
    let circle = Circle::new(Frame::world_xy(), 1.0);
    net.constrain(c, Geometry::Circle(circle)).unwrap();

    let options = ConstrainedOptions::default()
        .with_damping(0.5)
        .with_max_iter(500);
    let result = net.solve_constrained(options, None).unwrap();

    assert!(result.converged());
    let p = Vec3::from(result.positions[c]);
    assert_relative_eq!(p.norm(), 1.0, epsilon = 1e-3);
    assert_relative_eq!(p.x, 1.0, epsilon = 1e-2);
    assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
}

#[test]
fn selfweight_sags_free_nodes() {
    let mut net = Network::new();
    let a = net.add_anchor([0.0, 0.0, 0.0]);
    let m = net.add_node([1.0, 0.0, 0.0]);
    let b = net.add_anchor([2.0, 0.0, 0.0]);
    net.add_edge(a, m, Some(EdgeGoal::ForceDensity(1.0))).unwrap();
    net.add_edge(m, b, Some(EdgeGoal::ForceDensity(1.0))).unwrap();

    let weight = |x: &Mat| vec![0.5; x.nrows()];
    let result = net
        .solve_constrained(ConstrainedOptions::default(), Some(&weight as &dyn SelfWeight))
        .unwrap();
    assert_relative_eq!(result.positions[m][2], -0.25, epsilon = 1e-12);
}

#[test]
fn unregistered_geometry_is_unsupported() {
    let mut registry = ConstraintRegistry::empty();
    registry.register(GeometryKind::Plane, PlaneConstraint::build);
    assert!(registry.is_registered(GeometryKind::Plane));

    let mut net = Network::with_registry(registry);
    let a = net.add_anchor([0.0; 3]);
    let line = Line::new(Vec3::zeros(), Vec3::x());
    assert!(matches!(
        net.constrain(a, Geometry::Line(line)),
        Err(FDError::UnsupportedGeometry(GeometryKind::Line))
    ));
}
