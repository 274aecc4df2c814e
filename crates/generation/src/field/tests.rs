use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI};

use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::geometry::{rbf, Polygon};
use crate::raster::{BoundaryMap, HeightMap};

fn close(a: Tensor, b: Tensor, eps: f32) -> bool {
    (a.components() - b.components()).length() < eps
}

// ---------------------------------------------------------------------------
// BasisField
// ---------------------------------------------------------------------------

#[test]
fn test_regular_element_ignores_position() {
    let e = BasisField::regular(Point::new(0.2, 0.2), 2.0, Vec2::new(0.0, 1.0));
    let a = e.evaluate(Point::new(0.0, 0.0));
    let b = e.evaluate(Point::new(0.9, 0.4));
    assert_eq!(a, b);
    assert!((a.value() - 2.0).abs() < 1e-5);
    assert!((a.angle() - FRAC_PI_2).abs() < 1e-5);
    assert!(!e.is_singularity());
}

#[test]
fn test_singularity_closed_forms_along_x_axis() {
    let anchor = Point::new(0.5, 0.5);
    let p = Point::new(0.7, 0.5); // unit offset (1, 0)
    let expect = [
        (SingularityKind::Center, Vec2::new(-1.0, 0.0)),
        (SingularityKind::Wedge, Vec2::new(1.0, 0.0)),
        (SingularityKind::Node, Vec2::new(1.0, 0.0)),
        (SingularityKind::Trisector, Vec2::new(1.0, 0.0)),
        (SingularityKind::Saddle, Vec2::new(1.0, 0.0)),
        (SingularityKind::Focus, Vec2::new(-1.0, 0.0)),
    ];
    for (kind, v) in expect {
        let t = BasisField::singular(anchor, 1.0, kind).evaluate(p);
        assert!((t.components() - v).length() < 1e-5, "{kind:?}");
    }
}

#[test]
fn test_singularity_closed_forms_on_diagonal() {
    let anchor = Point::new(0.0, 0.0);
    let p = Point::new(0.3, 0.3);
    let h = std::f32::consts::FRAC_1_SQRT_2;
    let cases = [
        (SingularityKind::Center, Vec2::new(0.0, -1.0)),
        (SingularityKind::Wedge, Vec2::new(h, h)),
        (SingularityKind::Node, Vec2::new(0.0, 1.0)),
        (SingularityKind::Trisector, Vec2::new(h, -h)),
        (SingularityKind::Saddle, Vec2::new(0.0, -1.0)),
        (SingularityKind::Focus, Vec2::new(0.0, 1.0)),
    ];
    for (kind, v) in cases {
        let t = BasisField::singular(anchor, 3.0, kind).evaluate(p);
        assert!((t.components() - v * 3.0).length() < 1e-4, "{kind:?}");
    }
}

#[test]
fn test_singularity_at_anchor_is_zero() {
    for kind in SingularityKind::ALL {
        let e = BasisField::singular(Point::new(0.4, 0.4), 1.0, kind);
        assert!(e.evaluate(Point::new(0.4, 0.4)).is_zero());
        assert_eq!(e.singularity(), Some(kind));
    }
}

// ---------------------------------------------------------------------------
// BasisSumField
// ---------------------------------------------------------------------------

#[test]
fn test_empty_sum_is_zero() {
    assert!(BasisSumField::default().evaluate(Point::new(0.5, 0.5)).is_zero());
}

#[test]
fn test_single_element_value_at_anchor() {
    let anchor = Point::new(0.3, 0.6);
    let e = BasisField::regular(anchor, 2.0, Vec2::new(1.0, 1.0));
    let decay = 7.0;
    let mut sum = BasisSumField::new(decay);
    sum.insert(e);
    let expected = rbf(anchor, anchor, decay) * e.scale * e.evaluate(anchor);
    assert!(close(sum.evaluate(anchor), expected, 1e-5));
}

#[test]
fn test_nearer_element_dominates_midpoint() {
    // Perpendicular road directions are opposite tensors.
    let mut sum = BasisSumField::default();
    sum.insert(BasisField::regular(Point::new(0.4, 0.5), 1.0, Vec2::X));
    sum.insert(BasisField::regular(Point::new(1.0, 0.5), 1.0, Vec2::Y));

    let t = sum.evaluate(Point::new(0.5, 0.5));
    assert!(t.angle() < 1e-3 || PI - t.angle() < 1e-3, "angle {}", t.angle());
    // Inverse-square nearness keeps the far element below 5% of the blend.
    assert!(t.value() > 0.85, "value {}", t.value());
}

#[test]
fn test_sum_handles_are_stable() {
    let mut sum = BasisSumField::default();
    let a = sum.insert(BasisField::regular(Point::new(0.1, 0.1), 1.0, Vec2::X));
    let b = sum.insert(BasisField::singular(
        Point::new(0.9, 0.9),
        1.0,
        SingularityKind::Center,
    ));
    assert_ne!(a, b);
    assert_eq!(sum.singularities().collect::<Vec<_>>(), vec![Point::new(0.9, 0.9)]);

    assert!(sum.remove(a).is_some());
    assert!(sum.remove(a).is_none());
    assert!(sum.get(b).is_some());

    let moved = BasisField::singular(Point::new(0.2, 0.8), 1.0, SingularityKind::Node);
    assert!(sum.replace(b, moved).is_some());
    assert_eq!(sum.get(b).map(|f| f.anchor), Some(Point::new(0.2, 0.8)));
    assert_eq!(sum.len(), 1);
}

#[test]
fn test_higher_decay_weakens_far_field() {
    let e = BasisField::regular(Point::new(0.1, 0.1), 1.0, Vec2::X);
    let mut soft = BasisSumField::new(1.0);
    soft.insert(e);
    let mut sharp = BasisSumField::new(50.0);
    sharp.insert(e);
    let p = Point::new(0.6, 0.6);
    assert!(soft.evaluate(p).value() > sharp.evaluate(p).value());
}

// ---------------------------------------------------------------------------
// DiscreteField
// ---------------------------------------------------------------------------

fn swirl() -> BasisSumField {
    let mut sum = BasisSumField::new(2.0);
    sum.insert(BasisField::singular(Point::new(0.37, 0.61), 1.0, SingularityKind::Node));
    sum.insert(BasisField::regular(Point::new(0.8, 0.2), 1.0, Vec2::new(1.0, 0.3)));
    sum
}

#[test]
fn test_discrete_reproduces_lattice_points() {
    let source = swirl();
    let mut field = DiscreteField::new(8);
    field.load_values(&source);
    for row in 0..=8 {
        for col in 0..=8 {
            let p = field.lattice_point(row, col);
            assert!(
                close(field.evaluate(p), source.evaluate(p), 1e-4),
                "lattice ({row}, {col})"
            );
        }
    }
}

#[test]
fn test_discrete_interpolation_is_convex() {
    let mut field = DiscreteField::new(6);
    field.load_values(&swirl());
    let mut rng = StdRng::seed_from_u64(0xF1E1_D000);
    for _ in 0..500 {
        let p = Point::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
        let c = ((p.x() * 6.0).floor() as usize).min(5);
        let r = ((p.y() * 6.0).floor() as usize).min(5);
        let corners = [
            field.node(r, c),
            field.node(r, c + 1),
            field.node(r + 1, c),
            field.node(r + 1, c + 1),
        ];
        let v = field.evaluate(p).components();
        for axis in 0..2 {
            let vals = corners.map(|t| t.components()[axis]);
            let lo = vals.iter().cloned().fold(f32::MAX, f32::min);
            let hi = vals.iter().cloned().fold(f32::MIN, f32::max);
            assert!(v[axis] >= lo - 1e-5 && v[axis] <= hi + 1e-5);
        }
    }
}

#[test]
fn test_discrete_clamps_outside_domain() {
    let mut field = DiscreteField::new(4);
    field.load_values(&swirl());
    assert_eq!(
        field.evaluate(Point::new(-3.0, 2.0)),
        field.evaluate(Point::new(0.0, 1.0))
    );
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

#[test]
fn test_height_field_follows_contours() {
    let map = HeightMap::from_fn(50, 50, |col, _| col as f32 / 49.0);
    let field = HeightField::new(Some(map));
    let t = field.evaluate(Point::new(0.5, 0.5));
    assert!(t.value() > 1.0);
    // Height rises eastwards, so contour lines run north-south.
    let major = t.eigenvector(true).normalize();
    assert!(major.x.abs() < 1e-3, "{major:?}");
}

#[test]
fn test_height_field_follows_diagonal_contours() {
    // Height rises towards the north-east of the field.
    let map = HeightMap::from_fn(50, 50, |col, row| (col + 49 - row) as f32 / 98.0);
    let field = HeightField::new(Some(map));
    let major = field.evaluate(Point::new(0.5, 0.5)).eigenvector(true).normalize();
    // Contours run north-west to south-east.
    assert!((major.x + major.y).abs() < 1e-3, "{major:?}");
    assert!((major.x.abs() - FRAC_1_SQRT_2).abs() < 1e-3, "{major:?}");
}

#[test]
fn test_height_field_without_map_or_at_margin_is_zero() {
    assert!(HeightField::default().evaluate(Point::new(0.5, 0.5)).is_zero());
    let map = HeightMap::from_fn(10, 10, |col, row| (col + row) as f32 / 18.0);
    let field = HeightField::new(Some(map));
    assert!(field.evaluate(Point::new(1.0, 0.5)).is_zero());
}

fn block_map() -> BoundaryMap {
    BoundaryMap::from_fn(20, 20, |col, row| {
        ((5..=14).contains(&col) && (8..=12).contains(&row)).then_some(1)
    })
}

#[test]
fn test_boundary_field_builds_tangent_elements() {
    let field = BoundaryField::from_map(&block_map());
    assert!(field.element_count() > 0);
    // Just below the bottom border the field runs along it.
    let t = field.evaluate(Point::new(0.5, 0.32));
    assert!(t.value() > 0.0);
    let major = t.eigenvector(true);
    assert!(major.x.abs() > major.y.abs(), "{major:?}");

    let mut cleared = field.clone();
    cleared.set_map(None);
    assert_eq!(cleared.element_count(), 0);
}

#[test]
fn test_polygon_mask() {
    let inner = ConstantField(Tensor::new(1.0, 0.0));
    let square = Polygon::new(vec![
        Point::new(0.2, 0.2),
        Point::new(0.6, 0.2),
        Point::new(0.6, 0.6),
        Point::new(0.2, 0.6),
    ]);
    let mask = PolygonMask::new(&inner, &square);
    assert!(!mask.evaluate(Point::new(0.4, 0.4)).is_zero());
    assert!(mask.evaluate(Point::new(0.7, 0.4)).is_zero());
}

// ---------------------------------------------------------------------------
// CityField
// ---------------------------------------------------------------------------

fn small_settings() -> FieldSettings {
    FieldSettings {
        boundary_resolution: 16,
        ..FieldSettings::default()
    }
}

#[test]
fn test_city_field_normalizes_user_layer() {
    let mut field = CityField::new(small_settings());
    field.insert_basis(BasisField::regular(Point::new(0.5, 0.5), 1.0, Vec2::X));
    let t = field.evaluate(Point::new(0.5, 0.5));
    assert!((t.value() - 1.0).abs() < 1e-5);

    field.set_normalize(false);
    let weak = field.evaluate(Point::new(0.5, 0.5));
    assert!((weak.value() - 0.7).abs() < 1e-4, "{}", weak.value());
}

#[test]
fn test_city_field_obstacles_are_zero() {
    let mut field = CityField::new(small_settings());
    field.insert_basis(BasisField::regular(Point::new(0.5, 0.5), 1.0, Vec2::X));
    field.insert_basis(BasisField::regular(Point::new(0.1, 0.9), 1.0, Vec2::Y));
    field.set_boundary_map(Some(block_map()));
    assert!(field.evaluate(Point::new(0.5, 0.5)).is_zero());
    assert!(!field.evaluate(Point::new(0.1, 0.9)).is_zero());
}

#[test]
fn test_city_field_layer_names() {
    let mut field = CityField::new(small_settings());
    assert_eq!(field.set_weight_by_name("height", 0.5), Some(FieldLayer::Height));
    assert_eq!(field.settings().weight(FieldLayer::Height), 0.5);
    assert_eq!(field.set_decay_by_name("userEdit", 9.0), Some(FieldLayer::User));
    assert_eq!(field.user().decay(), 9.0);
    assert_eq!(field.set_weight_by_name("water", 1.0), None);
    assert_eq!(FieldLayer::from_name(FieldLayer::Boundary.name()), Some(FieldLayer::Boundary));
}

#[test]
fn test_city_field_keeps_positive_lattice_resolution() {
    let mut field = CityField::new(FieldSettings {
        height_resolution: 0,
        boundary_resolution: 0,
        ..FieldSettings::default()
    });
    let defaults = FieldSettings::default();
    assert_eq!(field.settings().height_resolution, defaults.height_resolution);
    assert_eq!(field.settings().boundary_resolution, defaults.boundary_resolution);

    field.apply_settings(small_settings());
    field.apply_settings(FieldSettings {
        boundary_resolution: 0,
        user_weight: 0.3,
        ..small_settings()
    });
    assert_eq!(field.settings().boundary_resolution, 16);
    assert_eq!(field.settings().user_weight, 0.3);

    field.set_boundary_map(Some(block_map()));
    assert!(field.evaluate(Point::new(0.5, 0.5)).is_zero());
}
