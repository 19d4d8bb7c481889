use holiday_ngin::data_structures::geometry::{GeometryKind, RIBBON_TINT, candy_cane_path};

const ALL_KINDS: [GeometryKind; 7] = [
    GeometryKind::Sphere,
    GeometryKind::Box,
    GeometryKind::Cylinder,
    GeometryKind::Dodecahedron,
    GeometryKind::GiftBox,
    GeometryKind::CandyCane,
    GeometryKind::Quad,
];

#[test]
fn every_kind_builds_a_valid_triangle_list() {
    for kind in ALL_KINDS {
        let mesh = kind.build();
        assert!(!mesh.vertices.is_empty(), "{kind:?} has no vertices");
        assert_eq!(mesh.indices.len() % 3, 0, "{kind:?} index count");
        assert!(mesh.triangle_count() > 0);
        let len = mesh.vertices.len() as u32;
        assert!(
            mesh.indices.iter().all(|i| *i < len),
            "{kind:?} indexes past its {len} vertices"
        );
    }
}

#[test]
fn normals_are_unit_length() {
    for kind in ALL_KINDS {
        for vertex in kind.build().vertices {
            let [x, y, z] = vertex.normal;
            let length = (x * x + y * y + z * z).sqrt();
            assert!((length - 1.0).abs() < 1e-3, "{kind:?} normal {:?}", vertex.normal);
        }
    }
}

#[test]
fn meshes_are_roughly_unit_sized() {
    for kind in ALL_KINDS {
        for vertex in kind.build().vertices {
            assert!(
                vertex.position.iter().all(|c| c.abs() <= 1.0),
                "{kind:?} vertex {:?} outside the unit box",
                vertex.position
            );
        }
    }
}

#[test]
fn gift_boxes_carry_ribbons() {
    let mesh = GeometryKind::GiftBox.build();
    assert!(mesh.vertices.iter().any(|v| v.tint == RIBBON_TINT));
    assert!(mesh.vertices.iter().any(|v| v.tint != RIBBON_TINT));
}

#[test]
fn candy_cane_path_has_a_hook() {
    let path = candy_cane_path(64);
    assert_eq!(path.len(), 65);
    let top = path.iter().map(|p| p.y).fold(f32::MIN, f32::max);
    let start = path[0];
    let end = path[path.len() - 1];
    assert!(top > start.y);
    // the hook bends back down and sideways
    assert!(end.y < top);
    assert!((end.x - start.x).abs() > 0.1);
}
