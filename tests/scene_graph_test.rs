use std::sync::Arc;

use cgmath::{Matrix4, Rad, SquareMatrix, Vector3, Vector4};
use spin_ngin::data_structures::{
    geometry::Geometry,
    material::{Colour, Material},
    scene_graph::{ContainerNode, MeshNode, Scene, SceneNode},
    transform::{Transform, world_transform},
};

fn icosahedron_with_wireframe() -> MeshNode {
    let mesh = MeshNode::new(
        "mesh",
        Arc::new(Geometry::icosahedron(1.0, 0)),
        Material::standard(Colour::WHITE).flat_shading(),
    );
    let wire = mesh.overlay("wire", Material::basic(Colour::WHITE).wireframe());
    mesh.with_child(wire)
}

#[test]
fn moving_the_parent_keeps_the_child_local_transform() {
    let mut scene = Scene::new();
    let id = scene.add(icosahedron_with_wireframe());
    scene.update_world_transforms();

    let parent = scene.find_mut(id).unwrap();
    parent.local_transform_mut().position = Vector3::new(1.0, 2.0, 3.0);
    parent.local_transform_mut().rotate_xy(Rad(0.3), Rad(0.6));
    scene.update_world_transforms();

    let parent = scene.find(id).unwrap();
    let child = &parent.get_children()[0];
    assert_eq!(*child.local_transform(), Transform::new());
    assert_eq!(child.world_transform(), parent.world_transform());

    let origin = child.world_transform() * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert_eq!(origin, Vector4::new(1.0, 2.0, 3.0, 1.0));
}

#[test]
fn world_is_parent_times_local() {
    let mut container = ContainerNode::new("group");
    container.local_transform_mut().position = Vector3::new(0.0, 5.0, 0.0);
    let mut child = icosahedron_with_wireframe();
    child.local_transform_mut().position = Vector3::new(2.0, 0.0, 0.0);
    let child_id = child.id();
    container.add_child(Box::new(child));

    let mut scene = Scene::new();
    scene.add(container);
    scene.update_world_transforms();

    let child = scene.find(child_id).unwrap();
    let expected = world_transform(
        &Matrix4::from_translation(Vector3::new(0.0, 5.0, 0.0)),
        &Transform::from_position((2.0, 0.0, 0.0)),
    );
    assert_eq!(child.world_transform(), expected);
    assert_eq!(scene.top_level_meshes().count(), 0);
}

#[test]
fn root_nodes_start_at_the_identity() {
    let mut scene = Scene::new();
    let id = scene.add(icosahedron_with_wireframe());
    scene.update_world_transforms();
    assert_eq!(scene.find(id).unwrap().world_transform(), Matrix4::identity());
}
