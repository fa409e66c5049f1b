//! Scene graph and hierarchical scene organization.
//!
//! Every node owns a local [`Transform`] and a cached world matrix. World
//! matrices are only ever produced by [`SceneNode::update_world_transforms`],
//! which walks the tree computing `parent_world * local`. Moving a parent
//! therefore moves its children without touching their local transforms.

use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use cgmath::{Matrix4, SquareMatrix};

use crate::data_structures::{
    geometry::Geometry,
    light::Light,
    material::Material,
    texture::Environment,
    transform::{Transform, world_transform},
};

/// Process-unique handle of a node. GPU resources are cached per id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Shape and appearance of a drawable node.
#[derive(Clone, Debug)]
pub struct MeshData {
    pub geometry: Arc<Geometry>,
    pub material: Material,
}

pub trait SceneNode: Debug {
    fn id(&self) -> NodeId;

    fn name(&self) -> &str;

    /// `None` for pure grouping nodes.
    fn mesh(&self) -> Option<&MeshData>;

    fn mesh_mut(&mut self) -> Option<&mut MeshData>;

    fn local_transform(&self) -> &Transform;

    fn local_transform_mut(&mut self) -> &mut Transform;

    /// World matrix as of the last [`update_world_transforms`](Self::update_world_transforms).
    fn world_transform(&self) -> Matrix4<f32>;

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /**
     * Recomputes this node's world matrix from `parent_world` and pushes the
     * result down to all children.
     */
    fn update_world_transforms(&mut self, parent_world: &Matrix4<f32>);

    fn update_world_transform_all(&mut self) {
        self.update_world_transforms(&Matrix4::identity());
    }
}

/// Fields shared by every node kind.
#[derive(Debug)]
struct NodeCore {
    id: NodeId,
    name: String,
    local: Transform,
    world: Matrix4<f32>,
    children: Vec<Box<dyn SceneNode>>,
}

impl NodeCore {
    fn new(name: &str) -> Self {
        Self {
            id: NodeId::next(),
            name: name.to_string(),
            local: Transform::default(),
            world: Matrix4::identity(),
            children: Vec::new(),
        }
    }

    fn update(&mut self, parent_world: &Matrix4<f32>) {
        self.world = world_transform(parent_world, &self.local);
        let world = self.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }
}

macro_rules! impl_node_core {
    () => {
        fn id(&self) -> NodeId {
            self.core.id
        }

        fn name(&self) -> &str {
            &self.core.name
        }

        fn local_transform(&self) -> &Transform {
            &self.core.local
        }

        fn local_transform_mut(&mut self) -> &mut Transform {
            &mut self.core.local
        }

        fn world_transform(&self) -> Matrix4<f32> {
            self.core.world
        }

        fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
            &self.core.children
        }

        fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
            &mut self.core.children
        }

        fn add_child(&mut self, child: Box<dyn SceneNode>) {
            self.core.children.push(child);
        }

        fn update_world_transforms(&mut self, parent_world: &Matrix4<f32>) {
            self.core.update(parent_world);
        }
    };
}

/// A node that only groups and transforms its children.
#[derive(Debug)]
pub struct ContainerNode {
    core: NodeCore,
}

impl ContainerNode {
    pub fn new(name: &str) -> Self {
        Self {
            core: NodeCore::new(name),
        }
    }
}

impl SceneNode for ContainerNode {
    impl_node_core!();

    fn mesh(&self) -> Option<&MeshData> {
        None
    }

    fn mesh_mut(&mut self) -> Option<&mut MeshData> {
        None
    }
}

/// A drawable node: geometry plus material.
#[derive(Debug)]
pub struct MeshNode {
    core: NodeCore,
    data: MeshData,
}

impl MeshNode {
    pub fn new(name: &str, geometry: Arc<Geometry>, material: Material) -> Self {
        Self {
            core: NodeCore::new(name),
            data: MeshData { geometry, material },
        }
    }

    /// A wireframe overlay drawn with the same geometry, meant to be added as
    /// a child so it follows this mesh.
    pub fn overlay(&self, name: &str, material: Material) -> Self {
        Self::new(name, self.data.geometry.clone(), material)
    }

    pub fn with_child(mut self, child: impl SceneNode + 'static) -> Self {
        self.add_child(Box::new(child));
        self
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.data.material
    }
}

impl SceneNode for MeshNode {
    impl_node_core!();

    fn mesh(&self) -> Option<&MeshData> {
        Some(&self.data)
    }

    fn mesh_mut(&mut self) -> Option<&mut MeshData> {
        Some(&mut self.data)
    }
}

/// Ordered top-level objects, lights and an optional environment.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Box<dyn SceneNode>>,
    lights: Vec<Light>,
    environment: Option<Environment>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level node and returns its id.
    pub fn add(&mut self, node: impl SceneNode + 'static) -> NodeId {
        let id = node.id();
        self.nodes.push(Box::new(node));
        id
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn nodes(&self) -> &[Box<dyn SceneNode>] {
        &self.nodes
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Top-level nodes that draw something (children excluded).
    pub fn top_level_meshes(&self) -> impl Iterator<Item = &dyn SceneNode> {
        self.nodes
            .iter()
            .map(|node| node.as_ref())
            .filter(|node| node.mesh().is_some())
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    pub fn set_environment(&mut self, environment: Option<Environment>) {
        self.environment = environment;
    }

    pub fn find(&self, id: NodeId) -> Option<&dyn SceneNode> {
        fn search(nodes: &[Box<dyn SceneNode>], id: NodeId) -> Option<&dyn SceneNode> {
            nodes.iter().find_map(|node| {
                if node.id() == id {
                    Some(node.as_ref())
                } else {
                    search(node.get_children(), id)
                }
            })
        }
        search(&self.nodes, id)
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut dyn SceneNode> {
        fn search(nodes: &mut [Box<dyn SceneNode>], id: NodeId) -> Option<&mut dyn SceneNode> {
            for node in nodes.iter_mut() {
                if node.id() == id {
                    return Some(node.as_mut());
                }
                if let Some(found) = search(node.get_children_mut(), id) {
                    return Some(found);
                }
            }
            None
        }
        search(&mut self.nodes, id)
    }

    /// Recomputes all world matrices from the root.
    pub fn update_world_transforms(&mut self) {
        for node in self.nodes.iter_mut() {
            node.update_world_transform_all();
        }
    }

    /// Depth-first walk over every node, parents before children.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a dyn SceneNode)) {
        fn walk<'a>(nodes: &'a [Box<dyn SceneNode>], f: &mut dyn FnMut(&'a dyn SceneNode)) {
            for node in nodes {
                f(node.as_ref());
                walk(node.get_children(), f);
            }
        }
        walk(&self.nodes, f);
    }
}
