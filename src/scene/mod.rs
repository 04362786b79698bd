pub mod writer;

use crate::common::{ExportError, Result, SpectralDistribution};
use std::{fmt, str::FromStr};

pub const SCENE_VERSION: &str = "2.0.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BsdfType {
    Diffuse,
    Plastic,
    RoughPlastic,
}

impl BsdfType {
    pub const ALL: [BsdfType; 3] = [BsdfType::Diffuse, BsdfType::Plastic, BsdfType::RoughPlastic];

    pub fn as_str(&self) -> &'static str {
        match self {
            BsdfType::Diffuse => "diffuse",
            BsdfType::Plastic => "plastic",
            BsdfType::RoughPlastic => "roughplastic",
        }
    }

    /// Name of the spectrum parameter carrying the surface colour.
    pub fn reflectance_param(&self) -> &'static str {
        match self {
            BsdfType::Diffuse => "reflectance",
            BsdfType::Plastic | BsdfType::RoughPlastic => "diffuse_reflectance",
        }
    }

    pub fn has_ior(&self) -> bool {
        *self != BsdfType::Diffuse
    }

    pub fn has_alpha(&self) -> bool {
        *self == BsdfType::RoughPlastic
    }
}

impl fmt::Display for BsdfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BsdfType {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        BsdfType::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .cloned()
            .ok_or_else(|| ExportError::UnknownBsdfType(s.to_owned()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    Bsdf(BsdfType),
    Emitter,
}

impl NodeKind {
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Bsdf(_) => "bsdf",
            NodeKind::Emitter => "emitter",
        }
    }

    pub fn type_attr(&self) -> &'static str {
        match self {
            NodeKind::Bsdf(kind) => kind.as_str(),
            NodeKind::Emitter => "area",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Spectrum {
        name: String,
        value: SpectralDistribution,
    },
    Float {
        name: String,
        value: f64,
    },
}

impl Param {
    pub fn tag(&self) -> &'static str {
        match self {
            Param::Spectrum { .. } => "spectrum",
            Param::Float { .. } => "float",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Param::Spectrum { name, .. } | Param::Float { name, .. } => name,
        }
    }
}

/// One `bsdf` or `emitter` element and its parameters, in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    kind: NodeKind,
    id: String,
    params: Vec<Param>,
}

impl Node {
    fn new(kind: NodeKind, id: String) -> Result<Self> {
        if id.trim().is_empty() {
            return Err(ExportError::MalformedIdentifier(id));
        }

        Ok(Node {
            kind,
            id,
            params: Vec::new(),
        })
    }

    pub fn new_bsdf(kind: BsdfType, id: impl Into<String>) -> Result<Self> {
        Self::new(NodeKind::Bsdf(kind), id.into())
    }

    pub fn new_emitter(id: impl Into<String>) -> Result<Self> {
        Self::new(NodeKind::Emitter, id.into())
    }

    pub fn add_spectrum_param(
        &mut self,
        name: impl Into<String>,
        value: SpectralDistribution,
    ) -> &mut Self {
        self.params.push(Param::Spectrum {
            name: name.into(),
            value,
        });
        self
    }

    pub fn add_float_param(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.params.push(Param::Float {
            name: name.into(),
            value,
        });
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|param| param.name() == name)
    }
}

/// Root `scene` element. Nodes are moved in on [`Scene::push`] and can no longer
/// be modified; the writer consumes the whole scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    version: String,
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Scene {
            version: String::from(SCENE_VERSION),
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes.iter().map(|node| node.id())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bsdf_type_parameters() {
        assert_eq!(BsdfType::Diffuse.reflectance_param(), "reflectance");
        assert_eq!(BsdfType::Plastic.reflectance_param(), "diffuse_reflectance");
        assert_eq!(BsdfType::RoughPlastic.reflectance_param(), "diffuse_reflectance");
        assert!(!BsdfType::Diffuse.has_ior());
        assert!(BsdfType::Plastic.has_ior() && !BsdfType::Plastic.has_alpha());
        assert!(BsdfType::RoughPlastic.has_ior() && BsdfType::RoughPlastic.has_alpha());
    }

    #[test]
    fn test_bsdf_type_from_str() {
        for kind in BsdfType::ALL.iter() {
            assert_eq!(kind.as_str().parse::<BsdfType>().unwrap(), *kind);
        }
        assert!("conductor".parse::<BsdfType>().is_err());
    }

    #[test]
    fn test_node_builder_appends_params_in_order() {
        let sd = SpectralDistribution::from_pairs("patch", &[(400.0, 0.1), (405.0, 0.2)]).unwrap();
        let mut node = Node::new_bsdf(BsdfType::RoughPlastic, "patch_01").unwrap();
        node.add_spectrum_param("diffuse_reflectance", sd.clone())
            .add_float_param("int_ior", 1.46)
            .add_float_param("alpha", 0.05);

        assert_eq!(node.kind().tag(), "bsdf");
        assert_eq!(node.kind().type_attr(), "roughplastic");
        let names: Vec<&str> = node.params().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["diffuse_reflectance", "int_ior", "alpha"]);
        assert_eq!(
            node.param("diffuse_reflectance"),
            Some(&Param::Spectrum {
                name: String::from("diffuse_reflectance"),
                value: sd
            })
        );
    }

    #[test]
    fn test_node_rejects_blank_id() {
        assert!(matches!(
            Node::new_emitter(""),
            Err(ExportError::MalformedIdentifier(_))
        ));
        assert!(Node::new_bsdf(BsdfType::Diffuse, "  ").is_err());
    }

    #[test]
    fn test_scene_does_not_enforce_unique_ids() {
        let mut scene = Scene::new();
        scene.push(Node::new_emitter("light").unwrap());
        scene.push(Node::new_emitter("light").unwrap());
        assert_eq!(scene.version(), "2.0.0");
        assert_eq!(scene.ids().collect::<Vec<_>>(), vec!["light", "light"]);
    }
}
