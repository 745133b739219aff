//! Asset library: the seam to the host's model loader.
//!
//! The simulation only needs "give me a node tree for this asset name"; the
//! registry below stands in for the host loader and fails for names it does
//! not know, which is what drives the per-prop skip-and-log policy at scene
//! build time.

use anyhow::{bail, Result};
use engine_core::{NodeId, SceneGraph};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct AssetLibrary {
    known: HashSet<&'static str>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library pre-registered with every asset the scenes reference.
    pub fn with_standard_assets() -> Self {
        let mut lib = Self::new();
        for name in [
            // rooms and characters
            "exam_room.glb",
            "showcase_room.glb",
            "bed.glb",
            "patient.glb",
            "avatar.glb",
            // props
            "bandage.glb",
            "oximeter.glb",
            "medical_scissors.glb",
            "reflex_hammer.glb",
            "stethoscope.glb",
            "chestpiece.glb",
            "gauze.glb",
            "syringe.glb",
            "thermometer.glb",
            "tensimeter.glb",
            "iv_stand.glb",
            "iv_bag.glb",
        ] {
            lib.register(name);
        }
        lib
    }

    pub fn register(&mut self, name: &'static str) {
        self.known.insert(name);
    }

    /// Instantiate an asset as a child node of `parent`. Unknown names are an
    /// error the caller is expected to log and skip.
    pub fn instantiate(
        &self,
        graph: &mut SceneGraph,
        parent: NodeId,
        name: &str,
    ) -> Result<NodeId> {
        if !self.known.contains(name) {
            bail!("unknown asset: {name}");
        }
        Ok(graph.create_child(parent, name.to_string())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_asset_is_an_error() {
        let lib = AssetLibrary::with_standard_assets();
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root");
        assert!(lib.instantiate(&mut graph, root, "missing.glb").is_err());
        assert!(lib.instantiate(&mut graph, root, "thermometer.glb").is_ok());
    }
}
