//! Material catalog with dependency-ordered emission

use super::Material;
use crate::primitive::{Identifier, Primitive};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Material definitions keyed by identifier
///
/// Iteration follows insertion order, so emission is deterministic.
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    materials: Vec<Material>,
    index: HashMap<Identifier, usize>,
}

impl MaterialCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, rejecting duplicate ids
    pub fn from_materials(materials: impl IntoIterator<Item = Material>) -> Result<Self> {
        let mut catalog = Self::new();
        for material in materials {
            catalog.insert(material)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, material: Material) -> Result<()> {
        if self.index.contains_key(&material.id) {
            return Err(Error::DuplicateIdentifier(material.id.to_string()));
        }
        self.index.insert(material.id.clone(), self.materials.len());
        self.materials.push(material);
        Ok(())
    }

    pub fn get(&self, id: &Identifier) -> Option<&Material> {
        self.index.get(id).map(|&i| &self.materials[i])
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    /// Emit a material and everything it depends on
    ///
    /// Depth-first, post-order over the modifier graph: every modifier's
    /// primitives precede the primitives that reference it. On a cycle the
    /// whole call fails and nothing is returned.
    pub fn emit(&self, id: &Identifier) -> Result<Vec<Primitive>> {
        self.emit_all(std::iter::once(id))
    }

    /// Emit several materials, sharing dependencies between them
    ///
    /// Each material is emitted at most once, in first-reached order.
    pub fn emit_all<'i>(
        &self,
        ids: impl IntoIterator<Item = &'i Identifier>,
    ) -> Result<Vec<Primitive>> {
        let mut emission = Emission::new(self);
        for id in ids {
            let material = self.get(id).ok_or_else(|| {
                Error::InvalidParameter(format!("material '{}' is not defined", id))
            })?;
            emission.visit(material)?;
        }
        Ok(emission.output)
    }

    /// Emit every material in the catalog
    pub fn emit_catalog(&self) -> Result<Vec<Primitive>> {
        self.emit_all(self.materials.iter().map(|m| &m.id))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

struct Emission<'a> {
    catalog: &'a MaterialCatalog,
    marks: HashMap<&'a Identifier, Mark>,
    path: Vec<&'a Identifier>,
    emitted: HashSet<Identifier>,
    output: Vec<Primitive>,
}

impl<'a> Emission<'a> {
    fn new(catalog: &'a MaterialCatalog) -> Self {
        Self {
            catalog,
            marks: HashMap::new(),
            path: Vec::new(),
            emitted: HashSet::new(),
            output: Vec::new(),
        }
    }

    fn visit(&mut self, material: &'a Material) -> Result<()> {
        let id = &material.id;
        match self.marks.get(id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = self.path.iter().position(|p| *p == id).unwrap_or(0);
                let mut chain: Vec<String> =
                    self.path[start..].iter().map(|p| p.to_string()).collect();
                chain.push(id.to_string());
                return Err(Error::CyclicModifier {
                    material: id.to_string(),
                    chain,
                });
            }
            None => {}
        }

        material.validate()?;

        self.marks.insert(id, Mark::Visiting);
        self.path.push(id);

        for modifier in &material.modifiers {
            let dependency =
                self.catalog
                    .get(modifier)
                    .ok_or_else(|| Error::UnknownModifier {
                        material: id.to_string(),
                        modifier: modifier.to_string(),
                    })?;
            self.visit(dependency)?;
        }

        self.path.pop();
        self.marks.insert(id, Mark::Done);

        for primitive in material.primitives()? {
            if !self.emitted.insert(primitive.id.clone()) {
                return Err(Error::DuplicateIdentifier(primitive.id.to_string()));
            }
            self.output.push(primitive);
        }

        Ok(())
    }
}
