/*!

  Circuits used as components of other circuits.

  A [CompositeDef] wraps a loaded [Circuit] and exposes its pins as ports on a
  box. Each placed instance owns a private [Simulation] of the inner circuit,
  created by the parent engine through [CompositeDef::instantiate].

*/

use crate::circuit::{Bounds, Circuit, Coord, Facing, GRID, LocalPort, PortMode, Signal};
use crate::component::{Footprint, Kind, Primitive};
use crate::description::Document;
use crate::error::{Error, Result};
use crate::simulation::{EngineConfig, Propagation, Simulation};
use bitvec::prelude::*;
use std::collections::HashMap;
use std::rc::Rc;

/// A pin of the inner circuit exposed as a port of the box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    /// Index of the pin among the inner circuit's components
    pub inner: usize,
    /// Where the pin connects inside
    pub at: Coord,
    /// Direction seen from the parent circuit
    pub mode: PortMode,
    /// Edge of the box the port sits on
    pub side: Facing,
    /// The pin's label
    pub label: Option<String>,
}

/// A circuit packaged to be placed inside other circuits
#[derive(Debug, Clone)]
pub struct CompositeDef {
    name: String,
    circuit: Circuit,
    boundary: Vec<Boundary>,
    ports: Vec<LocalPort>,
    dims: (i32, i32),
}

impl CompositeDef {
    /// Lay out the pins of `circuit` around a box.
    ///
    /// Pins are taken in order of distance from the circuit's origin, ties kept
    /// in component order, and placed on the edge opposite to the way they face.
    pub fn new(circuit: Circuit) -> Self {
        let mut pins: Vec<(usize, Coord, Facing, bool, Option<String>)> = circuit
            .components()
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match c.kind() {
                Kind::Primitive(Primitive::Pin(state)) => Some((
                    i,
                    c.anchor(),
                    c.facing().opposite(),
                    state.output,
                    state.label.clone(),
                )),
                _ => None,
            })
            .collect();
        pins.sort_by_key(|(_, at, ..)| at.magnitude_sq());

        let mut per_side = [0i32; 4];
        for (_, _, side, ..) in &pins {
            per_side[side.index()] += 1;
        }
        let [north, east, south, west] = per_side;
        let width = (north.max(south) + 1).max(3) * GRID;
        let height = (east.max(west) + 1).max(3) * GRID;

        let mut placed = [0i32; 4];
        let mut boundary = Vec::with_capacity(pins.len());
        let mut ports = Vec::with_capacity(pins.len());
        for (inner, at, side, output, label) in pins {
            placed[side.index()] += 1;
            let step = placed[side.index()] * GRID;
            let offset = match side {
                Facing::West => Coord::new(0, step),
                Facing::East => Coord::new(width, step),
                Facing::North => Coord::new(step, 0),
                Facing::South => Coord::new(step, height),
            };
            let mode = if output {
                PortMode::Output
            } else {
                PortMode::Input
            };
            ports.push(LocalPort { offset, mode });
            boundary.push(Boundary {
                inner,
                at,
                mode,
                side,
                label,
            });
        }

        Self {
            name: circuit.get_name().to_string(),
            circuit,
            boundary,
            ports,
            dims: (width, height),
        }
    }

    /// The wrapped circuit
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// The exposed pins, in port order
    pub fn boundary(&self) -> &[Boundary] {
        &self.boundary
    }

    /// Build a fresh engine for one instance
    pub fn instantiate(&self, config: &EngineConfig) -> Simulation {
        Simulation::load(&self.circuit, config.clone())
    }

    /// The port vector as currently seen from outside. Unconnected pins read low.
    pub fn read_boundary(&self, chip: &Simulation) -> BitVec {
        self.boundary
            .iter()
            .map(|b| chip.read_at(b.at).unwrap_or(Signal::Low).is_high())
            .collect()
    }

    /// Forward a change on port `changed` into `chip` and read every boundary back,
    /// along with what the change caused inside
    pub fn on_signal_change(
        &self,
        chip: &mut Simulation,
        ports: &BitSlice,
        changed: usize,
    ) -> (BitVec, Propagation) {
        let mut report = Propagation::default();
        if let Some(b) = self.boundary.get(changed) {
            if b.mode == PortMode::Input {
                let value = ports.get(changed).is_some_and(|v| *v);
                // Boundary pins always exist in the inner engine
                report = chip
                    .propagate_component_output(b.inner, BitVec::repeat(value, 1))
                    .unwrap_or_default();
            }
        }
        (self.read_boundary(chip), report)
    }
}

impl Footprint for CompositeDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> (i32, i32) {
        self.dims
    }

    /// Anchored at the top-left corner
    fn local_bounds(&self) -> Bounds {
        Bounds::from_corners(Coord::ORIGIN, Coord::new(self.dims.0, self.dims.1))
    }

    fn ports(&self) -> Vec<LocalPort> {
        self.ports.clone()
    }
}

/// Every circuit of a document, loaded and ready to be instantiated by name
#[derive(Debug, Clone, Default)]
pub struct CircuitRegistry {
    defs: HashMap<String, Rc<CompositeDef>>,
    order: Vec<String>,
}

impl CircuitRegistry {
    /// A registry without any circuits
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every circuit of `doc`.
    ///
    /// Sub-circuits are loaded before the circuits that use them. A circuit
    /// that ends up instantiating itself is an [Error::RecursiveCircuit].
    pub fn from_document(doc: &Document) -> Result<Self> {
        let mut registry = Self::new();
        let mut stack = Vec::new();
        for desc in &doc.circuits {
            registry.visit(doc, &desc.name, &mut stack)?;
        }
        Ok(registry)
    }

    fn visit(&mut self, doc: &Document, name: &str, stack: &mut Vec<String>) -> Result<()> {
        if self.defs.contains_key(name) {
            return Ok(());
        }
        if stack.iter().any(|s| s == name) {
            return Err(Error::RecursiveCircuit(name.to_string()));
        }
        let Some(desc) = doc.circuit(name) else {
            return Ok(());
        };

        stack.push(name.to_string());
        for comp in &desc.components {
            if !Primitive::is_known(&comp.name) && doc.circuit(&comp.name).is_some() {
                self.visit(doc, &comp.name, stack)?;
            }
        }
        stack.pop();

        let circuit = Circuit::load(desc, self)?;
        self.register(circuit);
        Ok(())
    }

    /// Add a loaded circuit, replacing any circuit of the same name
    pub fn register(&mut self, circuit: Circuit) -> Rc<CompositeDef> {
        let name = circuit.get_name().to_string();
        let def = Rc::new(CompositeDef::new(circuit));
        if self.defs.insert(name.clone(), def.clone()).is_none() {
            self.order.push(name);
        }
        def
    }

    /// Look up a circuit by name
    pub fn get(&self, name: &str) -> Option<&Rc<CompositeDef>> {
        self.defs.get(name)
    }

    /// The loaded circuit called `name`
    pub fn circuit(&self, name: &str) -> Result<&Circuit> {
        self.get(name)
            .map(|def| def.circuit())
            .ok_or_else(|| Error::UnknownCircuit(name.to_string()))
    }

    /// Start a simulation of the circuit called `name`
    pub fn simulate(&self, name: &str, config: EngineConfig) -> Result<Simulation> {
        Ok(Simulation::load(self.circuit(name)?, config))
    }

    /// Circuit names, in the order they were loaded
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of circuits
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no circuit was loaded
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{CircuitDescription, ComponentDescription};

    fn pin(at: (i32, i32), facing: &str, output: bool) -> ComponentDescription {
        ComponentDescription::at("Pin", at)
            .with("facing", facing)
            .with("output", output.to_string())
    }

    #[test]
    fn boundary_layout() {
        let desc = CircuitDescription::new("box")
            .with_component(pin((100, 50), "west", true))
            .with_component(pin((10, 10), "east", false))
            .with_component(pin((10, 40), "east", false))
            .with_component(pin((40, 0), "south", false));
        let circuit = Circuit::load(&desc, &CircuitRegistry::new()).unwrap();
        let def = CompositeDef::new(circuit);

        let inner: Vec<_> = def.boundary().iter().map(|b| b.inner).collect();
        assert_eq!(inner, [1, 3, 2, 0]);
        // Two pins on the west edge, one each on north and east
        assert_eq!(def.dimensions(), (30, 30));
        let offsets: Vec<_> = def.ports().iter().map(|p| p.offset).collect();
        assert_eq!(
            offsets,
            [
                Coord::new(0, 10),
                Coord::new(10, 0),
                Coord::new(0, 20),
                Coord::new(30, 10)
            ]
        );
        assert_eq!(def.ports()[3].mode, PortMode::Output);
    }

    #[test]
    fn box_grows_with_pins() {
        let mut desc = CircuitDescription::new("wide");
        for i in 0..5 {
            desc = desc.with_component(pin((0, 10 * i), "east", false));
        }
        let def = CompositeDef::new(Circuit::load(&desc, &CircuitRegistry::new()).unwrap());
        assert_eq!(def.dimensions(), (30, 60));
        assert_eq!(def.ports()[4].offset, Coord::new(0, 50));
    }

    #[test]
    fn self_reference_is_rejected() {
        let doc = Document::new()
            .with_circuit(CircuitDescription::new("a").with_component(ComponentDescription::at("b", (0, 0))))
            .with_circuit(CircuitDescription::new("b").with_component(ComponentDescription::at("a", (0, 0))));
        assert!(matches!(
            CircuitRegistry::from_document(&doc),
            Err(Error::RecursiveCircuit(_))
        ));
    }

    #[test]
    fn dependencies_load_first() {
        let doc = Document::new()
            .with_circuit(CircuitDescription::new("top").with_component(ComponentDescription::at("leaf", (0, 0))))
            .with_circuit(CircuitDescription::new("leaf").with_component(pin((0, 0), "east", false)));
        let registry = CircuitRegistry::from_document(&doc).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["leaf", "top"]);
        assert_eq!(registry.circuit("top").unwrap().components().len(), 1);
        assert!(registry.circuit("top").unwrap().skipped().is_empty());
        assert!(matches!(registry.circuit("nope"), Err(Error::UnknownCircuit(_))));
    }
}
