/*!

  The component model: what each kind of gate, pin or chip looks like and how it behaves.

  A kind is picked once, from its name, when a description is loaded. From then
  on a [Component] carries a closed [Kind] and nothing is dispatched by name again.

*/

use crate::attribute::{Attributes, decode_coord};
use crate::circuit::{Bounds, Coord, FaceAngles, Facing, GRID, LocalPort, Port};
use crate::composite::{CircuitRegistry, CompositeDef};
use crate::description::ComponentDescription;
use crate::error::{Error, Result};
use bitvec::prelude::*;
use std::rc::Rc;

/// Geometry shared by every kind of component.
///
/// Local geometry is drawn facing east with the anchor at the origin.
pub trait Footprint {
    /// Returns the display name of the kind
    fn name(&self) -> &str;

    /// Width and height of the drawn box
    fn dimensions(&self) -> (i32, i32);

    /// The box in local space. By default it extends west of the anchor and is
    /// vertically centred on it.
    fn local_bounds(&self) -> Bounds {
        let (w, h) = self.dimensions();
        Bounds::from_corners(Coord::new(-w, -h / 2), Coord::new(0, h - h / 2))
    }

    /// The ports in local space, in port index order
    fn ports(&self) -> Vec<LocalPort>;

    /// Rotation applied to local geometry for each facing
    fn face_angles(&self) -> FaceAngles {
        FaceAngles::CARDINAL
    }

    /// Facing used when the description does not give one
    fn default_facing(&self) -> Facing {
        Facing::East
    }
}

/// Combinational behaviour of a primitive.
pub trait TruthTable {
    /// Compute the new port vector from the current one. `changed` is the port
    /// whose net just changed. Must be pure.
    fn on_signal_change(&self, ports: &BitSlice, changed: usize) -> BitVec;

    /// Compute the port vector after the user activates the component, or
    /// [None] when activation does nothing.
    fn on_press(&self, _ports: &BitSlice) -> Option<BitVec> {
        None
    }
}

/// The binary operation of a two-input gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateOp {
    /// a ∧ b
    And,
    /// ¬(a ∧ b)
    Nand,
    /// a ∨ b
    Or,
    /// ¬(a ∨ b)
    Nor,
    /// a ⊕ b
    Xor,
    /// Low only when both inputs are high
    Adder,
}

impl GateOp {
    /// Apply the operation
    pub fn eval(self, a: bool, b: bool) -> bool {
        match self {
            GateOp::And => a && b,
            GateOp::Nand => !(a && b),
            GateOp::Or => a || b,
            GateOp::Nor => !(a || b),
            GateOp::Xor => a ^ b,
            GateOp::Adder => !(a && b),
        }
    }

    /// Returns the display name of the gate
    pub fn name(self) -> &'static str {
        match self {
            GateOp::And => "AND Gate",
            GateOp::Nand => "NAND Gate",
            GateOp::Or => "OR Gate",
            GateOp::Nor => "NOR Gate",
            GateOp::Xor => "XOR Gate",
            GateOp::Adder => "Adder",
        }
    }
}

/// State of a pin
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PinState {
    /// An output pin observes its net instead of driving it
    pub output: bool,
    /// Optional label
    pub label: Option<String>,
}

/// State of an LED. Colours are opaque to the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedState {
    /// Colour when lit
    pub color: String,
    /// Colour when dark
    pub off_color: String,
    /// Optional label
    pub label: Option<String>,
}

/// The built-in kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitive {
    /// A two-input gate. Ports are `[a, b, out]`.
    Gate {
        /// Its operation
        op: GateOp,
        /// Side length of the box
        size: i32,
    },
    /// An inverter. Ports are `[a, out]`.
    Not {
        /// Length of the box
        size: i32,
    },
    /// A single-port pin the user can toggle
    Pin(PinState),
    /// A single-port light
    Led(LedState),
}

impl Primitive {
    /// Strip the `Gate` suffix used by circuit files. Returns [None] for unknown kinds.
    fn base_name(name: &str) -> Option<&'static str> {
        let base = name.trim();
        let base = base.strip_suffix(" Gate").unwrap_or(base);
        match base {
            "AND" => Some("AND"),
            "NAND" => Some("NAND"),
            "OR" => Some("OR"),
            "NOR" => Some("NOR"),
            "XOR" => Some("XOR"),
            "NOT" => Some("NOT"),
            "Adder" => Some("Adder"),
            "Pin" => Some("Pin"),
            "LED" => Some("LED"),
            _ => None,
        }
    }

    /// Returns `true` if `name` selects a built-in kind
    pub fn is_known(name: &str) -> bool {
        Self::base_name(name).is_some()
    }

    /// Parse the state of the kind called `name`. Returns [None] for unknown kinds.
    pub fn parse(name: &str, attrs: &Attributes) -> Result<Option<Self>> {
        let Some(base) = Self::base_name(name) else {
            return Ok(None);
        };

        // Single-bit signals only
        if let Some(width) = attrs.get_parsed::<u32>(name, "width")? {
            if width != 1 {
                return Err(Error::unsupported(name, "width", &width.to_string()));
            }
        }

        let gate = |op: GateOp| -> Result<Option<Self>> {
            if let Some(inputs) = attrs.get("inputs") {
                if inputs.trim() != "2" {
                    return Err(Error::unsupported(name, "inputs", inputs));
                }
            }
            Ok(Some(Primitive::Gate {
                op,
                size: parse_size(name, attrs)?,
            }))
        };

        match base {
            "AND" => gate(GateOp::And),
            "NAND" => gate(GateOp::Nand),
            "OR" => gate(GateOp::Or),
            "NOR" => gate(GateOp::Nor),
            "XOR" => gate(GateOp::Xor),
            "Adder" => gate(GateOp::Adder),
            "NOT" => Ok(Some(Primitive::Not {
                size: parse_size(name, attrs)?,
            })),
            "Pin" => Ok(Some(Primitive::Pin(PinState {
                output: attrs.get_flag(name, "output")?,
                label: label(attrs),
            }))),
            _ => Ok(Some(Primitive::Led(LedState {
                color: attrs.get("color").unwrap_or("#ff0000").to_string(),
                off_color: attrs.get("offcolor").unwrap_or("#404040").to_string(),
                label: label(attrs),
            }))),
        }
    }

    /// The label of a pin or LED
    pub fn label(&self) -> Option<&str> {
        match self {
            Primitive::Pin(state) => state.label.as_deref(),
            Primitive::Led(state) => state.label.as_deref(),
            _ => None,
        }
    }
}

const DEFAULT_SIZE: i32 = 30;

fn parse_size(name: &str, attrs: &Attributes) -> Result<i32> {
    match attrs.get_parsed::<i32>(name, "size")? {
        None => Ok(DEFAULT_SIZE),
        Some(size) if size >= 2 * GRID && size % GRID == 0 => Ok(size),
        Some(size) => Err(Error::unsupported(name, "size", &size.to_string())),
    }
}

fn label(attrs: &Attributes) -> Option<String> {
    attrs
        .get("label")
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

fn bit(ports: &BitSlice, i: usize) -> bool {
    ports.get(i).is_some_and(|b| *b)
}

impl Footprint for Primitive {
    fn name(&self) -> &str {
        match self {
            Primitive::Gate { op, .. } => op.name(),
            Primitive::Not { .. } => "NOT Gate",
            Primitive::Pin(_) => "Pin",
            Primitive::Led(_) => "LED",
        }
    }

    fn dimensions(&self) -> (i32, i32) {
        match self {
            Primitive::Gate { size, .. } => (*size, *size),
            Primitive::Not { size } => (*size, 2 * GRID),
            Primitive::Pin(_) | Primitive::Led(_) => (2 * GRID, 2 * GRID),
        }
    }

    fn ports(&self) -> Vec<LocalPort> {
        match self {
            Primitive::Gate { size, .. } => {
                // Inputs straddle the centre line, snapped to the grid
                let spread = (size / 2) / GRID * GRID;
                vec![
                    LocalPort::input(-size, -spread),
                    LocalPort::input(-size, spread),
                    LocalPort::output(0, 0),
                ]
            }
            Primitive::Not { size } => vec![LocalPort::input(-size, 0), LocalPort::output(0, 0)],
            Primitive::Pin(state) if state.output => vec![LocalPort::input(0, 0)],
            Primitive::Pin(_) => vec![LocalPort::output(0, 0)],
            Primitive::Led(_) => vec![LocalPort::input(0, 0)],
        }
    }

    fn default_facing(&self) -> Facing {
        match self {
            Primitive::Led(_) => Facing::West,
            _ => Facing::East,
        }
    }
}

impl TruthTable for Primitive {
    fn on_signal_change(&self, ports: &BitSlice, _changed: usize) -> BitVec {
        match self {
            Primitive::Gate { op, .. } => {
                let (a, b) = (bit(ports, 0), bit(ports, 1));
                [a, b, op.eval(a, b)].into_iter().collect()
            }
            Primitive::Not { .. } => {
                let a = bit(ports, 0);
                [a, !a].into_iter().collect()
            }
            Primitive::Pin(_) | Primitive::Led(_) => ports.to_bitvec(),
        }
    }

    fn on_press(&self, ports: &BitSlice) -> Option<BitVec> {
        match self {
            Primitive::Pin(state) if !state.output => Some(BitVec::repeat(!bit(ports, 0), 1)),
            _ => None,
        }
    }
}

/// What a placed component is
#[derive(Debug, Clone)]
pub enum Kind {
    /// A built-in gate, pin or LED
    Primitive(Primitive),
    /// An instance of another circuit
    Chip(Rc<CompositeDef>),
}

impl Kind {
    /// Resolve a kind name: built-ins first, then circuits in `registry`.
    /// Returns [None] for unknown kinds.
    pub fn resolve(name: &str, attrs: &Attributes, registry: &CircuitRegistry) -> Result<Option<Self>> {
        if let Some(primitive) = Primitive::parse(name, attrs)? {
            return Ok(Some(Kind::Primitive(primitive)));
        }
        Ok(registry.get(name).map(|def| Kind::Chip(def.clone())))
    }
}

impl Footprint for Kind {
    fn name(&self) -> &str {
        match self {
            Kind::Primitive(p) => p.name(),
            Kind::Chip(def) => def.name(),
        }
    }

    fn dimensions(&self) -> (i32, i32) {
        match self {
            Kind::Primitive(p) => p.dimensions(),
            Kind::Chip(def) => def.dimensions(),
        }
    }

    fn local_bounds(&self) -> Bounds {
        match self {
            Kind::Primitive(p) => p.local_bounds(),
            Kind::Chip(def) => def.local_bounds(),
        }
    }

    fn ports(&self) -> Vec<LocalPort> {
        match self {
            Kind::Primitive(p) => p.ports(),
            Kind::Chip(def) => def.ports(),
        }
    }

    fn face_angles(&self) -> FaceAngles {
        match self {
            Kind::Primitive(p) => p.face_angles(),
            Kind::Chip(def) => def.face_angles(),
        }
    }

    fn default_facing(&self) -> Facing {
        match self {
            Kind::Primitive(p) => p.default_facing(),
            Kind::Chip(def) => def.default_facing(),
        }
    }
}

/// A component placed in a circuit, with its geometry resolved
#[derive(Debug, Clone)]
pub struct Component {
    kind: Kind,
    anchor: Coord,
    facing: Facing,
    bounds: Bounds,
    ports: Vec<Port>,
}

impl Component {
    /// Place `kind` at `anchor`. Without a facing the kind's default is used.
    ///
    /// Fails with [Error::MalformedCoordinate] if a port or corner would fall
    /// outside the coordinate range.
    pub fn place(kind: Kind, anchor: Coord, facing: Option<Facing>) -> Result<Self> {
        let facing = facing.unwrap_or_else(|| kind.default_facing());
        let angles = kind.face_angles();
        let at = |offset: Coord| {
            anchor
                .checked_add(angles.rotate(facing, offset))
                .ok_or_else(|| Error::MalformedCoordinate(anchor.to_string()))
        };
        let ports = kind
            .ports()
            .into_iter()
            .enumerate()
            .map(|(index, port)| {
                Ok(Port {
                    index,
                    coord: at(port.offset)?,
                    mode: port.mode,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let local = kind.local_bounds();
        let bounds = Bounds::from_corners(at(local.min)?, at(local.max)?);
        Ok(Self {
            kind,
            anchor,
            facing,
            bounds,
            ports,
        })
    }

    /// Build a component from its description.
    ///
    /// Returns [None] when the kind is unknown. A missing location or an
    /// unsupported attribute value is an error.
    pub fn from_description(desc: &ComponentDescription, registry: &CircuitRegistry) -> Result<Option<Self>> {
        let Some(kind) = Kind::resolve(&desc.name, &desc.attributes, registry)? else {
            return Ok(None);
        };
        let loc = desc.loc.as_deref().ok_or_else(|| Error::MissingCoordinate {
            element: desc.name.clone(),
            attribute: "loc",
        })?;
        let anchor = decode_coord(loc)?;
        let facing = match desc.attributes.get("facing") {
            Some(v) => Some(Facing::from_name(v).ok_or_else(|| Error::unsupported(&desc.name, "facing", v))?),
            None => None,
        };
        Self::place(kind, anchor, facing).map(Some)
    }

    /// What the component is
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Display name of the kind
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Where the component is anchored
    pub fn anchor(&self) -> Coord {
        self.anchor
    }

    /// Which way it faces
    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Absolute bounding box
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Absolute ports, in port index order
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// The label of a pin or LED
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            Kind::Primitive(p) => p.label(),
            Kind::Chip(_) => None,
        }
    }

    /// Returns `true` if activating the component can change anything
    pub fn is_interactive(&self) -> bool {
        matches!(&self.kind, Kind::Primitive(Primitive::Pin(state)) if !state.output)
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {} facing {}", self.name(), self.anchor, self.facing)
    }
}
