/*!

  The tokenized form of a circuit document, as handed over by a parser.

  Nothing here is validated yet: coordinates are still `(x,y)` tokens and
  attributes are plain strings. [crate::composite::CircuitRegistry::from_document]
  and [crate::circuit::Circuit::load] turn these into simulation-ready circuits.

*/

use crate::attribute::{AttributeValue, Attributes};
use crate::circuit::Coord;

/// A document holding any number of named circuits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    /// Circuits in document order
    pub circuits: Vec<CircuitDescription>,
}

impl Document {
    /// An empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a circuit
    pub fn with_circuit(mut self, circuit: CircuitDescription) -> Self {
        self.circuits.push(circuit);
        self
    }

    /// Find a circuit by name
    pub fn circuit(&self, name: &str) -> Option<&CircuitDescription> {
        self.circuits.iter().find(|c| c.name == name)
    }

    /// Write the document as JSON
    #[cfg(feature = "serde")]
    pub fn to_writer(&self, writer: impl std::io::Write) -> crate::error::Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Read a document written by [Document::to_writer]
    #[cfg(feature = "serde")]
    pub fn from_reader(reader: impl std::io::Read) -> crate::error::Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// One named circuit: its components and wires
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircuitDescription {
    /// Name other circuits use to instantiate this one
    pub name: String,
    /// Circuit-level attributes
    pub attributes: Attributes,
    /// Component elements in document order
    pub components: Vec<ComponentDescription>,
    /// Wire elements in document order
    pub wires: Vec<WireDescription>,
}

impl CircuitDescription {
    /// An empty circuit named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a component
    pub fn with_component(mut self, component: ComponentDescription) -> Self {
        self.components.push(component);
        self
    }

    /// Append a wire between two points
    pub fn with_wire(mut self, from: impl Into<Coord>, to: impl Into<Coord>) -> Self {
        self.wires.push(WireDescription::between(from, to));
        self
    }

    /// Append a wire element as-is
    pub fn with_wire_description(mut self, wire: WireDescription) -> Self {
        self.wires.push(wire);
        self
    }
}

/// A component element: a kind name, a location token and its attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentDescription {
    /// Kind name, like `AND Gate`, `Pin` or the name of another circuit
    pub name: String,
    /// The `(x,y)` anchor token
    pub loc: Option<String>,
    /// Everything else: `facing`, `size`, `label`, `output`, ...
    pub attributes: Attributes,
}

impl ComponentDescription {
    /// A component of kind `name` anchored at `loc`
    pub fn at(name: impl Into<String>, loc: impl Into<Coord>) -> Self {
        Self {
            name: name.into(),
            loc: Some(loc.into().to_string()),
            attributes: Attributes::new(),
        }
    }

    /// A component without a location
    pub fn unplaced(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set an attribute
    pub fn with(mut self, k: &str, v: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(k, v);
        self
    }
}

/// A wire element with its raw endpoint tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WireDescription {
    /// The `(x,y)` token of the first endpoint
    pub from: Option<String>,
    /// The `(x,y)` token of the second endpoint
    pub to: Option<String>,
}

impl WireDescription {
    /// A wire between two points
    pub fn between(from: impl Into<Coord>, to: impl Into<Coord>) -> Self {
        Self {
            from: Some(from.into().to_string()),
            to: Some(to.into().to_string()),
        }
    }
}
