/*!

  The static side of a circuit: signals, coordinates, ports, wires and the
  loaded [Circuit] itself.

*/

use crate::attribute::decode_coord;
use crate::component::Component;
use crate::composite::CircuitRegistry;
use crate::description::{CircuitDescription, WireDescription};
use crate::error::{Error, Result};
use crate::graph::Analysis;
use crate::netlist::{NetId, Netlist};

/// Drawing units per grid cell
pub const GRID: i32 = 10;

/// A two-valued logic level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Signal {
    /// Logical 0
    #[default]
    Low,
    /// Logical 1
    High,
}

impl Signal {
    /// Returns `true` for [Signal::High]
    pub fn is_high(self) -> bool {
        matches!(self, Signal::High)
    }
}

impl From<bool> for Signal {
    fn from(b: bool) -> Self {
        if b { Signal::High } else { Signal::Low }
    }
}

impl From<Signal> for bool {
    fn from(s: Signal) -> Self {
        s.is_high()
    }
}

impl From<Signal> for u8 {
    fn from(s: Signal) -> Self {
        s.is_high() as u8
    }
}

impl std::ops::Not for Signal {
    type Output = Signal;

    fn not(self) -> Self::Output {
        Signal::from(!self.is_high())
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// A point in drawing units. Used directly as the key of every spatial index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    /// Horizontal position, growing to the east
    pub x: i32,
    /// Vertical position, growing to the south
    pub y: i32,
}

impl Coord {
    /// The origin of a circuit's local space
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    /// Creates a coordinate
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared distance from the origin
    pub fn magnitude_sq(self) -> i64 {
        let (x, y) = (self.x as i64, self.y as i64);
        x * x + y * y
    }

    /// Component-wise sum, or [None] if it leaves the `i32` range
    pub fn checked_add(self, rhs: Coord) -> Option<Coord> {
        Some(Coord::new(self.x.checked_add(rhs.x)?, self.y.checked_add(rhs.y)?))
    }

    /// The grid cell holding this coordinate
    pub fn cell(self, grid: i32) -> Coord {
        Coord::new(self.x.div_euclid(grid), self.y.div_euclid(grid))
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord::new(x, y)
    }
}

impl std::str::FromStr for Coord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        decode_coord(s)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// One of the four cardinal orientations a component can be drawn in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Facing {
    /// Pointing up
    North,
    /// Pointing right, the orientation local geometry is drawn in
    #[default]
    East,
    /// Pointing down
    South,
    /// Pointing left
    West,
}

impl Facing {
    /// Parse a facing as written in circuit files (`north`, `east`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "north" => Some(Facing::North),
            "east" => Some(Facing::East),
            "south" => Some(Facing::South),
            "west" => Some(Facing::West),
            _ => None,
        }
    }

    /// Position in `[north, east, south, west]` order
    pub fn index(self) -> usize {
        match self {
            Facing::North => 0,
            Facing::East => 1,
            Facing::South => 2,
            Facing::West => 3,
        }
    }

    /// The facing pointing the other way
    pub fn opposite(self) -> Self {
        match self {
            Facing::North => Facing::South,
            Facing::East => Facing::West,
            Facing::South => Facing::North,
            Facing::West => Facing::East,
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Facing::North => "north",
            Facing::East => "east",
            Facing::South => "south",
            Facing::West => "west",
        };
        write!(f, "{name}")
    }
}

/// Rotation in degrees applied to local geometry for each facing, in
/// `[north, east, south, west]` order. Angles snap to quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceAngles(pub [i32; 4]);

impl FaceAngles {
    /// Local geometry faces east; every other facing is a quarter turn away.
    pub const CARDINAL: FaceAngles = FaceAngles([270, 0, 90, 180]);

    /// Rotate a local offset into `facing`. The y axis grows downwards.
    pub fn rotate(&self, facing: Facing, p: Coord) -> Coord {
        let angle = self.0[facing.index()].rem_euclid(360);
        match ((angle + 45) / 90) % 4 {
            0 => p,
            1 => Coord::new(-p.y, p.x),
            2 => Coord::new(-p.x, -p.y),
            _ => Coord::new(p.y, -p.x),
        }
    }
}

impl Default for FaceAngles {
    fn default() -> Self {
        Self::CARDINAL
    }
}

/// Which way a signal flows through a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PortMode {
    /// The component observes the net
    Input,
    /// The component drives the net
    Output,
}

/// A port in component-local, unrotated space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalPort {
    /// Offset from the component's anchor
    pub offset: Coord,
    /// Direction of the port
    pub mode: PortMode,
}

impl LocalPort {
    /// An input port at `(x, y)`
    pub const fn input(x: i32, y: i32) -> Self {
        Self {
            offset: Coord::new(x, y),
            mode: PortMode::Input,
        }
    }

    /// An output port at `(x, y)`
    pub const fn output(x: i32, y: i32) -> Self {
        Self {
            offset: Coord::new(x, y),
            mode: PortMode::Output,
        }
    }
}

/// A port resolved to its absolute location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    /// Position of the port within its component
    pub index: usize,
    /// Absolute location
    pub coord: Coord,
    /// Direction of the port
    pub mode: PortMode,
}

/// An axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Top-left corner
    pub min: Coord,
    /// Bottom-right corner
    pub max: Coord,
}

impl Bounds {
    /// The box spanned by two opposite corners, in any order
    pub fn from_corners(a: Coord, b: Coord) -> Self {
        Self {
            min: Coord::new(a.x.min(b.x), a.y.min(b.y)),
            max: Coord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Horizontal extent
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    /// Vertical extent
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }
}

/// A straight wire between two points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wire {
    /// First endpoint
    pub from: Coord,
    /// Second endpoint
    pub to: Coord,
}

impl Wire {
    /// A wire from `from` to `to`
    pub fn new(from: impl Into<Coord>, to: impl Into<Coord>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Decode a wire element. Both endpoints are required.
    pub fn from_description(desc: &WireDescription) -> Result<Self> {
        let endpoint = |token: &Option<String>, attribute: &'static str| match token {
            Some(token) => decode_coord(token),
            None => Err(Error::MissingCoordinate {
                element: "wire".to_string(),
                attribute,
            }),
        };
        Ok(Self {
            from: endpoint(&desc.from, "from")?,
            to: endpoint(&desc.to, "to")?,
        })
    }
}

impl std::fmt::Display for Wire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A loaded circuit: placed components, wires and the nets they form.
///
/// The topology is fixed once loaded. Signal values live in the
/// [crate::simulation::Simulation] that consumes the circuit.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    components: Vec<Component>,
    wires: Vec<Wire>,
    netlist: Netlist,
    skipped: Vec<String>,
}

impl Circuit {
    /// Assemble a circuit, grouping wire endpoints and overlapping ports into nets.
    pub fn new(name: String, components: Vec<Component>, wires: Vec<Wire>) -> Self {
        let mut netlist = Netlist::from_wires(&wires);
        netlist.join_ports(
            components
                .iter()
                .flat_map(|c| c.ports().iter().map(|p| p.coord)),
        );
        Self {
            name,
            components,
            wires,
            netlist,
            skipped: Vec::new(),
        }
    }

    /// Load a circuit description. Sub-circuits are looked up in `registry`.
    ///
    /// Components of an unknown kind are skipped and reported by [Circuit::skipped].
    pub fn load(desc: &CircuitDescription, registry: &CircuitRegistry) -> Result<Self> {
        let wires = desc
            .wires
            .iter()
            .map(Wire::from_description)
            .collect::<Result<Vec<_>>>()?;

        let mut components = Vec::with_capacity(desc.components.len());
        let mut skipped = Vec::new();
        for comp in &desc.components {
            match Component::from_description(comp, registry)? {
                Some(component) => components.push(component),
                None => {
                    log::warn!(
                        "Unknown component type `{}` in circuit `{}`, skipping it",
                        comp.name,
                        desc.name
                    );
                    skipped.push(comp.name.clone());
                }
            }
        }

        let mut circuit = Self::new(desc.name.clone(), components, wires);
        circuit.skipped = skipped;
        log::debug!(
            "Loaded circuit `{}`: {} components, {} wires, {} nets",
            circuit.name,
            circuit.components.len(),
            circuit.wires.len(),
            circuit.net_count()
        );
        Ok(circuit)
    }

    /// Returns the name of the circuit
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// The placed components, in description order
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// The wires, in description order
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// The coordinate to net mapping
    pub fn get_netlist(&self) -> &Netlist {
        &self.netlist
    }

    /// Number of nets
    pub fn net_count(&self) -> usize {
        self.netlist.net_count()
    }

    /// Kind names that were not recognised while loading
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// The net under port `port` of component `component`, if it is connected
    pub fn port_net(&self, component: usize, port: usize) -> Option<NetId> {
        let port = self.components.get(component)?.ports().get(port)?;
        self.netlist.net_at(port.coord)
    }

    /// Run an analysis over the circuit
    pub fn get_analysis<'a, A: Analysis<'a>>(&'a self) -> Result<A> {
        A::build(self)
    }
}
