/*!

  Read-only views of a running [Simulation] for whatever draws it.

*/

use crate::circuit::{Bounds, Coord, Facing, PortMode, Signal};
use crate::component::Kind;
use crate::simulation::Simulation;
use std::collections::BTreeMap;

/// A port as it should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortView {
    /// Absolute location
    pub coord: Coord,
    /// Direction of the port
    pub mode: PortMode,
    /// Value from the component's last evaluation
    pub signal: Signal,
}

/// A component as it should be drawn
#[derive(Debug, Clone)]
pub struct ComponentView<'a> {
    /// Index in the simulation
    pub index: usize,
    /// Display name of the kind
    pub name: &'a str,
    /// The kind, for kind-specific drawing
    pub kind: &'a Kind,
    /// Anchor point
    pub anchor: Coord,
    /// Absolute bounding box
    pub bounds: Bounds,
    /// Orientation
    pub facing: Facing,
    /// Ports in index order
    pub ports: Vec<PortView>,
}

/// A wire as it should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireView {
    /// First endpoint
    pub from: Coord,
    /// Second endpoint
    pub to: Coord,
    /// Value of the wire's net
    pub signal: Signal,
}

impl Simulation {
    /// Every component with its current port values
    pub fn component_views(&self) -> impl Iterator<Item = ComponentView<'_>> {
        self.components().enumerate().map(|(index, c)| {
            let cached = self.port_signals(index);
            let ports = c
                .ports()
                .iter()
                .map(|p| PortView {
                    coord: p.coord,
                    mode: p.mode,
                    signal: Signal::from(cached.and_then(|s| s.get(p.index)).is_some_and(|b| *b)),
                })
                .collect();
            ComponentView {
                index,
                name: c.name(),
                kind: c.kind(),
                anchor: c.anchor(),
                bounds: c.bounds(),
                facing: c.facing(),
                ports,
            }
        })
    }

    /// Every wire with the value of its net
    pub fn wire_views(&self) -> impl Iterator<Item = WireView> + '_ {
        self.wires().iter().enumerate().map(|(i, w)| WireView {
            from: w.from,
            to: w.to,
            signal: self.wire_signal(i).unwrap_or_default(),
        })
    }

    /// A text rendering of the circuit, one character per grid cell
    pub fn grid(&self) -> GridDump<'_> {
        GridDump { sim: self }
    }
}

/// Text grid of a simulation.
///
/// Wire cells show their value. Port cells show the mode most ports there
/// have, ties going to outputs: `⊕`/`⊖` on a wire, `⊞`/`⊟` off it.
///
/// At most [GridDump::MAX_CELLS] cells are drawn along each axis, counted from
/// the top-left of the circuit. Anything further away is clipped.
pub struct GridDump<'a> {
    sim: &'a Simulation,
}

#[derive(Default)]
struct Cell {
    wire: Option<Signal>,
    inputs: usize,
    outputs: usize,
}

impl Cell {
    fn glyph(&self) -> char {
        let on_wire = self.wire.is_some();
        if self.inputs + self.outputs > 0 {
            match (self.outputs >= self.inputs, on_wire) {
                (true, true) => '⊕',
                (false, true) => '⊖',
                (true, false) => '⊞',
                (false, false) => '⊟',
            }
        } else {
            match self.wire {
                Some(Signal::High) => '1',
                Some(Signal::Low) => '0',
                None => '.',
            }
        }
    }
}

/// Cells from `a` to `b`, either way round, that lie within `lo..=hi`
fn span(a: i32, b: i32, lo: i32, hi: i32) -> std::ops::RangeInclusive<i32> {
    a.min(b).max(lo)..=a.max(b).min(hi)
}

impl GridDump<'_> {
    /// Cells drawn along each axis
    pub const MAX_CELLS: i32 = 256;

    fn cells(&self) -> BTreeMap<Coord, Cell> {
        let grid = self.sim.config().grid.max(1);
        let wires: Vec<(Coord, Coord, Signal)> = self
            .sim
            .wire_views()
            .map(|w| (w.from.cell(grid), w.to.cell(grid), w.signal))
            .collect();
        let ports: Vec<(Coord, PortMode)> = self
            .sim
            .component_views()
            .flat_map(|v| v.ports)
            .map(|p| (p.coord.cell(grid), p.mode))
            .collect();

        let corners = wires.iter().flat_map(|(a, b, _)| [*a, *b]);
        let Some(min) = corners
            .chain(ports.iter().map(|(c, _)| *c))
            .reduce(|m, c| Coord::new(m.x.min(c.x), m.y.min(c.y)))
        else {
            return BTreeMap::new();
        };
        let max = Coord::new(
            min.x.saturating_add(Self::MAX_CELLS - 1),
            min.y.saturating_add(Self::MAX_CELLS - 1),
        );
        let inside = |c: Coord| c.x <= max.x && c.y <= max.y;

        let mut cells: BTreeMap<Coord, Cell> = BTreeMap::new();
        for (a, b, signal) in wires {
            let mut mark = |c: Coord| {
                if inside(c) {
                    cells.entry(c).or_default().wire = Some(signal);
                }
            };
            if a.y == b.y {
                span(a.x, b.x, min.x, max.x).for_each(|x| mark(Coord::new(x, a.y)));
            } else if a.x == b.x {
                span(a.y, b.y, min.y, max.y).for_each(|y| mark(Coord::new(a.x, y)));
            } else {
                // Only the ends of a slanted wire
                mark(a);
                mark(b);
            }
        }

        for (at, mode) in ports.into_iter().filter(|(c, _)| inside(*c)) {
            let cell = cells.entry(at).or_default();
            match mode {
                PortMode::Input => cell.inputs += 1,
                PortMode::Output => cell.outputs += 1,
            }
        }
        cells
    }
}

impl std::fmt::Display for GridDump<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells = self.cells();
        let Some(first) = cells.keys().next() else {
            return Ok(());
        };
        let (mut min, mut max) = (*first, *first);
        for c in cells.keys() {
            min = Coord::new(min.x.min(c.x), min.y.min(c.y));
            max = Coord::new(max.x.max(c.x), max.y.max(c.y));
        }

        for y in min.y..=max.y {
            let row: Vec<String> = (min.x..=max.x)
                .map(|x| {
                    cells
                        .get(&Coord::new(x, y))
                        .map_or('.', Cell::glyph)
                        .to_string()
                })
                .collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}
