/*!

  Event-driven evaluation of a loaded [Circuit].

  A [Simulation] holds the value of every net and the last evaluated port
  vector of every component. Changes travel through an explicit worklist in
  rounds: a round applies all pending net updates and schedules the outputs
  that changed for the next one. An update that would leave a net unchanged is
  skipped, so acyclic circuits settle on their own however deep they are. A
  net may change at most [EngineConfig::tick_budget] times per external
  trigger; updates past that are dropped, which is what stops an oscillating
  circuit.

*/

use crate::circuit::{Circuit, Coord, PortMode, Signal, Wire};
use crate::component::{Component, Kind, TruthTable};
use crate::error::{Error, Result};
use crate::netlist::{NetId, Netlist};
use bitvec::prelude::*;

/// Knobs of a [Simulation]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Times a single net may change per external trigger
    pub tick_budget: usize,
    /// Drawing units per grid cell, used when rendering
    pub grid: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_budget: 10,
            grid: crate::circuit::GRID,
        }
    }
}

impl EngineConfig {
    /// Set the number of changes a net is allowed per external trigger
    pub fn with_tick_budget(mut self, tick_budget: usize) -> Self {
        self.tick_budget = tick_budget;
        self
    }

    /// Set the grid size
    pub fn with_grid(mut self, grid: i32) -> Self {
        self.grid = grid;
        self
    }
}

/// What one external trigger caused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Rounds that changed at least one net
    pub rounds: usize,
    /// Net updates that changed a value
    pub updates: usize,
    /// Updates dropped because their net had used up its tick budget,
    /// here or inside a chip
    pub dropped: usize,
}

impl Propagation {
    /// Returns `true` if the tick budget cut propagation short
    pub fn truncated(&self) -> bool {
        self.dropped > 0
    }

    fn merge(&mut self, other: Propagation) {
        self.rounds += other.rounds;
        self.updates += other.updates;
        self.dropped += other.dropped;
    }
}

#[derive(Debug, Clone)]
struct Slot {
    component: Component,
    /// Engine of the inner circuit, for chips
    chip: Option<Box<Simulation>>,
    nets: Vec<Option<NetId>>,
    /// Last evaluated port vector
    signals: BitVec,
}

fn bit(v: &BitSlice, i: usize) -> bool {
    v.get(i).is_some_and(|b| *b)
}

/// A running simulation of one circuit
#[derive(Debug, Clone)]
pub struct Simulation {
    slots: Vec<Slot>,
    wires: Vec<Wire>,
    wire_nets: Vec<Option<NetId>>,
    /// Nets touched by at least one wire
    wired: BitVec,
    net_signal: BitVec,
    /// Every (component, port) registered at each net
    net_index: Vec<Vec<(usize, usize)>>,
    netlist: Netlist,
    config: EngineConfig,
    primed: Propagation,
}

impl Simulation {
    /// An engine over `netlist` with no wires or components yet. Every net starts low.
    pub fn new(netlist: Netlist, config: EngineConfig) -> Self {
        let count = netlist.net_count();
        Self {
            slots: Vec::new(),
            wires: Vec::new(),
            wire_nets: Vec::new(),
            wired: BitVec::repeat(false, count),
            net_signal: BitVec::repeat(false, count),
            net_index: vec![Vec::new(); count],
            netlist,
            config,
            primed: Propagation::default(),
        }
    }

    /// Build and prime an engine for `circuit`
    pub fn load(circuit: &Circuit, config: EngineConfig) -> Self {
        let mut sim = Self::new(circuit.get_netlist().clone(), config);
        sim.connect_wires(circuit.wires().iter().copied());
        sim.primed = sim.connect_ports(circuit.components().iter().cloned());
        sim
    }

    /// Attach wires. Their nets become readable.
    pub fn connect_wires(&mut self, wires: impl IntoIterator<Item = Wire>) {
        for wire in wires {
            let net = self.netlist.net_at(wire.from);
            if let Some(net) = net {
                self.wired.set(net, true);
            }
            self.wires.push(wire);
            self.wire_nets.push(net);
        }
    }

    /// Attach components, evaluate each from all-low inputs and push any
    /// outputs that disagree with their nets.
    pub fn connect_ports(&mut self, components: impl IntoIterator<Item = Component>) -> Propagation {
        let mut report = Propagation::default();
        let first = self.slots.len();
        for component in components {
            let idx = self.slots.len();
            let nets: Vec<Option<NetId>> = component
                .ports()
                .iter()
                .map(|p| self.netlist.net_at(p.coord))
                .collect();
            for (port, net) in nets.iter().enumerate() {
                if let Some(net) = net {
                    self.net_index[*net].push((idx, port));
                }
            }

            let (chip, signals) = match component.kind() {
                Kind::Primitive(p) => {
                    let low = BitVec::repeat(false, nets.len());
                    (None, p.on_signal_change(&low, 0))
                }
                Kind::Chip(def) => {
                    let chip = def.instantiate(&self.config);
                    let signals = def.read_boundary(&chip);
                    report.dropped += chip.priming().dropped;
                    (Some(Box::new(chip)), signals)
                }
            };
            self.slots.push(Slot {
                component,
                chip,
                nets,
                signals,
            });
        }

        for idx in first..self.slots.len() {
            let slot = &self.slots[idx];
            let pending: Vec<(NetId, bool)> = slot
                .component
                .ports()
                .iter()
                .filter(|p| p.mode == PortMode::Output)
                .filter_map(|p| {
                    let net = slot.nets[p.index]?;
                    let value = bit(&slot.signals, p.index);
                    (self.net_signal[net] != value).then_some((net, value))
                })
                .collect();
            if !pending.is_empty() {
                report.merge(self.run(pending));
            }
        }
        report
    }

    /// Drive `net` to `value` and let the change settle
    pub fn propagate_signal(&mut self, net: NetId, value: Signal) -> Propagation {
        if net >= self.net_signal.len() || self.net_signal[net] == value.is_high() {
            return Propagation::default();
        }
        self.run(vec![(net, value.is_high())])
    }

    /// Push a freshly computed port vector of component `idx` into its nets
    pub fn propagate_component_output(&mut self, idx: usize, outputs: BitVec) -> Result<Propagation> {
        let slot = self.slots.get_mut(idx).ok_or(Error::NoSuchComponent(idx))?;
        let pending = Self::changed_outputs(slot, &outputs);
        slot.signals = outputs;
        if pending.is_empty() {
            return Ok(Propagation::default());
        }
        Ok(self.run(pending))
    }

    /// Press component `idx`. Only input pins react.
    pub fn activate(&mut self, idx: usize) -> Result<Propagation> {
        let slot = self.slots.get(idx).ok_or(Error::NoSuchComponent(idx))?;
        let pressed = match slot.component.kind() {
            Kind::Primitive(p) => p.on_press(&slot.signals),
            Kind::Chip(_) => None,
        };
        match pressed {
            Some(outputs) => {
                log::debug!("Activated {}", slot.component);
                self.propagate_component_output(idx, outputs)
            }
            None => Ok(Propagation::default()),
        }
    }

    /// The value of `net`, or [None] if no wire carries it
    pub fn read(&self, net: NetId) -> Option<Signal> {
        if bit(&self.wired, net) {
            Some(self.signal(net))
        } else {
            None
        }
    }

    /// The readable value of the net at `coord`
    pub fn read_at(&self, coord: Coord) -> Option<Signal> {
        self.read(self.net_at(coord)?)
    }

    /// The value of `net`. Unknown nets are low.
    pub fn signal(&self, net: NetId) -> Signal {
        Signal::from(bit(&self.net_signal, net))
    }

    /// Values of every net, indexed by id
    pub fn signals(&self) -> &BitSlice {
        &self.net_signal
    }

    /// The net at `coord`
    pub fn net_at(&self, coord: Coord) -> Option<NetId> {
        self.netlist.net_at(coord)
    }

    /// Number of nets
    pub fn net_count(&self) -> usize {
        self.net_signal.len()
    }

    /// Last evaluated port vector of component `idx`
    pub fn port_signals(&self, idx: usize) -> Option<&BitSlice> {
        self.slots.get(idx).map(|s| s.signals.as_bitslice())
    }

    /// The value carried by wire `idx`
    pub fn wire_signal(&self, idx: usize) -> Option<Signal> {
        let net = self.wire_nets.get(idx)?;
        Some(net.map_or(Signal::Low, |n| self.signal(n)))
    }

    /// Component `idx`
    pub fn component(&self, idx: usize) -> Option<&Component> {
        self.slots.get(idx).map(|s| &s.component)
    }

    /// All components, in index order
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.slots.iter().map(|s| &s.component)
    }

    /// Number of components
    pub fn component_count(&self) -> usize {
        self.slots.len()
    }

    /// All wires, in index order
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// The inner engine of chip `idx`
    pub fn chip(&self, idx: usize) -> Option<&Simulation> {
        self.slots.get(idx)?.chip.as_deref()
    }

    /// Index of the first pin or LED labelled `label`
    pub fn find_labeled(&self, label: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.component.label() == Some(label))
    }

    /// The configuration the engine runs with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// What priming caused when the engine was loaded
    pub fn priming(&self) -> Propagation {
        self.primed
    }

    /// Output ports whose value in `outputs` differs from the cached vector
    fn changed_outputs(slot: &Slot, outputs: &BitSlice) -> Vec<(NetId, bool)> {
        slot.component
            .ports()
            .iter()
            .filter(|p| p.mode == PortMode::Output)
            .filter(|p| bit(outputs, p.index) != bit(&slot.signals, p.index))
            .filter_map(|p| Some((slot.nets[p.index]?, bit(outputs, p.index))))
            .collect()
    }

    fn run(&mut self, mut pending: Vec<(NetId, bool)>) -> Propagation {
        let mut report = Propagation::default();
        let mut changes = vec![0usize; self.net_signal.len()];
        while !pending.is_empty() {
            let mut next = Vec::new();
            let mut applied = false;
            for (net, value) in pending {
                if self.net_signal[net] == value {
                    continue;
                }
                if changes[net] >= self.config.tick_budget {
                    report.dropped += 1;
                    continue;
                }
                changes[net] += 1;
                applied = true;
                report.updates += 1;
                self.apply(net, value, &mut next, &mut report);
            }
            if applied {
                report.rounds += 1;
            }
            pending = next;
        }
        if report.truncated() {
            log::debug!(
                "Tick budget of {} changes per net exhausted, dropped {} updates",
                self.config.tick_budget,
                report.dropped
            );
        }
        report
    }

    /// Set `net` and re-evaluate everything registered at it
    fn apply(
        &mut self,
        net: NetId,
        value: bool,
        next: &mut Vec<(NetId, bool)>,
        report: &mut Propagation,
    ) {
        self.net_signal.set(net, value);
        log::trace!("net {net} <- {}", Signal::from(value));

        let users = std::mem::take(&mut self.net_index[net]);
        for &(idx, port) in &users {
            let (outputs, inner) = self.evaluate(idx, port);
            report.dropped += inner.dropped;
            let slot = &mut self.slots[idx];
            next.extend(Self::changed_outputs(slot, &outputs));
            slot.signals = outputs;
        }
        self.net_index[net] = users;
    }

    /// New port vector of `idx`, and what it caused inside a chip
    fn evaluate(&mut self, idx: usize, port: usize) -> (BitVec, Propagation) {
        let inputs = self.gather(idx);
        let slot = &mut self.slots[idx];
        match slot.component.kind() {
            Kind::Primitive(p) => (p.on_signal_change(&inputs, port), Propagation::default()),
            Kind::Chip(def) => match slot.chip.as_deref_mut() {
                Some(chip) => def.on_signal_change(chip, &inputs, port),
                None => (slot.signals.clone(), Propagation::default()),
            },
        }
    }

    /// Current value at every port of `idx`. Unconnected ports are low.
    fn gather(&self, idx: usize) -> BitVec {
        self.slots[idx]
            .nets
            .iter()
            .map(|net| net.is_some_and(|n| self.net_signal[n]))
            .collect()
    }
}
