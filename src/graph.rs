/*!

  Connectivity analyses over a loaded [Circuit].

*/

use crate::circuit::{Circuit, PortMode};
use crate::error::Result;
use crate::netlist::NetId;
#[cfg(feature = "graph")]
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// A common trait of analyses than can be performed on a circuit.
pub trait Analysis<'a>
where
    Self: Sized + 'a,
{
    /// Construct the analysis for the circuit.
    fn build(circuit: &'a Circuit) -> Result<Self>;
}

/// A port of a component, by index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRef {
    /// Index of the component in the circuit
    pub component: usize,
    /// Index of the port on the component
    pub port: usize,
}

impl std::fmt::Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.component, self.port)
    }
}

/// A table of which ports drive and observe each net
pub struct FanOutTable<'a> {
    // A reference to the underlying circuit
    _circuit: &'a Circuit,
    // Output ports on each net
    net_drivers: HashMap<NetId, Vec<PortRef>>,
    // Input ports on each net
    net_users: HashMap<NetId, Vec<PortRef>>,
    /// Maps a component to the components its outputs reach
    component_fan_out: HashMap<usize, Vec<usize>>,
}

impl FanOutTable<'_> {
    /// Returns an iterator to the output ports driving `net`.
    pub fn get_net_drivers(&self, net: NetId) -> impl Iterator<Item = PortRef> {
        self.net_drivers
            .get(&net)
            .into_iter()
            .flat_map(|ports| ports.iter().copied())
    }

    /// Returns an iterator to the input ports observing `net`.
    pub fn get_net_users(&self, net: NetId) -> impl Iterator<Item = PortRef> {
        self.net_users
            .get(&net)
            .into_iter()
            .flat_map(|ports| ports.iter().copied())
    }

    /// Returns `true` if any input port observes `net`
    pub fn net_has_uses(&self, net: NetId) -> bool {
        self.net_users.get(&net).is_some_and(|u| !u.is_empty())
    }

    /// Returns an iterator to the components reached by the outputs of `component`, without repeats.
    pub fn get_component_users(&self, component: usize) -> impl Iterator<Item = usize> {
        self.component_fan_out
            .get(&component)
            .into_iter()
            .flat_map(|users| users.iter().copied())
    }
}

impl<'a> Analysis<'a> for FanOutTable<'a> {
    fn build(circuit: &'a Circuit) -> Result<Self> {
        let mut net_drivers: HashMap<NetId, Vec<PortRef>> = HashMap::new();
        let mut net_users: HashMap<NetId, Vec<PortRef>> = HashMap::new();

        for (component, c) in circuit.components().iter().enumerate() {
            for port in c.ports() {
                let Some(net) = circuit.get_netlist().net_at(port.coord) else {
                    continue;
                };
                let r = PortRef {
                    component,
                    port: port.index,
                };
                match port.mode {
                    PortMode::Output => net_drivers.entry(net).or_default().push(r),
                    PortMode::Input => net_users.entry(net).or_default().push(r),
                }
            }
        }

        let mut component_fan_out: HashMap<usize, Vec<usize>> = HashMap::new();
        for (net, drivers) in &net_drivers {
            for d in drivers {
                let users = component_fan_out.entry(d.component).or_default();
                for u in net_users.get(net).into_iter().flatten() {
                    if !users.contains(&u.component) {
                        users.push(u.component);
                    }
                }
            }
        }
        for users in component_fan_out.values_mut() {
            users.sort_unstable();
        }

        Ok(FanOutTable {
            _circuit: circuit,
            net_drivers,
            net_users,
            component_fan_out,
        })
    }
}

/// A petgraph view of the circuit: one node per component (weighted by its
/// index) and one edge per driver-to-user connection, labelled with the net.
#[cfg(feature = "graph")]
pub struct ConnectivityGraph<'a> {
    _circuit: &'a Circuit,
    graph: DiGraph<usize, NetId>,
}

#[cfg(feature = "graph")]
impl ConnectivityGraph<'_> {
    /// Return a reference to the graph constructed by this analysis
    pub fn get_graph(&self) -> &DiGraph<usize, NetId> {
        &self.graph
    }

    /// Returns `true` if some output feeds back into its own inputs
    pub fn has_feedback(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }
}

#[cfg(feature = "graph")]
impl<'a> Analysis<'a> for ConnectivityGraph<'a> {
    fn build(circuit: &'a Circuit) -> Result<Self> {
        let table = FanOutTable::build(circuit)?;
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..circuit.components().len())
            .map(|i| graph.add_node(i))
            .collect();

        let mut nets: Vec<_> = table.net_drivers.keys().copied().collect();
        nets.sort_unstable();
        for net in nets {
            for d in table.get_net_drivers(net) {
                for u in table.get_net_users(net) {
                    graph.add_edge(nodes[d.component], nodes[u.component], net);
                }
            }
        }

        Ok(Self {
            _circuit: circuit,
            graph,
        })
    }
}
