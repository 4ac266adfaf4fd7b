/*!

  Grouping of wire endpoints and ports into electrical nets.

*/

use crate::circuit::{Coord, Wire};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Identifies one electrically-connected group of wire endpoints and ports.
/// Nets of a circuit are numbered densely from zero.
pub type NetId = usize;

/// Maps coordinates to the net they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netlist {
    nets: HashMap<Coord, NetId>,
    count: usize,
}

impl Netlist {
    /// Group the endpoints of `wires` into nets.
    ///
    /// Any two coordinates joined by a chain of wires end up in the same net.
    /// Ids are handed out in the order nets are first discovered. When a wire
    /// joins two existing nets, every coordinate of the second is relabelled to
    /// the first; the gaps this leaves are compacted at the end.
    pub fn from_wires<'a>(wires: impl IntoIterator<Item = &'a Wire>) -> Self {
        let mut nets: HashMap<Coord, NetId> = HashMap::new();
        let mut members: Vec<Vec<Coord>> = Vec::new();

        for wire in wires {
            let from = nets.get(&wire.from).copied();
            let to = nets.get(&wire.to).copied();
            match (from, to) {
                (None, None) => {
                    let id = members.len();
                    nets.insert(wire.from, id);
                    nets.insert(wire.to, id);
                    if wire.from == wire.to {
                        members.push(vec![wire.from]);
                    } else {
                        members.push(vec![wire.from, wire.to]);
                    }
                }
                (Some(id), None) => {
                    nets.insert(wire.to, id);
                    members[id].push(wire.to);
                }
                (None, Some(id)) => {
                    nets.insert(wire.from, id);
                    members[id].push(wire.from);
                }
                (Some(keep), Some(gone)) if keep != gone => {
                    let moved = std::mem::take(&mut members[gone]);
                    for coord in &moved {
                        nets.insert(*coord, keep);
                    }
                    members[keep].extend(moved);
                }
                _ => {}
            }
        }

        // Merged-away ids leave holes, renumber what survived
        let mut remap = vec![0; members.len()];
        let mut count = 0;
        for (old, coords) in members.iter().enumerate() {
            if !coords.is_empty() {
                remap[old] = count;
                count += 1;
            }
        }
        for id in nets.values_mut() {
            *id = remap[*id];
        }

        Self { nets, count }
    }

    /// Give a shared net to every coordinate touched by two or more ports but by no wire.
    ///
    /// A lone port that touches nothing stays unconnected.
    pub fn join_ports(&mut self, ports: impl IntoIterator<Item = Coord>) {
        let mut order: Vec<Coord> = Vec::new();
        let mut seen: HashMap<Coord, usize> = HashMap::new();
        for coord in ports {
            if self.nets.contains_key(&coord) {
                continue;
            }
            match seen.entry(coord) {
                Entry::Vacant(e) => {
                    e.insert(1);
                    order.push(coord);
                }
                Entry::Occupied(mut e) => *e.get_mut() += 1,
            }
        }

        for coord in order {
            if seen[&coord] > 1 {
                self.nets.insert(coord, self.count);
                self.count += 1;
            }
        }
    }

    /// The net at `coord`, if anything electrical sits there
    pub fn net_at(&self, coord: Coord) -> Option<NetId> {
        self.nets.get(&coord).copied()
    }

    /// Number of nets, one more than the largest id
    pub fn net_count(&self) -> usize {
        self.count
    }

    /// Every coordinate with its net, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (Coord, NetId)> {
        self.nets.iter().map(|(c, n)| (*c, *n))
    }

    /// The coordinates belonging to `net`, sorted
    pub fn coords_of(&self, net: NetId) -> Vec<Coord> {
        let mut coords: Vec<Coord> = self
            .nets
            .iter()
            .filter(|(_, n)| **n == net)
            .map(|(c, _)| *c)
            .collect();
        coords.sort();
        coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(a: (i32, i32), b: (i32, i32)) -> Wire {
        Wire::new(a, b)
    }

    #[test]
    fn ids_follow_discovery_order() {
        let netlist = Netlist::from_wires(&[
            wire((0, 0), (10, 0)),
            wire((50, 50), (60, 50)),
            wire((10, 0), (20, 0)),
        ]);
        assert_eq!(netlist.net_count(), 2);
        assert_eq!(netlist.net_at(Coord::new(0, 0)), Some(0));
        assert_eq!(netlist.net_at(Coord::new(20, 0)), Some(0));
        assert_eq!(netlist.net_at(Coord::new(60, 50)), Some(1));
        assert_eq!(netlist.net_at(Coord::new(30, 0)), None);
    }

    #[test]
    fn merging_compacts_ids() {
        let netlist = Netlist::from_wires(&[
            wire((0, 0), (10, 0)),
            wire((30, 0), (40, 0)),
            wire((20, 0), (30, 0)),
            wire((10, 0), (20, 0)),
            wire((100, 0), (110, 0)),
        ]);
        assert_eq!(netlist.net_count(), 2);
        for x in [0, 10, 20, 30, 40] {
            assert_eq!(netlist.net_at(Coord::new(x, 0)), Some(0));
        }
        assert_eq!(netlist.net_at(Coord::new(100, 0)), Some(1));
        assert_eq!(netlist.coords_of(1), vec![Coord::new(100, 0), Coord::new(110, 0)]);
    }

    #[test]
    fn closing_a_loop_is_a_no_op() {
        let netlist = Netlist::from_wires(&[
            wire((0, 0), (10, 0)),
            wire((10, 0), (10, 10)),
            wire((10, 10), (0, 0)),
        ]);
        assert_eq!(netlist.net_count(), 1);
    }

    #[test]
    fn isolated_wire_gets_its_own_net() {
        let netlist = Netlist::from_wires(&[wire((0, 0), (0, 0))]);
        assert_eq!(netlist.net_count(), 1);
        assert_eq!(netlist.net_at(Coord::ORIGIN), Some(0));
    }

    #[test]
    fn overlapping_ports_share_a_net() {
        let mut netlist = Netlist::from_wires(&[wire((0, 0), (10, 0))]);
        netlist.join_ports([
            Coord::new(10, 0),
            Coord::new(50, 50),
            Coord::new(70, 70),
            Coord::new(50, 50),
        ]);
        assert_eq!(netlist.net_count(), 2);
        assert_eq!(netlist.net_at(Coord::new(10, 0)), Some(0));
        assert_eq!(netlist.net_at(Coord::new(50, 50)), Some(1));
        // Nothing else touches this one
        assert_eq!(netlist.net_at(Coord::new(70, 70)), None);
    }
}
