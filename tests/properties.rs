//! Property-based tests for net grouping and signal propagation.

use proptest::prelude::*;
use signal_net::circuit::{Circuit, Wire};
use signal_net::component::{Component, Kind, LedState, PinState, Primitive};
use signal_net::netlist::Netlist;
use signal_net::{Coord, EngineConfig, Signal, Simulation};
use std::collections::{HashMap, HashSet};

/// Wires between points of a small grid, so that endpoints collide often
fn arb_wires(max_wires: usize) -> impl Strategy<Value = Vec<Wire>> {
    let point = (0..6i32, 0..6i32).prop_map(|(x, y)| Coord::new(x * 10, y * 10));
    proptest::collection::vec((point.clone(), point), 0..=max_wires)
        .prop_map(|pairs| pairs.into_iter().map(|(a, b)| Wire::new(a, b)).collect())
}

/// Reference grouping with a plain union-find
fn reference_groups(wires: &[Wire]) -> HashMap<Coord, Coord> {
    let mut parent: HashMap<Coord, Coord> = HashMap::new();
    fn find(parent: &mut HashMap<Coord, Coord>, c: Coord) -> Coord {
        let p = *parent.entry(c).or_insert(c);
        if p == c {
            return c;
        }
        let root = find(parent, p);
        parent.insert(c, root);
        root
    }
    for w in wires {
        let (a, b) = (find(&mut parent, w.from), find(&mut parent, w.to));
        if a != b {
            parent.insert(a, b);
        }
    }
    let coords: Vec<Coord> = parent.keys().copied().collect();
    coords
        .into_iter()
        .map(|c| (c, find(&mut parent, c)))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Endpoints share a net exactly when a chain of wires joins them
    #[test]
    fn nets_match_connectivity(wires in arb_wires(20)) {
        let netlist = Netlist::from_wires(&wires);
        let groups = reference_groups(&wires);

        for (a, ra) in &groups {
            for (b, rb) in &groups {
                prop_assert_eq!(netlist.net_at(*a) == netlist.net_at(*b), ra == rb);
            }
        }

        let roots: HashSet<&Coord> = groups.values().collect();
        prop_assert_eq!(netlist.net_count(), roots.len());
    }

    /// Ids are dense: every id below the count is used
    #[test]
    fn net_ids_are_dense(wires in arb_wires(20)) {
        let netlist = Netlist::from_wires(&wires);
        let used: HashSet<usize> = netlist.iter().map(|(_, n)| n).collect();
        prop_assert_eq!(used, (0..netlist.net_count()).collect::<HashSet<_>>());
    }

    /// Pressing one of several separate pin-to-LED chains leaves the others alone
    #[test]
    fn chains_are_independent(chains in 1..6usize, presses in proptest::collection::vec(0..6usize, 0..12)) {
        let mut components = Vec::new();
        let mut wires = Vec::new();
        for i in 0..chains {
            let y = 20 * i as i32;
            let pin = Kind::Primitive(Primitive::Pin(PinState::default()));
            components.push(Component::place(pin, Coord::new(0, y), None).unwrap());
            components.push(Component::place(
                Kind::Primitive(Primitive::Led(LedState {
                    color: "#ff0000".into(),
                    off_color: "#404040".into(),
                    label: None,
                })),
                Coord::new(50, y),
                None,
            ).unwrap());
            wires.push(Wire::new((0, y), (50, y)));
        }
        let circuit = Circuit::new("chains".to_string(), components, wires);
        let mut sim = Simulation::load(&circuit, EngineConfig::default());

        let mut expected = vec![false; chains];
        for p in presses.into_iter().filter(|p| *p < chains) {
            sim.activate(2 * p).unwrap();
            expected[p] = !expected[p];
        }
        for (i, e) in expected.into_iter().enumerate() {
            let led = Coord::new(50, 20 * i as i32);
            prop_assert_eq!(sim.read_at(led), Some(Signal::from(e)));
        }
    }
}
