use signal_net::circuit::Circuit;
use signal_net::composite::CircuitRegistry;
use signal_net::description::{CircuitDescription, ComponentDescription, Document};
use signal_net::graph::{FanOutTable, PortRef};

fn ring() -> CircuitDescription {
    CircuitDescription::new("ring")
        .with_component(ComponentDescription::at("NOT Gate", (100, 100)))
        .with_wire((100, 100), (100, 130))
        .with_wire((100, 130), (70, 130))
        .with_wire((70, 130), (70, 100))
}

/// Two pins into an OR gate, whose output feeds both inputs of a NAND and an LED
fn fan() -> CircuitDescription {
    CircuitDescription::new("fan")
        .with_component(ComponentDescription::at("Pin", (130, 90)))
        .with_component(ComponentDescription::at("Pin", (130, 110)))
        .with_component(ComponentDescription::at("OR Gate", (200, 100)))
        .with_component(ComponentDescription::at("NAND Gate", (300, 100)))
        .with_component(ComponentDescription::at("LED", (250, 150)))
        .with_wire((130, 90), (170, 90))
        .with_wire((130, 110), (170, 110))
        .with_wire((200, 100), (250, 100))
        .with_wire((250, 100), (270, 90))
        .with_wire((250, 100), (270, 110))
        .with_wire((250, 100), (250, 150))
}

fn registry() -> CircuitRegistry {
    CircuitRegistry::from_document(&Document::new().with_circuit(ring()).with_circuit(fan())).unwrap()
}

fn circuit<'a>(registry: &'a CircuitRegistry, name: &str) -> &'a Circuit {
    registry.circuit(name).unwrap()
}

#[test]
fn fanout_table() {
    let registry = registry();
    let fan = circuit(&registry, "fan");
    let table: FanOutTable = fan.get_analysis().unwrap();

    let out = fan.port_net(2, 2).unwrap();
    assert_eq!(
        table.get_net_drivers(out).collect::<Vec<_>>(),
        [PortRef {
            component: 2,
            port: 2
        }]
    );
    let mut users: Vec<_> = table.get_net_users(out).collect();
    users.sort();
    assert_eq!(
        users.iter().map(ToString::to_string).collect::<Vec<_>>(),
        ["3.0", "3.1", "4.0"]
    );
    assert_eq!(table.get_component_users(2).collect::<Vec<_>>(), [3, 4]);
    assert_eq!(table.get_component_users(0).collect::<Vec<_>>(), [2]);

    // Nobody listens to the NAND
    assert!(fan.port_net(3, 2).is_none());
    assert!(table.net_has_uses(out));
}

#[test]
fn self_loop_in_table() {
    let registry = registry();
    let ring = circuit(&registry, "ring");
    let table: FanOutTable = ring.get_analysis().unwrap();
    assert_eq!(table.get_component_users(0).collect::<Vec<_>>(), [0]);
}

#[cfg(feature = "graph")]
#[test]
fn feedback_detection() {
    use signal_net::graph::ConnectivityGraph;

    let registry = registry();
    let graph: ConnectivityGraph = circuit(&registry, "ring").get_analysis().unwrap();
    assert!(graph.has_feedback());
    assert_eq!(graph.get_graph().node_count(), 1);

    let graph: ConnectivityGraph = circuit(&registry, "fan").get_analysis().unwrap();
    assert!(!graph.has_feedback());
    // One edge per driver and user pair
    assert_eq!(graph.get_graph().edge_count(), 5);
}
