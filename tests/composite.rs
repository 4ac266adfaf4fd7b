use signal_net::circuit::PortMode;
use signal_net::component::{Footprint, Kind};
use signal_net::composite::CircuitRegistry;
use signal_net::description::{CircuitDescription, ComponentDescription, Document};
use signal_net::{Coord, EngineConfig, Error, Signal, Simulation};

fn pin(at: (i32, i32), label: &str, output: bool) -> ComponentDescription {
    let facing = if output { "west" } else { "east" };
    ComponentDescription::at("Pin", at)
        .with("label", label)
        .with("facing", facing)
        .with("output", output.to_string())
}

/// S = A xor B, C = A and B
fn half_adder() -> CircuitDescription {
    CircuitDescription::new("half")
        .with_component(pin((50, 50), "A", false))
        .with_component(pin((50, 150), "B", false))
        .with_component(ComponentDescription::at("XOR Gate", (200, 80)))
        .with_component(ComponentDescription::at("AND Gate", (200, 140)))
        .with_component(pin((300, 80), "S", true))
        .with_component(pin((300, 140), "C", true))
        .with_wire((50, 50), (120, 50))
        .with_wire((120, 50), (120, 70))
        .with_wire((120, 70), (170, 70))
        .with_wire((120, 70), (120, 130))
        .with_wire((120, 130), (170, 130))
        .with_wire((50, 150), (140, 150))
        .with_wire((140, 150), (170, 150))
        .with_wire((140, 150), (140, 90))
        .with_wire((140, 90), (170, 90))
        .with_wire((200, 80), (300, 80))
        .with_wire((200, 140), (300, 140))
}

fn top() -> CircuitDescription {
    CircuitDescription::new("main")
        .with_component(ComponentDescription::at("half", (400, 400)))
        .with_component(ComponentDescription::at("Pin", (300, 410)).with("label", "a"))
        .with_component(ComponentDescription::at("Pin", (300, 420)).with("label", "b"))
        .with_component(ComponentDescription::at("LED", (500, 410)))
        .with_component(ComponentDescription::at("LED", (500, 420)))
        .with_wire((300, 410), (400, 410))
        .with_wire((300, 420), (400, 420))
        .with_wire((430, 410), (500, 410))
        .with_wire((430, 420), (500, 420))
}

fn registry() -> CircuitRegistry {
    let _ = env_logger::Builder::from_default_env().is_test(true).try_init();
    CircuitRegistry::from_document(&Document::new().with_circuit(top()).with_circuit(half_adder())).unwrap()
}

/// Set a pin to `value` by pressing it if needed
fn set(sim: &mut Simulation, label: &str, value: bool) {
    let idx = sim.find_labeled(label).unwrap();
    if sim.port_signals(idx).unwrap()[0] != value {
        sim.activate(idx).unwrap();
    }
}

fn read(sim: &Simulation, at: (i32, i32)) -> bool {
    sim.read_at(at.into()).unwrap().is_high()
}

#[test]
fn chip_layout() {
    let registry = registry();
    let def = registry.get("half").unwrap();
    assert_eq!(def.dimensions(), (30, 30));
    let labels: Vec<_> = def
        .boundary()
        .iter()
        .map(|b| b.label.as_deref().unwrap())
        .collect();
    assert_eq!(labels, ["A", "B", "S", "C"]);

    let sim = registry.simulate("main", EngineConfig::default()).unwrap();
    let chip = sim.component(0).unwrap();
    assert!(matches!(chip.kind(), Kind::Chip(_)));
    let ports: Vec<_> = chip.ports().iter().map(|p| (p.coord, p.mode)).collect();
    assert_eq!(
        ports,
        [
            (Coord::new(400, 410), PortMode::Input),
            (Coord::new(400, 420), PortMode::Input),
            (Coord::new(430, 410), PortMode::Output),
            (Coord::new(430, 420), PortMode::Output),
        ]
    );
    assert_eq!(chip.bounds().min, Coord::new(400, 400));
    assert_eq!(chip.bounds().max, Coord::new(430, 430));
}

#[test]
fn chip_matches_inline_gates() {
    let registry = registry();
    for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
        let mut inline = registry.simulate("half", EngineConfig::default()).unwrap();
        set(&mut inline, "A", a);
        set(&mut inline, "B", b);

        let mut nested = registry.simulate("main", EngineConfig::default()).unwrap();
        set(&mut nested, "a", a);
        set(&mut nested, "b", b);

        let (s, c) = (read(&inline, (300, 80)), read(&inline, (300, 140)));
        assert_eq!((s, c), (a ^ b, a && b), "inline {a} {b}");
        assert_eq!(read(&nested, (500, 410)), s, "sum of {a} {b}");
        assert_eq!(read(&nested, (500, 420)), c, "carry of {a} {b}");
    }
}

#[test]
fn chip_follows_toggles() {
    let registry = registry();
    let mut sim = registry.simulate("main", EngineConfig::default()).unwrap();
    for (a, b) in [(true, false), (true, true), (false, true), (false, false)] {
        set(&mut sim, "a", a);
        set(&mut sim, "b", b);
        assert_eq!(read(&sim, (500, 410)), a ^ b);
        assert_eq!(read(&sim, (500, 420)), a && b);
    }

    // The inner engine saw the last inputs
    let inner = sim.chip(0).unwrap();
    assert_eq!(inner.read_at(Coord::new(50, 50)), Some(Signal::Low));
    assert!(sim.chip(1).is_none());
}

#[test]
fn instances_are_independent() {
    let doc = Document::new()
        .with_circuit(half_adder())
        .with_circuit(
            CircuitDescription::new("pair")
                .with_component(ComponentDescription::at("half", (100, 100)))
                .with_component(ComponentDescription::at("half", (100, 200)))
                .with_component(ComponentDescription::at("Pin", (50, 110)).with("label", "x"))
                .with_wire((50, 110), (100, 110))
                .with_wire((130, 110), (160, 110))
                .with_wire((130, 210), (160, 210)),
        );
    let registry = CircuitRegistry::from_document(&doc).unwrap();
    let mut sim = registry.simulate("pair", EngineConfig::default()).unwrap();
    set(&mut sim, "x", true);
    assert_eq!(sim.read_at(Coord::new(160, 110)), Some(Signal::High));
    assert_eq!(sim.read_at(Coord::new(160, 210)), Some(Signal::Low));
}

#[test]
fn recursion_is_rejected() {
    let doc = Document::new().with_circuit(
        CircuitDescription::new("loop").with_component(ComponentDescription::at("loop", (0, 0))),
    );
    assert!(matches!(
        CircuitRegistry::from_document(&doc),
        Err(Error::RecursiveCircuit(name)) if name == "loop"
    ));
}

#[test]
fn primitives_shadow_circuits() {
    let doc = Document::new()
        .with_circuit(CircuitDescription::new("AND").with_component(pin((0, 0), "q", false)))
        .with_circuit(CircuitDescription::new("main").with_component(ComponentDescription::at("AND", (100, 100))));
    let registry = CircuitRegistry::from_document(&doc).unwrap();
    let main = registry.circuit("main").unwrap();
    assert_eq!(main.components()[0].name(), "AND Gate");
}

/// A NAND gate fed back into itself, enabled by pin E
fn ring_oscillator() -> CircuitDescription {
    CircuitDescription::new("osc")
        .with_component(pin((50, 50), "E", false))
        .with_component(ComponentDescription::at("NAND Gate", (200, 60)))
        .with_component(pin((250, 60), "Q", true))
        .with_wire((50, 50), (170, 50))
        .with_wire((200, 60), (200, 90))
        .with_wire((200, 90), (170, 90))
        .with_wire((170, 90), (170, 70))
        .with_wire((200, 60), (250, 60))
}

#[test]
fn chip_reports_inner_truncation() {
    let doc = Document::new().with_circuit(ring_oscillator()).with_circuit(
        CircuitDescription::new("main")
            .with_component(ComponentDescription::at("osc", (400, 400)))
            .with_component(ComponentDescription::at("Pin", (300, 410)).with("label", "en"))
            .with_component(ComponentDescription::at("LED", (500, 410)))
            .with_wire((300, 410), (400, 410))
            .with_wire((430, 410), (500, 410)),
    );
    let _ = env_logger::Builder::from_default_env().is_test(true).try_init();
    let registry = CircuitRegistry::from_document(&doc).unwrap();

    let mut inline = registry.simulate("osc", EngineConfig::default()).unwrap();
    assert!(!inline.priming().truncated());
    let e = inline.find_labeled("E").unwrap();
    assert!(inline.activate(e).unwrap().truncated());

    let mut nested = registry.simulate("main", EngineConfig::default()).unwrap();
    assert!(!nested.priming().truncated());
    let en = nested.find_labeled("en").unwrap();
    let report = nested.activate(en).unwrap();
    assert!(report.truncated());
    assert!(report.dropped >= 1);
}
