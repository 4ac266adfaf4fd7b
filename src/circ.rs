/*!

  Reader for Logisim `.circ` project files.

  Only the parts a simulation needs are read: `<circuit>` elements with their
  `<a>` attributes, `<comp>` elements and `<wire>` elements. Library, toolbar
  and option sections are skipped.

*/

use crate::description::{CircuitDescription, ComponentDescription, Document, WireDescription};
use crate::error::Result;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Collect the attributes of an element as owned `(name, value)` pairs
fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        pairs.push((key, value));
    }
    Ok(pairs)
}

fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[derive(Default)]
struct State {
    doc: Document,
    circuit: Option<CircuitDescription>,
    comp: Option<ComponentDescription>,
}

impl State {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let pairs = attributes(e)?;
        match e.name().as_ref() {
            b"circuit" => {
                let name = lookup(&pairs, "name").unwrap_or_default();
                self.circuit = Some(CircuitDescription::new(name));
            }
            b"comp" if self.circuit.is_some() => {
                let mut comp = ComponentDescription::unplaced(lookup(&pairs, "name").unwrap_or_default());
                comp.loc = lookup(&pairs, "loc").map(str::to_string);
                self.comp = Some(comp);
            }
            b"wire" => {
                if let Some(circuit) = self.circuit.as_mut() {
                    circuit.wires.push(WireDescription {
                        from: lookup(&pairs, "from").map(str::to_string),
                        to: lookup(&pairs, "to").map(str::to_string),
                    });
                }
            }
            b"a" => {
                let (Some(k), Some(v)) = (lookup(&pairs, "name"), lookup(&pairs, "val")) else {
                    return Ok(());
                };
                if let Some(comp) = self.comp.as_mut() {
                    comp.attributes.insert(k, v);
                } else if let Some(circuit) = self.circuit.as_mut() {
                    if k == "circuit" && circuit.name.is_empty() {
                        circuit.name = v.to_string();
                    }
                    circuit.attributes.insert(k, v);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"comp" => {
                if let (Some(comp), Some(circuit)) = (self.comp.take(), self.circuit.as_mut()) {
                    circuit.components.push(comp);
                }
            }
            b"circuit" => {
                if let Some(circuit) = self.circuit.take() {
                    if circuit.name.is_empty() {
                        log::warn!("Skipping a circuit without a name");
                    } else {
                        self.doc.circuits.push(circuit);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Parse the text of a `.circ` file
pub fn parse_document(text: &str) -> Result<Document> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut state = State::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => state.open(&e)?,
            Event::Empty(e) => {
                state.open(&e)?;
                state.close(e.name().as_ref());
            }
            Event::End(e) => state.close(e.name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
    }

    log::debug!("Read {} circuits", state.doc.circuits.len());
    Ok(state.doc)
}

/// Read and parse a `.circ` file
pub fn read_document(path: impl AsRef<std::path::Path>) -> Result<Document> {
    let text = std::fs::read_to_string(path)?;
    parse_document(&text)
}
