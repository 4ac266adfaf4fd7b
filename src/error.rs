/*!

  Errors raised while loading circuits and driving simulations.

*/

use thiserror::Error;

/// Everything that can go wrong while turning a description into a [crate::circuit::Circuit]
/// or poking at a running [crate::simulation::Simulation].
///
/// Oscillating circuits are not an error: they are cut off by the tick budget
/// and reported through [crate::simulation::Propagation].
#[derive(Error, Debug)]
pub enum Error {
    /// A wire or component is missing a coordinate it cannot be placed without
    #[error("{element} is missing its `{attribute}` coordinate")]
    MissingCoordinate {
        /// The element kind, like `wire` or `AND Gate`
        element: String,
        /// The attribute that was expected
        attribute: &'static str,
    },

    /// A coordinate token could not be decoded as `(x,y)`
    #[error("malformed coordinate `{0}`")]
    MalformedCoordinate(String),

    /// An attribute carries a value the component model cannot represent
    #[error("unsupported value `{value}` for `{attribute}` on {element}")]
    Unsupported {
        /// The element kind
        element: String,
        /// The attribute name
        attribute: String,
        /// The offending value
        value: String,
    },

    /// A circuit was requested by name but the document has none by that name
    #[error("circuit `{0}` is not defined")]
    UnknownCircuit(String),

    /// A circuit instantiates itself, directly or through other circuits
    #[error("circuit `{0}` instantiates itself")]
    RecursiveCircuit(String),

    /// A document without any circuit to simulate
    #[error("the document holds no circuits")]
    EmptyDocument,

    /// A component index outside of the simulation
    #[error("no component at index {0}")]
    NoSuchComponent(usize),

    /// A file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The `.circ` document is not well-formed XML
    #[cfg(feature = "circ")]
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// A description could not be (de)serialized
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for an [Error::Unsupported] value
    pub(crate) fn unsupported(element: &str, attribute: &str, value: &str) -> Self {
        Error::Unsupported {
            element: element.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }
}

#[cfg(feature = "circ")]
impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Xml(e.to_string())
    }
}

#[cfg(feature = "circ")]
impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(e.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
