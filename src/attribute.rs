/*!

  Attributes attached to components and circuits in a circuit description.

*/

use crate::circuit::Coord;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::str::FromStr;

/// The name of an attribute, like `facing` or `size`
pub type AttributeKey = String;
/// Attribute values stay textual until a component kind asks for them
pub type AttributeValue = String;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single attribute, as found in a `<a name=".." val=".."/>` element
pub struct Attribute {
    k: AttributeKey,
    v: AttributeValue,
}

impl Attribute {
    /// Create a new attribute pair
    pub fn new(k: AttributeKey, v: AttributeValue) -> Self {
        Self { k, v }
    }

    /// Get the key of the attribute
    pub fn key(&self) -> &AttributeKey {
        &self.k
    }

    /// Get the value of the attribute
    pub fn value(&self) -> &AttributeValue {
        &self.v
    }

    /// Map attribute key-value pairs to the Attribute struct
    pub fn from_pairs(
        iter: impl Iterator<Item = (AttributeKey, AttributeValue)>,
    ) -> impl Iterator<Item = Self> {
        iter.map(|(k, v)| Self::new(k, v))
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<a name=\"{}\" val=\"{}\"/>", self.k, self.v)
    }
}

/// The already-tokenized attribute map of one element.
///
/// Keys are kept sorted so that descriptions compare and print deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Attributes {
    map: BTreeMap<AttributeKey, AttributeValue>,
}

impl Attributes {
    /// An empty attribute map
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `k` to `v`, returning the previous value
    pub fn insert(&mut self, k: impl Into<AttributeKey>, v: impl Into<AttributeValue>) -> Option<AttributeValue> {
        self.map.insert(k.into(), v.into())
    }

    /// Remove the attribute `k`
    pub fn remove(&mut self, k: &str) -> Option<AttributeValue> {
        self.map.remove(k)
    }

    /// Look up the raw value of `k`
    pub fn get(&self, k: &str) -> Option<&str> {
        self.map.get(k).map(String::as_str)
    }

    /// Returns `true` if `k` is set
    pub fn contains(&self, k: &str) -> bool {
        self.map.contains_key(k)
    }

    /// Parse the value of `k`. A value that does not parse is an unsupported value of `element`.
    pub fn get_parsed<T: FromStr>(&self, element: &str, k: &str) -> Result<Option<T>> {
        match self.get(k) {
            Some(v) => v
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| Error::unsupported(element, k, v)),
            None => Ok(None),
        }
    }

    /// Read a `true`/`false` flag, defaulting to `false`
    pub fn get_flag(&self, element: &str, k: &str) -> Result<bool> {
        Ok(self.get_parsed::<bool>(element, k)?.unwrap_or(false))
    }

    /// Iterate the attributes in key order
    pub fn iter(&self) -> impl Iterator<Item = Attribute> {
        Attribute::from_pairs(self.map.clone().into_iter())
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no attributes
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<AttributeKey>,
    V: Into<AttributeValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            map: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Decode a coordinate token of the form `(x,y)`.
pub fn decode_coord(token: &str) -> Result<Coord> {
    let malformed = || Error::MalformedCoordinate(token.to_string());
    let inner = token
        .trim()
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(malformed)?;
    let (x, y) = inner.split_once(',').ok_or_else(malformed)?;
    let x = x.trim().parse::<i32>().map_err(|_| malformed())?;
    let y = y.trim().parse::<i32>().map_err(|_| malformed())?;
    Ok(Coord::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_coordinates() {
        assert_eq!(decode_coord("(10,20)").unwrap(), Coord::new(10, 20));
        assert_eq!(decode_coord(" ( -30 , 40 ) ").unwrap(), Coord::new(-30, 40));
    }

    #[test]
    fn rejects_malformed_coordinates() {
        for token in ["10,20", "(10;20)", "(10,)", "(a,b)", "()", ""] {
            assert!(
                matches!(decode_coord(token), Err(Error::MalformedCoordinate(_))),
                "{token} should not decode"
            );
        }
    }

    #[test]
    fn typed_getters() {
        let attrs: Attributes = [("size", "50"), ("output", "true"), ("width", "x")]
            .into_iter()
            .collect();
        assert_eq!(attrs.get_parsed::<i32>("AND Gate", "size").unwrap(), Some(50));
        assert!(attrs.get_flag("Pin", "output").unwrap());
        assert!(!attrs.get_flag("Pin", "missing").unwrap());
        assert!(matches!(
            attrs.get_parsed::<u32>("Pin", "width"),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn attribute_display() {
        let attr = Attribute::new("facing".into(), "west".into());
        assert_eq!(attr.to_string(), "<a name=\"facing\" val=\"west\"/>");
    }
}
