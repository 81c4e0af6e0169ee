use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// Read-only view of a dissected packet.
///
/// Consumers probe for layers by name and read fields as text, the same way a
/// dissector tree is browsed. Layer names are matched case-insensitively.
pub trait LayeredPacket {
    /// Capture timestamp of the frame, formatted `YYYY-MM-DD HH:MM:SS.ffffff` (UTC).
    fn sniff_timestamp(&self) -> &str;

    /// Return `true` when the packet carries a layer with this name.
    fn has_layer(&self, name: &str) -> bool;

    /// Return the text value of `field` inside `layer`, if both exist.
    fn field(&self, layer: &str, field: &str) -> Option<&str>;
}

/// One protocol layer and its decoded fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layer {
    /// Upper-case layer name (`ETH`, `IP`, `UDP`, `DHCP`, `BOOTP`, `DNS`).
    pub name: String,
    /// Field values keyed by field name.
    pub fields: BTreeMap<String, String>,
}

impl Layer {
    /// Create an empty layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Builder-style variant of [`Layer::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// A frame after dissection: timestamp plus its layers, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedPacket {
    /// Zero-based position of the frame in the capture.
    pub index: usize,
    pub timestamp: String,
    pub layers: Vec<Layer>,
}

impl DecodedPacket {
    pub fn new(index: usize, timestamp: impl Into<String>) -> Self {
        Self {
            index,
            timestamp: timestamp.into(),
            layers: Vec::new(),
        }
    }

    /// Return the first layer with the provided name.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|layer| layer.name.eq_ignore_ascii_case(name))
    }

    /// Layer names in stacking order, e.g. `ETH:IP:UDP:DHCP`.
    pub fn protocols(&self) -> String {
        self.layers
            .iter()
            .map(|layer| layer.name.as_str())
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl LayeredPacket for DecodedPacket {
    fn sniff_timestamp(&self) -> &str {
        &self.timestamp
    }

    fn has_layer(&self, name: &str) -> bool {
        self.layer(name).is_some()
    }

    fn field(&self, layer: &str, field: &str) -> Option<&str> {
        self.layer(layer)?.get(field)
    }
}

impl Display for DecodedPacket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} [{}]", self.index, self.timestamp, self.protocols())
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodedPacket, Layer, LayeredPacket};

    #[test]
    fn layer_lookup_ignores_case() {
        let mut packet = DecodedPacket::new(0, "2024-01-15 10:00:01.000000");
        packet
            .layers
            .push(Layer::new("IP").with("src", "10.0.0.1").with("dst", "10.0.0.2"));

        assert!(packet.has_layer("ip"));
        assert!(!packet.has_layer("dns"));
        assert_eq!(packet.field("Ip", "src"), Some("10.0.0.1"));
        assert_eq!(packet.field("IP", "ttl"), None);
        assert_eq!(packet.field("DNS", "qry_name"), None);
    }

    #[test]
    fn display_lists_protocol_stack() {
        let mut packet = DecodedPacket::new(3, "2024-01-15 10:00:01.000000");
        packet.layers.push(Layer::new("ETH"));
        packet.layers.push(Layer::new("IP"));
        packet.layers.push(Layer::new("UDP"));

        assert_eq!(
            packet.to_string(),
            "#3 2024-01-15 10:00:01.000000 [ETH:IP:UDP]"
        );
    }
}
