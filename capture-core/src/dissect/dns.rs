//! DNS and mDNS messages, decoded with `hickory-proto`. Only the header and
//! first question are exposed as fields.

use hickory_proto::op::{Message, MessageType};

use super::DissectError;
use crate::packet::Layer;

pub const DNS_PORT: u16 = 53;
pub const MDNS_PORT: u16 = 5353;

/// Decode `payload` into a layer called `name` (`DNS` or `MDNS`).
pub(super) fn dissect(payload: &[u8], name: &'static str) -> Result<Layer, DissectError> {
    let message =
        Message::from_vec(payload).map_err(|err| DissectError::payload(name, err.to_string()))?;
    let header = message.header();

    let response = match header.message_type() {
        MessageType::Query => "0",
        MessageType::Response => "1",
    };
    let mut layer = Layer::new(name)
        .with("id", format!("0x{:04x}", header.id()))
        .with("flags_response", response)
        .with("flags_opcode", u8::from(header.op_code()).to_string())
        .with("flags_rcode", u16::from(header.response_code()).to_string())
        .with("count_queries", header.query_count().to_string())
        .with("count_answers", header.answer_count().to_string())
        .with("count_auth_rr", header.name_server_count().to_string())
        .with("count_add_rr", header.additional_count().to_string());

    if let Some(query) = message.queries().first() {
        let qname = query.name();
        let qname = if qname.is_root() {
            "<Root>".to_string()
        } else {
            qname.to_string().trim_end_matches('.').to_string()
        };
        layer.insert("qry_name", qname);
        layer.insert("qry_type", u16::from(query.query_type()).to_string());
        layer.insert(
            "qry_class",
            format!("0x{:04x}", u16::from(query.query_class())),
        );
    }

    Ok(layer)
}
