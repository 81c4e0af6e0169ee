//! BOOTP (RFC 951) and DHCP (RFC 2131/2132) payloads.

use super::{format_mac, ipv4_at, DissectError};
use crate::packet::Layer;

pub const BOOTP_SERVER_PORT: u16 = 67;
pub const BOOTP_CLIENT_PORT: u16 = 68;

/// Marks the start of the DHCP options area.
pub const DHCP_MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];

/// Fixed BOOTP header size, up to and excluding the magic cookie.
const HEADER_SIZE: usize = 236;
const CHADDR_LEN: usize = 16;

mod options {
    pub const PAD: u8 = 0;
    pub const SUBNET_MASK: u8 = 1;
    pub const ROUTER: u8 = 3;
    pub const DNS_SERVER: u8 = 6;
    pub const HOSTNAME: u8 = 12;
    pub const DOMAIN_NAME: u8 = 15;
    pub const REQUESTED_IP: u8 = 50;
    pub const LEASE_TIME: u8 = 51;
    pub const MESSAGE_TYPE: u8 = 53;
    pub const SERVER_ID: u8 = 54;
    pub const PARAMETER_REQUEST: u8 = 55;
    pub const VENDOR_CLASS: u8 = 60;
    pub const CLIENT_ID: u8 = 61;
    pub const END: u8 = 255;
}

/// Decode a BOOTP payload.
///
/// Payloads carrying the DHCP magic cookie become a `DHCP` layer with one
/// `option_*` field per recognised option; plain BOOTP becomes a `BOOTP` layer
/// with header fields only.
pub(super) fn dissect(payload: &[u8]) -> Result<Layer, DissectError> {
    if payload.len() < HEADER_SIZE {
        return Err(DissectError::payload(
            "BOOTP",
            format!("{} bytes, header needs {HEADER_SIZE}", payload.len()),
        ));
    }

    let has_cookie = payload.len() >= HEADER_SIZE + 4
        && payload[HEADER_SIZE..HEADER_SIZE + 4] == DHCP_MAGIC_COOKIE;
    let mut layer = Layer::new(if has_cookie { "DHCP" } else { "BOOTP" });

    let hlen = payload[2];
    layer.insert("op", payload[0].to_string());
    layer.insert("htype", payload[1].to_string());
    layer.insert("hlen", hlen.to_string());
    layer.insert("hops", payload[3].to_string());
    layer.insert(
        "id",
        format!(
            "0x{:08x}",
            u32::from_be_bytes([payload[4], payload[5], payload[6], payload[7]])
        ),
    );
    layer.insert(
        "secs",
        u16::from_be_bytes([payload[8], payload[9]]).to_string(),
    );
    layer.insert(
        "flags",
        format!("0x{:04x}", u16::from_be_bytes([payload[10], payload[11]])),
    );
    layer.insert("ciaddr", ipv4_at(payload, 12).to_string());
    layer.insert("yiaddr", ipv4_at(payload, 16).to_string());
    layer.insert("siaddr", ipv4_at(payload, 20).to_string());
    layer.insert("giaddr", ipv4_at(payload, 24).to_string());

    // hlen of 0 or past the field size is common in hand-crafted traffic; show an Ethernet-sized address.
    let mac_len = match hlen as usize {
        0 => 6,
        n => n.min(CHADDR_LEN),
    };
    layer.insert("chaddr", format_mac(&payload[28..28 + mac_len]));

    if let Some(sname) = c_string(&payload[44..108]) {
        layer.insert("sname", sname);
    }
    if let Some(file) = c_string(&payload[108..236]) {
        layer.insert("file", file);
    }

    if has_cookie {
        dissect_options(&payload[HEADER_SIZE + 4..], &mut layer)?;
    }

    Ok(layer)
}

fn dissect_options(mut data: &[u8], layer: &mut Layer) -> Result<(), DissectError> {
    while let Some((&code, rest)) = data.split_first() {
        match code {
            options::PAD => {
                data = rest;
                continue;
            }
            options::END => break,
            _ => {}
        }

        let (&len, rest) = rest.split_first().ok_or_else(|| {
            DissectError::payload("DHCP", format!("option {code} is missing its length"))
        })?;
        let len = len as usize;
        if rest.len() < len {
            return Err(DissectError::payload(
                "DHCP",
                format!("option {code} declares {len} bytes, {} remain", rest.len()),
            ));
        }

        let (value, rest) = rest.split_at(len);
        let (name, text) = describe_option(code, value);
        layer.insert(name, text);
        data = rest;
    }

    Ok(())
}

fn describe_option(code: u8, value: &[u8]) -> (String, String) {
    let named = |name: &str, text: String| (format!("option_{name}"), text);
    match code {
        options::MESSAGE_TYPE if !value.is_empty() => named("dhcp", value[0].to_string()),
        options::REQUESTED_IP => named("requested_ip_address", ipv4_or_hex(value)),
        options::SERVER_ID => named("dhcp_server_id", ipv4_or_hex(value)),
        options::SUBNET_MASK => named("subnet_mask", ipv4_or_hex(value)),
        options::ROUTER => named("router", ipv4_list(value)),
        options::DNS_SERVER => named("domain_name_server", ipv4_list(value)),
        options::HOSTNAME => named("hostname", lossy(value)),
        options::DOMAIN_NAME => named("domain_name", lossy(value)),
        options::VENDOR_CLASS => named("vendor_class_id", lossy(value)),
        options::CLIENT_ID => named("client_id", format_mac(value)),
        options::LEASE_TIME if value.len() == 4 => named(
            "ip_address_lease_time",
            u32::from_be_bytes([value[0], value[1], value[2], value[3]]).to_string(),
        ),
        options::PARAMETER_REQUEST => named(
            "parameter_request_list",
            value
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        _ => (format!("option_{code}"), hex(value)),
    }
}

fn ipv4_or_hex(value: &[u8]) -> String {
    if value.len() == 4 {
        ipv4_at(value, 0).to_string()
    } else {
        hex(value)
    }
}

fn ipv4_list(value: &[u8]) -> String {
    if value.is_empty() || value.len() % 4 != 0 {
        return hex(value);
    }
    value
        .chunks_exact(4)
        .map(|chunk| ipv4_at(chunk, 0).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn hex(value: &[u8]) -> String {
    value.iter().map(|b| format!("{b:02x}")).collect()
}

fn lossy(value: &[u8]) -> String {
    String::from_utf8_lossy(value)
        .trim_end_matches('\0')
        .to_string()
}

fn c_string(field: &[u8]) -> Option<String> {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());
    if end == 0 {
        return None;
    }
    Some(String::from_utf8_lossy(&field[..end]).into_owned())
}
