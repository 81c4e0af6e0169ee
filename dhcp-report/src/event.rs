//! DHCP event records and their display labels.

use serde::Serialize;

/// Label used when the operation or message type cannot be determined.
pub const UNKNOWN: &str = "Unknown";

pub const BOOT_REQUEST: &str = "Boot Request (1)";
pub const BOOT_REPLY: &str = "Boot Reply (2)";

/// One DHCP/BOOTP packet as reported in the table and the CSV.
///
/// Field order is the CSV column order; the header row comes from the field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DhcpEvent {
    pub time: String,
    pub src: String,
    pub dst: String,
    pub bootp_op: String,
    pub dhcp_type: String,
    pub ciaddr: String,
    pub yiaddr: String,
    pub siaddr: String,
    pub giaddr: String,
    pub chaddr: String,
    pub requested_ip: String,
}

/// Map the BOOTP `op` field to its label.
pub fn bootp_op_label(op: Option<&str>) -> &'static str {
    match op {
        Some("1") => BOOT_REQUEST,
        Some("2") => BOOT_REPLY,
        _ => UNKNOWN,
    }
}

/// Map the raw value of option 53 to a message-type label.
///
/// Absent option gives [`UNKNOWN`]; an integer without a name gives
/// `Type {n}`; any other non-blank text is returned verbatim.
pub fn dhcp_type_label(option: Option<&str>) -> String {
    let Some(raw) = option else {
        return UNKNOWN.to_string();
    };

    match raw.trim().parse::<i64>() {
        Ok(code) => message_type_name(code)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Type {code}")),
        Err(_) if raw.trim().is_empty() => UNKNOWN.to_string(),
        Err(_) => raw.to_string(),
    }
}

fn message_type_name(code: i64) -> Option<&'static str> {
    match code {
        1 => Some("Discover"),
        2 => Some("Offer"),
        3 => Some("Request"),
        5 => Some("Ack"),
        7 => Some("Decline"),
        8 => Some("Nak"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{bootp_op_label, dhcp_type_label, UNKNOWN};

    #[test]
    fn bootp_op_labels() {
        assert_eq!(bootp_op_label(Some("1")), "Boot Request (1)");
        assert_eq!(bootp_op_label(Some("2")), "Boot Reply (2)");
        assert_eq!(bootp_op_label(Some("3")), UNKNOWN);
        assert_eq!(bootp_op_label(None), UNKNOWN);
    }

    #[test]
    fn message_type_from_option_53() {
        assert_eq!(dhcp_type_label(Some("1")), "Discover");
        assert_eq!(dhcp_type_label(Some("2")), "Offer");
        assert_eq!(dhcp_type_label(Some("3")), "Request");
        assert_eq!(dhcp_type_label(Some("5")), "Ack");
        assert_eq!(dhcp_type_label(Some("7")), "Decline");
        assert_eq!(dhcp_type_label(Some("8")), "Nak");
    }

    #[test]
    fn unnamed_and_unparseable_codes() {
        assert_eq!(dhcp_type_label(Some("99")), "Type 99");
        assert_eq!(dhcp_type_label(Some("4")), "Type 4");
        assert_eq!(dhcp_type_label(Some("abc")), "abc");
        assert_eq!(dhcp_type_label(Some(" ")), "Unknown");
        assert_eq!(dhcp_type_label(None), "Unknown");
    }
}
