use std::collections::HashMap;

use serde::Serialize;

use crate::event::DhcpEvent;

/// Number of events carrying one message-type label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub label: String,
    pub count: usize,
}

/// Count events per `dhcp_type`, in order of first appearance.
pub fn count_by_type(events: &[DhcpEvent]) -> Vec<TypeCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<TypeCount> = Vec::new();

    for event in events {
        match positions.get(event.dhcp_type.as_str()) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                positions.insert(&event.dhcp_type, counts.len());
                counts.push(TypeCount {
                    label: event.dhcp_type.clone(),
                    count: 1,
                });
            }
        }
    }

    counts
}

/// Highest count first; equal counts keep their first-appearance order.
pub fn most_common(counts: &[TypeCount]) -> Vec<TypeCount> {
    let mut sorted = counts.to_vec();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    sorted
}

/// Sort events ascending by timestamp text; equal timestamps keep capture order.
pub fn sort_by_time(events: &mut [DhcpEvent]) {
    events.sort_by(|a, b| a.time.cmp(&b.time));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{count_by_type, most_common, sort_by_time, TypeCount};
    use crate::event::DhcpEvent;

    fn event(time: &str, dhcp_type: &str) -> DhcpEvent {
        DhcpEvent {
            time: time.to_string(),
            src: "0.0.0.0".to_string(),
            dst: "255.255.255.255".to_string(),
            bootp_op: "Boot Request (1)".to_string(),
            dhcp_type: dhcp_type.to_string(),
            ciaddr: String::new(),
            yiaddr: String::new(),
            siaddr: String::new(),
            giaddr: String::new(),
            chaddr: String::new(),
            requested_ip: String::new(),
        }
    }

    fn count(label: &str, count: usize) -> TypeCount {
        TypeCount {
            label: label.to_string(),
            count,
        }
    }

    #[test]
    fn counts_keep_first_appearance_order() {
        let events = vec![
            event("1", "Request"),
            event("2", "Discover"),
            event("3", "Discover"),
            event("4", "Ack"),
        ];
        assert_eq!(
            count_by_type(&events),
            vec![count("Request", 1), count("Discover", 2), count("Ack", 1)]
        );
    }

    #[test]
    fn most_common_breaks_ties_by_first_appearance() {
        let counts = vec![
            count("Request", 1),
            count("Discover", 2),
            count("Ack", 1),
            count("Offer", 2),
        ];
        assert_eq!(
            most_common(&counts),
            vec![
                count("Discover", 2),
                count("Offer", 2),
                count("Request", 1),
                count("Ack", 1),
            ]
        );
    }

    #[test]
    fn sorts_by_time_stably() {
        let mut events = vec![
            event("10:00:02", "Offer"),
            event("10:00:01", "Discover"),
            event("10:00:02", "Request"),
        ];
        sort_by_time(&mut events);

        let order: Vec<(&str, &str)> = events
            .iter()
            .map(|e| (e.time.as_str(), e.dhcp_type.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("10:00:01", "Discover"),
                ("10:00:02", "Offer"),
                ("10:00:02", "Request"),
            ]
        );
    }
}
