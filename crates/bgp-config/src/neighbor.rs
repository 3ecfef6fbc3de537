//! Configured BGP neighbors.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use crate::family::{Afi, Families};

/// Hold time applied when a neighbor block does not set one.
pub const DEFAULT_HOLD_TIME: u16 = 180;

/// One `neighbor` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborConfig {
    /// Remote address of the session.
    pub peer_address: IpAddr,
    /// Free-form operator description.
    pub description: Option<String>,
    /// BGP identifier sent in OPEN.
    pub router_id: Option<Ipv4Addr>,
    /// Local address the session binds to.
    pub local_address: Option<IpAddr>,
    /// Local autonomous system.
    pub local_as: u32,
    /// Expected remote autonomous system.
    pub peer_as: u32,
    /// Proposed hold time in seconds.
    pub hold_time: u16,
    /// Families announced in OPEN.
    pub families: Families,
}

impl NeighborConfig {
    /// Builds a neighbor with default hold time and no optional statements.
    #[must_use]
    pub fn new(peer_address: IpAddr, local_as: u32, peer_as: u32) -> Self {
        Self {
            peer_address,
            description: None,
            router_id: None,
            local_address: None,
            local_as,
            peer_as,
            hold_time: DEFAULT_HOLD_TIME,
            families: Families::default(),
        }
    }

    /// Returns the selector name used to match control-channel descriptions.
    ///
    /// The name lists `key value` phrases, e.g.
    /// `neighbor 10.0.0.1 local-ip 10.0.0.2 local-as 65000 peer-as 65001
    /// router-id 1.1.1.1 family-allowed ipv4-unicast`.
    #[must_use]
    pub fn name(&self) -> String {
        let mut name = format!("neighbor {}", self.peer_address);
        if let Some(local) = self.local_address {
            name.push_str(&format!(" local-ip {local}"));
        }
        name.push_str(&format!(
            " local-as {} peer-as {}",
            self.local_as, self.peer_as
        ));
        if let Some(router_id) = self.router_id {
            name.push_str(&format!(" router-id {router_id}"));
        }
        name.push_str(" family-allowed ");
        if self.families.is_empty() {
            name.push_str("in-open");
        } else {
            let allowed: Vec<String> = self
                .families
                .iter()
                .map(|family| format!("{}-{}", family.afi, family.safi))
                .collect();
            name.push_str(&allowed.join("/"));
        }
        name
    }
}

impl fmt::Display for NeighborConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(formatter, "neighbor {} {{", self.peer_address)?;
        if let Some(description) = &self.description {
            writeln!(formatter, "    description \"{description}\";")?;
        }
        if let Some(router_id) = self.router_id {
            writeln!(formatter, "    router-id {router_id};")?;
        }
        if let Some(local) = self.local_address {
            writeln!(formatter, "    local-address {local};")?;
        }
        writeln!(formatter, "    local-as {};", self.local_as)?;
        writeln!(formatter, "    peer-as {};", self.peer_as)?;
        writeln!(formatter, "    hold-time {};", self.hold_time)?;
        if !self.families.is_empty() {
            writeln!(formatter, "    family {{")?;
            for afi in Afi::ALL {
                let safis = self.families.safis(afi);
                if safis.is_empty() {
                    continue;
                }
                let joined: Vec<&str> = safis.iter().map(|safi| safi.as_str()).collect();
                writeln!(formatter, "        {afi} [ {} ];", joined.join(" "))?;
            }
            writeln!(formatter, "    }}")?;
        }
        write!(formatter, "}}")
    }
}

#[cfg(test)]
mod tests {
    use crate::family::{FamilyDeclaration, Safi};

    use super::*;

    fn neighbor() -> NeighborConfig {
        let mut declaration = FamilyDeclaration::new();
        declaration.add(Afi::Ipv4, Safi::Unicast).expect("unicast");
        declaration.add(Afi::Ipv6, Safi::Flow).expect("flow");
        NeighborConfig {
            router_id: Some(Ipv4Addr::new(1, 1, 1, 1)),
            local_address: Some("10.0.0.2".parse().expect("ip")),
            families: declaration.finish(),
            ..NeighborConfig::new("10.0.0.1".parse().expect("ip"), 65000, 65001)
        }
    }

    #[test]
    fn name_lists_selector_phrases() {
        assert_eq!(
            neighbor().name(),
            "neighbor 10.0.0.1 local-ip 10.0.0.2 local-as 65000 peer-as 65001 \
             router-id 1.1.1.1 family-allowed ipv4-unicast/ipv6-flow"
        );
    }

    #[test]
    fn name_reports_in_open_without_families() {
        let plain = NeighborConfig::new("192.0.2.1".parse().expect("ip"), 1, 2);
        assert!(plain.name().ends_with("family-allowed in-open"));
    }

    #[test]
    fn renders_configuration_block() {
        let rendered = neighbor().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.first(), Some(&"neighbor 10.0.0.1 {"));
        assert!(lines.contains(&"    local-as 65000;"));
        assert!(lines.contains(&"        ipv4 [ unicast ];"));
        assert!(lines.contains(&"        ipv6 [ flow ];"));
        assert_eq!(lines.last(), Some(&"}"));
    }
}
