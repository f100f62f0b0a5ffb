// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `addresses.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::crd::{
        VirtualMachineInstance, VirtualMachineInstanceNetworkInterface,
        VirtualMachineInstanceSpec, VirtualMachineInstanceStatus,
    };

    fn multus(ip: &str, info_source: &str) -> VirtualMachineInstanceNetworkInterface {
        VirtualMachineInstanceNetworkInterface {
            ip: Some(ip.to_string()),
            info_source: Some(info_source.to_string()),
            ..Default::default()
        }
    }

    fn guest_agent(ips: &[&str], info_source: &str) -> VirtualMachineInstanceNetworkInterface {
        VirtualMachineInstanceNetworkInterface {
            ip: ips.first().map(|ip| (*ip).to_string()),
            ips: Some(ips.iter().map(|ip| (*ip).to_string()).collect()),
            info_source: Some(info_source.to_string()),
            ..Default::default()
        }
    }

    fn vmi(interfaces: Vec<VirtualMachineInstanceNetworkInterface>) -> VirtualMachineInstance {
        let mut vmi = VirtualMachineInstance::new("vm", VirtualMachineInstanceSpec::default());
        vmi.status = Some(VirtualMachineInstanceStatus {
            interfaces,
        });
        vmi
    }

    // ---------- SourceTags ----------

    #[test]
    fn test_source_tags_exact_token_match() {
        let cases = [
            ("multus-status", "multus-status", true),
            ("domain,multus-status", "multus-status", true),
            ("multus-status,guest-agent", "multus-status", true),
            ("domain, guest-agent", "guest-agent", true),
            (" guest-agent ", "guest-agent", true),
            ("domain", "multus-status", false),
            ("guest-agent", "multus-status", false),
            ("", "multus-status", false),
            ("multus", "multus-status", false),
            ("guest-agent-v2", "guest-agent", false),
        ];

        for (raw, tag, want) in cases {
            assert_eq!(
                SourceTags::parse(raw).contains(tag),
                want,
                "SourceTags::parse({raw:?}).contains({tag:?})"
            );
        }
    }

    #[test]
    fn test_source_tags_missing_info_source() {
        let iface = VirtualMachineInstanceNetworkInterface {
            ip: Some("10.0.0.1".to_string()),
            ..Default::default()
        };
        assert_eq!(SourceTags::of(&iface), SourceTags::default());
        assert!(!AddressSource::MultusStatus.reported(&iface));
    }

    // ---------- classify ----------

    #[test]
    fn test_classify() {
        assert_eq!(classify("192.168.1.1", false), Some(AddressFamily::V4));
        assert_eq!(classify("2001:db8::1", false), Some(AddressFamily::V6));
        assert_eq!(classify("::ffff:10.0.0.1", false), Some(AddressFamily::V4));
        assert_eq!(classify("fe80::1", false), None);
        assert_eq!(classify("fe80::1", true), Some(AddressFamily::V6));
        assert_eq!(classify("febf::1", false), None);
        assert_eq!(classify("fec0::1", false), Some(AddressFamily::V6));
        assert_eq!(classify("not-an-ip", true), None);
        assert_eq!(classify("10.0.0.1/24", true), None);
        assert_eq!(classify("256.0.0.1", true), None);
    }

    // ---------- extract_addresses: multus-status ----------

    #[test]
    fn test_extract_multus_empty_interfaces() {
        let found = extract_addresses(&[], AddressSource::MultusStatus);
        assert!(found.is_empty());
    }

    #[test]
    fn test_extract_multus_only_non_multus_source() {
        let interfaces = [multus("10.0.0.1", "domain"), multus("10.0.0.2", "guest-agent")];
        let found = extract_addresses(&interfaces, AddressSource::MultusStatus);
        assert!(found.is_empty(), "expected no IPs, got {found:?}");
    }

    #[test]
    fn test_extract_multus_ipv4() {
        let interfaces = [multus("192.168.1.10", "multus-status")];
        let found = extract_addresses(&interfaces, AddressSource::MultusStatus);
        assert_eq!(found.ipv4, vec!["192.168.1.10"]);
        assert!(found.ipv6.is_empty());
    }

    #[test]
    fn test_extract_multus_ipv6() {
        let interfaces = [multus("2001:db8::1", "multus-status")];
        let found = extract_addresses(&interfaces, AddressSource::MultusStatus);
        assert!(found.ipv4.is_empty());
        assert_eq!(found.ipv6, vec!["2001:db8::1"]);
    }

    #[test]
    fn test_extract_multus_mixed() {
        let interfaces = [
            multus("192.168.1.10", "multus-status"),
            multus("10.0.0.5", "domain"),
            multus("2001:db8::1", "multus-status"),
            multus("", "multus-status"),
            multus("garbage", "multus-status"),
        ];
        let found = extract_addresses(&interfaces, AddressSource::MultusStatus);
        assert_eq!(found.ipv4, vec!["192.168.1.10"]);
        assert_eq!(found.ipv6, vec!["2001:db8::1"]);
    }

    #[test]
    fn test_extract_multus_comma_separated_info_source() {
        let interfaces = [multus("10.10.10.10", "domain,multus-status")];
        let found = extract_addresses(&interfaces, AddressSource::MultusStatus);
        assert_eq!(found.ipv4, vec!["10.10.10.10"]);
    }

    #[test]
    fn test_extract_multus_keeps_link_local() {
        let interfaces = [multus("fe80::abcd", "multus-status")];
        let found = extract_addresses(&interfaces, AddressSource::MultusStatus);
        assert_eq!(found.ipv6, vec!["fe80::abcd"]);
    }

    #[test]
    fn test_extract_multus_ignores_ip_list() {
        let interfaces = [VirtualMachineInstanceNetworkInterface {
            ip: Some("10.0.0.1".to_string()),
            ips: Some(vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()]),
            info_source: Some("multus-status".to_string()),
            ..Default::default()
        }];
        let found = extract_addresses(&interfaces, AddressSource::MultusStatus);
        assert_eq!(found.ipv4, vec!["10.0.0.1"]);
    }

    #[test]
    fn test_extract_multus_trims_whitespace() {
        let interfaces = [multus("  10.0.0.7 ", "multus-status")];
        let found = extract_addresses(&interfaces, AddressSource::MultusStatus);
        assert_eq!(found.ipv4, vec!["10.0.0.7"]);
    }

    // ---------- extract_addresses: guest-agent ----------

    #[test]
    fn test_extract_guest_agent_drops_link_local() {
        let interfaces = [guest_agent(
            &["192.168.1.1", "2001:db8::1", "fe80::1"],
            "domain, guest-agent",
        )];
        let found = extract_addresses(&interfaces, AddressSource::GuestAgent);
        assert_eq!(found.ipv4, vec!["192.168.1.1"]);
        assert_eq!(found.ipv6, vec!["2001:db8::1"]);
    }

    #[test]
    fn test_extract_guest_agent_discards_invalid_and_empty() {
        let interfaces = [guest_agent(
            &["", "  ", "bogus", "10.0.0.1", " 2001:db8::2 "],
            "guest-agent",
        )];
        let found = extract_addresses(&interfaces, AddressSource::GuestAgent);
        assert_eq!(found.ipv4, vec!["10.0.0.1"]);
        assert_eq!(found.ipv6, vec!["2001:db8::2"]);
    }

    #[test]
    fn test_extract_guest_agent_preserves_order_and_duplicates() {
        let interfaces = [
            guest_agent(&["10.0.0.2", "10.0.0.1"], "guest-agent"),
            guest_agent(&["10.0.0.2"], "guest-agent, multus-status"),
        ];
        let found = extract_addresses(&interfaces, AddressSource::GuestAgent);
        assert_eq!(found.ipv4, vec!["10.0.0.2", "10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn test_extract_guest_agent_skips_other_sources() {
        let interfaces = [guest_agent(&["10.0.0.1"], "domain, multus-status")];
        let found = extract_addresses(&interfaces, AddressSource::GuestAgent);
        assert!(found.is_empty());
    }

    #[test]
    fn test_extract_guest_agent_never_returns_link_local() {
        let interfaces = [guest_agent(
            &["fe80::1", "fe80::dead:beef", "febf:ffff::1", "FE80::2"],
            "guest-agent",
        )];
        let found = extract_addresses(&interfaces, AddressSource::GuestAgent);
        assert!(found.is_empty(), "link-local leaked: {found:?}");
    }

    // ---------- select_best ----------

    #[test]
    fn test_select_best_prefers_guest_agent() {
        let vmi = vmi(vec![
            guest_agent(&["10.0.0.1", "2001:db8::1"], "domain, guest-agent"),
            multus("192.168.0.9", "multus-status"),
        ]);

        let resolved = select_best(&vmi);
        assert_eq!(resolved.source, Some(AddressSource::GuestAgent));
        assert_eq!(resolved.source_tag(), "guest-agent");
        assert_eq!(resolved.ipv4, vec!["10.0.0.1"]);
        assert_eq!(resolved.ipv6, vec!["2001:db8::1"]);
        assert!(!resolved.ipv4.contains(&"192.168.0.9".to_string()));
    }

    #[test]
    fn test_select_best_falls_back_to_multus() {
        let vmi = vmi(vec![
            guest_agent(&["fe80::1"], "guest-agent"),
            multus("192.168.0.9", "multus-status"),
        ]);

        let resolved = select_best(&vmi);
        assert_eq!(resolved.source, Some(AddressSource::MultusStatus));
        assert_eq!(resolved.source_tag(), "multus-status");
        assert_eq!(resolved.ipv4, vec!["192.168.0.9"]);
        assert!(resolved.ipv6.is_empty());
    }

    #[test]
    fn test_select_best_nothing_resolved() {
        let resolved = select_best(&vmi(vec![multus("10.0.0.1", "domain")]));
        assert!(resolved.is_empty());
        assert_eq!(resolved.source, None);
        assert_eq!(resolved.source_tag(), "");
    }

    #[test]
    fn test_select_best_without_status() {
        let vmi = VirtualMachineInstance::new("vm", VirtualMachineInstanceSpec::default());
        assert_eq!(select_best(&vmi), ResolvedAddresses::default());
    }

    #[test]
    fn test_source_priority_order() {
        assert_eq!(
            SOURCE_PRIORITY,
            [AddressSource::GuestAgent, AddressSource::MultusStatus]
        );
        assert!(!AddressSource::GuestAgent.accepts_link_local());
        assert!(AddressSource::MultusStatus.accepts_link_local());
    }
}
