// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `annotations.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::crd::{VirtualMachineInstance, VirtualMachineInstanceSpec};
    use std::collections::BTreeMap;

    fn vmi_with_annotations(annotations: &[(&str, &str)]) -> VirtualMachineInstance {
        let mut vmi = VirtualMachineInstance::new("vm", VirtualMachineInstanceSpec::default());
        let map: BTreeMap<String, String> = annotations
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        vmi.metadata.annotations = Some(map);
        vmi
    }

    #[test]
    fn test_parse_hostnames() {
        let cases: &[(&str, &[&str])] = &[
            ("foo.example.com", &["foo.example.com"]),
            (
                "foo.example.com,bar.example.com",
                &["foo.example.com", "bar.example.com"],
            ),
            (
                "  foo.example.com , bar.example.com  ",
                &["foo.example.com", "bar.example.com"],
            ),
            ("a.example.com,,b.example.com,", &["a.example.com", "b.example.com"]),
            ("", &[]),
            (" , ,", &[]),
        ];

        for (raw, want) in cases {
            assert_eq!(parse_hostnames(raw), *want, "parse_hostnames({raw:?})");
        }
    }

    #[test]
    fn test_parse_hostnames_keeps_duplicates_and_order() {
        assert_eq!(
            parse_hostnames("b.example.com,a.example.com,b.example.com"),
            vec!["b.example.com", "a.example.com", "b.example.com"]
        );
    }

    #[test]
    fn test_parse_hostnames_join_round_trip() {
        let lists: &[&[&str]] = &[
            &["vm.example.com"],
            &["vm.example.com", "alias.example.com"],
            &["a.example.com", "b.example.org", "c.example.net"],
        ];

        for list in lists {
            let joined = list.join(",");
            assert_eq!(parse_hostnames(&joined), *list);

            let spaced = list.join(" , ");
            assert_eq!(parse_hostnames(&spaced), *list);
        }
    }

    #[test]
    fn test_parse_ttl() {
        let cases = [
            (None, 300),
            (Some(""), 300),
            (Some("300"), 300),
            (Some("60"), 60),
            (Some(" 120 "), 120),
            (Some("abc"), 300),
            (Some("-1"), 300),
            (Some("0"), 300),
            (Some("1.5"), 300),
            (Some("86400000"), 86_400_000),
            (Some("99999999999999999999999"), 300),
        ];

        for (raw, want) in cases {
            assert_eq!(parse_ttl(raw), want, "parse_ttl({raw:?})");
        }
    }

    #[test]
    fn test_hostname_annotation_blank_is_absent() {
        let vmi = vmi_with_annotations(&[(crate::labels::HOSTNAME_ANNOTATION, "   ")]);
        assert_eq!(hostname_annotation(&vmi), None);

        let vmi = vmi_with_annotations(&[]);
        assert_eq!(hostname_annotation(&vmi), None);
    }

    #[test]
    fn test_hostname_annotation_trimmed() {
        let vmi =
            vmi_with_annotations(&[(crate::labels::HOSTNAME_ANNOTATION, " vm.example.com ")]);
        assert_eq!(hostname_annotation(&vmi), Some("vm.example.com"));
    }

    #[test]
    fn test_ttl_annotation() {
        let vmi = vmi_with_annotations(&[(crate::labels::TTL_ANNOTATION, "45")]);
        assert_eq!(parse_ttl(ttl_annotation(&vmi)), 45);

        let vmi = vmi_with_annotations(&[]);
        assert_eq!(ttl_annotation(&vmi), None);
    }
}
