// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition_is_valid() {
        Config::command().debug_assert();
    }

    #[test]
    fn test_explicit_flags() {
        let config = Config::try_parse_from([
            "kubevirt-dns",
            "--metrics-bind-address",
            "127.0.0.1:9090",
            "--health-probe-bind-address",
            "127.0.0.1:9091",
            "--leader-elect",
            "--leader-election-id",
            "my-lease",
            "--leader-election-namespace",
            "kubevirt-dns-system",
            "--leader-election-identity",
            "pod-0",
            "--watch-namespace",
            "vms",
            "--reconcile-timeout-secs",
            "10",
            "--error-requeue-secs",
            "5",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.metrics_bind_address.port(), 9090);
        assert_eq!(config.health_probe_bind_address.port(), 9091);
        assert!(config.leader_elect);
        assert_eq!(config.leader_election_id, "my-lease");
        assert_eq!(config.leader_election_namespace, "kubevirt-dns-system");
        assert_eq!(config.identity(), "pod-0");
        assert_eq!(config.watch_namespace.as_deref(), Some("vms"));
        assert_eq!(config.reconcile_timeout(), Duration::from_secs(10));
        assert_eq!(config.error_requeue(), Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_log_format_is_case_insensitive() {
        let config =
            Config::try_parse_from(["kubevirt-dns", "--log-format", "JSON"]).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_bind_address_is_rejected() {
        let result = Config::try_parse_from(["kubevirt-dns", "--metrics-bind-address", "nope"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let result = Config::try_parse_from(["kubevirt-dns", "--reconcile-timeout-secs", "-3"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_durations_are_rejected() {
        for flag in ["--reconcile-timeout-secs", "--error-requeue-secs"] {
            let result = Config::try_parse_from(["kubevirt-dns", flag, "0"]);
            assert!(result.is_err(), "{flag} 0 should be rejected");
        }
        let config =
            Config::try_parse_from(["kubevirt-dns", "--reconcile-timeout-secs", "1"]).unwrap();
        assert_eq!(config.reconcile_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_default_addresses_parse() {
        let metrics: SocketAddr = DEFAULT_METRICS_BIND_ADDRESS.parse().unwrap();
        let probes: SocketAddr = DEFAULT_HEALTH_PROBE_BIND_ADDRESS.parse().unwrap();
        assert_eq!(metrics.port(), 8080);
        assert_eq!(probes.port(), 8081);
    }

    #[test]
    fn test_blank_identity_falls_back() {
        let config = Config::try_parse_from([
            "kubevirt-dns",
            "--leader-election-identity",
            "  ",
        ])
        .unwrap();
        assert!(!config.identity().trim().is_empty());
    }
}
