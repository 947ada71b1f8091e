// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/format.rs
// Version: 1.0.0
//
// This file provides utility functions for formatting statistics in the
// XMRig Bridge, located in the utils subdirectory. It formats hashrate,
// uptime, and numbers for consistent output in logs and status lines.
//
// Tree Location:
// - src/utils/format.rs (formatting utilities)
// - Depends on: std

use std::time::Duration;

/// Utility functions for formatting bridge statistics
pub struct FormatUtils;

impl FormatUtils {
    /// Format hashrate in appropriate units (H/s, KH/s, MH/s, GH/s)
    pub fn format_hashrate(hashrate: f64) -> String {
        if hashrate >= 1_000_000_000.0 {
            format!("{:.2} GH/s", hashrate / 1_000_000_000.0)
        } else if hashrate >= 1_000_000.0 {
            format!("{:.2} MH/s", hashrate / 1_000_000.0)
        } else if hashrate >= 1_000.0 {
            format!("{:.2} KH/s", hashrate / 1_000.0)
        } else {
            format!("{:.2} H/s", hashrate)
        }
    }

    /// Format an uptime duration as h/m/s
    pub fn format_uptime(uptime: Duration) -> String {
        let secs = uptime.as_secs();
        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        }
    }

    /// Format large numbers with suffixes (K, M, B)
    pub fn format_number(num: u64) -> String {
        if num >= 1_000_000_000 {
            format!("{:.1}B", num as f64 / 1_000_000_000.0)
        } else if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hashrate_units() {
        assert_eq!(FormatUtils::format_hashrate(12.5), "12.50 H/s");
        assert_eq!(FormatUtils::format_hashrate(12_500.0), "12.50 KH/s");
        assert_eq!(FormatUtils::format_hashrate(12_500_000.0), "12.50 MH/s");
    }

    #[test]
    fn test_format_number_suffixes() {
        assert_eq!(FormatUtils::format_number(999), "999");
        assert_eq!(FormatUtils::format_number(26_843_545), "26.8M");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(FormatUtils::format_uptime(Duration::from_secs(42)), "42s");
        assert_eq!(FormatUtils::format_uptime(Duration::from_secs(90)), "1m 30s");
        assert_eq!(FormatUtils::format_uptime(Duration::from_secs(3720)), "1h 2m");
    }
}

// Changelog:
// - v1.0.0 (2025-07-12): Initial formatting helpers.
