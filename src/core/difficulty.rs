// XMRig Bridge - Free and Open Source Software Statement
//
// This project, xmrig-bridge, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/difficulty.rs
// Version: 1.0.1
//
// This file contains the function for converting relay-provided hex targets
// into integer difficulty, located in the core subdirectory of the bridge
// source tree. The bridge only uses difficulty to estimate miner speed; it
// never validates work against it.

use log::warn;

const LOG_TARGET: &str = "xmrig_bridge::difficulty";

/// Maximum value of the 32-bit target space
const MAX_TARGET: u64 = 0xFFFFFFFF;

/// Difficulty assumed when the target is missing, short, or undecodable
const FALLBACK_DIFFICULTY: u64 = 1000;

/// Difficulty reported for an all-zero target instead of dividing by zero
const ZERO_TARGET_DIFFICULTY: u64 = 1_000_000;

/// Convert a hex-encoded little-endian 32-bit target into integer difficulty.
///
/// The target's first 4 bytes are read little-endian as `v`; the result is
/// `floor(0xFFFFFFFF / v)`. Malformed input degrades to a fixed fallback,
/// a zero target to a fixed ceiling. Never panics.
pub fn target_to_difficulty(target_hex: &str) -> u64 {
    if target_hex.len() < 8 {
        warn!(target: LOG_TARGET, "Target too short ({} hex chars), using fallback difficulty", target_hex.len());
        return FALLBACK_DIFFICULTY;
    }
    match hex::decode(target_hex) {
        Ok(target_bytes) if target_bytes.len() >= 4 => {
            let target_u32 = u32::from_le_bytes([
                target_bytes[0],
                target_bytes[1],
                target_bytes[2],
                target_bytes[3],
            ]);
            if target_u32 == 0 {
                warn!(target: LOG_TARGET, "Zero target value, using ceiling difficulty");
                ZERO_TARGET_DIFFICULTY
            } else {
                MAX_TARGET / target_u32 as u64
            }
        }
        Ok(target_bytes) => {
            warn!(target: LOG_TARGET, "Target too short ({} bytes), using fallback difficulty", target_bytes.len());
            FALLBACK_DIFFICULTY
        }
        Err(e) => {
            warn!(target: LOG_TARGET, "Failed to decode target hex: {}", e);
            FALLBACK_DIFFICULTY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_target() {
        // a0 00 00 00 read little-endian is 0xa0 = 160
        assert_eq!(target_to_difficulty("a0000000"), 0xFFFFFFFFu64 / 160);
    }

    #[test]
    fn test_unit_target() {
        assert_eq!(target_to_difficulty("01000000"), 0xFFFFFFFFu64);
    }

    #[test]
    fn test_full_width_target_uses_low_bytes() {
        // Only the first 4 bytes of a longer target participate
        let wide = format!("{}{}", "a0000000", "00".repeat(28));
        assert_eq!(target_to_difficulty(&wide), target_to_difficulty("a0000000"));
    }

    #[test]
    fn test_short_target_falls_back() {
        assert_eq!(target_to_difficulty(""), 1000);
        assert_eq!(target_to_difficulty("ff"), 1000);
        assert_eq!(target_to_difficulty("ffffff"), 1000);
    }

    #[test]
    fn test_zero_target_ceiling() {
        assert_eq!(target_to_difficulty("00000000"), 1_000_000);
    }

    #[test]
    fn test_malformed_target_falls_back() {
        assert_eq!(target_to_difficulty("zzzzzzzz"), 1000);
        assert_eq!(target_to_difficulty("a000000"), 1000); // odd length, < 8 chars
    }
}

// Changelog:
// - v1.0.1 (2025-07-18): Named the fallback and ceiling constants.
// - v1.0.0 (2025-07-12): Initial codec.
//   - Purpose: Derives the difficulty the hashrate estimator scales by from
//     the compact target carried on each relay job.
