//! Temporal gesture stabilization.
//!
//! Raw per-frame classification is noisy. This state machine converts
//! flicker into hysteresis-stable on/off signals: a gesture must be
//! sustained before it activates, must stay absent before it deactivates,
//! and cannot re-arm until a cooldown elapses.
//!
//! Per-gesture lifecycle: IDLE → POTENTIAL → ACTIVE → EXIT_PENDING → IDLE.

use std::collections::{HashMap, HashSet};

use crate::config::StabilizerConfig;

use super::vocabulary::GestureName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Detected but not yet sustained for the hold duration.
    Potential,
    /// Confirmed; reported in the active set.
    Active,
    /// Detection dropped; still reported active until the exit window ends.
    ExitPending,
}

#[derive(Debug, Clone, Copy)]
struct Record {
    phase: Phase,
    /// When the current phase was entered.
    entered_at: u64,
    /// Last frame the gesture was actually detected.
    last_seen: u64,
}

/// Per-session debounce state machine. One instance per pipeline.
#[derive(Debug)]
pub struct GestureStabilizer {
    config: StabilizerConfig,
    records: HashMap<GestureName, Record>,
    /// Exit timestamps starting each gesture's cooldown window.
    exited_at: HashMap<GestureName, u64>,
}

impl GestureStabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        Self {
            config,
            records: HashMap::new(),
            exited_at: HashMap::new(),
        }
    }

    /// Feed one frame's raw detections and get back the confirmed set.
    ///
    /// `now_ms` is caller-supplied so hosts drive time from their frame
    /// clock and tests drive it deterministically.
    pub fn observe(&mut self, detected: &HashSet<GestureName>, now_ms: u64) -> HashSet<GestureName> {
        // Advance or create records for detected gestures
        for &name in detected {
            match self.records.get_mut(&name) {
                Some(record) => {
                    record.last_seen = now_ms;
                    match record.phase {
                        Phase::Potential => {
                            if now_ms.saturating_sub(record.entered_at) >= self.config.hold_ms {
                                record.phase = Phase::Active;
                                record.entered_at = now_ms;
                                tracing::debug!(gesture = ?name, "gesture activated");
                            }
                        }
                        Phase::Active => {}
                        Phase::ExitPending => {
                            // Flicker: detection resumed inside the exit window
                            record.phase = Phase::Active;
                            record.entered_at = now_ms;
                        }
                    }
                }
                None => {
                    if !self.in_cooldown(name, now_ms) {
                        self.records.insert(
                            name,
                            Record {
                                phase: Phase::Potential,
                                entered_at: now_ms,
                                last_seen: now_ms,
                            },
                        );
                    }
                }
            }
        }

        // Regress records for gestures absent this frame
        let strict = self.config.strict_hold;
        let grace_ms = self.config.grace_ms;
        let exit_ms = self.config.exit_ms;
        let mut exited = Vec::new();
        self.records.retain(|&name, record| {
            if detected.contains(&name) {
                return true;
            }
            match record.phase {
                Phase::Potential => {
                    // Strict: a single missed frame aborts the hold.
                    // Tolerant: gaps under the grace period survive.
                    let aborted =
                        strict || now_ms.saturating_sub(record.last_seen) >= grace_ms;
                    !aborted
                }
                Phase::Active => {
                    record.phase = Phase::ExitPending;
                    record.entered_at = now_ms;
                    true
                }
                Phase::ExitPending => {
                    if now_ms.saturating_sub(record.entered_at) >= exit_ms {
                        exited.push(name);
                        false
                    } else {
                        true
                    }
                }
            }
        });
        for name in exited {
            tracing::debug!(gesture = ?name, "gesture exit confirmed");
            self.exited_at.insert(name, now_ms);
        }

        // Active set: confirmed gestures, including those inside the
        // exit-debounce window
        self.records
            .iter()
            .filter(|(_, r)| matches!(r.phase, Phase::Active | Phase::ExitPending))
            .map(|(&name, _)| name)
            .collect()
    }

    /// Drop all tracking state, including cooldowns.
    pub fn reset(&mut self) {
        self.records.clear();
        self.exited_at.clear();
    }

    fn in_cooldown(&self, name: GestureName, now_ms: u64) -> bool {
        self.exited_at
            .get(&name)
            .is_some_and(|&exit| now_ms.saturating_sub(exit) < self.config.cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StabilizerConfig {
        StabilizerConfig {
            hold_ms: 150,
            exit_ms: 300,
            cooldown_ms: 500,
            strict_hold: false,
            grace_ms: 80,
        }
    }

    fn set(names: &[GestureName]) -> HashSet<GestureName> {
        names.iter().copied().collect()
    }

    const FIST: &[GestureName] = &[GestureName::LockMode];
    const NONE: &[GestureName] = &[];

    #[test]
    fn test_short_detection_never_activates() {
        let mut fsm = GestureStabilizer::new(config());
        // 4 frames at 33ms spacing span 132ms < 150ms hold
        for t in [0, 33, 66, 132] {
            assert!(fsm.observe(&set(FIST), t).is_empty());
        }
        assert!(fsm.observe(&set(NONE), 200).is_empty());
    }

    #[test]
    fn test_sustained_detection_activates() {
        let mut fsm = GestureStabilizer::new(config());
        for t in (0..150).step_by(33) {
            assert!(fsm.observe(&set(FIST), t).is_empty());
        }
        let active = fsm.observe(&set(FIST), 150);
        assert!(active.contains(&GestureName::LockMode));
    }

    #[test]
    fn test_brief_dropout_keeps_active() {
        let mut fsm = GestureStabilizer::new(config());
        fsm.observe(&set(FIST), 0);
        fsm.observe(&set(FIST), 160);
        // One-frame dropout, far shorter than the 300ms exit window
        let active = fsm.observe(&set(NONE), 193);
        assert!(active.contains(&GestureName::LockMode));
        // Re-detection resumes ACTIVE
        let active = fsm.observe(&set(FIST), 226);
        assert!(active.contains(&GestureName::LockMode));
    }

    #[test]
    fn test_long_dropout_deactivates_and_cooldown_blocks() {
        let mut fsm = GestureStabilizer::new(config());
        fsm.observe(&set(FIST), 0);
        assert!(fsm.observe(&set(FIST), 160).contains(&GestureName::LockMode));

        // Dropout begins at 200, exit confirmed at 200 + 300
        assert!(fsm.observe(&set(NONE), 200).contains(&GestureName::LockMode));
        assert!(fsm.observe(&set(NONE), 500).is_empty());

        // Re-detection during the 500ms cooldown does not even start a hold
        fsm.observe(&set(FIST), 600);
        fsm.observe(&set(FIST), 900);
        assert!(fsm.observe(&set(FIST), 999).is_empty());

        // After cooldown, a fresh hold succeeds
        fsm.observe(&set(FIST), 1001);
        let active = fsm.observe(&set(FIST), 1160);
        assert!(active.contains(&GestureName::LockMode));
    }

    #[test]
    fn test_strict_hold_aborts_on_single_gap() {
        let mut fsm = GestureStabilizer::new(StabilizerConfig {
            strict_hold: true,
            ..config()
        });
        fsm.observe(&set(FIST), 0);
        fsm.observe(&set(FIST), 100);
        fsm.observe(&set(NONE), 120); // gap aborts the hold
        fsm.observe(&set(FIST), 140);
        // The original hold would have completed by 160; the restarted one has not
        assert!(fsm.observe(&set(FIST), 160).is_empty());
        // Restarted hold completes at 140 + 150
        assert!(fsm.observe(&set(FIST), 290).contains(&GestureName::LockMode));
    }

    #[test]
    fn test_tolerant_hold_survives_short_gap() {
        let mut fsm = GestureStabilizer::new(config());
        fsm.observe(&set(FIST), 0);
        fsm.observe(&set(FIST), 60);
        fsm.observe(&set(NONE), 90); // 30ms gap, under the 80ms grace
        let active = fsm.observe(&set(FIST), 150);
        assert!(active.contains(&GestureName::LockMode));
    }
}
