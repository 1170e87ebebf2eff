//! Behavioral Pattern Learning
//!
//! Learns operator command patterns and flags departures from them:
//! replayed timestamps, off-hours switching, excessive toggling and
//! machine-speed command sequences.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::BehaviorConfig;
use crate::preprocess::PreprocessedSample;
use crate::telemetry::BreakerStatus;

use super::ModelOutput;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// One remembered operator command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct CommandRecord {
    timestamp: f64,
    hour: u32,
    breaker_status: BreakerStatus,
    breaker_changed: bool,
}

/// Learned behavior profile, exposed through pipeline stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorProfile {
    pub total_commands: usize,
    pub total_switches: usize,
    /// Up to three most common operation hours
    pub common_hours: Vec<u32>,
    pub average_switches_per_hour: f64,
}

/// Operator-pattern detector with bounded command, timestamp and
/// breaker-toggle FIFOs.
#[derive(Debug, Clone)]
pub struct BehaviorModel {
    config: BehaviorConfig,
    command_history: VecDeque<CommandRecord>,
    timestamp_history: VecDeque<f64>,
    switch_timestamps: VecDeque<f64>,
}

impl BehaviorModel {
    pub fn new(config: BehaviorConfig) -> Self {
        Self {
            command_history: VecDeque::with_capacity(config.pattern_memory_size),
            timestamp_history: VecDeque::with_capacity(config.pattern_memory_size),
            switch_timestamps: VecDeque::with_capacity(config.pattern_memory_size),
            config,
        }
    }

    pub fn analyze(&mut self, data: &PreprocessedSample) -> ModelOutput {
        let mut scores = Vec::new();
        let mut reasons = Vec::new();

        let checks = [
            self.check_replay_attack(data),
            self.check_off_hours_operation(data),
            self.check_excessive_switching(data),
            self.check_rapid_commands(data),
        ];
        for (score, reason) in checks.into_iter().flatten() {
            scores.push(score);
            reasons.push(reason);
        }

        self.update_history(data);

        if scores.is_empty() {
            return ModelOutput::new(
                0.0,
                0.75,
                "Normal operator behavior pattern",
                json!({
                    "checks_performed": 4,
                    "anomalies_found": 0,
                }),
            );
        }

        let final_score = scores.iter().cloned().fold(0.0, f64::max);
        let confidence = (0.65 + scores.len() as f64 * 0.1).min(0.90);

        let mut primary_reason = reasons[0].clone();
        if reasons.len() > 1 {
            primary_reason.push_str(&format!(" (+{} more anomalies)", reasons.len() - 1));
        }

        ModelOutput::new(
            final_score,
            confidence,
            primary_reason,
            json!({
                "checks_performed": 4,
                "anomalies_found": scores.len(),
                "all_reasons": reasons,
            }),
        )
    }

    /// A timestamp within tolerance of any stored past timestamp means the
    /// command was captured and resent.
    fn check_replay_attack(&self, data: &PreprocessedSample) -> Option<(f64, String)> {
        let current = data.temporal.unix_time;
        let tolerance = self.config.replay_time_tolerance;

        let replayed = self
            .timestamp_history
            .iter()
            .any(|past| (current - past).abs() < tolerance);

        if replayed {
            return Some((0.9, "Replay attack detected (repeated timestamp)".to_string()));
        }
        None
    }

    fn check_off_hours_operation(&self, data: &PreprocessedSample) -> Option<(f64, String)> {
        if !data.deltas.breaker_changed {
            return None;
        }

        if data.temporal.is_night {
            return Some((
                0.5,
                format!("Breaker operation during night hours ({}:00)", data.temporal.hour),
            ));
        }

        if data.temporal.is_weekend {
            return Some((0.4, "Breaker operation during weekend".to_string()));
        }

        None
    }

    /// Counts breaker toggles in the trailing hour, including the current
    /// one. The toggle FIFO is pruned to the trailing hour on every call.
    fn check_excessive_switching(&mut self, data: &PreprocessedSample) -> Option<(f64, String)> {
        let current = data.temporal.unix_time;

        if data.deltas.breaker_changed {
            while self.switch_timestamps.len() >= self.config.pattern_memory_size {
                self.switch_timestamps.pop_front();
            }
            self.switch_timestamps.push_back(current);
        }

        let one_hour_ago = current - SECONDS_PER_HOUR;
        self.switch_timestamps.retain(|&t| t > one_hour_ago);

        let recent = self.switch_timestamps.len();
        let max_switches = self.config.max_switches_per_hour;

        if recent > max_switches {
            let score = (recent as f64 / (max_switches as f64 * 2.0)).min(1.0);
            return Some((score, format!("Excessive breaker toggling ({recent} switches in 1 hour)")));
        }

        None
    }

    fn check_rapid_commands(&self, data: &PreprocessedSample) -> Option<(f64, String)> {
        let elapsed = data.deltas.time_secs;

        if data.deltas.breaker_changed && elapsed < self.config.command_interval_min {
            return Some((
                0.6,
                format!(
                    "Rapid command sequence ({:.1}s interval, min {}s)",
                    elapsed, self.config.command_interval_min
                ),
            ));
        }

        None
    }

    fn update_history(&mut self, data: &PreprocessedSample) {
        let capacity = self.config.pattern_memory_size;

        while self.command_history.len() >= capacity {
            self.command_history.pop_front();
        }
        self.command_history.push_back(CommandRecord {
            timestamp: data.temporal.unix_time,
            hour: data.temporal.hour,
            breaker_status: data.sample.breaker_status,
            breaker_changed: data.deltas.breaker_changed,
        });

        while self.timestamp_history.len() >= capacity {
            self.timestamp_history.pop_front();
        }
        self.timestamp_history.push_back(data.temporal.unix_time);
    }

    /// Learned behavior profile statistics.
    pub fn profile(&self) -> BehaviorProfile {
        let total_commands = self.command_history.len();
        let total_switches = self.command_history.iter().filter(|c| c.breaker_changed).count();

        let mut hour_counts = [0usize; 24];
        for command in &self.command_history {
            hour_counts[command.hour as usize % 24] += 1;
        }

        let mut ranked: Vec<(u32, usize)> = hour_counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(hour, &count)| (hour as u32, count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let average_switches_per_hour =
            total_switches as f64 / (total_commands as f64 / 60.0).max(1.0);

        BehaviorProfile {
            total_commands,
            total_switches,
            common_hours: ranked.into_iter().take(3).map(|(hour, _)| hour).collect(),
            average_switches_per_hour,
        }
    }

    pub fn command_history_len(&self) -> usize {
        self.command_history.len()
    }

    pub fn reset(&mut self) {
        self.command_history.clear();
        self.timestamp_history.clear();
        self.switch_timestamps.clear();
    }

    pub fn info(&self) -> serde_json::Value {
        json!({
            "name": "Behavioral Pattern Learning",
            "type": "behavioral_learning",
            "methods": [
                "replay_attack_detection",
                "off_hours_detection",
                "excessive_switching_detection",
                "rapid_command_detection",
            ],
            "config": self.config,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
