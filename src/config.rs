use serde::Deserialize;
use tracing::warn;

/// Runtime knobs for the kiosk client. Everything has a default so the binary
/// boots with no environment at all.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// Base URL of the conversation backend, no trailing slash required.
    pub backend_url: String,
    pub request_timeout_ms: u64,
    /// How long a MutationKey suppresses repeats.
    pub quarantine_ms: u64,
    /// Half period of the highlight pulse (rest -> peak).
    pub pulse_half_period_ms: u64,
    pub pulse_iterations: u32,
    pub barcode_scan_ms: u64,
    /// How long the card-insert prompt waits before the card counts as inserted.
    pub card_insert_ms: u64,
    pub payment_processing_ms: u64,
    /// Settling delay before a recorded clip is uploaded.
    pub voice_send_delay_ms: u64,
    pub sample_rate: u32,
    pub max_recording_secs: u32,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://192.168.0.15:8000".to_string(),
            request_timeout_ms: 15_000,
            quarantine_ms: 5_000,
            pulse_half_period_ms: 500,
            pulse_iterations: 10,
            barcode_scan_ms: 10_000,
            card_insert_ms: 3_000,
            payment_processing_ms: 2_000,
            voice_send_delay_ms: 100,
            sample_rate: 16_000,
            max_recording_secs: 60,
        }
    }
}

impl KioskConfig {
    /// Reads `KIOSK_*` variables over the defaults. Unparseable values are
    /// ignored with a warning rather than aborting startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("KIOSK_BACKEND_URL") {
            let trimmed = url.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                config.backend_url = trimmed.to_string();
            }
        }

        read_number(&lookup, "KIOSK_REQUEST_TIMEOUT_MS", &mut config.request_timeout_ms);
        read_number(&lookup, "KIOSK_QUARANTINE_MS", &mut config.quarantine_ms);
        read_number(&lookup, "KIOSK_PULSE_HALF_PERIOD_MS", &mut config.pulse_half_period_ms);
        read_number(&lookup, "KIOSK_PULSE_ITERATIONS", &mut config.pulse_iterations);
        read_number(&lookup, "KIOSK_BARCODE_SCAN_MS", &mut config.barcode_scan_ms);
        read_number(&lookup, "KIOSK_CARD_INSERT_MS", &mut config.card_insert_ms);
        read_number(&lookup, "KIOSK_PAYMENT_PROCESSING_MS", &mut config.payment_processing_ms);
        read_number(&lookup, "KIOSK_VOICE_SEND_DELAY_MS", &mut config.voice_send_delay_ms);
        read_number(&lookup, "KIOSK_SAMPLE_RATE", &mut config.sample_rate);
        read_number(&lookup, "KIOSK_MAX_RECORDING_SECS", &mut config.max_recording_secs);

        config
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

fn read_number<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse::<T>() {
            Ok(value) => *slot = value,
            Err(_) => warn!("Ignoring invalid {}={:?}, keeping default", key, raw),
        }
    }
}
