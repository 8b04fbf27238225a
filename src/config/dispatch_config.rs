//! config/dispatch_config.rs
//! Parámetros del despacho masivo y de la simulación.

use std::env;
use std::time::Duration;

pub const SIMULATED_ERRORS: [&str; 3] = ["Network error", "Invalid number", "Delivery failed"];

/// Ritmo del envío y cada cuántos registros se hace commit.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub throttle: Duration, // pausa entre destinatarios (no después del último)
    pub commit_every: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            throttle: Duration::from_millis(100),
            commit_every: 10,
        }
    }
}

impl DispatchConfig {
    /// SMS_THROTTLE_MS y SMS_COMMIT_EVERY
    pub fn from_env() -> Self {
        let mut config = DispatchConfig::default();

        if let Some(ms) = env::var("SMS_THROTTLE_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.throttle = Duration::from_millis(ms);
        }

        if let Some(n) = env::var("SMS_COMMIT_EVERY")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            config.commit_every = n;
        }

        config.normalized()
    }

    /// commit_every = 0 no tiene sentido; se lleva a 1.
    pub fn normalized(mut self) -> Self {
        self.commit_every = self.commit_every.max(1);
        self
    }
}

/// Constantes de la simulación (latencia, tasa de éxito, costo fijo).
/// Son valores de prueba, no reglas de negocio.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub latency: Duration,
    pub success_rate: f64,
    pub flat_cost: f64,
    pub error_reasons: Vec<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            latency: Duration::from_millis(50),
            success_rate: 0.95,
            flat_cost: 0.5,
            error_reasons: SIMULATED_ERRORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SimulationConfig {
    /// Sin latencia artificial (útil en tests).
    pub fn instant() -> Self {
        SimulationConfig {
            latency: Duration::ZERO,
            ..SimulationConfig::default()
        }
    }

    pub fn with_success_rate(mut self, rate: f64) -> Self {
        self.success_rate = rate;
        self
    }

    /// Tasa acotada a [0, 1]; NaN cuenta como 0.
    pub fn clamped_success_rate(&self) -> f64 {
        if self.success_rate.is_nan() {
            0.0
        } else {
            self.success_rate.clamp(0.0, 1.0)
        }
    }
}
