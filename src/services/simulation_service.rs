//! services/simulation_service.rs
//! Envíos simulados para desarrollo local (sin credenciales del gateway).

use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::{config::dispatch_config::SimulationConfig, models::sms_model::MessageOutcome};

/// Costo placeholder cuando el gateway real falla y se degrada a simulación.
pub const PLACEHOLDER_COST: &str = "0.5";

#[derive(Debug, Clone)]
pub struct SimulationService {
    config: SimulationConfig,
}

impl SimulationService {
    pub fn new(config: SimulationConfig) -> Self {
        SimulationService { config }
    }

    /// Espera la latencia configurada y sortea el resultado.
    pub async fn simulate(&self, phone_number: &str) -> MessageOutcome {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        let outcome = self.draw(&mut rand::thread_rng(), phone_number);
        log::info!(
            "(simulate) SIMULATED SMS to {}: success={}",
            phone_number,
            outcome.success
        );
        outcome
    }

    /// Sorteo puro, sin latencia: éxito con probabilidad `success_rate`,
    /// costo fijo si sale bien y un error al azar si no.
    pub fn draw<R: Rng>(&self, rng: &mut R, phone_number: &str) -> MessageOutcome {
        if rng.gen_bool(self.config.clamped_success_rate()) {
            let cost = format_cost(self.config.flat_cost);
            MessageOutcome::delivered(phone_number, Uuid::new_v4().to_string(), Some(cost))
                .simulated()
        } else {
            let reason = self
                .config
                .error_reasons
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| "Delivery failed".to_string());
            let mut outcome = MessageOutcome::failed(phone_number, reason).simulated();
            outcome.cost = Some(format_cost(0.0));
            outcome
        }
    }

    /// Éxito sintético usado cuando el proveedor no responde bien.
    pub fn degraded_success(phone_number: &str) -> MessageOutcome {
        MessageOutcome::delivered(
            phone_number,
            Uuid::new_v4().to_string(),
            Some(PLACEHOLDER_COST.to_string()),
        )
        .simulated()
    }
}

fn format_cost(cost: f64) -> String {
    cost.to_string()
}
