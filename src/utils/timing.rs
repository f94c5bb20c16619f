// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIMING UTILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Medição do tempo de cada estágio do pipeline.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::time::Instant;

/// Timer de um estágio
pub struct StageTimer {
    start: Instant,
    name: &'static str,
}

impl StageTimer {
    /// Inicia o timer
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Tempo decorrido em milissegundos
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Para o timer e loga o tempo decorrido
    pub fn stop_and_log(self) -> u128 {
        let elapsed = self.elapsed_ms();
        log::info!("⏱️  {} completado em {}ms", self.name, elapsed);
        elapsed
    }
}

/// Tempos dos estágios de uma execução, na ordem em que rodaram
#[derive(Debug, Clone, Default)]
pub struct StageTimings {
    entries: Vec<(&'static str, u128)>,
}

impl StageTimings {
    /// Sem estágios registrados
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra a duração de um estágio
    pub fn record(&mut self, stage: &'static str, ms: u128) {
        self.entries.push((stage, ms));
    }

    /// Soma de todos os estágios
    pub fn total_ms(&self) -> u128 {
        self.entries.iter().map(|(_, ms)| ms).sum()
    }

    /// Resumo em uma linha para log
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(name, ms)| format!("{}: {}ms", name, ms))
            .collect();
        format!("{} | total: {}ms", parts.join(" | "), self.total_ms())
    }
}
