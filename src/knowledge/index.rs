// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ÍNDICE DE SIMILARIDADE EM MEMÓRIA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Busca exaustiva por similaridade cosseno. O índice vive apenas durante
// uma requisição; nada é persistido.
//
//   cos(θ) = (A · B) / (||A|| × ||B||)
//
// Vetores de dimensões diferentes não têm score: a inserção rejeita
// dimensão divergente e a busca coloca a comparação no fim do ranking.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::cmp::Ordering;

use crate::types::{DocumentChunk, ScoredChunk};

/// Similaridade cosseno entre dois vetores.
///
/// `None` quando as dimensões diferem; vetor nulo tem similaridade 0.
pub fn cosine(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    let denom = norm_a.sqrt() * norm_b.sqrt();
    Some(if denom == 0.0 { 0.0 } else { dot / denom })
}

/// Normaliza o vetor para norma L2 = 1 (vetor nulo fica como está)
pub fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Vetor com dimensão diferente da já indexada
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Embedding dimension mismatch: expected {expected}, got {got}")]
pub struct DimensionMismatch {
    /// Dimensão do índice
    pub expected: usize,
    /// Dimensão recebida
    pub got: usize,
}

/// Índice de chunks e seus embeddings
#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    entries: Vec<(DocumentChunk, Vec<f32>)>,
    dimension: Option<usize>,
}

impl SimilarityIndex {
    /// Índice vazio
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de chunks indexados
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Retorna true se nada foi indexado
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensão dos vetores (definida pelo primeiro inserido)
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Adiciona um chunk; todos os vetores precisam ter a mesma dimensão
    pub fn add(&mut self, chunk: DocumentChunk, vector: Vec<f32>) -> Result<(), DimensionMismatch> {
        match self.dimension {
            Some(expected) if expected != vector.len() => {
                return Err(DimensionMismatch {
                    expected,
                    got: vector.len(),
                })
            }
            None => self.dimension = Some(vector.len()),
            _ => {}
        }
        self.entries.push((chunk, vector));
        Ok(())
    }

    /// Os `k` chunks mais similares, do maior para o menor score.
    ///
    /// Empates mantêm a ordem de inserção.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (_, vector))| (i, cosine(query, vector).unwrap_or(f32::NEG_INFINITY)))
            .collect();

        // sort_by é estável
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(i, score)| ScoredChunk {
                chunk: self.entries[i].0.clone(),
                score,
            })
            .collect()
    }
}
