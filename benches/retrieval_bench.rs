//! Benchmarks da base de conhecimento.
//!
//! Testa performance de:
//! - Chunking recursivo com sobreposição
//! - Busca top-k por similaridade cosseno
//!
//! Executar: `cargo bench --bench retrieval_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use travel_itinerary::knowledge::SimilarityIndex;
use travel_itinerary::types::{ChunkMetadata, DocumentChunk};
use travel_itinerary::utils::{split_text, SplitterOptions};

/// Vetor pseudo-aleatório determinístico (LCG)
fn pseudo_embedding(seed: u64, dim: usize) -> Vec<f32> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    (0..dim)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect()
}

fn sample_page(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| {
            format!(
                "Dica {}: em Londres, use o Oyster card no metrô e visite os museus gratuitos da cidade.",
                i
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK: Chunking
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_split_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_text");
    let options = SplitterOptions::new(1000, 200);

    for paragraphs in [10, 100, 1000].iter() {
        let page = sample_page(*paragraphs);
        group.throughput(Throughput::Bytes(page.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(paragraphs), &page, |b, page| {
            b.iter(|| black_box(split_text(page, &options)))
        });
    }

    group.finish();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK: Busca no índice
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn build_index(size: usize, dim: usize) -> SimilarityIndex {
    let mut index = SimilarityIndex::new();
    for i in 0..size {
        let chunk = DocumentChunk {
            text: format!("chunk {}", i),
            metadata: ChunkMetadata {
                source: "https://www.dicasdeviagem.com/inglaterra/".into(),
                section: "postcontentwrap".into(),
                chunk_index: i,
            },
        };
        let _ = index.add(chunk, pseudo_embedding(i as u64, dim));
    }
    index
}

fn bench_index_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_search");
    let dim = 1536;
    let query = pseudo_embedding(u64::MAX, dim);

    for size in [50, 500, 5000].iter() {
        let index = build_index(*size, dim);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("top4", size), &index, |b, index| {
            b.iter(|| black_box(index.search(&query, 4)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_split_text, bench_index_search);

criterion_main!(benches);
