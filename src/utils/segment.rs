// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SEGMENT - Chunking Recursivo de Texto
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Divide o texto da página de referência em chunks com sobreposição para
// indexação semântica.
//
// Estratégia recursiva por separadores, do mais forte ao mais fraco:
//   "\n\n" (parágrafo) → "\n" (linha) → " " (palavra) → "" (caractere)
//
// O separador fica grudado no início do pedaço seguinte; pedaços pequenos
// são reagrupados até `chunk_size` e cada chunk novo reaproveita até
// `chunk_overlap` caracteres do final do anterior.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::VecDeque;

/// Separadores padrão, em ordem de preferência
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Opções de configuração para chunking
#[derive(Debug, Clone)]
pub struct SplitterOptions {
    /// Tamanho máximo do chunk em caracteres (default: 1000)
    pub chunk_size: usize,
    /// Caracteres compartilhados entre chunks vizinhos (default: 200)
    pub chunk_overlap: usize,
    /// Separadores em ordem de preferência
    pub separators: Vec<String>,
}

impl Default for SplitterOptions {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

impl SplitterOptions {
    /// Cria opções com os separadores padrão
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Divide texto em chunks com sobreposição.
///
/// # Garantias (com os separadores padrão)
/// - cada chunk tem no máximo `chunk_size` caracteres
/// - chunks vizinhos compartilham no máximo `chunk_overlap` caracteres
/// - chunks não têm espaços nas pontas e nunca são vazios
///
/// # Exemplo
/// ```rust
/// use travel_itinerary::utils::segment::{split_text, SplitterOptions};
///
/// let text = "Primeiro parágrafo.\n\nSegundo parágrafo.";
/// let chunks = split_text(text, &SplitterOptions::new(20, 5));
///
/// assert_eq!(chunks, vec!["Primeiro parágrafo.", "Segundo parágrafo."]);
/// ```
pub fn split_text(text: &str, options: &SplitterOptions) -> Vec<String> {
    let separators: Vec<&str> = options.separators.iter().map(String::as_str).collect();
    split_recursive(text, &separators, options)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn split_recursive(text: &str, separators: &[&str], options: &SplitterOptions) -> Vec<String> {
    // Primeiro separador presente no texto; "" sempre casa
    let mut separator = separators.last().copied().unwrap_or("");
    let mut finer: &[&str] = &[];
    for (i, candidate) in separators.iter().enumerate() {
        if candidate.is_empty() {
            separator = candidate;
            break;
        }
        if text.contains(candidate) {
            separator = candidate;
            finer = &separators[i + 1..];
            break;
        }
    }

    let mut chunks = Vec::new();
    let mut small: Vec<&str> = Vec::new();

    for piece in split_keeping_separator(text, separator) {
        if char_len(piece) < options.chunk_size {
            small.push(piece);
            continue;
        }

        if !small.is_empty() {
            chunks.extend(merge_pieces(&small, options));
            small.clear();
        }

        if finer.is_empty() {
            chunks.push(piece.to_string());
        } else {
            chunks.extend(split_recursive(piece, finer, options));
        }
    }

    if !small.is_empty() {
        chunks.extend(merge_pieces(&small, options));
    }

    chunks
}

/// Split mantendo o separador no início do pedaço seguinte.
///
/// "a\n\nb\n\nc" com "\n\n" → ["a", "\n\nb", "\n\nc"]
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}

/// Reagrupa pedaços pequenos em chunks de até `chunk_size` com sobreposição
fn merge_pieces(pieces: &[&str], options: &SplitterOptions) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<(&str, usize)> = VecDeque::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = char_len(piece);

        if total + len > options.chunk_size && !window.is_empty() {
            if let Some(chunk) = join_window(&window) {
                chunks.push(chunk);
            }
            // Mantém só o final do chunk emitido como sobreposição
            while total > options.chunk_overlap || (total + len > options.chunk_size && total > 0) {
                match window.pop_front() {
                    Some((_, first_len)) => total -= first_len,
                    None => break,
                }
            }
        }

        window.push_back((piece, len));
        total += len;
    }

    if let Some(chunk) = join_window(&window) {
        chunks.push(chunk);
    }

    chunks
}

fn join_window(window: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    /// Maior sufixo de `a` que é prefixo de `b`, em caracteres
    fn shared_chars(a: &str, b: &str) -> usize {
        let b_chars: Vec<char> = b.chars().collect();
        let a_chars: Vec<char> = a.chars().collect();
        (1..=a_chars.len().min(b_chars.len()))
            .rev()
            .find(|&k| a_chars[a_chars.len() - k..] == b_chars[..k])
            .unwrap_or(0)
    }

    fn numbered_words(count: usize) -> String {
        (0..count)
            .map(|i| format!("palavra{:05}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_split_keeping_separator() {
        assert_eq!(
            split_keeping_separator("a\n\nb\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\nc"]
        );
        assert_eq!(split_keeping_separator("\n\nb", "\n\n"), vec!["\n\nb"]);
        assert_eq!(
            split_keeping_separator("a\n\n\n\nb", "\n\n"),
            vec!["a", "\n\n", "\n\nb"]
        );
        assert_eq!(split_keeping_separator("ção", ""), vec!["ç", "ã", "o"]);
    }

    #[test]
    fn test_short_text_is_single_trimmed_chunk() {
        let chunks = split_text("  Londres em agosto  ", &SplitterOptions::default());
        assert_eq!(chunks, vec!["Londres em agosto"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(split_text("", &SplitterOptions::default()).is_empty());
        assert!(split_text(" \n\n ", &SplitterOptions::default()).is_empty());
    }

    #[test]
    fn test_paragraphs_are_preferred_boundaries() {
        let p1 = "a".repeat(600);
        let p2 = "b".repeat(600);
        let text = format!("{}\n\n{}", p1, p2);

        let chunks = split_text(&text, &SplitterOptions::default());
        assert_eq!(chunks, vec![p1, p2]);
    }

    #[test]
    fn test_word_split_respects_size_and_overlap() {
        let text = numbered_words(1000); // ~12000 chars, um único parágrafo
        let options = SplitterOptions::default();
        let chunks = split_text(&text, &options);

        assert!(chunks.len() > 10);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 1000, "chunk com {} chars", chunk.len());
        }
        for pair in chunks.windows(2) {
            let shared = shared_chars(&pair[0], &pair[1]);
            assert!(shared <= 200, "sobreposição de {} chars", shared);
            assert!(shared > 0, "chunks vizinhos deveriam se sobrepor");
        }
    }

    #[test]
    fn test_unbroken_text_falls_back_to_characters() {
        let text = "ç".repeat(1500);
        let chunks = split_text(&text, &SplitterOptions::default());

        let lengths: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lengths, vec![1000, 700]);
    }

    #[test]
    fn test_mixed_structure_never_exceeds_limit() {
        let mut text = String::new();
        for i in 0..40 {
            text.push_str(&format!("Seção {}\n", i));
            text.push_str(&numbered_words(30 + i * 7));
            text.push_str("\n\n");
        }

        let options = SplitterOptions::new(300, 60);
        let chunks = split_text(&text, &options);

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 300);
            assert_eq!(chunk.trim(), chunk);
        }
        for pair in chunks.windows(2) {
            assert!(shared_chars(&pair[0], &pair[1]) <= 60);
        }
    }
}
