//! Vocabulary mapping from token ids to words for decoding model output.
//!
//! The base mapping is loaded from `id2word.json` in a data directory: a
//! JSON array of words indexed by token id. Two synthetic entries are
//! injected at construction — the CTC blank token at id `K` (the base
//! vocabulary size) and a catch-all at id `-1` for the ids beam search
//! emits after end-of-sequence.

use crate::error::{Result, VocabError};
use crate::snapshot;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// Vocabulary file name inside a data directory.
pub const VOCAB_FILE: &str = "id2word.json";

/// Display string for the CTC blank token.
pub const BLANK_WORD: &str = "<>";

/// Display string for the post-end-of-sequence id `-1`.
pub const CATCH_ALL_WORD: &str = "<-1>";

/// Decoding configuration consumed at vocabulary construction.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct DecodeConfig {
    /// Designated CTC blank token id; must equal the vocabulary size when set
    pub ctc_blank_id: Option<i64>,
}

/// Immutable id-to-word mapping with injected sentinel entries.
#[derive(Clone, Debug)]
pub struct Vocabulary {
    id_to_word: HashMap<i64, String>,
    vocab_size: usize,
}

impl Vocabulary {
    /// Load the base mapping from `<data_dir>/id2word.json` and construct.
    pub fn load(data_dir: &Path, config: &DecodeConfig) -> Result<Self> {
        let words: Vec<String> = snapshot::load(&data_dir.join(VOCAB_FILE))?;
        Self::from_words(words, config)
    }

    /// Construct from a dense word list, word index being the token id.
    ///
    /// # Errors
    ///
    /// Fails with [`VocabError::BlankIdMismatch`] if the configured CTC
    /// blank id is set and differs from the vocabulary size.
    pub fn from_words(words: Vec<String>, config: &DecodeConfig) -> Result<Self> {
        let vocab_size = words.len();
        let blank_id = vocab_size as i64;

        if let Some(configured) = config.ctc_blank_id {
            if configured != blank_id {
                return Err(VocabError::BlankIdMismatch {
                    expected: blank_id,
                    got: configured,
                }
                .into());
            }
        }

        let mut id_to_word: HashMap<i64, String> = words
            .into_iter()
            .enumerate()
            .map(|(id, word)| (id as i64, word))
            .collect();
        id_to_word.insert(blank_id, BLANK_WORD.to_string());
        id_to_word.insert(-1, CATCH_ALL_WORD.to_string());

        Ok(Self {
            id_to_word,
            vocab_size,
        })
    }

    /// Number of base entries, excluding the injected sentinels.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Id of the injected CTC blank token.
    pub fn blank_id(&self) -> i64 {
        self.vocab_size as i64
    }

    /// Word for a token id.
    ///
    /// An unknown id is logged at error severity and rendered as `"<id>"`
    /// so that one stray id never fails a whole batch.
    pub fn word(&self, id: i64) -> String {
        match self.id_to_word.get(&id) {
            Some(word) => word.clone(),
            None => {
                tracing::error!(id, "unknown token id");
                format!("<{id}>")
            }
        }
    }

    /// Render each row of a (batch, time) id matrix as a labelled line.
    ///
    /// Every line is `label`, a space, then the row's words joined by
    /// `separator` — or concatenated directly when `separator` is `None`.
    pub fn seq2str(&self, ids: &Array2<i64>, label: &str, separator: Option<&str>) -> Vec<String> {
        let separator = separator.unwrap_or("");
        ids.rows()
            .into_iter()
            .map(|row| {
                let words: Vec<String> = row.iter().map(|&id| self.word(id)).collect();
                format!("{label} {}", words.join(separator))
            })
            .collect()
    }
}

static VOCABULARY: OnceLock<Vocabulary> = OnceLock::new();

/// Load and register the process-wide vocabulary.
///
/// The first successful call constructs and publishes the mapper; later
/// calls return the cached value without touching the data directory.
/// Concurrent first calls may each load the file, but only one value is
/// published and returned to every caller.
pub fn initialize(data_dir: &Path, config: &DecodeConfig) -> Result<&'static Vocabulary> {
    if let Some(vocab) = VOCABULARY.get() {
        return Ok(vocab);
    }
    let vocab = Vocabulary::load(data_dir, config)?;
    Ok(VOCABULARY.get_or_init(|| vocab))
}

/// The process-wide vocabulary registered by [`initialize`].
///
/// # Errors
///
/// Fails with [`VocabError::Uninitialized`] before the first `initialize`.
pub fn active() -> Result<&'static Vocabulary> {
    VOCABULARY
        .get()
        .ok_or_else(|| VocabError::Uninitialized.into())
}

/// [`Vocabulary::seq2str`] through the process-wide vocabulary.
pub fn seq2str(ids: &Array2<i64>, label: &str, separator: Option<&str>) -> Result<Vec<String>> {
    Ok(active()?.seq2str(ids, label, separator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use ndarray::array;

    fn words() -> Vec<String> {
        ["\\alpha", "\\beta", "{", "}"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn vocabulary() -> Vocabulary {
        Vocabulary::from_words(words(), &DecodeConfig::default()).unwrap()
    }

    #[test]
    fn maps_known_ids() {
        let vocab = vocabulary();

        assert_eq!(vocab.vocab_size(), 4);
        assert_eq!(vocab.word(0), "\\alpha");
        assert_eq!(vocab.word(3), "}");
    }

    #[test]
    fn injects_sentinel_entries() {
        let vocab = vocabulary();

        assert_eq!(vocab.blank_id(), 4);
        assert_eq!(vocab.word(4), "<>");
        assert_eq!(vocab.word(-1), "<-1>");
    }

    #[test]
    fn renders_unknown_ids_as_placeholders() {
        let vocab = vocabulary();

        assert_eq!(vocab.word(7), "<7>");
        assert_eq!(vocab.word(-3), "<-3>");
    }

    #[test]
    fn accepts_matching_blank_id() {
        let config = DecodeConfig {
            ctc_blank_id: Some(4),
        };

        assert!(Vocabulary::from_words(words(), &config).is_ok());
    }

    #[test]
    fn rejects_mismatched_blank_id() {
        let config = DecodeConfig {
            ctc_blank_id: Some(3),
        };

        let result = Vocabulary::from_words(words(), &config);

        assert!(matches!(
            result,
            Err(Error::Vocab(VocabError::BlankIdMismatch {
                expected: 4,
                got: 3
            }))
        ));
    }

    #[test]
    fn seq2str_concatenates_by_default() {
        let vocab = vocabulary();
        let ids = array![[0, 1, 2], [3, 4, -1]];

        let lines = vocab.seq2str(&ids, "L", None);

        assert_eq!(lines, vec!["L \\alpha\\beta{", "L }<><-1>"]);
    }

    #[test]
    fn seq2str_joins_with_separator() {
        let vocab = vocabulary();
        let ids = array![[0, 1], [2, 3]];

        let lines = vocab.seq2str(&ids, "pred", Some(" "));

        assert_eq!(lines, vec!["pred \\alpha \\beta", "pred { }"]);
    }

    #[test]
    fn loads_from_data_dir() {
        let dir = std::env::temp_dir().join("magpie-vocab-load");
        if dir.exists() {
            std::fs::remove_dir_all(&dir).ok();
        }
        std::fs::create_dir_all(&dir).unwrap();

        crate::snapshot::dump(&words(), &dir.join(VOCAB_FILE)).unwrap();

        let vocab = Vocabulary::load(&dir, &DecodeConfig::default()).unwrap();
        assert_eq!(vocab.vocab_size(), 4);
        assert_eq!(vocab.word(1), "\\beta");

        std::fs::remove_dir_all(&dir).ok();
    }

    // The process-wide registry is one-shot per process, so its whole
    // lifecycle lives in a single test to keep ordering deterministic.
    #[test]
    fn process_wide_registry_lifecycle() {
        let before = active();
        assert!(matches!(
            before,
            Err(Error::Vocab(VocabError::Uninitialized))
        ));

        let early = seq2str(&array![[0]], "L", None);
        assert!(early.is_err());

        let dir = std::env::temp_dir().join("magpie-vocab-global");
        if dir.exists() {
            std::fs::remove_dir_all(&dir).ok();
        }
        std::fs::create_dir_all(&dir).unwrap();
        crate::snapshot::dump(&words(), &dir.join(VOCAB_FILE)).unwrap();

        let first = initialize(&dir, &DecodeConfig::default()).unwrap();
        let second = initialize(&dir, &DecodeConfig::default()).unwrap();
        assert!(std::ptr::eq(first, second));

        let lines = seq2str(&array![[0, 1]], "L", Some(" ")).unwrap();
        assert_eq!(lines, vec!["L \\alpha \\beta"]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
