use byte_unit::{Byte, UnitType};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;
use tiktoken_rs::{CoreBPE, cl100k_base};

/// Loaded once per process. `None` when the BPE tables cannot be built, in
/// which case token counts are reported as unavailable.
static ENCODER: Lazy<Option<Mutex<CoreBPE>>> = Lazy::new(|| match cl100k_base() {
    Ok(bpe) => Some(Mutex::new(bpe)),
    Err(e) => {
        log::warn!("Token encoder unavailable, token counts will be N/A: {}", e);
        None
    }
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentStats {
    pub bytes: usize,
    pub tokens: Option<usize>,
}

impl ContentStats {
    pub fn measure(text: &str) -> Self {
        Self {
            bytes: text.len(),
            tokens: count_tokens(text),
        }
    }

    pub fn human_size(&self) -> String {
        human_size(self.bytes)
    }
}

impl fmt::Display for ContentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens = match self.tokens {
            Some(n) => group_thousands(n),
            None => "N/A".to_string(),
        };
        write!(
            f,
            "Size: {} ({} bytes), Tokens (est.): {}",
            self.human_size(),
            group_thousands(self.bytes),
            tokens
        )
    }
}

pub fn count_tokens(text: &str) -> Option<usize> {
    let encoder = ENCODER.as_ref()?;
    let bpe = encoder.lock().ok()?;
    Some(bpe.encode_ordinary(text).len())
}

pub fn human_size(bytes: usize) -> String {
    let byte = Byte::from_u128(bytes as u128).unwrap_or_default();
    format!("{:.2}", byte.get_appropriate_unit(UnitType::Binary))
}

/// `1234567` → `1,234,567`.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
