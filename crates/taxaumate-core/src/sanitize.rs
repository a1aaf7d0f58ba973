//! Cleanup of model output before display.
//!
//! The model is told not to emit code formatting, but it still does
//! occasionally, and it tends to glue amounts to the following word
//! ("1000dollars") or clause reference ("100(a)").
//!
//! # Rules, applied in order
//!
//! 1. Paired ```` ``` ```` fences: markers removed, inner text kept
//! 2. Any remaining single backtick removed
//! 3. A run of digits/commas directly followed by an ASCII letter gets a space
//! 4. A run of digits/commas directly followed by `(` or `)` gets a space
//!
//! The transform is idempotent, so it can be re-run over the whole accumulated
//! stream after every fragment.

use std::sync::LazyLock;

use regex::Regex;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[\s\S]*?```").expect("valid fence regex"));
static NUMBER_THEN_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([,\d]+)([a-zA-Z])").expect("valid number/letter regex"));
static NUMBER_THEN_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([,\d]+)([()])").expect("valid number/paren regex"));

/// Apply the display cleanup rules to model output.
pub fn sanitize_response(text: &str) -> String {
    let unfenced = FENCED_BLOCK.replace_all(text, |caps: &regex::Captures<'_>| {
        caps[0].replace("```", "")
    });
    let no_ticks = unfenced.replace('`', "");
    let spaced = NUMBER_THEN_LETTER.replace_all(&no_ticks, "$1 $2");
    NUMBER_THEN_PAREN.replace_all(&spaced, "$1 $2").into_owned()
}
